use std::io::{self, BufReader};
use std::{env, fs, process};

use minipl::error::Diagnostic;
use minipl::MiniPl;

fn main() {
    let args: Vec<String> = env::args().collect();

    let path = match args.as_slice() {
        [_, path] => path,
        _ => {
            eprintln!("Usage: minipl <script>");
            process::exit(-1);
        }
    };

    let source = match fs::read_to_string(path) {
        Ok(source) => source,
        Err(error) => {
            eprintln!("{}", Diagnostic::from(error));
            process::exit(-1);
        }
    };

    let stdin = io::stdin();
    let mut input = BufReader::new(stdin.lock());
    let mut output = io::stdout();

    match MiniPl::new(&mut input, &mut output).run(&source) {
        Ok(()) => process::exit(0),
        Err(diagnostic) => {
            eprintln!("{diagnostic}");
            process::exit(-1);
        }
    }
}

//! Mini-PL is a tiny imperative teaching language: integers, strings,
//! booleans, variable declarations with optional initialization,
//! assignments, numeric-range `for` loops, and three built-ins (`read`,
//! `print`, `assert`). This crate is a tree-walking interpreter for it.
//!
//! ## Pipeline
//! Source text flows through four stages, each described in its own
//! module:
//!
//! 1. [`scanner`] — a pull-based tokenizer. `Scanner::scan_next_token`
//!    returns one [`token::Token`] per call; it never aborts on a bad
//!    character, it returns an [`token::TokenKind::Error`] token instead.
//! 2. [`parser`] — an LL(1) recursive-descent parser that consumes tokens
//!    on demand and produces an [`ast::Program`] (a flat list of
//!    [`ast::Node`] statements). Syntax errors trigger panic-mode recovery:
//!    the parser resynchronizes at the next `;` and keeps going, so one
//!    bad statement doesn't lose the rest of the file.
//! 3. [`analyzer`] — a single top-to-bottom walk over the AST that
//!    type-checks every statement against a scoped [`symbol::SymbolTable`]
//!    without evaluating anything. It exists separately from evaluation so
//!    type errors surface before any `print`/`read`/`assert` side effect
//!    happens.
//! 4. [`interpreter`] — the tree-walking evaluator. It owns its own fresh
//!    symbol table (the analyzer's is discarded) and executes statements
//!    in order, stopping at the first runtime error.
//!
//! Evaluation only runs if both the parser and the analyzer report no
//! errors; see [`MiniPl::run`].
//!
//! [`error::Diagnostic`] is the single diagnostic type shared by every
//! stage, formatted as `<Kind>Error::Row <R>::Column <C>::<message>`.

pub mod analyzer;
pub mod ast;
pub mod error;
pub mod interpreter;
pub mod parser;
pub mod scanner;
pub mod symbol;
pub mod token;
pub mod value;

use std::io::{BufRead, Write};

use analyzer::Analyzer;
use error::Diagnostic;
use interpreter::Interpreter;
use parser::Parser;

/// Wraps the full scan → parse → analyze → evaluate pipeline, holding the
/// I/O streams `read`/`print`/`assert` write to and read from.
pub struct MiniPl<'io> {
    input: &'io mut dyn BufRead,
    output: &'io mut dyn Write,
}

impl<'io> MiniPl<'io> {
    pub fn new(input: &'io mut dyn BufRead, output: &'io mut dyn Write) -> Self {
        MiniPl { input, output }
    }

    /// Runs one source file end to end. Returns the first diagnostic
    /// encountered, drawn from whichever stage produced it first (parser,
    /// then analyzer, then evaluator); `Ok(())` means the program ran to
    /// completion with no errors.
    pub fn run(&mut self, source: &str) -> Result<(), Diagnostic> {
        let mut parser = Parser::new(source);
        let program = parser.parse();
        if let Some(diagnostic) = parser.diagnostics().first() {
            return Err(diagnostic.clone());
        }

        let mut analyzer = Analyzer::new();
        analyzer.analyze(&program);
        if let Some(diagnostic) = analyzer.diagnostics().first() {
            return Err(diagnostic.clone());
        }

        let mut interpreter = Interpreter::new(self.input, self.output);
        interpreter.interpret(&program);
        if let Some(diagnostic) = interpreter.diagnostic() {
            return Err(diagnostic.clone());
        }

        Ok(())
    }
}

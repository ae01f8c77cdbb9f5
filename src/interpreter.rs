use std::io::{BufRead, Write};

use crate::ast::{Builtin, Node, Op, Program};
use crate::error::Diagnostic;
use crate::symbol::{Symbol, SymbolTable};
use crate::value::Value;

type EvalResult<T> = Result<T, Diagnostic>;

/// Tree-walking evaluator. Executes statements in order against a fresh
/// [`SymbolTable`], stopping at the first runtime error. Input and output
/// are taken as trait objects so tests can swap in an in-memory cursor
/// instead of the real console.
pub struct Interpreter<'io> {
    table: SymbolTable,
    input: &'io mut dyn BufRead,
    output: &'io mut dyn Write,
    diagnostic: Option<Diagnostic>,
}

impl<'io> Interpreter<'io> {
    pub fn new(input: &'io mut dyn BufRead, output: &'io mut dyn Write) -> Self {
        Interpreter {
            table: SymbolTable::new(),
            input,
            output,
            diagnostic: None,
        }
    }

    pub fn had_error(&self) -> bool {
        self.diagnostic.is_some()
    }

    pub fn diagnostic(&self) -> Option<&Diagnostic> {
        self.diagnostic.as_ref()
    }

    pub fn interpret(&mut self, program: &Program) {
        for statement in program {
            if let Err(diagnostic) = self.execute(statement) {
                self.diagnostic = Some(diagnostic);
                return;
            }
        }
    }

    fn execute(&mut self, node: &Node) -> EvalResult<()> {
        match node {
            Node::Expression { op: Op::Init, left, right, .. } => self.exec_init(left, right.as_deref()),
            Node::Expression { op: Op::Assign, left, right, position } => {
                let Node::Variable { name, .. } = left.as_ref() else {
                    unreachable!("parser always builds Assign's left child as a Variable");
                };
                let right = right.as_ref().expect("parser always attaches a right side to Assign");
                let value = self.evaluate(right)?;
                if !self.table.update(name, value) {
                    return Err(self.runtime_error(*position, format!("undeclared variable {name}")));
                }
                Ok(())
            }
            Node::ForLoop { iterator, start, end, body, .. } => self.exec_for_loop(iterator, start, end, body),
            Node::Function { name: Builtin::Read, parameter, position } => self.exec_read(parameter, *position),
            Node::Function { name: Builtin::Print, parameter, .. } => {
                let value = self.evaluate(parameter)?;
                write!(self.output, "{value}").expect("writing to the output stream should not fail");
                Ok(())
            }
            Node::Function { name: Builtin::Assert, parameter, .. } => {
                let value = self.evaluate(parameter)?;
                if matches!(value, Value::Bool(false)) {
                    writeln!(self.output, "Expected the result to be true. Got false")
                        .expect("writing to the output stream should not fail");
                }
                Ok(())
            }
            other => unreachable!("{other:?} is not a statement node"),
        }
    }

    fn exec_init(&mut self, left: &Node, right: Option<&Node>) -> EvalResult<()> {
        let Node::Variable { name, declared_type: Some(declared_type), .. } = left else {
            unreachable!("parser always attaches a declared_type to Init's left child");
        };

        let value = match right {
            Some(expr) => self.evaluate(expr)?,
            None => Value::default_for(*declared_type),
        };

        self.table.declare(Symbol {
            name: name.clone(),
            declared_type: *declared_type,
            value,
            scope_level: self.table.current_scope(),
        });
        Ok(())
    }

    fn exec_for_loop(&mut self, iterator: &Node, start: &Node, end: &Node, body: &[Node]) -> EvalResult<()> {
        let Node::Variable { name, position, .. } = iterator else {
            unreachable!("parser always builds the iterator as a Variable");
        };

        let start = self.evaluate_int(start)?;
        let end = self.evaluate_int(end)?;

        // Each iteration gets its own scope, pushed and popped around the
        // body, so `var` declarations inside the loop don't pile up across
        // iterations (the symbol table would otherwise grow by one entry
        // per iteration, and would violate the "no two symbols share an
        // identifier and scope level" invariant).
        let mut i = start;
        while i <= end {
            self.table.add_scope();
            if !self.table.update(name, Value::Int(i)) {
                self.table.remove_scope();
                return Err(self.runtime_error(*position, format!("undeclared variable {name}")));
            }
            for statement in body {
                if let Err(diagnostic) = self.execute(statement) {
                    self.table.remove_scope();
                    return Err(diagnostic);
                }
            }
            self.table.remove_scope();
            i += 1;
        }
        Ok(())
    }

    fn exec_read(&mut self, parameter: &Node, position: crate::token::Position) -> EvalResult<()> {
        let Node::Variable { name, .. } = parameter else {
            unreachable!("the analyzer only lets read through with a Variable argument");
        };

        let declared_type = self
            .table
            .lookup(name)
            .map(|symbol| symbol.declared_type)
            .ok_or_else(|| self.runtime_error(position, format!("undeclared variable {name}")))?;

        let mut line = String::new();
        self.input
            .read_line(&mut line)
            .map_err(|error| self.runtime_error(position, format!("failed to read input: {error}")))?;
        let line = line.trim_end_matches(['\n', '\r']);

        let value = match declared_type {
            crate::ast::Type::Int => line
                .parse::<i64>()
                .map(Value::Int)
                .map_err(|_| self.runtime_error(position, "cannot convert input string to int"))?,
            crate::ast::Type::Bool => {
                return Err(self.runtime_error(position, "cannot convert input string to bool"));
            }
            crate::ast::Type::Str => Value::Str(line.to_string()),
        };

        self.table.update(name, value);
        Ok(())
    }

    fn evaluate_int(&mut self, node: &Node) -> EvalResult<i64> {
        let value = self.evaluate(node)?;
        value.as_int().ok_or_else(|| self.runtime_error(node.position(), "expected an int"))
    }

    fn evaluate(&mut self, node: &Node) -> EvalResult<Value> {
        match node {
            Node::Integer { lexeme, position } => lexeme
                .parse::<i64>()
                .map(Value::Int)
                .map_err(|_| self.runtime_error(*position, format!("'{lexeme}' is not a valid integer literal"))),
            Node::Str { value, .. } => Ok(Value::Str(value.clone())),
            Node::Variable { name, position, .. } => self
                .table
                .lookup(name)
                .map(|symbol| symbol.value.clone())
                .ok_or_else(|| self.runtime_error(*position, format!("undeclared variable {name}"))),
            Node::Not { child, .. } => {
                let value = self.evaluate(child)?;
                Ok(Value::Bool(!matches!(value, Value::Bool(true))))
            }
            Node::Expression { op, left, right, position } => {
                let left = self.evaluate(left)?;
                let right = self.evaluate(right.as_deref().expect("binary operators always carry a right side"))?;
                self.apply_binary(*op, left, right, *position)
            }
            other => unreachable!("{other:?} cannot appear in expression position"),
        }
    }

    fn apply_binary(&self, op: Op, left: Value, right: Value, position: crate::token::Position) -> EvalResult<Value> {
        match op {
            Op::LogicalAnd => Ok(Value::Bool(left != Value::Bool(false) && right != Value::Bool(false))),
            Op::Equality => Ok(Value::Bool(left == right)),
            Op::LessThan => Ok(Value::Bool(left < right)),
            Op::Add => match (left, right) {
                (Value::Int(a), Value::Int(b)) => Ok(Value::Int(a + b)),
                (Value::Str(a), Value::Str(b)) => Ok(Value::Str(a + &b)),
                (left, right) => Err(self.runtime_error(
                    position,
                    format!("operator + is not defined for {} and {}", left.type_of(), right.type_of()),
                )),
            },
            Op::Minus | Op::Multiply | Op::Divide => {
                let (Some(a), Some(b)) = (left.as_int(), right.as_int()) else {
                    return Err(self.runtime_error(position, "arithmetic requires int operands"));
                };
                match op {
                    Op::Minus => Ok(Value::Int(a - b)),
                    Op::Multiply => Ok(Value::Int(a * b)),
                    // Truncates toward zero, matching native i64 division.
                    Op::Divide => {
                        if b == 0 {
                            Err(self.runtime_error(position, "division by zero"))
                        } else {
                            Ok(Value::Int(a / b))
                        }
                    }
                    _ => unreachable!(),
                }
            }
            Op::Init | Op::Assign => unreachable!("Init/Assign are statements, not expressions"),
        }
    }

    fn runtime_error(&self, position: crate::token::Position, message: impl Into<String>) -> Diagnostic {
        Diagnostic::runtime(position, message)
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::parser::Parser;
    use std::io::Cursor;

    fn run(source: &str, stdin: &str) -> (String, Option<Diagnostic>) {
        let mut parser = Parser::new(source);
        let program = parser.parse();
        assert!(!parser.had_error(), "source failed to parse: {source}");

        let mut input = Cursor::new(stdin.as_bytes().to_vec());
        let mut output = Vec::new();
        let mut interpreter = Interpreter::new(&mut input, &mut output);
        interpreter.interpret(&program);
        let diagnostic = interpreter.diagnostic().cloned();

        (String::from_utf8(output).unwrap(), diagnostic)
    }

    #[test]
    fn arithmetic_precedence_matches_the_grammar() {
        let (output, error) = run("var x : int := 1 + 2 * 3;\nprint x;", "");
        assert_eq!(output, "7");
        assert!(error.is_none());
    }

    #[test]
    fn string_concatenation_and_equality() {
        let (output, error) = run(
            r#"var a : string := "foo"; var b : string := "bar"; print a + b; assert (a + b = "foobar");"#,
            "",
        );
        assert_eq!(output, "foobar");
        assert!(error.is_none());
    }

    #[test]
    fn for_loop_leaves_the_iterator_at_its_last_value() {
        let (output, error) = run(
            "var i : int;\nfor i in 0..1 do\n  var j : int := i;\n  print j;\nend for;\nprint i;",
            "",
        );
        assert_eq!(output, "011");
        assert!(error.is_none());
    }

    #[test]
    fn read_parses_an_int_from_stdin() {
        let (output, error) = run("var n : int;\nread n;\nprint n;", "42\n");
        assert_eq!(output, "42");
        assert!(error.is_none());
    }

    #[test]
    fn read_reports_a_runtime_error_on_bad_int_input() {
        let (_, error) = run("var n : int;\nread n;", "oops\n");
        let error = error.expect("expected a runtime diagnostic");
        assert!(error.message.contains("cannot convert input string to int"));
    }

    #[test]
    fn division_by_zero_is_a_runtime_error_not_a_panic() {
        let (_, error) = run("var x : int := 1 / 0;", "");
        assert!(error.unwrap().message.contains("division by zero"));
    }

    #[test]
    fn division_truncates_toward_zero() {
        let (output, _) = run("print 7 / 2;\nprint (0 - 7) / 2;", "");
        assert_eq!(output, "3-3");
    }

    #[test]
    fn failed_assertion_prints_the_fixed_message_and_continues() {
        let (output, error) = run("assert (1 = 2);\nprint \"after\";", "");
        assert_eq!(output, "Expected the result to be true. Got false\nafter");
        assert!(error.is_none());
    }

    #[test]
    fn boolean_and_string_ordering_matches_the_spec() {
        let (output, _) = run(
            r#"var f : bool := (1 = 2); var t : bool := (1 = 1); print (f < t); print " "; print ("a" < "b");"#,
            "",
        );
        assert_eq!(output, "true true");
    }
}

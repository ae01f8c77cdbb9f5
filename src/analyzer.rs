use crate::ast::{Builtin, Node, Op, Program, Type};
use crate::error::{push_diagnostic, Diagnostic};
use crate::symbol::{Symbol, SymbolTable};

/// Walks the AST once against a fresh [`SymbolTable`], recording type and
/// scope diagnostics without evaluating anything. Runs before the
/// evaluator so errors surface before any side effect happens.
pub struct Analyzer {
    table: SymbolTable,
    diagnostics: Vec<Diagnostic>,
}

impl Analyzer {
    pub fn new() -> Self {
        Analyzer {
            table: SymbolTable::new(),
            diagnostics: Vec::new(),
        }
    }

    pub fn had_error(&self) -> bool {
        !self.diagnostics.is_empty()
    }

    pub fn diagnostics(&self) -> &[Diagnostic] {
        &self.diagnostics
    }

    pub fn analyze(&mut self, program: &Program) {
        for statement in program {
            self.check_statement(statement);
        }
    }

    fn check_statement(&mut self, node: &Node) {
        match node {
            Node::Expression { op: Op::Init, left, right, position } => {
                let Node::Variable { name, declared_type: Some(declared_type), .. } = left.as_ref() else {
                    unreachable!("parser always attaches a declared_type to Init's left child");
                };

                if self.declared_in_current_scope(name) {
                    push_diagnostic(
                        &mut self.diagnostics,
                        Diagnostic::semantic(
                            *position,
                            format!("Variable {name} already defined in this scope!"),
                        ),
                    );
                    return;
                }

                if let Some(right) = right {
                    if let Some(actual) = self.check_expression(right) {
                        if actual != *declared_type {
                            push_diagnostic(
                                &mut self.diagnostics,
                                Diagnostic::semantic(
                                    *position,
                                    format!(
                                        "cannot assign a value of type {actual} to variable {name} of type {declared_type}"
                                    ),
                                ),
                            );
                        }
                    }
                }

                self.table.declare(Symbol {
                    name: name.clone(),
                    declared_type: *declared_type,
                    value: crate::value::Value::default_for(*declared_type),
                    scope_level: self.table.current_scope(),
                });
            }
            Node::Expression { op: Op::Assign, left, right, position } => {
                let Node::Variable { name, .. } = left.as_ref() else {
                    unreachable!("parser always builds Assign's left child as a Variable");
                };
                let right = right.as_ref().expect("parser always attaches a right side to Assign");

                let Some(declared_type) = self.table.lookup(name).map(|s| s.declared_type) else {
                    push_diagnostic(
                        &mut self.diagnostics,
                        Diagnostic::semantic(*position, format!("undeclared variable {name}")),
                    );
                    self.check_expression(right);
                    return;
                };

                if let Some(actual) = self.check_expression(right) {
                    if actual != declared_type {
                        push_diagnostic(
                            &mut self.diagnostics,
                            Diagnostic::semantic(
                                *position,
                                format!(
                                    "cannot assign a value of type {actual} to variable {name} of type {declared_type}"
                                ),
                            ),
                        );
                    }
                }
            }
            Node::ForLoop { iterator, start, end, body, position } => {
                let Node::Variable { name, .. } = iterator.as_ref() else {
                    unreachable!("parser always builds the iterator as a Variable");
                };

                if !self.table.contains(name) {
                    push_diagnostic(
                        &mut self.diagnostics,
                        Diagnostic::semantic(*position, format!("undeclared variable {name}")),
                    );
                }

                self.expect_type(start, Type::Int);
                self.expect_type(end, Type::Int);

                self.table.add_scope();
                for statement in body {
                    self.check_statement(statement);
                }
                self.table.remove_scope();
            }
            Node::Function { name: Builtin::Read, parameter, position } => {
                let Node::Variable { name, .. } = parameter.as_ref() else {
                    push_diagnostic(
                        &mut self.diagnostics,
                        Diagnostic::semantic(*position, "read's argument must be a variable"),
                    );
                    return;
                };
                if !self.table.contains(name) {
                    push_diagnostic(
                        &mut self.diagnostics,
                        Diagnostic::semantic(*position, format!("undeclared variable {name}")),
                    );
                }
            }
            Node::Function { name: Builtin::Print, parameter, .. } => {
                self.check_expression(parameter);
            }
            Node::Function { name: Builtin::Assert, parameter, .. } => {
                self.expect_type(parameter, Type::Bool);
            }
            other => unreachable!("{other:?} is not a statement node"),
        }
    }

    fn expect_type(&mut self, node: &Node, expected: Type) {
        if let Some(actual) = self.check_expression(node) {
            if actual != expected {
                push_diagnostic(
                    &mut self.diagnostics,
                    Diagnostic::semantic(
                        node.position(),
                        format!("expected type {expected}, got {actual}"),
                    ),
                );
            }
        }
    }

    fn declared_in_current_scope(&self, name: &str) -> bool {
        self.table
            .lookup(name)
            .is_some_and(|symbol| symbol.scope_level == self.table.current_scope())
    }

    /// Computes an expression's type, recording a diagnostic on mismatch.
    /// Returns `None` ("unknown") when the sub-expression already failed,
    /// so the failure does not cascade into a secondary diagnostic.
    fn check_expression(&mut self, node: &Node) -> Option<Type> {
        match node {
            Node::Integer { .. } => Some(Type::Int),
            Node::Str { .. } => Some(Type::Str),
            Node::Variable { name, position, .. } => match self.table.lookup(name) {
                Some(symbol) => Some(symbol.declared_type),
                None => {
                    push_diagnostic(
                        &mut self.diagnostics,
                        Diagnostic::semantic(*position, format!("undeclared variable {name}")),
                    );
                    None
                }
            },
            Node::Not { child, position } => {
                let child_type = self.check_expression(child)?;
                if child_type != Type::Bool {
                    push_diagnostic(
                        &mut self.diagnostics,
                        Diagnostic::semantic(
                            *position,
                            format!("expected type bool, got {child_type}"),
                        ),
                    );
                    return None;
                }
                Some(Type::Bool)
            }
            Node::Expression { op, left, right, position } => {
                let left_type = self.check_expression(left);
                let right_type = right.as_deref().and_then(|right| self.check_expression(right));
                let (left_type, right_type) = (left_type?, right_type?);

                let result = match op {
                    Op::LogicalAnd => (left_type == Type::Bool && right_type == Type::Bool).then_some(Type::Bool),
                    Op::Equality | Op::LessThan => (left_type == right_type).then_some(Type::Bool),
                    Op::Add => match (left_type, right_type) {
                        (Type::Int, Type::Int) => Some(Type::Int),
                        (Type::Str, Type::Str) => Some(Type::Str),
                        _ => None,
                    },
                    Op::Minus | Op::Multiply | Op::Divide => {
                        (left_type == Type::Int && right_type == Type::Int).then_some(Type::Int)
                    }
                    Op::Init | Op::Assign => unreachable!("Init/Assign are statements, not expressions"),
                };

                if result.is_none() {
                    push_diagnostic(
                        &mut self.diagnostics,
                        Diagnostic::semantic(
                            *position,
                            format!("operator {op} is not defined for {left_type} and {right_type}"),
                        ),
                    );
                }
                result
            }
            other => unreachable!("{other:?} cannot appear in expression position"),
        }
    }
}

impl Default for Analyzer {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::parser::Parser;

    fn analyze(source: &str) -> Analyzer {
        let mut parser = Parser::new(source);
        let program = parser.parse();
        assert!(!parser.had_error(), "source failed to parse: {source}");
        let mut analyzer = Analyzer::new();
        analyzer.analyze(&program);
        analyzer
    }

    #[test]
    fn accepts_a_well_typed_program() {
        let analyzer = analyze("var x : int := 1 + 2 * 3;\nprint x;");
        assert!(!analyzer.had_error());
    }

    #[test]
    fn rejects_redeclaration_in_the_same_scope() {
        let analyzer = analyze("var x : int := 1;\nvar x : int := 2;");
        assert!(analyzer.had_error());
        assert!(analyzer.diagnostics()[0].message.contains("already defined"));
    }

    #[test]
    fn allows_shadowing_in_a_nested_for_loop_scope() {
        let analyzer = analyze("var i : int;\nfor i in 0..1 do\n  var j : int := i;\nend for;");
        assert!(!analyzer.had_error());
    }

    #[test]
    fn rejects_undeclared_variable_use() {
        let analyzer = analyze("print missing;");
        assert!(analyzer.had_error());
        assert!(analyzer.diagnostics()[0].message.contains("undeclared variable missing"));
    }

    #[test]
    fn rejects_type_mismatch_on_initializer() {
        let analyzer = analyze(r#"var x : int := "oops";"#);
        assert!(analyzer.had_error());
    }

    #[test]
    fn rejects_assert_on_a_non_bool_expression() {
        let analyzer = analyze("assert (1 + 1);");
        assert!(analyzer.had_error());
    }

    #[test]
    fn mismatch_inside_a_subexpression_does_not_cascade() {
        let analyzer = analyze(r#"print (1 + "x") + 1;"#);
        assert_eq!(analyzer.diagnostics().len(), 1);
    }

    #[test]
    fn read_requires_an_existing_variable() {
        let analyzer = analyze("read missing;");
        assert!(analyzer.had_error());
    }
}

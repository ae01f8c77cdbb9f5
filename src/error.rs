use std::fmt;
use std::io;

use crate::token::Position;

/// The five diagnostic categories a Mini-PL run can produce.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DiagnosticKind {
    Lexical,
    Syntax,
    Semantic,
    Runtime,
    Io,
}

impl fmt::Display for DiagnosticKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            DiagnosticKind::Lexical => "Lexical",
            DiagnosticKind::Syntax => "Syntax",
            DiagnosticKind::Semantic => "Semantic",
            DiagnosticKind::Runtime => "Runtime",
            DiagnosticKind::Io => "IO",
        };
        write!(f, "{name}")
    }
}

/// A single diagnostic, formatted exactly as
/// `<Kind>Error::Row <R>::Column <C>::<message>`.
#[derive(Debug, Clone, PartialEq)]
pub struct Diagnostic {
    pub kind: DiagnosticKind,
    pub position: Position,
    pub message: String,
}

impl Diagnostic {
    pub fn new(kind: DiagnosticKind, position: Position, message: impl Into<String>) -> Self {
        Diagnostic {
            kind,
            position,
            message: message.into(),
        }
    }

    pub fn lexical(position: Position, message: impl Into<String>) -> Self {
        Diagnostic::new(DiagnosticKind::Lexical, position, message)
    }

    pub fn syntax(position: Position, message: impl Into<String>) -> Self {
        Diagnostic::new(DiagnosticKind::Syntax, position, message)
    }

    pub fn semantic(position: Position, message: impl Into<String>) -> Self {
        Diagnostic::new(DiagnosticKind::Semantic, position, message)
    }

    pub fn runtime(position: Position, message: impl Into<String>) -> Self {
        Diagnostic::new(DiagnosticKind::Runtime, position, message)
    }

    pub fn io(message: impl Into<String>) -> Self {
        Diagnostic::new(DiagnosticKind::Io, Position::start(), message)
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}Error::Row {}::Column {}::{}",
            self.kind, self.position.row, self.position.column, self.message
        )
    }
}

impl From<io::Error> for Diagnostic {
    fn from(error: io::Error) -> Self {
        Diagnostic::io(error.to_string())
    }
}

/// Appends `diagnostic` unless it duplicates the immediately preceding one
/// at the same position, per the one-report-per-failure propagation policy.
pub fn push_diagnostic(diagnostics: &mut Vec<Diagnostic>, diagnostic: Diagnostic) {
    if let Some(last) = diagnostics.last() {
        if last.position == diagnostic.position && last.message == diagnostic.message {
            return;
        }
    }
    diagnostics.push(diagnostic);
}

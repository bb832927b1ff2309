//! Types for error reporting.
//!
//! Diagnostics are plain data: the front-end appends them to a
//! [`DiagnosticsCollection`][collection::DiagnosticsCollection] and the
//! embedder decides when and how to surface them.

mod collection;
mod sink;

use std::fmt::{self, Write};

use thiserror::Error;

use crate::{
    source::{SourceLoadResult, SourceProvider},
    span::{Location, Position, Positioned, SourceUri},
};

pub use collection::*;
pub use sink::*;

/// Diagnostic severity.
///
/// The order matters: severities compare by how alarming they are, so that
/// "is there anything at least this bad?" is a simple comparison.
#[derive(Copy, Clone, PartialEq, Eq, Hash, Debug, PartialOrd, Ord)]
pub enum Severity {
    /// A gentle suggestion.
    Hint,
    /// An informational message.
    Information,
    /// A later pass applied an optimization worth knowing about.
    OptimizationNotice,
    /// A later pass tried to apply an optimization and could not.
    FailedOptimization,
    /// Legal but suspect code.
    Warning,
    /// The input is invalid.
    Error,
}

impl Severity {
    pub fn name(&self) -> &'static str {
        match self {
            Severity::Hint => "HINT",
            Severity::Information => "INFO",
            Severity::OptimizationNotice => "OPTIMIZATION",
            Severity::FailedOptimization => "FAILED OPTIMIZATION",
            Severity::Warning => "WARNING",
            Severity::Error => "ERROR",
        }
    }
}

/// A positioned (or context-less) message describing something about the
/// compiled code.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Diagnostic {
    pub severity: Severity,
    pub message: String,
    /// Where the diagnostic points, when it points anywhere at all.
    pub location: Option<Location>,
    /// Nested diagnostics providing additional context on this one.
    pub sub_diagnostics: Vec<Diagnostic>,
}

impl Diagnostic {
    /// Creates a new diagnostic with the severity passed in as an argument.
    /// You should generally prefer the convenience functions over this:
    /// - [`Diagnostic::error`]
    /// - [`Diagnostic::warning`]
    /// - [`Diagnostic::information`]
    /// - [`Diagnostic::hint`]
    /// - [`Diagnostic::internal_error`]
    pub fn new(severity: Severity, message: impl Into<String>) -> Self {
        Self {
            severity,
            message: message.into(),
            location: None,
            sub_diagnostics: vec![],
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self::new(Severity::Error, message)
    }

    pub fn warning(message: impl Into<String>) -> Self {
        Self::new(Severity::Warning, message)
    }

    pub fn information(message: impl Into<String>) -> Self {
        Self::new(Severity::Information, message)
    }

    pub fn hint(message: impl Into<String>) -> Self {
        Self::new(Severity::Hint, message)
    }

    /// Creates an error-level diagnostic describing an impossibility the
    /// implementation ran into. The message is prefixed so that reports can
    /// be told apart from ordinary syntax errors.
    pub fn internal_error(message: impl fmt::Display) -> Self {
        Self::new(
            Severity::Error,
            format!("internal compiler error: {message}"),
        )
    }

    /// Attaches a position and file to the diagnostic.
    pub fn at(mut self, position: &impl Positioned, file: SourceUri) -> Self {
        self.location = Some(Location::new(position.position(), file));
        self
    }

    pub fn at_location(mut self, location: Location) -> Self {
        self.location = Some(location);
        self
    }

    /// Adds a nested diagnostic.
    pub fn with_sub(mut self, sub: Diagnostic) -> Self {
        self.sub_diagnostics.push(sub);
        self
    }

    pub fn is_positioned(&self) -> bool {
        matches!(
            self.location,
            Some(Location {
                position: Position::Spanning { .. },
                ..
            })
        )
    }

    /// Formats the diagnostic (and its sub-diagnostics, indented by depth)
    /// into `out`. Source snippets are looked up through `providers`.
    pub fn write_to(&self, out: &mut String, providers: &[&dyn SourceProvider]) {
        self.write_indented(out, providers, 0);
    }

    fn write_indented(&self, out: &mut String, providers: &[&dyn SourceProvider], depth: usize) {
        for _ in 0..depth {
            out.push_str("  ");
        }
        match &self.location {
            Some(Location {
                position: Position::Spanning { start, .. },
                file: Some(file),
            }) => {
                _ = writeln!(
                    out,
                    "{} ({}:{}:{}): {}",
                    self.severity.name(),
                    file,
                    start.line + 1,
                    start.column,
                    self.message
                );
                if depth == 0 {
                    self.write_snippet(out, providers, file);
                }
            }
            _ => {
                _ = writeln!(out, "{}: {}", self.severity.name(), self.message);
            }
        }
        for sub in &self.sub_diagnostics {
            sub.write_indented(out, providers, depth + 1);
        }
    }

    /// Writes an arrow-annotated snippet of the offending line, if any of the
    /// providers can resolve the file.
    fn write_snippet(&self, out: &mut String, providers: &[&dyn SourceProvider], file: &SourceUri) {
        let Some(Location {
            position: Position::Spanning { start, end },
            ..
        }) = &self.location
        else {
            return;
        };
        let Some(source) = providers.iter().find_map(|provider| {
            match provider.try_load(file.as_str(), None) {
                SourceLoadResult::Loaded { source, .. } => Some(source),
                _ => None,
            }
        }) else {
            return;
        };
        let Some(line) = source.lines().nth(start.line as usize) else {
            return;
        };

        _ = writeln!(out, "  --> {line}");
        let col = start.column.saturating_sub(1) as usize;
        let width = if start.line == end.line {
            ((end.column - start.column) as usize).max(1)
        } else {
            line.chars().count().saturating_sub(col).max(1)
        };
        out.push_str("      ");
        for _ in 0..col {
            out.push(' ');
        }
        for _ in 0..width {
            out.push('^');
        }
        out.push('\n');
    }
}

impl Positioned for Diagnostic {
    fn position(&self) -> Position {
        self.location
            .as_ref()
            .map(|location| location.position)
            .unwrap_or(Position::Unknown)
    }
}

/// Raised when parsing cannot continue at all, and by
/// [`DiagnosticsCollection::throw`] when the collection holds an error.
///
/// This is the only unwind the front-end performs; it crosses exactly one
/// frame and is converted back into a diagnostic at the `parse()` boundary.
#[derive(Debug, Clone, Error)]
#[error("{}", .diagnostic.message)]
pub struct SyntaxError {
    pub diagnostic: Diagnostic,
}

impl SyntaxError {
    pub fn new(diagnostic: Diagnostic) -> Self {
        Self { diagnostic }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::source::MemorySourceProvider;
    use crate::span::{Point, Position};

    #[test]
    fn severities_rank_by_alarm() {
        assert!(Severity::Error > Severity::Warning);
        assert!(Severity::Warning > Severity::FailedOptimization);
        assert!(Severity::Hint < Severity::Information);
    }

    #[test]
    fn printing_positioned_diagnostic_with_snippet() {
        let file = SourceUri::from("test.slt");
        let provider = MemorySourceProvider::new().with("test.slt", "int x = ;");
        let position = Position::new(Point::new(8, 0, 9), Point::new(9, 0, 10));
        let diagnostic = Diagnostic::error("expression expected").at(&position, file);

        let mut out = String::new();
        diagnostic.write_to(&mut out, &[&provider]);
        assert_eq!(
            out,
            "ERROR (test.slt:1:9): expression expected\n  --> int x = ;\n              ^\n"
        );
    }

    #[test]
    fn printing_contextless_diagnostic() {
        let diagnostic = Diagnostic::warning("nothing to compile");
        let mut out = String::new();
        diagnostic.write_to(&mut out, &[]);
        assert_eq!(out, "WARNING: nothing to compile\n");
    }

    #[test]
    fn sub_diagnostics_indent_by_depth() {
        let diagnostic = Diagnostic::error("outer")
            .with_sub(Diagnostic::hint("inner").with_sub(Diagnostic::hint("innermost")));
        let mut out = String::new();
        diagnostic.write_to(&mut out, &[]);
        assert_eq!(out, "ERROR: outer\n  HINT: inner\n    HINT: innermost\n");
    }

    #[test]
    fn internal_errors_carry_the_marker() {
        let diagnostic = Diagnostic::internal_error("parser did not advance");
        assert_eq!(
            diagnostic.message,
            "internal compiler error: parser did not advance"
        );
        assert_eq!(diagnostic.severity, Severity::Error);
    }
}

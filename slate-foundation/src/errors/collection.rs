use crate::{
    errors::{Diagnostic, Severity, SyntaxError},
    source::SourceProvider,
};

/// An ordered collection of diagnostics.
///
/// Context-less diagnostics and positioned ones are kept apart so that the
/// former always print first. Appending is idempotent: a diagnostic equal to
/// one already present is silently dropped.
///
/// Speculative parsing writes through *override scopes*: a scope buffers
/// everything appended while it is open, and the buffered diagnostics either
/// flush into the parent on [`commit_override`][Self::commit_override] or are
/// handed back (usually to be discarded or re-ranked) on
/// [`drop_override`][Self::drop_override]. Scopes are strictly LIFO; popping
/// out of order is a programmer error and panics.
#[derive(Debug, Clone, Default)]
pub struct DiagnosticsCollection {
    contextless: Vec<Diagnostic>,
    positioned: Vec<Diagnostic>,
    overrides: Vec<OverrideFrame>,
}

#[derive(Debug, Clone, Default)]
struct OverrideFrame {
    contextless: Vec<Diagnostic>,
    positioned: Vec<Diagnostic>,
}

/// Handle to an open override scope. Returned by
/// [`DiagnosticsCollection::push_override`] and consumed by exactly one of
/// `commit_override`/`drop_override`.
#[derive(Debug, PartialEq, Eq)]
#[must_use = "an override scope must be committed or dropped"]
pub struct OverrideScope {
    depth: usize,
}

impl DiagnosticsCollection {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a diagnostic, deduplicating against the list it lands in.
    pub fn add(&mut self, diagnostic: Diagnostic) {
        let (contextless, positioned) = match self.overrides.last_mut() {
            Some(frame) => (&mut frame.contextless, &mut frame.positioned),
            None => (&mut self.contextless, &mut self.positioned),
        };
        let list = if diagnostic.is_positioned() {
            positioned
        } else {
            contextless
        };
        if !list.contains(&diagnostic) {
            list.push(diagnostic);
        }
    }

    /// Opens an override scope. Every `add` until the matching commit/drop is
    /// buffered in the scope.
    pub fn push_override(&mut self) -> OverrideScope {
        self.overrides.push(OverrideFrame::default());
        OverrideScope {
            depth: self.overrides.len(),
        }
    }

    /// Closes the scope and flushes its diagnostics into the parent
    /// (deduplicated, like any other append).
    pub fn commit_override(&mut self, scope: OverrideScope) {
        let frame = self.pop_frame(scope);
        for diagnostic in frame.contextless.into_iter().chain(frame.positioned) {
            self.add(diagnostic);
        }
    }

    /// Closes the scope and returns its diagnostics without flushing them.
    pub fn drop_override(&mut self, scope: OverrideScope) -> Vec<Diagnostic> {
        let frame = self.pop_frame(scope);
        let mut dropped = frame.contextless;
        dropped.extend(frame.positioned);
        dropped
    }

    fn pop_frame(&mut self, scope: OverrideScope) -> OverrideFrame {
        assert_eq!(
            scope.depth,
            self.overrides.len(),
            "override scopes must be popped in LIFO order"
        );
        self.overrides.pop().expect("override stack is empty")
    }

    pub fn has_errors(&self) -> bool {
        self.iter().any(|d| d.severity == Severity::Error)
    }

    pub fn is_empty(&self) -> bool {
        self.contextless.is_empty() && self.positioned.is_empty()
    }

    pub fn len(&self) -> usize {
        self.contextless.len() + self.positioned.len()
    }

    /// Iterates over all committed diagnostics, context-less first.
    pub fn iter(&self) -> impl Iterator<Item = &Diagnostic> {
        self.contextless.iter().chain(self.positioned.iter())
    }

    /// Returns an error for the first error-level diagnostic, if there is
    /// one.
    pub fn throw(&self) -> Result<(), SyntaxError> {
        match self.iter().find(|d| d.severity == Severity::Error) {
            Some(error) => Err(SyntaxError::new(error.clone())),
            None => Ok(()),
        }
    }

    /// Formats every diagnostic into `out`.
    pub fn write_errors_to(&self, out: &mut String, providers: &[&dyn SourceProvider]) {
        for diagnostic in self.iter() {
            diagnostic.write_to(out, providers);
        }
    }

    /// Prints every diagnostic to standard error.
    pub fn print(&self, providers: &[&dyn SourceProvider]) {
        let mut out = String::new();
        self.write_errors_to(&mut out, providers);
        eprint!("{out}");
    }
}

impl Extend<Diagnostic> for DiagnosticsCollection {
    fn extend<I: IntoIterator<Item = Diagnostic>>(&mut self, iter: I) {
        for diagnostic in iter {
            self.add(diagnostic);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::span::{Point, Position, SourceUri};

    fn positioned(message: &str) -> Diagnostic {
        Diagnostic::error(message).at(
            &Position::new(Point::new(0, 0, 1), Point::new(1, 0, 2)),
            SourceUri::from("test.slt"),
        )
    }

    #[test]
    fn add_is_idempotent() {
        let mut collection = DiagnosticsCollection::new();
        collection.add(positioned("duplicate"));
        collection.add(positioned("duplicate"));
        assert_eq!(collection.len(), 1);
    }

    #[test]
    fn contextless_diagnostics_come_first() {
        let mut collection = DiagnosticsCollection::new();
        collection.add(positioned("positioned"));
        collection.add(Diagnostic::warning("contextless"));
        let messages: Vec<_> = collection.iter().map(|d| d.message.as_str()).collect();
        assert_eq!(messages, ["contextless", "positioned"]);
    }

    #[test]
    fn committed_override_flushes_into_parent() {
        let mut collection = DiagnosticsCollection::new();
        let scope = collection.push_override();
        collection.add(positioned("speculative"));
        assert!(collection.is_empty());
        collection.commit_override(scope);
        assert_eq!(collection.len(), 1);
    }

    #[test]
    fn dropped_override_discards_and_returns() {
        let mut collection = DiagnosticsCollection::new();
        let scope = collection.push_override();
        collection.add(positioned("speculative"));
        let dropped = collection.drop_override(scope);
        assert!(collection.is_empty());
        assert_eq!(dropped.len(), 1);
    }

    #[test]
    fn nested_overrides_commit_inside_out() {
        let mut collection = DiagnosticsCollection::new();
        let outer = collection.push_override();
        collection.add(positioned("outer"));
        let inner = collection.push_override();
        collection.add(positioned("inner"));
        collection.commit_override(inner);
        collection.commit_override(outer);
        assert_eq!(collection.len(), 2);
    }

    #[test]
    #[should_panic(expected = "LIFO")]
    fn mismatched_override_pop_panics() {
        let mut collection = DiagnosticsCollection::new();
        let outer = collection.push_override();
        let _inner = collection.push_override();
        collection.commit_override(outer);
    }

    #[test]
    fn throw_raises_the_first_error() {
        let mut collection = DiagnosticsCollection::new();
        collection.add(Diagnostic::warning("just a warning"));
        assert!(collection.throw().is_ok());
        collection.add(Diagnostic::error("first"));
        collection.add(Diagnostic::error("second"));
        let error = collection.throw().unwrap_err();
        assert_eq!(error.diagnostic.message, "first");
    }

    #[test]
    fn has_errors_ignores_warnings() {
        let mut collection = DiagnosticsCollection::new();
        collection.add(Diagnostic::warning("meh"));
        assert!(!collection.has_errors());
        collection.add(positioned("bad"));
        assert!(collection.has_errors());
    }
}

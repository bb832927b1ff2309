//! Importance-ranked diagnostics.
//!
//! When several grammar productions compete for the same input and all of
//! them fail, reporting every failure would bury the useful message. Each
//! candidate is therefore tagged with an *importance* - in practice, how many
//! tokens the alternative consumed before giving up - and only the candidates
//! tied for the maximum importance survive compilation into plain
//! diagnostics.

use crate::errors::Diagnostic;

/// A diagnostic tagged with how promising the failed alternative that
/// produced it was.
#[derive(Debug, Clone)]
pub struct OrderedDiagnostic {
    pub importance: usize,
    pub diagnostic: Diagnostic,
    /// Candidates from alternatives nested inside this one.
    pub sub: Vec<OrderedDiagnostic>,
}

impl OrderedDiagnostic {
    pub fn new(importance: usize, diagnostic: Diagnostic) -> Self {
        Self {
            importance,
            diagnostic,
            sub: vec![],
        }
    }

    pub fn with_sub(mut self, sub: OrderedDiagnosticCollection) -> Self {
        self.sub = sub.entries;
        self
    }
}

/// Collects [`OrderedDiagnostic`]s from competing productions.
#[derive(Debug, Clone, Default)]
pub struct OrderedDiagnosticCollection {
    entries: Vec<OrderedDiagnostic>,
}

impl OrderedDiagnosticCollection {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, importance: usize, diagnostic: Diagnostic) {
        self.entries.push(OrderedDiagnostic::new(importance, diagnostic));
    }

    pub fn add_ordered(&mut self, ordered: OrderedDiagnostic) {
        self.entries.push(ordered);
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn max_importance(&self) -> Option<usize> {
        self.entries.iter().map(|entry| entry.importance).max()
    }

    /// Keeps only the candidates tied for maximum importance and flattens
    /// them into plain diagnostics. Nested candidate collections compile
    /// recursively into sub-diagnostics of their parent.
    pub fn compile(self) -> Vec<Diagnostic> {
        let Some(max) = self.max_importance() else {
            return vec![];
        };
        self.entries
            .into_iter()
            .filter(|entry| entry.importance == max)
            .map(|entry| {
                let mut diagnostic = entry.diagnostic;
                diagnostic
                    .sub_diagnostics
                    .extend(OrderedDiagnosticCollection { entries: entry.sub }.compile());
                diagnostic
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn compile_keeps_only_max_importance() {
        let mut collection = OrderedDiagnosticCollection::new();
        collection.add(1, Diagnostic::error("barely started"));
        collection.add(7, Diagnostic::error("got pretty far"));
        collection.add(7, Diagnostic::error("also got pretty far"));
        collection.add(3, Diagnostic::error("middling"));

        let compiled = collection.compile();
        let messages: Vec<_> = compiled.iter().map(|d| d.message.as_str()).collect();
        assert_eq!(messages, ["got pretty far", "also got pretty far"]);
    }

    #[test]
    fn compile_of_empty_collection_is_empty() {
        assert!(OrderedDiagnosticCollection::new().compile().is_empty());
    }

    #[test]
    fn nested_candidates_become_sub_diagnostics() {
        let mut inner = OrderedDiagnosticCollection::new();
        inner.add(2, Diagnostic::error("inner winner"));
        inner.add(1, Diagnostic::error("inner loser"));

        let mut outer = OrderedDiagnosticCollection::new();
        outer.add_ordered(OrderedDiagnostic::new(5, Diagnostic::error("outer")).with_sub(inner));

        let compiled = outer.compile();
        assert_eq!(compiled.len(), 1);
        assert_eq!(compiled[0].sub_diagnostics.len(), 1);
        assert_eq!(compiled[0].sub_diagnostics[0].message, "inner winner");
    }
}

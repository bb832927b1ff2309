//! The conditional-inclusion state machine embedded in the tokenizer.
//!
//! Directives (`#if`, `#elseif`, `#else`, `#endif`, `#define`, `#undefine`)
//! drive a stack of condition frames; while any frame is unsatisfied the
//! tokenizer keeps emitting tokens but re-types them as
//! [`PreprocessSkipped`][crate::token::TokenKind::PreprocessSkipped], so
//! source spans stay exact.

use std::collections::HashSet;

use slate_foundation::{
    errors::{Diagnostic, DiagnosticSink},
    span::Location,
};
use tracing::debug;

/// The set of defined preprocessor variables.
///
/// May be constructed externally to seed the tokenizer with symbols such as
/// `DEBUG` before any `#define` runs.
#[derive(Debug, Clone, Default)]
pub struct Definitions {
    set: HashSet<String>,
}

impl Definitions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn define(&mut self, variable: impl Into<String>) {
        self.set.insert(variable.into());
    }

    pub fn undefine(&mut self, variable: &str) {
        self.set.remove(variable);
    }

    pub fn is_defined(&self, variable: &str) -> bool {
        self.set.contains(variable)
    }
}

impl<S: Into<String>> FromIterator<S> for Definitions {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        Self {
            set: iter.into_iter().map(Into::into).collect(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ConditionPhase {
    If,
    Else,
}

#[derive(Debug, Clone)]
struct ConditionFrame {
    phase: ConditionPhase,
    /// One entry per branch seen so far; the last entry is the branch we are
    /// currently in. The frame skips iff the last entry is false.
    prior_conditions: Vec<bool>,
    /// Where the `#if` opening this frame sits, for the unclosed-frame
    /// warning at end of input.
    opened_at: Location,
}

/// Preprocessor state. Owned by the tokenizer, consulted on every token.
#[derive(Debug, Clone, Default)]
pub struct Preprocessor {
    pub definitions: Definitions,
    frames: Vec<ConditionFrame>,
}

impl Preprocessor {
    pub fn new(definitions: Definitions) -> Self {
        Self {
            definitions,
            frames: vec![],
        }
    }

    /// Whether tokens at the current point of the file are excluded from
    /// compilation.
    pub fn is_skipping(&self) -> bool {
        self.frames
            .iter()
            .any(|frame| frame.prior_conditions.last() == Some(&false))
    }

    /// Applies one directive. `name` excludes the leading `#`; `argument` is
    /// the rest-of-line token's content, when present.
    pub fn directive(
        &mut self,
        name: &str,
        argument: Option<&str>,
        location: Location,
        diagnostics: &mut dyn DiagnosticSink,
    ) {
        match name {
            "if" => match self.require_argument("if", argument, &location, diagnostics) {
                Some(variable) => self.frames.push(ConditionFrame {
                    phase: ConditionPhase::If,
                    prior_conditions: vec![self.definitions.is_defined(variable)],
                    opened_at: location,
                }),
                None => (),
            },
            "elseif" => {
                let Some(variable) =
                    self.require_argument("elseif", argument, &location, diagnostics)
                else {
                    return;
                };
                let defined = self.definitions.is_defined(variable);
                match self.frames.last_mut() {
                    None => diagnostics.emit(
                        Diagnostic::error("#elseif without a matching #if")
                            .at_location(location),
                    ),
                    Some(frame) if frame.phase == ConditionPhase::Else => diagnostics.emit(
                        Diagnostic::error("#elseif is not allowed after #else or #elseif")
                            .at_location(location),
                    ),
                    Some(frame) => {
                        let none_prior = !frame.prior_conditions.iter().any(|&c| c);
                        frame.prior_conditions.push(none_prior && defined);
                        frame.phase = ConditionPhase::Else;
                    }
                }
            }
            "else" => match self.frames.last_mut() {
                None => diagnostics.emit(
                    Diagnostic::error("#else without a matching #if").at_location(location),
                ),
                Some(frame) if frame.phase == ConditionPhase::Else => diagnostics.emit(
                    Diagnostic::error("#else is not allowed after #else or #elseif")
                        .at_location(location),
                ),
                Some(frame) => {
                    let none_prior = !frame.prior_conditions.iter().any(|&c| c);
                    frame.prior_conditions.push(none_prior);
                    frame.phase = ConditionPhase::Else;
                }
            },
            "endif" => {
                if self.frames.pop().is_none() {
                    diagnostics.emit(
                        Diagnostic::error("#endif without a matching #if").at_location(location),
                    );
                }
            }
            "define" => {
                if let Some(variable) =
                    self.require_argument("define", argument, &location, diagnostics)
                {
                    if !self.is_skipping() {
                        if self.definitions.is_defined(variable) {
                            debug!("preprocessor variable {variable} is already defined");
                        }
                        self.definitions.define(variable);
                    }
                }
            }
            "undefine" => {
                if let Some(variable) =
                    self.require_argument("undefine", argument, &location, diagnostics)
                {
                    if !self.is_skipping() {
                        self.definitions.undefine(variable);
                    }
                }
            }
            _ => diagnostics.emit(
                Diagnostic::error(format!("unknown preprocessor tag #{name}"))
                    .at_location(location),
            ),
        }
    }

    fn require_argument<'arg>(
        &self,
        directive: &str,
        argument: Option<&'arg str>,
        location: &Location,
        diagnostics: &mut dyn DiagnosticSink,
    ) -> Option<&'arg str> {
        match argument {
            Some(argument) if !argument.is_empty() => Some(argument),
            _ => {
                diagnostics.emit(
                    Diagnostic::error(format!("#{directive} expects a variable name"))
                        .at_location(location.clone()),
                );
                None
            }
        }
    }

    /// Called at end of input; any frame still open is suspicious.
    pub fn finish(&mut self, diagnostics: &mut dyn DiagnosticSink) {
        for frame in self.frames.drain(..) {
            diagnostics.emit(
                Diagnostic::warning("#if is not closed by a matching #endif")
                    .at_location(frame.opened_at),
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use slate_foundation::errors::Diagnostic;

    fn run(directives: &[(&str, Option<&str>)], initial: &[&str]) -> (Preprocessor, Vec<Diagnostic>) {
        let mut preprocessor = Preprocessor::new(initial.iter().copied().collect());
        let mut diagnostics = Vec::new();
        for (name, argument) in directives {
            preprocessor.directive(name, *argument, Location::UNKNOWN, &mut diagnostics);
        }
        (preprocessor, diagnostics)
    }

    #[test]
    fn if_skips_when_undefined() {
        let (preprocessor, diagnostics) = run(&[("if", Some("FEATURE"))], &[]);
        assert!(preprocessor.is_skipping());
        assert!(diagnostics.is_empty());
    }

    #[test]
    fn if_keeps_when_defined() {
        let (preprocessor, diagnostics) = run(&[("if", Some("FEATURE"))], &["FEATURE"]);
        assert!(!preprocessor.is_skipping());
        assert!(diagnostics.is_empty());
    }

    #[test]
    fn else_flips_the_branch() {
        let (preprocessor, _) = run(&[("if", Some("FEATURE")), ("else", None)], &[]);
        assert!(!preprocessor.is_skipping());
        let (preprocessor, _) = run(&[("if", Some("FEATURE")), ("else", None)], &["FEATURE"]);
        assert!(preprocessor.is_skipping());
    }

    #[test]
    fn elseif_takes_only_the_first_satisfied_branch() {
        let directives: &[(&str, Option<&str>)] =
            &[("if", Some("A")), ("elseif", Some("B")), ("else", None)];

        let (preprocessor, _) = run(directives, &["A", "B"]);
        assert!(preprocessor.is_skipping(), "the #elseif branch must not win over #if");

        let (preprocessor, diagnostics) = run(&directives[..2], &["B"]);
        assert!(!preprocessor.is_skipping());
        assert!(diagnostics.is_empty());
    }

    #[test]
    fn elseif_after_else_is_an_error() {
        let (_, diagnostics) = run(
            &[("if", Some("A")), ("else", None), ("elseif", Some("B"))],
            &[],
        );
        assert_eq!(diagnostics.len(), 1);
        assert!(diagnostics[0].message.contains("#elseif"));
    }

    #[test]
    fn define_and_undefine_respect_skipping() {
        let (preprocessor, _) = run(
            &[
                ("define", Some("KEPT")),
                ("if", Some("MISSING")),
                ("define", Some("SKIPPED")),
                ("endif", None),
                ("undefine", Some("KEPT")),
            ],
            &[],
        );
        assert!(!preprocessor.definitions.is_defined("SKIPPED"));
        assert!(!preprocessor.definitions.is_defined("KEPT"));
    }

    #[test]
    fn nested_ifs_stack() {
        let (preprocessor, _) = run(&[("if", Some("A")), ("if", Some("B"))], &["A", "B"]);
        assert!(!preprocessor.is_skipping());
        let (preprocessor, _) = run(&[("if", Some("A")), ("if", Some("B"))], &["B"]);
        assert!(preprocessor.is_skipping(), "outer #if must keep skipping nested code");
    }

    #[test]
    fn stray_directives_are_errors() {
        for directives in [
            &[("endif", None)][..],
            &[("else", None)][..],
            &[("elseif", Some("A"))][..],
            &[("garbage", Some("A"))][..],
        ] {
            let (_, diagnostics) = run(directives, &[]);
            assert_eq!(diagnostics.len(), 1, "{directives:?}");
        }
    }

    #[test]
    fn missing_argument_is_an_error() {
        for name in ["if", "elseif", "define", "undefine"] {
            let mut directives = vec![];
            if name == "elseif" {
                directives.push(("if", Some("A")));
            }
            directives.push((name, None));
            let (_, diagnostics) = run(&directives, &[]);
            assert_eq!(diagnostics.len(), 1, "#{name}");
            assert!(diagnostics[0].message.contains("expects a variable name"));
        }
    }

    #[test]
    fn unclosed_if_warns_at_finish() {
        let (mut preprocessor, mut diagnostics) = run(&[("if", Some("A"))], &[]);
        preprocessor.finish(&mut diagnostics);
        assert_eq!(diagnostics.len(), 1);
        assert!(diagnostics[0].message.contains("not closed"));
    }
}

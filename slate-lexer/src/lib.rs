//! Tokenizer for the Slate language, with the conditional preprocessor
//! built in.

pub mod lexer;
pub mod preprocessor;
pub mod token;

use slate_foundation::{errors::DiagnosticSink, span::SourceUri};

pub use crate::{
    lexer::Lexer,
    preprocessor::{Definitions, Preprocessor},
    token::{AnalyzedKind, Token, TokenKind},
};

/// Tokenizes a whole source file.
///
/// The returned stream contains every lexeme, trivia included; conditional
/// compilation has already been applied (excluded tokens are re-typed as
/// [`TokenKind::PreprocessSkipped`]). `initial_definitions` seeds the
/// preprocessor before the first `#define` runs.
pub fn tokenize(
    source: &str,
    file: &SourceUri,
    diagnostics: &mut dyn DiagnosticSink,
    initial_definitions: Definitions,
) -> Vec<Token> {
    Lexer::new(source, file.clone(), initial_definitions, diagnostics).lex()
}

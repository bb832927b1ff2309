//! The recursive-descent parser.
//!
//! The parser works on an owned, mutable token buffer: trivia is filtered on
//! intake, and type parsing may split tokens in place (`>>` at the end of
//! nested generics, `@word` closure annotations). Productions save a restore
//! point and rewind the cursor on failure so the caller can try the next
//! alternative; buffer mutations deliberately survive the rewind.
//!
//! Error recovery happens in three layers:
//!
//! 1. Silent backtrack - an early token probe missed, no diagnostic.
//! 2. Synthesized placeholder - the production already committed, so it emits
//!    a positioned diagnostic, substitutes a `Missing*` node at
//!    `previous_token.position.after()`, and keeps going.
//! 3. Importance-ranked fallback - competing top-level alternatives record
//!    their failures into an [`OrderedDiagnosticCollection`] keyed by how
//!    many tokens each consumed; only the best-matching explanations are
//!    reported.

mod def;
mod expr;
pub mod keyword;
mod stmt;
mod types;

use slate_foundation::{
    errors::{drain_diagnostics_into, Diagnostic, DiagnosticsCollection, SyntaxError},
    ordered::OrderedDiagnosticCollection,
    span::{Location, Position, SourceUri},
};
use slate_lexer::{AnalyzedKind, Token, TokenKind};
use tracing::warn;

use crate::ast::{
    AliasDefinition, Expression, FunctionDefinition, MissingId, MissingNode, Statement,
    StructDefinition, TypeInstance, UsingDefinition,
};

pub use types::AllowedTypes;

/// Iteration ceiling for every loop in the parser. Real inputs get nowhere
/// near it; a production that fails to advance does, and that is a parser
/// bug, not an input problem.
const MAX_PARSER_ITERATIONS: usize = 1 << 20;

/// Everything the parser extracted from one source file.
#[derive(Debug, Clone, Default)]
pub struct ParserResult {
    pub functions: Vec<FunctionDefinition>,
    pub operators: Vec<FunctionDefinition>,
    pub structs: Vec<StructDefinition>,
    pub usings: Vec<UsingDefinition>,
    pub aliases: Vec<AliasDefinition>,
    pub top_level_statements: Vec<Statement>,
    /// The tokenizer's output, untouched.
    pub original_tokens: Vec<Token>,
    /// The trivia-filtered buffer the parser consumed, including in-place
    /// splits and analyzed-kind tags. This is the surface highlighters read.
    pub filtered_tokens: Vec<Token>,
}

/// Parses a whole source file.
///
/// This never fails: unparseable input degrades into diagnostics and
/// `Missing*` placeholders, and the deeply-wrong inputs that abort the parse
/// internally are converted into a diagnostic here. Check
/// [`DiagnosticsCollection::has_errors`] to decide whether to continue.
pub fn parse(
    tokens: Vec<Token>,
    file: &SourceUri,
    diagnostics: &mut DiagnosticsCollection,
) -> ParserResult {
    let mut parser = Parser::new(&tokens, file.clone(), diagnostics);
    let mut result = ParserResult {
        original_tokens: tokens,
        ..Default::default()
    };
    if let Err(aborted) = parser.parse_file(&mut result) {
        parser.diagnostics.add(aborted.diagnostic);
    }
    result.filtered_tokens = parser.tokens;
    result
}

/// Parses a single expression.
///
/// A restricted mode of [`parse`]: top-level and termination rules are
/// relaxed, and the one expression lands in
/// [`ParserResult::top_level_statements`].
pub fn parse_expression(
    tokens: Vec<Token>,
    file: &SourceUri,
    diagnostics: &mut DiagnosticsCollection,
) -> ParserResult {
    let mut parser = Parser::new(&tokens, file.clone(), diagnostics);
    let mut result = ParserResult {
        original_tokens: tokens,
        ..Default::default()
    };
    match parser.parse_expression_value() {
        Ok(expression) => {
            if !parser.at_end() {
                let position = parser.current_position();
                parser.error("expected end of input after the expression", position);
            }
            result.top_level_statements.push(Statement::Expression(expression));
        }
        Err(error) => {
            parser.error("expected an expression", error.position);
        }
    }
    result.filtered_tokens = parser.tokens;
    result
}

/// The AST node could not be parsed. Carries where the failure happened so
/// callers can rank or report it.
#[derive(Debug, Clone, Copy)]
pub struct ParseError {
    pub position: Position,
}

/// A saved cursor state. Restoring rewinds consumption but keeps buffer
/// mutations (splits stay split).
#[derive(Debug, Clone, Copy)]
pub(crate) struct Checkpoint {
    index: usize,
}

pub(crate) struct Parser<'a> {
    pub(crate) file: SourceUri,
    pub(crate) tokens: Vec<Token>,
    pub(crate) index: usize,
    pub(crate) diagnostics: &'a mut DiagnosticsCollection,
    next_missing_id: u32,
    iterations: usize,
    fatal: Option<Diagnostic>,
}

impl<'a> Parser<'a> {
    pub(crate) fn new(
        tokens: &[Token],
        file: SourceUri,
        diagnostics: &'a mut DiagnosticsCollection,
    ) -> Self {
        Self {
            file,
            tokens: tokens
                .iter()
                .filter(|token| !token.kind.is_trivia())
                .cloned()
                .collect(),
            index: 0,
            diagnostics,
            next_missing_id: 0,
            iterations: 0,
            fatal: None,
        }
    }

    // ------------------------------------------------------------------
    // Cursor primitives
    // ------------------------------------------------------------------

    pub(crate) fn checkpoint(&self) -> Checkpoint {
        Checkpoint { index: self.index }
    }

    pub(crate) fn restore(&mut self, checkpoint: Checkpoint) {
        self.index = checkpoint.index;
    }

    pub(crate) fn at_end(&self) -> bool {
        self.index >= self.tokens.len()
    }

    pub(crate) fn peek(&self) -> Option<&Token> {
        self.tokens.get(self.index)
    }

    pub(crate) fn peek_at(&self, offset: usize) -> Option<&Token> {
        self.tokens.get(self.index + offset)
    }

    pub(crate) fn advance(&mut self) -> Option<Token> {
        let token = self.tokens.get(self.index).cloned();
        if token.is_some() {
            self.index += 1;
        }
        token
    }

    /// Position of the current (unconsumed) token, or the end of input.
    pub(crate) fn current_position(&self) -> Position {
        match self.peek() {
            Some(token) => token.position,
            None => self.previous_position().after(),
        }
    }

    /// Position of the most recently consumed token, or the start of input.
    pub(crate) fn previous_position(&self) -> Position {
        self.index
            .checked_sub(1)
            .and_then(|i| self.tokens.get(i))
            .map(|token| token.position)
            .unwrap_or(Position::at(slate_foundation::span::Point::START))
    }

    /// Where a missing element would have been: just past the previous token.
    pub(crate) fn missing_position(&self) -> Position {
        self.previous_position().after()
    }

    pub(crate) fn location(&self, position: Position) -> Location {
        Location::new(position, self.file.clone())
    }

    /// Counts loop iterations across the whole parse and trips an internal
    /// error when a production stops advancing. Purely a defense against
    /// parser bugs; the error unwinds out of `parse_file`.
    pub(crate) fn guard(&mut self) -> Result<(), ParseError> {
        self.iterations += 1;
        if self.iterations > MAX_PARSER_ITERATIONS && self.fatal.is_none() {
            warn!(
                file = %self.file,
                index = self.index,
                "parser iteration ceiling hit, aborting the parse"
            );
            self.fatal = Some(
                Diagnostic::internal_error("the parser stopped advancing through the input")
                    .at_location(self.location(self.current_position())),
            );
        }
        match self.fatal {
            Some(_) => Err(self.parse_error()),
            None => Ok(()),
        }
    }

    pub(crate) fn parse_error(&self) -> ParseError {
        ParseError {
            position: self.current_position(),
        }
    }

    // ------------------------------------------------------------------
    // Diagnostics
    // ------------------------------------------------------------------

    pub(crate) fn error(&mut self, message: impl Into<String>, position: Position) {
        let diagnostic = Diagnostic::error(message).at_location(self.location(position));
        self.diagnostics.add(diagnostic);
    }

    pub(crate) fn warning(&mut self, message: impl Into<String>, position: Position) {
        let diagnostic = Diagnostic::warning(message).at_location(self.location(position));
        self.diagnostics.add(diagnostic);
    }

    // ------------------------------------------------------------------
    // Missing-node synthesis
    // ------------------------------------------------------------------

    pub(crate) fn missing_node(&mut self) -> MissingNode {
        let id = MissingId(self.next_missing_id);
        self.next_missing_id += 1;
        MissingNode {
            id,
            location: self.location(self.missing_position()),
        }
    }

    pub(crate) fn missing_token(&self, kind: TokenKind, content: &str) -> Token {
        Token::missing(kind, content, self.missing_position())
    }

    pub(crate) fn missing_expression(&mut self) -> Expression {
        Expression::Missing(self.missing_node())
    }

    pub(crate) fn missing_type(&mut self) -> TypeInstance {
        TypeInstance::Missing(self.missing_node())
    }

    pub(crate) fn missing_statement(&mut self) -> Statement {
        Statement::Missing(self.missing_node())
    }

    // ------------------------------------------------------------------
    // Token matching
    // ------------------------------------------------------------------

    pub(crate) fn peek_is_operator(&self, content: &str) -> bool {
        self.peek()
            .map(|token| token.is(TokenKind::Operator, content))
            .unwrap_or(false)
    }

    pub(crate) fn peek_at_is_operator(&self, offset: usize, content: &str) -> bool {
        self.peek_at(offset)
            .map(|token| token.is(TokenKind::Operator, content))
            .unwrap_or(false)
    }

    pub(crate) fn peek_is_identifier_with(&self, name: &str) -> bool {
        self.peek()
            .map(|token| token.is(TokenKind::Identifier, name))
            .unwrap_or(false)
    }

    /// Consumes the operator with exactly this spelling; leaves the cursor
    /// unchanged on a miss.
    pub(crate) fn expect_operator(&mut self, content: &str) -> Result<Token, ParseError> {
        if self.peek_is_operator(content) {
            Ok(self.advance().ok_or(self.parse_error())?)
        } else {
            Err(self.parse_error())
        }
    }

    pub(crate) fn expect_operator_in(&mut self, contents: &[&str]) -> Result<Token, ParseError> {
        match self.peek() {
            Some(token)
                if token.kind == TokenKind::Operator
                    && contents.contains(&token.content.as_str()) =>
            {
                Ok(self.advance().ok_or(self.parse_error())?)
            }
            _ => Err(self.parse_error()),
        }
    }

    /// Consumes a non-reserved identifier.
    pub(crate) fn expect_identifier(&mut self) -> Result<Token, ParseError> {
        match self.peek() {
            Some(token)
                if token.kind == TokenKind::Identifier
                    && !keyword::is_reserved(&token.content) =>
            {
                Ok(self.advance().ok_or(self.parse_error())?)
            }
            _ => Err(self.parse_error()),
        }
    }

    /// Consumes the identifier with exactly this spelling (used for
    /// keywords, which lex as identifiers).
    pub(crate) fn expect_identifier_with(&mut self, name: &str) -> Result<Token, ParseError> {
        if self.peek_is_identifier_with(name) {
            Ok(self.advance().ok_or(self.parse_error())?)
        } else {
            Err(self.parse_error())
        }
    }

    /// Consumes any literal token.
    pub(crate) fn expect_literal(&mut self) -> Result<Token, ParseError> {
        match self.peek() {
            Some(token) if token.kind.is_literal() => {
                Ok(self.advance().ok_or(self.parse_error())?)
            }
            _ => Err(self.parse_error()),
        }
    }

    /// Tags the most recently consumed token with a semantic color. The tag
    /// lands on the buffer, which is what the parse result hands back to
    /// highlighters.
    pub(crate) fn tag_previous(&mut self, kind: AnalyzedKind) {
        if let Some(token) = self
            .index
            .checked_sub(1)
            .and_then(|i| self.tokens.get_mut(i))
        {
            token.analyzed_kind = kind;
        }
    }

    // ------------------------------------------------------------------
    // Backtracking
    // ------------------------------------------------------------------

    /// Runs a production speculatively: on failure the cursor rewinds and
    /// every diagnostic the production emitted is discarded.
    pub(crate) fn try_parse<T>(
        &mut self,
        production: impl FnOnce(&mut Self) -> Result<T, ParseError>,
    ) -> Result<T, ParseError> {
        let checkpoint = self.checkpoint();
        let scope = self.diagnostics.push_override();
        match production(self) {
            Ok(value) => {
                self.diagnostics.commit_override(scope);
                Ok(value)
            }
            Err(error) => {
                self.diagnostics.drop_override(scope);
                self.restore(checkpoint);
                Err(error)
            }
        }
    }

    /// Runs one alternative of a competing set. On failure the cursor
    /// rewinds and the alternative's diagnostics move into `ordered`, ranked
    /// by how many tokens the alternative consumed before giving up - the
    /// best-matching failure explanations survive
    /// [`OrderedDiagnosticCollection::compile`].
    pub(crate) fn attempt<T>(
        &mut self,
        ordered: &mut OrderedDiagnosticCollection,
        expected: &str,
        production: impl FnOnce(&mut Self) -> Result<T, ParseError>,
    ) -> Option<T> {
        let checkpoint = self.checkpoint();
        let scope = self.diagnostics.push_override();
        match production(self) {
            Ok(value) => {
                self.diagnostics.commit_override(scope);
                Some(value)
            }
            Err(error) => {
                let dropped = self.diagnostics.drop_override(scope);
                let importance = self.index - checkpoint.index;
                if dropped.is_empty() {
                    ordered.add(
                        importance,
                        Diagnostic::error(format!("expected {expected}"))
                            .at_location(self.location(error.position)),
                    );
                } else {
                    for diagnostic in dropped {
                        ordered.add(importance, diagnostic);
                    }
                }
                self.restore(checkpoint);
                None
            }
        }
    }

    // ------------------------------------------------------------------
    // Top level
    // ------------------------------------------------------------------

    fn parse_file(&mut self, result: &mut ParserResult) -> Result<(), SyntaxError> {
        let mut stalled = false;
        while !self.at_end() {
            if self.guard().is_err() {
                // A production tripped the iteration ceiling (or the top
                // level itself did); unwind with the recorded diagnostic.
                match self.fatal.take() {
                    Some(fatal) => return Err(SyntaxError::new(fatal)),
                    None => break,
                }
            }

            if self.peek_is_identifier_with("using") {
                if let Ok(using) = self.try_parse(Self::parse_using) {
                    result.usings.push(using);
                    stalled = false;
                    continue;
                }
            }

            let mut ordered = OrderedDiagnosticCollection::new();
            if let Some(function) = self.attempt(&mut ordered, "a function", Self::parse_function)
            {
                result.functions.push(function);
                stalled = false;
                continue;
            }
            if let Some(operator) =
                self.attempt(&mut ordered, "an operator", Self::parse_operator)
            {
                result.operators.push(operator);
                stalled = false;
                continue;
            }
            if let Some(alias) = self.attempt(&mut ordered, "an alias", Self::parse_alias) {
                result.aliases.push(alias);
                stalled = false;
                continue;
            }
            if let Some(definition) = self.attempt(&mut ordered, "a struct", Self::parse_struct) {
                result.structs.push(definition);
                stalled = false;
                continue;
            }
            if let Some(statement) =
                self.attempt(&mut ordered, "a statement", Self::parse_terminated_statement)
            {
                result.top_level_statements.push(statement);
                stalled = false;
                continue;
            }

            // Nothing matched. Report the most promising failures once per
            // stall, then skip a token so the parse keeps moving.
            if !stalled {
                drain_diagnostics_into(ordered.compile(), self.diagnostics);
                result.top_level_statements.push(self.missing_statement());
                stalled = true;
            }
            self.advance();
        }
        Ok(())
    }
}

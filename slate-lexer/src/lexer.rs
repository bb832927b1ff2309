//! The tokenizer.
//!
//! Walks the source text character by character and emits *every* lexeme,
//! including whitespace, line breaks and comments; the parser filters trivia
//! on intake so that source spans stay exact for tools. The preprocessor
//! state machine is consulted before each token is committed: inside an
//! unsatisfied `#if` branch, tokens keep their content and position but are
//! re-typed as [`TokenKind::PreprocessSkipped`].

use slate_foundation::{
    errors::{Diagnostic, DiagnosticSink},
    span::{Location, Point, Position, SourceUri},
};

use crate::{
    preprocessor::{Definitions, Preprocessor},
    token::{Token, TokenKind},
};

/// Multi-character operators, longest first so that maximal munch falls out
/// of a linear scan.
const MULTI_CHAR_OPERATORS: &[&str] = &[
    "<<", ">>", "<=", ">=", "==", "!=", "&&", "||", "=>", "->", "++", "--", "+=", "-=", "*=",
    "/=", "%=", "&=", "|=", "^=",
];

const SINGLE_CHAR_OPERATORS: &str = ".,;:(){}[]<>+-*/%&|^~!=?@";

pub struct Lexer<'a> {
    input: &'a str,
    file: SourceUri,
    point: Point,
    preprocessor: Preprocessor,
    tokens: Vec<Token>,
    diagnostics: &'a mut dyn DiagnosticSink,
}

impl<'a> Lexer<'a> {
    pub fn new(
        input: &'a str,
        file: SourceUri,
        definitions: Definitions,
        diagnostics: &'a mut dyn DiagnosticSink,
    ) -> Self {
        Self {
            input,
            file,
            point: Point::START,
            preprocessor: Preprocessor::new(definitions),
            tokens: vec![],
            diagnostics,
        }
    }

    fn current_char(&self) -> Option<char> {
        self.input[self.point.offset..].chars().next()
    }

    fn peek_char(&self) -> Option<char> {
        let mut chars = self.input[self.point.offset..].chars();
        chars.next();
        chars.next()
    }

    fn advance_char(&mut self) {
        if let Some(char) = self.current_char() {
            self.point.offset += char.len_utf8();
            if char == '\n' {
                self.point.line += 1;
                self.point.column = 1;
            } else {
                self.point.column += 1;
            }
        }
    }

    fn position_from(&self, start: Point) -> Position {
        Position::new(start, self.point)
    }

    fn location_from(&self, start: Point) -> Location {
        Location::new(self.position_from(start), self.file.clone())
    }

    fn push(&mut self, kind: TokenKind, start: Point) {
        let position = self.position_from(start);
        let content = &self.input[start.offset..self.point.offset];
        // Directives stay visible while skipping so that the state machine's
        // decisions remain legible in the token stream.
        let kind = if self.preprocessor.is_skipping()
            && !matches!(
                kind,
                TokenKind::PreprocessIdentifier | TokenKind::PreprocessArgument
            ) {
            TokenKind::PreprocessSkipped
        } else {
            kind
        };
        self.tokens.push(Token::new(kind, content, position));
    }

    fn one_or_more(&mut self, test: impl Fn(char) -> bool) -> bool {
        if !self.current_char().map(&test).unwrap_or(false) {
            return false;
        }
        while self.current_char().map(&test).unwrap_or(false) {
            self.advance_char();
        }
        true
    }

    fn whitespace(&mut self, start: Point) {
        while let Some(' ' | '\t') = self.current_char() {
            self.advance_char();
        }
        // A stray `\r` not followed by `\n` counts as whitespace too.
        while self.current_char() == Some('\r') && self.peek_char() != Some('\n') {
            self.advance_char();
        }
        self.push(TokenKind::Whitespace, start);
    }

    fn line_break(&mut self, start: Point) {
        if self.current_char() == Some('\r') {
            self.advance_char();
        }
        self.advance_char(); // The `\n`.
        self.push(TokenKind::LineBreak, start);
    }

    fn identifier(&mut self, start: Point) {
        self.one_or_more(|c| c.is_ascii_alphanumeric() || c == '_');
        self.push(TokenKind::Identifier, start);
    }

    fn number(&mut self, start: Point) {
        if self.current_char() == Some('0') && matches!(self.peek_char(), Some('x' | 'b')) {
            let base = self.peek_char();
            self.advance_char();
            self.advance_char();
            let (digits, kind, what) = match base {
                Some('x') => (
                    self.one_or_more(|c| c.is_ascii_hexdigit() || c == '_'),
                    TokenKind::LiteralHex,
                    "hex",
                ),
                _ => (
                    self.one_or_more(|c| matches!(c, '0' | '1' | '_')),
                    TokenKind::LiteralBinary,
                    "binary",
                ),
            };
            if !digits {
                self.diagnostics.emit(
                    Diagnostic::error(format!("Invalid {what} literal"))
                        .at_location(self.location_from(start)),
                );
            }
            self.push(kind, start);
            return;
        }

        self.one_or_more(|c| c.is_ascii_digit() || c == '_');
        if self.current_char() == Some('.')
            && self
                .peek_char()
                .map(|c| c.is_ascii_digit() || c == '_')
                .unwrap_or(false)
        {
            self.advance_char(); // The `.`.
            self.one_or_more(|c| c.is_ascii_digit() || c == '_');
            self.push(TokenKind::LiteralFloat, start);
        } else {
            self.push(TokenKind::LiteralNumber, start);
        }
    }

    /// Advances over one character of a quoted literal, honoring `\`-escapes
    /// so a `\"` does not end a string.
    fn quoted_char(&mut self) {
        if self.current_char() == Some('\\') {
            self.advance_char();
        }
        self.advance_char();
    }

    fn quoted_literal(&mut self, start: Point, quote: char, kind: TokenKind, what: &str) {
        self.advance_char(); // The opening quote.
        loop {
            match self.current_char() {
                Some(c) if c == quote => {
                    self.advance_char();
                    break;
                }
                None | Some('\n') => {
                    self.diagnostics.emit(
                        Diagnostic::error(format!("{what} literal is not closed"))
                            .at_location(self.location_from(start)),
                    );
                    break;
                }
                _ => self.quoted_char(),
            }
        }
        self.push(kind, start);
    }

    fn comment_or_division(&mut self, start: Point) {
        self.advance_char();
        match self.current_char() {
            Some('/') => {
                while !matches!(self.current_char(), None | Some('\n')) {
                    self.advance_char();
                }
                self.push(TokenKind::Comment, start);
            }
            Some('*') => {
                self.advance_char();
                loop {
                    match self.current_char() {
                        Some('*') if self.peek_char() == Some('/') => {
                            self.advance_char();
                            self.advance_char();
                            break;
                        }
                        None => {
                            self.diagnostics.emit(
                                Diagnostic::error(
                                    "block comment does not have a matching */ terminator",
                                )
                                .at_location(self.location_from(start)),
                            );
                            break;
                        }
                        _ => self.advance_char(),
                    }
                }
                self.push(TokenKind::CommentMultiline, start);
            }
            _ => self.operator(start),
        }
    }

    /// `#word`, and the rest of the line as its single argument token.
    fn preprocess_directive(&mut self, start: Point) {
        self.advance_char(); // The `#`.
        self.one_or_more(|c| c.is_ascii_alphanumeric() || c == '_');
        let name = self.input[start.offset + 1..self.point.offset].to_owned();
        let directive_location = self.location_from(start);
        self.push(TokenKind::PreprocessIdentifier, start);

        // Inline whitespace between the directive and its argument.
        let whitespace_start = self.point;
        if matches!(self.current_char(), Some(' ' | '\t')) {
            while let Some(' ' | '\t') = self.current_char() {
                self.advance_char();
            }
            self.push(TokenKind::Whitespace, whitespace_start);
        }

        // The argument is the rest of the line, as one token.
        let argument_start = self.point;
        while !matches!(self.current_char(), None | Some('\n' | '\r')) {
            self.advance_char();
        }
        let argument = if self.point.offset > argument_start.offset {
            let content = self.input[argument_start.offset..self.point.offset]
                .trim_end()
                .to_owned();
            self.push(TokenKind::PreprocessArgument, argument_start);
            Some(content)
        } else {
            None
        };

        self.preprocessor.directive(
            &name,
            argument.as_deref(),
            directive_location,
            self.diagnostics,
        );
    }

    /// `@` immediately followed by a word lexes as one identifier token
    /// (`@closure`); the parser splits it back apart when the `@` matters on
    /// its own. This mirrors `#word` directives being single tokens.
    fn at_identifier(&mut self, start: Point) {
        self.advance_char(); // The `@`.
        if self
            .current_char()
            .map(|c| c.is_ascii_alphabetic() || c == '_')
            .unwrap_or(false)
        {
            self.one_or_more(|c| c.is_ascii_alphanumeric() || c == '_');
            self.push(TokenKind::Identifier, start);
        } else {
            self.push(TokenKind::Operator, start);
        }
    }

    fn operator(&mut self, start: Point) {
        let rest = &self.input[start.offset..];
        for multi in MULTI_CHAR_OPERATORS {
            if rest.starts_with(multi) {
                while self.point.offset < start.offset + multi.len() {
                    self.advance_char();
                }
                self.push(TokenKind::Operator, start);
                return;
            }
        }
        if self.point.offset == start.offset {
            // Entered directly (not via comment_or_division, which has
            // already consumed the `/`).
            self.advance_char();
        }
        self.push(TokenKind::Operator, start);
    }

    pub fn lex(mut self) -> Vec<Token> {
        while let Some(char) = self.current_char() {
            let start = self.point;
            match char {
                ' ' | '\t' => self.whitespace(start),
                '\r' if self.peek_char() == Some('\n') => self.line_break(start),
                '\r' => self.whitespace(start),
                '\n' => self.line_break(start),
                '/' => self.comment_or_division(start),
                'a'..='z' | 'A'..='Z' | '_' => self.identifier(start),
                '0'..='9' => self.number(start),
                '"' => self.quoted_literal(start, '"', TokenKind::LiteralString, "String"),
                '\'' => self.quoted_literal(start, '\'', TokenKind::LiteralCharacter, "Character"),
                '#' => self.preprocess_directive(start),
                '@' => self.at_identifier(start),
                c if SINGLE_CHAR_OPERATORS.contains(c) => self.operator(start),
                unknown => {
                    self.advance_char();
                    let diagnostic = Diagnostic::error(format!(
                        "unrecognized character {unknown:?}"
                    ))
                    .at_location(self.location_from(start));
                    self.diagnostics.emit(diagnostic);
                    // The stray character stays in the stream with an exact
                    // span so later spans are not thrown off.
                    self.push(TokenKind::Operator, start);
                }
            }
        }
        self.preprocessor.finish(self.diagnostics);
        self.tokens
    }
}

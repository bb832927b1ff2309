//! Typed lexemes.

use std::fmt;

use slate_foundation::span::{Point, Position, Positioned};

/// What kind of lexeme a token is.
///
/// This list is wire identity: external tools (highlighters, fidelity tools)
/// match on it, so variants must not be renamed or reordered lightly.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum TokenKind {
    Identifier,
    LiteralNumber,
    LiteralFloat,
    LiteralHex,
    LiteralBinary,
    LiteralString,
    LiteralCharacter,
    Operator,
    Whitespace,
    LineBreak,
    Comment,
    CommentMultiline,
    PreprocessIdentifier,
    PreprocessArgument,
    PreprocessSkipped,
}

impl TokenKind {
    /// Tokens the parser drops on intake.
    pub fn is_trivia(&self) -> bool {
        matches!(
            self,
            TokenKind::Whitespace
                | TokenKind::LineBreak
                | TokenKind::Comment
                | TokenKind::CommentMultiline
                | TokenKind::PreprocessIdentifier
                | TokenKind::PreprocessArgument
                | TokenKind::PreprocessSkipped
        )
    }

    pub fn is_literal(&self) -> bool {
        matches!(
            self,
            TokenKind::LiteralNumber
                | TokenKind::LiteralFloat
                | TokenKind::LiteralHex
                | TokenKind::LiteralBinary
                | TokenKind::LiteralString
                | TokenKind::LiteralCharacter
        )
    }

    pub fn name(&self) -> &'static str {
        match self {
            TokenKind::Identifier => "identifier",
            TokenKind::LiteralNumber => "integer literal",
            TokenKind::LiteralFloat => "float literal",
            TokenKind::LiteralHex => "hex literal",
            TokenKind::LiteralBinary => "binary literal",
            TokenKind::LiteralString => "string literal",
            TokenKind::LiteralCharacter => "character literal",
            TokenKind::Operator => "operator",
            TokenKind::Whitespace => "whitespace",
            TokenKind::LineBreak => "line break",
            TokenKind::Comment => "comment",
            TokenKind::CommentMultiline => "comment",
            TokenKind::PreprocessIdentifier => "preprocessor directive",
            TokenKind::PreprocessArgument => "preprocessor argument",
            TokenKind::PreprocessSkipped => "skipped token",
        }
    }
}

/// Semantic color category, assigned during parsing and consumed by external
/// syntax highlighters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AnalyzedKind {
    #[default]
    None,
    Keyword,
    Type,
    Struct,
    Attribute,
    FunctionName,
    VariableName,
    FieldName,
    ParameterName,
    Namespace,
}

/// A single lexeme.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    pub kind: TokenKind,
    /// The raw slice of source this token covers. Synthesized tokens carry
    /// the text they stand in for.
    pub content: String,
    pub position: Position,
    /// True when the tokenizer or parser fabricated this token for recovery.
    pub is_synthetic: bool,
    /// Semantic color slot; overwritten during parsing. Tags live on the
    /// token list handed back in the parse result, not on token clones
    /// embedded in AST nodes.
    pub analyzed_kind: AnalyzedKind,
}

impl Token {
    pub fn new(kind: TokenKind, content: impl Into<String>, position: Position) -> Self {
        Self {
            kind,
            content: content.into(),
            position,
            is_synthetic: false,
            analyzed_kind: AnalyzedKind::None,
        }
    }

    /// Fabricates a token that was not present in the source. Used by the
    /// parser when recovery requires a stand-in.
    pub fn missing(kind: TokenKind, content: impl Into<String>, position: Position) -> Self {
        Self {
            kind,
            content: content.into(),
            position,
            is_synthetic: true,
            analyzed_kind: AnalyzedKind::None,
        }
    }

    pub fn is(&self, kind: TokenKind, content: &str) -> bool {
        self.kind == kind && self.content == content
    }

    /// Joins two adjacent tokens into one spanning both. Returns [`None`]
    /// when the tokens do not touch.
    pub fn concat(&self, other: &Token) -> Option<Token> {
        if self.position.end() != other.position.start() || self.position.end().is_none() {
            return None;
        }
        let mut content = self.content.clone();
        content.push_str(&other.content);
        Some(Token {
            kind: self.kind,
            content,
            position: self.position.union(&other.position),
            is_synthetic: self.is_synthetic || other.is_synthetic,
            analyzed_kind: self.analyzed_kind,
        })
    }

    /// Splits the token into two at byte `at` of its content. Returns
    /// [`None`] - a null partition - when the cut would fall inside a
    /// character or escape sequence, or outside the content entirely.
    pub fn slice(&self, at: usize) -> Option<(Token, Token)> {
        if at == 0 || at >= self.content.len() || !self.content.is_char_boundary(at) {
            return None;
        }
        let (Some(start), Some(end)) = (self.position.start(), self.position.end()) else {
            return None;
        };

        let head = &self.content[..at];
        let line_breaks = head.matches('\n').count() as u32;
        let mid = Point {
            offset: start.offset + at,
            line: start.line + line_breaks,
            column: match head.rfind('\n') {
                Some(last) => head[last + 1..].chars().count() as u32 + 1,
                None => start.column + head.chars().count() as u32,
            },
        };

        let left = Token {
            kind: self.kind,
            content: head.to_owned(),
            position: Position::new(start, mid),
            is_synthetic: self.is_synthetic,
            analyzed_kind: self.analyzed_kind,
        };
        let right = Token {
            kind: self.kind,
            content: self.content[at..].to_owned(),
            position: Position::new(mid, end),
            is_synthetic: self.is_synthetic,
            analyzed_kind: self.analyzed_kind,
        };
        Some((left, right))
    }
}

impl Positioned for Token {
    fn position(&self) -> Position {
        self.position
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.content)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn token(kind: TokenKind, content: &str, offset: usize) -> Token {
        let start = Point::new(offset, 0, offset as u32 + 1);
        let end = Point::new(
            offset + content.len(),
            0,
            (offset + content.len()) as u32 + 1,
        );
        Token::new(kind, content, Position::new(start, end))
    }

    #[test]
    fn concat_joins_adjacent_tokens() {
        let a = token(TokenKind::Operator, ">", 4);
        let b = token(TokenKind::Operator, ">", 5);
        let joined = a.concat(&b).unwrap();
        assert_eq!(joined.content, ">>");
        assert_eq!(joined.position, Position::new(
            Point::new(4, 0, 5),
            Point::new(6, 0, 7),
        ));
    }

    #[test]
    fn concat_refuses_gaps() {
        let a = token(TokenKind::Operator, ">", 4);
        let b = token(TokenKind::Operator, ">", 6);
        assert!(a.concat(&b).is_none());
    }

    #[test]
    fn slice_splits_content_and_position() {
        let original = token(TokenKind::Operator, ">>", 8);
        let (left, right) = original.slice(1).unwrap();
        assert_eq!(left.content, ">");
        assert_eq!(right.content, ">");
        assert_eq!(left.position.start().unwrap().offset, 8);
        assert_eq!(left.position.end().unwrap().offset, 9);
        assert_eq!(right.position.start().unwrap().offset, 9);
        assert_eq!(right.position.end().unwrap().offset, 10);
        assert_eq!(right.position.start().unwrap().column, 10);
        // A re-concatenation restores the original.
        assert_eq!(left.concat(&right).unwrap(), original);
    }

    #[test]
    fn slice_refuses_char_boundaries_and_ends() {
        let token = token(TokenKind::LiteralString, "\"héllo\"", 0);
        assert!(token.slice(0).is_none());
        assert!(token.slice(token.content.len()).is_none());
        // The byte in the middle of `é`.
        assert!(token.slice(3).is_none());
    }
}

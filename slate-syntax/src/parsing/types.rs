//! Parsing of types in type position.

use bitflags::bitflags;
use slate_foundation::span::Positioned;
use slate_lexer::{AnalyzedKind, Token, TokenKind};

use crate::ast::{
    TypeInstance, TypeInstanceFunction, TypeInstancePointer, TypeInstanceSimple,
    TypeInstanceStackArray,
};

use super::{keyword, ParseError, Parser};

bitflags! {
    /// Which type forms may appear in the current context. Simple types,
    /// pointers, generics and stack arrays with a length are always allowed.
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct AllowedTypes: u8 {
        const FUNCTION_POINTER = 1 << 0;
        const STACK_ARRAY_WITHOUT_LENGTH = 1 << 1;
    }
}

impl AllowedTypes {
    /// Every form.
    pub const ANY: Self = Self::all();
}

impl<'a> Parser<'a> {
    /// Splits the multi-character operator at the cursor after its first
    /// character, in place. The cursor ends up on the first half; the second
    /// half stays in the buffer for the next match. Used for `>>` closing two
    /// generic lists at once (`A<B<C>>`) and for `@word` closure annotations;
    /// a stray `>>>` degrades to `>` + `>>` the same way.
    ///
    /// The mutation is observable in the returned token list by design -
    /// fidelity tools get the split view, the original list keeps the raw
    /// one.
    pub(crate) fn split_current_token(&mut self, at: usize, left_kind: TokenKind) -> bool {
        let Some(token) = self.peek() else {
            return false;
        };
        let Some((mut left, right)) = token.slice(at) else {
            return false;
        };
        left.kind = left_kind;
        self.tokens[self.index] = left;
        self.tokens.insert(self.index + 1, right);
        true
    }

    /// Parses a type. `allowed` gates which forms are legal here; violations
    /// are diagnosed but the node is kept so parsing can continue.
    pub(crate) fn parse_type(&mut self, allowed: AllowedTypes) -> Result<TypeInstance, ParseError> {
        self.guard()?;

        let closure_modifier = self.parse_closure_modifier();
        let base = self.parse_simple_type()?;
        let parsed = self.parse_type_postfix(base, allowed)?;

        match closure_modifier {
            None => Ok(parsed),
            Some(modifier) => match parsed {
                TypeInstance::Function(mut function) => {
                    function.location.position =
                        modifier.position.union(&function.location.position);
                    function.closure_modifier = Some(modifier);
                    Ok(TypeInstance::Function(function))
                }
                other => {
                    self.error(
                        "a closure annotation must be followed by a function pointer type",
                        modifier.position,
                    );
                    Ok(other)
                }
            },
        }
    }

    /// `@word` before a function pointer type. The tokenizer usually delivers
    /// the annotation as one combined token, which gets split in place here;
    /// a pre-split `@` + `word` pair is accepted as well.
    fn parse_closure_modifier(&mut self) -> Option<Token> {
        match self.peek() {
            Some(token)
                if token.kind == TokenKind::Identifier && token.content.starts_with('@') =>
            {
                if !self.split_current_token(1, TokenKind::Operator) {
                    return None;
                }
                self.advance(); // The `@`.
                let word = self.advance();
                self.tag_previous(AnalyzedKind::Keyword);
                word
            }
            Some(token) if token.is(TokenKind::Operator, "@") => {
                let next_is_word = self
                    .peek_at(1)
                    .map(|t| t.kind == TokenKind::Identifier)
                    .unwrap_or(false);
                if !next_is_word {
                    return None;
                }
                self.advance(); // The `@`.
                let word = self.advance();
                self.tag_previous(AnalyzedKind::Keyword);
                word
            }
            _ => None,
        }
    }

    /// An identifier, optionally with generic arguments.
    fn parse_simple_type(&mut self) -> Result<TypeInstance, ParseError> {
        let identifier = match self.peek() {
            Some(token) if token.kind == TokenKind::Identifier => {
                let builtin = keyword::BUILTIN_TYPE_KEYWORDS.contains(&token.content.as_str());
                if !builtin && keyword::is_reserved(&token.content) {
                    return Err(self.parse_error());
                }
                let token = self.advance().ok_or(self.parse_error())?;
                self.tag_previous(if builtin {
                    AnalyzedKind::Keyword
                } else {
                    AnalyzedKind::Type
                });
                token
            }
            _ => return Err(self.parse_error()),
        };

        let generic_arguments = if self.peek_is_operator("<") {
            self.try_parse(Self::parse_generic_arguments).unwrap_or_default()
        } else {
            vec![]
        };

        let mut position = identifier.position;
        if let Some(last) = generic_arguments.last() {
            position = position.union(&last.position());
        }
        position = position.union(&self.previous_position());
        Ok(TypeInstance::Simple(TypeInstanceSimple {
            identifier,
            generic_arguments,
            location: self.location(position),
        }))
    }

    /// `'<' type (',' type)* ('>' | '>>')`. A closing `>>` is split in place
    /// so the outer generic list sees its own `>`.
    fn parse_generic_arguments(&mut self) -> Result<Vec<TypeInstance>, ParseError> {
        self.expect_operator("<")?;
        let mut arguments = vec![];
        loop {
            self.guard()?;
            arguments.push(self.parse_type(AllowedTypes::ANY)?);

            if self.expect_operator(",").is_ok() {
                continue;
            }
            if self.expect_operator(">").is_ok() {
                break;
            }
            match self.peek() {
                Some(token)
                    if token.kind == TokenKind::Operator && token.content.starts_with('>') =>
                {
                    // `>>` (or a degenerate `>>>`): split after the first `>`
                    // and consume only that half.
                    if self.split_current_token(1, TokenKind::Operator) {
                        self.advance();
                        break;
                    }
                    return Err(self.parse_error());
                }
                _ => return Err(self.parse_error()),
            }
        }
        Ok(arguments)
    }

    fn parse_type_postfix(
        &mut self,
        base: TypeInstance,
        allowed: AllowedTypes,
    ) -> Result<TypeInstance, ParseError> {
        let mut current = base;
        loop {
            self.guard()?;
            if self.peek_is_operator("*") {
                let star = self.advance().ok_or(self.parse_error())?;
                let position = current.position().union(&star.position);
                current = TypeInstance::Pointer(TypeInstancePointer {
                    inner: Box::new(current),
                    star,
                    location: self.location(position),
                });
            } else if self.peek_is_operator("(") {
                // A function pointer type: the type so far is the return
                // type, the parenthesized list holds the parameter types.
                // Backtracks without consuming when the parentheses turn out
                // to hold something else (call arguments, grouping).
                let Ok(parameters) = self.try_parse(Self::parse_function_type_parameters) else {
                    break;
                };
                if !allowed.contains(AllowedTypes::FUNCTION_POINTER) {
                    self.error(
                        "a function pointer type is not allowed here",
                        current.position(),
                    );
                }
                let position = current.position().union(&self.previous_position());
                current = TypeInstance::Function(TypeInstanceFunction {
                    return_type: Box::new(current),
                    parameters,
                    closure_modifier: None,
                    location: self.location(position),
                });
            } else if self.peek_is_operator("[") {
                self.advance();
                let length = if self.peek_is_operator("]") {
                    None
                } else {
                    match self.try_parse(Self::parse_expression_value) {
                        Ok(length) => Some(Box::new(length)),
                        Err(_) => return Err(self.parse_error()),
                    }
                };
                if self.expect_operator("]").is_err() {
                    return Err(self.parse_error());
                }
                if length.is_none() && !allowed.contains(AllowedTypes::STACK_ARRAY_WITHOUT_LENGTH)
                {
                    self.error(
                        "a stack array type without a length is not allowed here",
                        current.position(),
                    );
                }
                let position = current.position().union(&self.previous_position());
                current = TypeInstance::StackArray(TypeInstanceStackArray {
                    element: Box::new(current),
                    length,
                    location: self.location(position),
                });
            } else {
                break;
            }
        }
        Ok(current)
    }

    fn parse_function_type_parameters(&mut self) -> Result<Vec<TypeInstance>, ParseError> {
        self.expect_operator("(")?;
        let mut parameters = vec![];
        if self.expect_operator(")").is_ok() {
            return Ok(parameters);
        }
        loop {
            self.guard()?;
            parameters.push(self.parse_type(AllowedTypes::ANY)?);
            if self.expect_operator(",").is_ok() {
                continue;
            }
            self.expect_operator(")")?;
            break;
        }
        Ok(parameters)
    }
}

//! Expression parsing.
//!
//! Binary expressions are built left-leaning and re-associated on every new
//! operator: the incoming operator walks the rightmost spine of the tree and
//! splices in at the deepest node whose operator binds strictly looser,
//! stopping at parenthesized subtrees. This keeps the parse single-pass
//! while honoring the precedence table.

use slate_foundation::span::{Position, Positioned};
use slate_lexer::{AnalyzedKind, Token, TokenKind};

use crate::ast::{
    AnyCall, Argument, ArgumentExpression, ArgumentListExpression, BinaryOperatorCall,
    CharLiteral, Dereference, Expression, FieldAccess, FloatLiteral, GetReference,
    IdentifierExpression, IndexCall, IntegerBase, IntegerLiteral, Lambda, LambdaBody,
    ListExpression, Literal, ManagedTypeCast, NewInstance, Reinterpret, StringLiteral,
    TypeInstance, TypeInstanceSimple, UnaryOperatorCall,
};

use super::{
    keyword::{self, binary_precedence},
    types::AllowedTypes,
    ParseError, Parser,
};

/// Argument modifiers: a subset of the modifier keywords makes sense on call
/// arguments.
const ARGUMENT_MODIFIERS: &[&str] = &["ref", "temp"];

impl<'a> Parser<'a> {
    /// Parses a full expression, including binary operators.
    pub(crate) fn parse_expression_value(&mut self) -> Result<Expression, ParseError> {
        let mut left = self.parse_prefixed_value()?;
        loop {
            self.guard()?;
            let operator = match self.peek() {
                Some(token)
                    if token.kind == TokenKind::Operator
                        && binary_precedence(&token.content).is_some() =>
                {
                    self.advance().ok_or(self.parse_error())?
                }
                _ => break,
            };
            let right = match self.try_parse(Self::parse_prefixed_value) {
                Ok(right) => right,
                Err(_) => {
                    let position = self.missing_position();
                    self.error(
                        format!("expected a value after `{}`", operator.content),
                        position,
                    );
                    self.missing_expression()
                }
            };
            left = self.insert_binary(left, operator, right);
        }
        Ok(left)
    }

    /// Splices `operator`/`right` into the rightmost spine of `left`. The
    /// insertion point is the deepest rightmost subtree whose operator binds
    /// strictly looser than the incoming one and is not parenthesized.
    fn insert_binary(&self, left: Expression, operator: Token, right: Expression) -> Expression {
        if let Expression::Binary(binary) = left {
            let looser = binary_precedence(&binary.operator.content)
                < binary_precedence(&operator.content);
            if looser && !binary.parenthesized {
                let BinaryOperatorCall {
                    operator: spine_operator,
                    left: spine_left,
                    right: spine_right,
                    parenthesized,
                    reference,
                    compiled_type,
                    ..
                } = binary;
                let new_right = self.insert_binary(*spine_right, operator, right);
                let position = spine_left.position().union(&new_right.position());
                return Expression::Binary(BinaryOperatorCall {
                    operator: spine_operator,
                    left: spine_left,
                    right: Box::new(new_right),
                    parenthesized,
                    reference,
                    compiled_type,
                    location: self.location(position),
                });
            }
            return self.new_binary(Expression::Binary(binary), operator, right);
        }
        self.new_binary(left, operator, right)
    }

    fn new_binary(&self, left: Expression, operator: Token, right: Expression) -> Expression {
        let position = left.position().union(&right.position());
        Expression::Binary(BinaryOperatorCall {
            operator,
            left: Box::new(left),
            right: Box::new(right),
            parenthesized: false,
            reference: None,
            compiled_type: None,
            location: self.location(position),
        })
    }

    /// A value with optional unary prefix operators (`!`, `~`, `-`, `+`),
    /// which bind tighter than any binary operator.
    pub(crate) fn parse_prefixed_value(&mut self) -> Result<Expression, ParseError> {
        self.guard()?;
        if let Some(token) = self.peek() {
            if token.kind == TokenKind::Operator
                && keyword::UNARY_PREFIX_OPERATORS.contains(&token.content.as_str())
            {
                let operator = self.advance().ok_or(self.parse_error())?;
                let operand = self.parse_prefixed_value()?;
                let position = operator.position.union(&operand.position());
                return Ok(Expression::Unary(UnaryOperatorCall {
                    operator,
                    operand: Box::new(operand),
                    reference: None,
                    compiled_type: None,
                    location: self.location(position),
                }));
            }
        }
        self.parse_one_value_chain(true)
    }

    /// A single value followed by its postfix chain: field accesses, index
    /// calls, call argument lists, and (where allowed) `as` reinterprets.
    pub(crate) fn parse_one_value_chain(
        &mut self,
        allow_reinterpret: bool,
    ) -> Result<Expression, ParseError> {
        let mut value = self.parse_one_value()?;
        loop {
            self.guard()?;
            if self.expect_operator(".").is_ok() {
                let field = match self.expect_identifier() {
                    Ok(field) => {
                        self.tag_previous(AnalyzedKind::FieldName);
                        field
                    }
                    Err(_) => {
                        let position = self.missing_position();
                        self.error("expected a field name after `.`", position);
                        self.missing_token(TokenKind::Identifier, "")
                    }
                };
                let position = value.position().union(&field.position);
                value = Expression::FieldAccess(FieldAccess {
                    object: Box::new(value),
                    field,
                    compiled_type: None,
                    location: self.location(position),
                });
            } else if self.peek_is_operator("(") {
                let arguments = self.parse_argument_list()?;
                let position = value.position().union(&arguments.location.position);
                value = Expression::AnyCall(AnyCall {
                    callee: Box::new(value),
                    arguments,
                    reference: None,
                    compiled_type: None,
                    location: self.location(position),
                });
            } else if self.peek_is_operator("[") {
                self.advance();
                let index = match self.try_parse(Self::parse_expression_value) {
                    Ok(index) => index,
                    Err(_) => {
                        let position = self.missing_position();
                        self.error("expected an index expression", position);
                        self.missing_expression()
                    }
                };
                self.close_delimiter("]", "to close the index");
                let position = value.position().union(&self.previous_position());
                value = Expression::IndexCall(IndexCall {
                    object: Box::new(value),
                    index: Box::new(index),
                    compiled_type: None,
                    location: self.location(position),
                });
            } else if allow_reinterpret && self.peek_is_identifier_with("as") {
                self.advance();
                self.tag_previous(AnalyzedKind::Keyword);
                let target_type = match self.try_parse(|p| p.parse_type(AllowedTypes::ANY)) {
                    Ok(target_type) => target_type,
                    Err(_) => {
                        let position = self.missing_position();
                        self.error("expected a type after `as`", position);
                        self.missing_type()
                    }
                };
                let position = value.position().union(&target_type.position());
                value = Expression::Reinterpret(Reinterpret {
                    value: Box::new(value),
                    target_type,
                    compiled_type: None,
                    location: self.location(position),
                });
            } else {
                break;
            }
        }
        Ok(value)
    }

    /// The atoms of the expression grammar.
    fn parse_one_value(&mut self) -> Result<Expression, ParseError> {
        self.guard()?;
        let Some(token) = self.peek() else {
            return Err(self.parse_error());
        };
        let (kind, content) = (token.kind, token.content.clone());

        match (kind, content.as_str()) {
            (TokenKind::Operator, "&") => {
                let ampersand = self.advance().ok_or(self.parse_error())?;
                let operand = self.parse_one_value()?;
                let position = ampersand.position.union(&operand.position());
                Ok(Expression::GetReference(GetReference {
                    operand: Box::new(operand),
                    compiled_type: None,
                    location: self.location(position),
                }))
            }
            (TokenKind::Operator, "*") => {
                let star = self.advance().ok_or(self.parse_error())?;
                let operand = self.parse_one_value()?;
                let position = star.position.union(&operand.position());
                Ok(Expression::Dereference(Dereference {
                    operand: Box::new(operand),
                    compiled_type: None,
                    location: self.location(position),
                }))
            }
            (TokenKind::Operator, "[") => self.parse_list_expression(),
            (TokenKind::Operator, "(") => self.parse_parenthesized(),
            (TokenKind::Identifier, "new") => self.parse_new_instance(),
            (TokenKind::Identifier, name) => {
                if keyword::is_reserved(name) && name != "this" {
                    return Err(self.parse_error());
                }
                let token = self.advance().ok_or(self.parse_error())?;
                // The semantic phase refines this tag (field, function, ...)
                // once names resolve.
                self.tag_previous(if token.content == "this" {
                    AnalyzedKind::Keyword
                } else {
                    AnalyzedKind::VariableName
                });
                let position = token.position;
                Ok(Expression::Identifier(IdentifierExpression {
                    token,
                    reference: None,
                    compiled_type: None,
                    location: self.location(position),
                }))
            }
            (kind, _) if kind.is_literal() => {
                let token = self.advance().ok_or(self.parse_error())?;
                Ok(Expression::Literal(self.convert_literal(token)))
            }
            _ => Err(self.parse_error()),
        }
    }

    /// `(` can open a lambda parameter list, a type cast, or a grouped
    /// expression; tried in that order with backtracking.
    fn parse_parenthesized(&mut self) -> Result<Expression, ParseError> {
        if let Ok(lambda) = self.try_parse(Self::parse_lambda) {
            return Ok(lambda);
        }
        if let Ok(cast) = self.try_parse(Self::parse_type_cast) {
            return Ok(cast);
        }

        let open = self.expect_operator("(")?;
        let inner = self.parse_expression_value()?;
        self.close_delimiter(")", "to close the grouped expression");
        let close_position = self.previous_position();
        Ok(match inner {
            Expression::Binary(mut binary) => {
                binary.parenthesized = true;
                binary.location.position = open
                    .position
                    .union(&binary.location.position)
                    .union(&close_position);
                Expression::Binary(binary)
            }
            other => other,
        })
    }

    /// `(TYPE) one_value`. Only taken when a value actually follows;
    /// otherwise the caller backtracks to a grouped expression.
    fn parse_type_cast(&mut self) -> Result<Expression, ParseError> {
        let open = self.expect_operator("(")?;
        let target_type = self.parse_type(AllowedTypes::ANY)?;
        self.expect_operator(")")?;
        let value = self.parse_one_value()?;
        let position = open.position.union(&value.position());
        Ok(Expression::ManagedTypeCast(ManagedTypeCast {
            target_type,
            value: Box::new(value),
            compiled_type: None,
            location: self.location(position),
        }))
    }

    /// `(params) => block-or-expression`.
    fn parse_lambda(&mut self) -> Result<Expression, ParseError> {
        let parameters = self.parse_parameters(&["ref", "temp", "const"], false, false)?;
        let arrow = self.expect_operator("=>")?;
        let body = if self.peek_is_operator("{") {
            match self.try_parse(Self::parse_block) {
                Ok(block) => LambdaBody::Block(block),
                Err(_) => LambdaBody::Missing(self.missing_node()),
            }
        } else {
            match self.try_parse(Self::parse_expression_value) {
                Ok(expression) => LambdaBody::Expression(Box::new(expression)),
                Err(_) => {
                    let position = self.missing_position();
                    self.error("expected a lambda body after `=>`", position);
                    LambdaBody::Missing(self.missing_node())
                }
            }
        };
        let body_position = match &body {
            LambdaBody::Block(block) => block.location.position,
            LambdaBody::Expression(expression) => expression.position(),
            LambdaBody::Missing(_) => arrow.position,
        };
        let position = parameters.location.position.union(&body_position);
        Ok(Expression::Lambda(Lambda {
            parameters,
            body,
            compiled_type: None,
            location: self.location(position),
        }))
    }

    /// `new T` or `new T(args)`.
    fn parse_new_instance(&mut self) -> Result<Expression, ParseError> {
        let keyword = self.expect_identifier_with("new")?;
        self.tag_previous(AnalyzedKind::Keyword);
        // Function pointer types would swallow the argument list; lengthless
        // stack arrays cannot be allocated.
        let instance_type = match self.try_parse(|p| p.parse_type(AllowedTypes::empty())) {
            Ok(instance_type) => instance_type,
            Err(_) => {
                let position = self.missing_position();
                self.error("expected a type after `new`", position);
                self.missing_type()
            }
        };
        let arguments = if self.peek_is_operator("(") {
            Some(self.parse_argument_list()?)
        } else {
            None
        };
        let mut position = keyword.position.union(&instance_type.position());
        if let Some(arguments) = &arguments {
            position = position.union(&arguments.location.position);
        }
        Ok(Expression::NewInstance(NewInstance {
            keyword,
            instance_type,
            arguments,
            constructor_reference: None,
            allocator_reference: None,
            compiled_type: None,
            location: self.location(position),
        }))
    }

    /// `[a, b, c]`.
    fn parse_list_expression(&mut self) -> Result<Expression, ParseError> {
        let open = self.expect_operator("[")?;
        let mut elements = vec![];
        loop {
            self.guard()?;
            if self.expect_operator("]").is_ok() {
                break;
            }
            elements.push(match self.try_parse(Self::parse_expression_value) {
                Ok(element) => element,
                Err(_) => {
                    let position = self.current_position();
                    self.error("expected a list element", position);
                    return Err(self.parse_error());
                }
            });
            if self.expect_operator(",").is_ok() {
                continue;
            }
            if self.expect_operator("]").is_ok() {
                break;
            }
            let position = self.missing_position();
            self.error("expected `,` or `]` in the list", position);
            return Err(self.parse_error());
        }
        let position = open.position.union(&self.previous_position());
        Ok(Expression::List(ListExpression {
            elements,
            compiled_type: None,
            location: self.location(position),
        }))
    }

    /// `'(' (arg (',' arg)*)? ')'` where `arg ::= modifier* expression`.
    pub(crate) fn parse_argument_list(&mut self) -> Result<ArgumentListExpression, ParseError> {
        let open = self.expect_operator("(")?;
        let mut arguments = vec![];
        loop {
            self.guard()?;
            if self.expect_operator(")").is_ok() {
                break;
            }
            if self.at_end() {
                let position = self.missing_position();
                self.error("expected `)` to close the argument list", position);
                break;
            }
            match self.try_parse(Self::parse_argument) {
                Ok(argument) => arguments.push(argument),
                Err(_) => {
                    let position = self.current_position();
                    self.error("expected an argument", position);
                    let missing = self.missing_node();
                    arguments.push(ArgumentExpression::Missing(missing));
                }
            }
            if self.expect_operator(",").is_ok() {
                continue;
            }
            if self.expect_operator(")").is_ok() {
                break;
            }
            let position = self.missing_position();
            self.error("expected `,` or `)` in the argument list", position);
            return Err(self.parse_error());
        }
        let position = open.position.union(&self.previous_position());
        Ok(ArgumentListExpression {
            arguments,
            location: self.location(position),
        })
    }

    fn parse_argument(&mut self) -> Result<ArgumentExpression, ParseError> {
        let mut modifiers = vec![];
        while let Some(token) = self.peek() {
            if token.kind == TokenKind::Identifier
                && ARGUMENT_MODIFIERS.contains(&token.content.as_str())
            {
                if let Some(modifier) = self.advance() {
                    self.tag_previous(AnalyzedKind::Keyword);
                    modifiers.push(modifier);
                }
            } else {
                break;
            }
        }

        if !modifiers.is_empty() && (self.peek_is_operator(",") || self.peek_is_operator(")")) {
            // The modifier stands alone.
            let position = self.missing_position();
            self.warning("modifier is not followed by a value (is this ok?)", position);
            let value = self.missing_expression();
            let position = modifiers
                .first()
                .map(|m| m.position)
                .unwrap_or(Position::Unknown);
            return Ok(ArgumentExpression::Argument(Argument {
                modifiers,
                value,
                location: self.location(position),
            }));
        }

        let value = self.parse_expression_value()?;
        let mut position = value.position();
        if let Some(first) = modifiers.first() {
            position = first.position.union(&position);
        }
        Ok(ArgumentExpression::Argument(Argument {
            modifiers,
            value,
            location: self.location(position),
        }))
    }

    /// Consumes the closing delimiter or synthesizes it with a diagnostic.
    pub(crate) fn close_delimiter(&mut self, content: &str, what: &str) -> Token {
        match self.expect_operator(content) {
            Ok(token) => token,
            Err(_) => {
                let position = self.missing_position();
                self.error(format!("expected `{content}` {what}"), position);
                self.missing_token(TokenKind::Operator, content)
            }
        }
    }

    /// Converts a literal token into a typed literal, reporting malformed
    /// escapes and out-of-range values. Hex and binary literals without
    /// digits were already diagnosed by the tokenizer and convert to 0.
    pub(crate) fn convert_literal(&mut self, token: Token) -> Literal {
        let location = self.location(token.position);
        match token.kind {
            TokenKind::LiteralNumber => {
                let digits: String = token.content.chars().filter(|&c| c != '_').collect();
                let value = self.integer_value(&digits, 10, token.position);
                Literal::Integer(IntegerLiteral {
                    value,
                    base: IntegerBase::Decimal,
                    token,
                    compiled_type: None,
                    location,
                })
            }
            TokenKind::LiteralHex | TokenKind::LiteralBinary => {
                let (radix, base) = if token.kind == TokenKind::LiteralHex {
                    (16, IntegerBase::Hex)
                } else {
                    (2, IntegerBase::Binary)
                };
                let digits: String = token
                    .content
                    .chars()
                    .skip(2)
                    .filter(|&c| c != '_')
                    .collect();
                let value = self.integer_value(&digits, radix, token.position);
                Literal::Integer(IntegerLiteral {
                    value,
                    base,
                    token,
                    compiled_type: None,
                    location,
                })
            }
            TokenKind::LiteralFloat => {
                let digits: String = token.content.chars().filter(|&c| c != '_').collect();
                let value = digits.parse::<f64>().unwrap_or(0.0);
                Literal::Float(FloatLiteral {
                    value,
                    token,
                    compiled_type: None,
                    location,
                })
            }
            TokenKind::LiteralString => {
                let raw = token.content.trim_matches('"');
                let value = self.unescape(raw, token.position);
                Literal::String(StringLiteral {
                    value,
                    token,
                    compiled_type: None,
                    location,
                })
            }
            TokenKind::LiteralCharacter => {
                let raw = token.content.trim_matches('\'');
                let text = self.unescape(raw, token.position);
                let mut chars = text.chars();
                let value = match (chars.next(), chars.next()) {
                    (Some(value), None) => value,
                    _ => {
                        self.error(
                            "a character literal must contain exactly one character",
                            token.position,
                        );
                        text.chars().next().unwrap_or('\0')
                    }
                };
                Literal::Char(CharLiteral {
                    value,
                    token,
                    compiled_type: None,
                    location,
                })
            }
            _ => {
                self.error("expected a literal", token.position);
                Literal::Missing(self.missing_node())
            }
        }
    }

    fn integer_value(&mut self, digits: &str, radix: u32, position: Position) -> i64 {
        if digits.is_empty() {
            // Underscore-only or empty digit runs are worth zero; the
            // tokenizer has already complained where that was suspicious.
            return 0;
        }
        match i64::from_str_radix(digits, radix) {
            Ok(value) => value,
            Err(_) => {
                self.error("integer literal is too large", position);
                0
            }
        }
    }

    fn unescape(&mut self, raw: &str, position: Position) -> String {
        let mut value = String::with_capacity(raw.len());
        let mut chars = raw.chars();
        while let Some(c) = chars.next() {
            if c != '\\' {
                value.push(c);
                continue;
            }
            match chars.next() {
                Some('n') => value.push('\n'),
                Some('r') => value.push('\r'),
                Some('t') => value.push('\t'),
                Some('0') => value.push('\0'),
                Some('\\') => value.push('\\'),
                Some('"') => value.push('"'),
                Some('\'') => value.push('\''),
                Some(other) => {
                    self.error(format!("unknown escape sequence \\{other}"), position);
                    value.push(other);
                }
                None => {
                    self.error("incomplete escape sequence", position);
                }
            }
        }
        value
    }

    /// A `var` declaration carries the keyword as its type instance.
    pub(crate) fn var_type_instance(&mut self, keyword: Token) -> TypeInstance {
        let position = keyword.position;
        TypeInstance::Simple(TypeInstanceSimple {
            identifier: keyword,
            generic_arguments: vec![],
            location: self.location(position),
        })
    }
}

#[cfg(test)]
mod tests {
    use slate_foundation::errors::DiagnosticsCollection;
    use slate_foundation::span::SourceUri;
    use slate_lexer::{tokenize, Definitions};

    use crate::ast::{Expression, IntegerBase, Literal};
    use crate::parsing::Parser;

    fn parse_expr(source: &str) -> (Expression, DiagnosticsCollection) {
        let file = SourceUri::from("test.slt");
        let mut diagnostics = DiagnosticsCollection::new();
        let tokens = tokenize(source, &file, &mut diagnostics, Definitions::new());
        let mut parser = Parser::new(&tokens, file, &mut diagnostics);
        let expression = parser
            .parse_expression_value()
            .unwrap_or_else(|_| panic!("expression must parse: {source}"));
        (expression, diagnostics)
    }

    fn operator_of(expression: &Expression) -> &str {
        match expression {
            Expression::Binary(binary) => &binary.operator.content,
            _ => panic!("expected a binary expression"),
        }
    }

    fn binary_parts(expression: &Expression) -> (&Expression, &Expression) {
        match expression {
            Expression::Binary(binary) => (&binary.left, &binary.right),
            _ => panic!("expected a binary expression"),
        }
    }

    fn integer_value(expression: &Expression) -> i64 {
        match expression {
            Expression::Literal(Literal::Integer(literal)) => literal.value,
            _ => panic!("expected an integer literal"),
        }
    }

    #[test]
    fn precedence_reassociates_the_right_spine() {
        // 1 + 2 * 3 must parse as 1 + (2 * 3).
        let (expression, diagnostics) = parse_expr("1 + 2 * 3");
        assert!(diagnostics.is_empty());
        assert_eq!(operator_of(&expression), "+");
        let (left, right) = binary_parts(&expression);
        assert_eq!(integer_value(left), 1);
        assert_eq!(operator_of(right), "*");
        let (two, three) = binary_parts(right);
        assert_eq!(integer_value(two), 2);
        assert_eq!(integer_value(three), 3);
    }

    #[test]
    fn equal_precedence_associates_left() {
        // 1 - 2 + 3 must parse as (1 - 2) + 3.
        let (expression, _) = parse_expr("1 - 2 + 3");
        assert_eq!(operator_of(&expression), "+");
        let (left, right) = binary_parts(&expression);
        assert_eq!(operator_of(left), "-");
        assert_eq!(integer_value(right), 3);
    }

    #[test]
    fn parentheses_stop_reassociation() {
        // (1 + 2) * 3 must keep the parenthesized group intact.
        let (expression, _) = parse_expr("(1 + 2) * 3");
        assert_eq!(operator_of(&expression), "*");
        let (left, right) = binary_parts(&expression);
        assert_eq!(operator_of(left), "+");
        assert_eq!(integer_value(right), 3);
    }

    #[test]
    fn relational_binds_looser_than_bitwise() {
        let (expression, _) = parse_expr("a & b == c");
        assert_eq!(operator_of(&expression), "==");
        let (left, _) = binary_parts(&expression);
        assert_eq!(operator_of(left), "&");
    }

    #[test]
    fn unary_prefix_binds_tightest() {
        let (expression, _) = parse_expr("-a * b");
        assert_eq!(operator_of(&expression), "*");
        let (left, _) = binary_parts(&expression);
        assert!(matches!(left, Expression::Unary(_)));
    }

    #[test]
    fn call_field_and_index_chain() {
        let (expression, diagnostics) = parse_expr("items[0].update(1, 2)");
        assert!(diagnostics.is_empty());
        let Expression::AnyCall(call) = &expression else {
            panic!("expected a call");
        };
        assert_eq!(call.arguments.arguments.len(), 2);
        let Expression::FieldAccess(access) = call.callee.as_ref() else {
            panic!("expected a field access callee");
        };
        assert_eq!(access.field.content, "update");
        assert!(matches!(access.object.as_ref(), Expression::IndexCall(_)));
    }

    #[test]
    fn literal_conversion_handles_bases_and_underscores() {
        let (expression, _) = parse_expr("0xFF");
        match &expression {
            Expression::Literal(Literal::Integer(literal)) => {
                assert_eq!(literal.value, 255);
                assert_eq!(literal.base, IntegerBase::Hex);
            }
            _ => panic!("expected an integer literal"),
        }

        let (expression, _) = parse_expr("1_000_000");
        assert_eq!(integer_value(&expression), 1_000_000);

        let (expression, diagnostics) = parse_expr("0b1010");
        assert_eq!(integer_value(&expression), 10);
        assert!(diagnostics.is_empty());
    }

    #[test]
    fn string_escapes_convert() {
        let (expression, diagnostics) = parse_expr(r#""a\tb\n""#);
        assert!(diagnostics.is_empty());
        match &expression {
            Expression::Literal(Literal::String(literal)) => {
                assert_eq!(literal.value, "a\tb\n");
            }
            _ => panic!("expected a string literal"),
        }
    }

    #[test]
    fn type_cast_versus_grouping() {
        let (expression, _) = parse_expr("(int)x");
        assert!(matches!(expression, Expression::ManagedTypeCast(_)));

        let (expression, _) = parse_expr("(x)");
        assert!(matches!(expression, Expression::Identifier(_)));
    }

    #[test]
    fn new_with_and_without_arguments() {
        let (expression, _) = parse_expr("new Point(1, 2)");
        let Expression::NewInstance(new) = &expression else {
            panic!("expected a new instance");
        };
        assert!(new.arguments.is_some());

        let (expression, _) = parse_expr("new Point");
        let Expression::NewInstance(new) = &expression else {
            panic!("expected a new instance");
        };
        assert!(new.arguments.is_none());
    }

    #[test]
    fn lambda_with_expression_body() {
        let (expression, diagnostics) = parse_expr("(int a, int b) => a + b");
        assert!(diagnostics.is_empty());
        let Expression::Lambda(lambda) = &expression else {
            panic!("expected a lambda");
        };
        assert_eq!(lambda.parameters.parameters.len(), 2);
        assert!(matches!(lambda.body, crate::ast::LambdaBody::Expression(_)));
    }

    #[test]
    fn reference_and_dereference() {
        let (expression, _) = parse_expr("&x");
        assert!(matches!(expression, Expression::GetReference(_)));
        let (expression, _) = parse_expr("*p");
        assert!(matches!(expression, Expression::Dereference(_)));
    }

    #[test]
    fn reinterpret_chains_after_a_value() {
        let (expression, _) = parse_expr("x as int");
        assert!(matches!(expression, Expression::Reinterpret(_)));

        // `as` binds tighter than binary operators.
        let (expression, _) = parse_expr("a + b as int");
        assert_eq!(operator_of(&expression), "+");
        let (_, right) = binary_parts(&expression);
        assert!(matches!(right, Expression::Reinterpret(_)));
    }

    #[test]
    fn argument_modifiers_parse_and_lone_modifier_warns() {
        let (expression, diagnostics) = parse_expr("f(ref x, temp y)");
        assert!(diagnostics.is_empty());
        let Expression::AnyCall(call) = &expression else {
            panic!("expected a call");
        };
        match &call.arguments.arguments[0] {
            crate::ast::ArgumentExpression::Argument(argument) => {
                assert_eq!(argument.modifiers.len(), 1);
                assert_eq!(argument.modifiers[0].content, "ref");
            }
            _ => panic!("expected a present argument"),
        }

        let (_, diagnostics) = parse_expr("f(ref)");
        assert!(diagnostics
            .iter()
            .any(|d| d.message.contains("is this ok?")));
    }

    #[test]
    fn missing_operand_recovers_with_placeholder() {
        let (expression, diagnostics) = parse_expr("1 +");
        assert!(diagnostics.has_errors());
        let (_, right) = binary_parts(&expression);
        assert!(matches!(right, Expression::Missing(_)));
    }

    #[test]
    fn list_expression() {
        let (expression, diagnostics) = parse_expr("[1, 2, 3]");
        assert!(diagnostics.is_empty());
        let Expression::List(list) = &expression else {
            panic!("expected a list expression");
        };
        assert_eq!(list.elements.len(), 3);
    }
}

//! Parsing of top-level items and struct members.

use slate_foundation::span::{Position, Positioned};
use slate_lexer::{AnalyzedKind, Token, TokenKind};

use crate::ast::{
    AliasDefinition, AttributeUsage, ConstructorDefinition, FieldDefinition, FunctionBody,
    FunctionDefinition, GeneralFunctionDefinition, GeneralFunctionKind, Literal,
    ParameterDefinition, ParameterDefinitionCollection, StructDefinition, TemplateInfo,
    TypeInstance, UsingDefinition, UsingPath,
};

use super::{keyword, types::AllowedTypes, ParseError, Parser};

const FUNCTION_MODIFIERS: &[&str] = &["export", "private", "inline"];
const STRUCT_MODIFIERS: &[&str] = &["export", "private"];
const ALIAS_MODIFIERS: &[&str] = &["export", "private"];
const FIELD_MODIFIERS: &[&str] = &["private", "const"];
const CONSTRUCTOR_MODIFIERS: &[&str] = &["export", "inline"];

const FUNCTION_PARAMETER_MODIFIERS: &[&str] = &["ref", "temp", "const", "this"];
const OPERATOR_PARAMETER_MODIFIERS: &[&str] = &["ref", "temp", "const"];

enum StructMember {
    Field(FieldDefinition),
    Method(FunctionDefinition),
    General(GeneralFunctionDefinition),
    Operator(FunctionDefinition),
    Constructor(ConstructorDefinition),
}

impl<'a> Parser<'a> {
    // ------------------------------------------------------------------
    // Shared prefixes
    // ------------------------------------------------------------------

    /// Zero or more `[Name(...)]` attribute usages.
    pub(crate) fn parse_attributes(&mut self) -> Vec<AttributeUsage> {
        let mut attributes = vec![];
        while self.peek_is_operator("[") {
            match self.try_parse(Self::parse_attribute) {
                Ok(attribute) => attributes.push(attribute),
                Err(_) => break,
            }
        }
        attributes
    }

    fn parse_attribute(&mut self) -> Result<AttributeUsage, ParseError> {
        let open = self.expect_operator("[")?;
        let identifier = self.expect_identifier()?;
        self.tag_previous(AnalyzedKind::Attribute);

        let mut parameters = vec![];
        if self.expect_operator("(").is_ok() {
            loop {
                self.guard()?;
                if self.expect_operator(")").is_ok() {
                    break;
                }
                match self.expect_literal() {
                    Ok(token) => {
                        let literal = self.convert_literal(token);
                        parameters.push(literal);
                    }
                    Err(_) => {
                        let position = self.current_position();
                        self.error("expected a literal attribute parameter", position);
                        let missing = self.missing_node();
                        parameters.push(Literal::Missing(missing));
                        if self.at_end() {
                            return Err(self.parse_error());
                        }
                        // Leave separators for the matcher below; skip
                        // anything else.
                        if !self.peek_is_operator(",") && !self.peek_is_operator(")") {
                            self.advance();
                        }
                    }
                }
                if self.expect_operator(",").is_ok() {
                    continue;
                }
                if self.expect_operator(")").is_ok() {
                    break;
                }
                return Err(self.parse_error());
            }
        }

        self.expect_operator("]")?;
        let position = open.position.union(&self.previous_position());
        Ok(AttributeUsage {
            identifier,
            parameters,
            location: self.location(position),
        })
    }

    /// Zero or more modifier/protection keywords. Which of them are actually
    /// legal depends on the construct; [`Parser::check_modifiers`] validates
    /// after the construct is known.
    pub(crate) fn parse_modifiers(&mut self) -> Vec<Token> {
        let mut modifiers = vec![];
        loop {
            let is_modifier = self
                .peek()
                .map(|token| {
                    token.kind == TokenKind::Identifier
                        && (keyword::MODIFIER_KEYWORDS.contains(&token.content.as_str())
                            || keyword::PROTECTION_KEYWORDS.contains(&token.content.as_str()))
                })
                .unwrap_or(false);
            if !is_modifier {
                break;
            }
            if let Some(token) = self.advance() {
                self.tag_previous(AnalyzedKind::Keyword);
                modifiers.push(token);
            }
        }
        modifiers
    }

    /// Reports modifiers that are not permitted in this context. The
    /// modifiers stay on the definition either way.
    pub(crate) fn check_modifiers(&mut self, modifiers: &[Token], allowed: &[&str], what: &str) {
        for modifier in modifiers {
            if !allowed.contains(&modifier.content.as_str()) {
                self.error(
                    format!("the `{}` modifier is not allowed on {what}", modifier.content),
                    modifier.position,
                );
            }
        }
    }

    // ------------------------------------------------------------------
    // Parameters
    // ------------------------------------------------------------------

    /// `'(' (param (',' param)*)? ')'` with context-dependent rules:
    /// `this` only on the first parameter and only where the caller allows
    /// it; default values only where requested, and once one parameter has a
    /// default every following parameter needs one too.
    pub(crate) fn parse_parameters(
        &mut self,
        allowed_modifiers: &[&str],
        allow_this: bool,
        allow_default_values: bool,
    ) -> Result<ParameterDefinitionCollection, ParseError> {
        let open = self.expect_operator("(")?;
        let mut parameters: Vec<ParameterDefinition> = vec![];
        let mut seen_default = false;
        loop {
            self.guard()?;
            if self.expect_operator(")").is_ok() {
                break;
            }
            if self.at_end() {
                let position = self.missing_position();
                self.error("expected a parameter type", position);
                return Err(self.parse_error());
            }

            let modifiers = self.parse_modifiers();
            let parameter_type = match self.try_parse(|p| p.parse_type(AllowedTypes::ANY)) {
                Ok(parameter_type) => parameter_type,
                Err(_) => {
                    let position = self.current_position();
                    self.error("expected a parameter type", position);
                    return Err(self.parse_error());
                }
            };
            let identifier = match self.expect_identifier() {
                Ok(identifier) => {
                    self.tag_previous(AnalyzedKind::ParameterName);
                    identifier
                }
                Err(_) => {
                    let position = self.missing_position();
                    self.error("expected a parameter name", position);
                    return Err(self.parse_error());
                }
            };

            let mut default_value = if self.expect_operator("=").is_ok() {
                match self.try_parse(Self::parse_expression_value) {
                    Ok(value) => Some(value),
                    Err(_) => {
                        let position = self.missing_position();
                        self.error("expected a default value after `=`", position);
                        Some(self.missing_expression())
                    }
                }
            } else {
                None
            };

            self.check_modifiers(&modifiers, allowed_modifiers, "this parameter");
            if let Some(this) = modifiers.iter().find(|m| m.content == "this") {
                let position = this.position;
                if !allow_this {
                    self.error("a `this` parameter is not allowed here", position);
                } else if !parameters.is_empty() {
                    self.error(
                        "the `this` modifier is only valid on the first parameter",
                        position,
                    );
                }
            }
            if let Some(value) = &default_value {
                if !allow_default_values {
                    self.error("a default value is not allowed here", value.position());
                    default_value = None;
                }
            }
            if default_value.is_none() && seen_default {
                self.error(
                    "a parameter without a default value may not follow one with a default value",
                    identifier.position,
                );
            }
            seen_default |= default_value.is_some();

            let mut position = parameter_type.position().union(&identifier.position);
            if let Some(first) = modifiers.first() {
                position = first.position.union(&position);
            }
            if let Some(value) = &default_value {
                position = position.union(&value.position());
            }
            parameters.push(ParameterDefinition {
                modifiers,
                parameter_type,
                identifier,
                default_value,
                location: self.location(position),
            });

            if self.expect_operator(",").is_ok() {
                continue;
            }
            if self.expect_operator(")").is_ok() {
                break;
            }
            let position = self.missing_position();
            self.error("expected `,` or `)` in the parameter list", position);
            return Err(self.parse_error());
        }
        let position = open.position.union(&self.previous_position());
        Ok(ParameterDefinitionCollection {
            parameters,
            location: self.location(position),
        })
    }

    /// `<T, U>` after a name. An empty list is suspicious but legal.
    fn parse_template(&mut self) -> Option<TemplateInfo> {
        if !self.peek_is_operator("<") {
            return None;
        }
        self.try_parse(|p| {
            let open = p.expect_operator("<")?;
            let mut parameters = vec![];
            loop {
                p.guard()?;
                if p.expect_operator(">").is_ok() {
                    break;
                }
                let parameter = p.expect_identifier()?;
                p.tag_previous(AnalyzedKind::Type);
                parameters.push(parameter);
                if p.expect_operator(",").is_ok() {
                    continue;
                }
                p.expect_operator(">")?;
                break;
            }
            if parameters.is_empty() {
                p.warning("empty template", open.position);
            }
            let position = open.position.union(&p.previous_position());
            Ok(TemplateInfo {
                parameters,
                location: p.location(position),
            })
        })
        .ok()
    }

    /// The body of a function-like definition: a block, a `;` for bodyless
    /// declarations, or a placeholder when neither is there.
    fn parse_function_body(&mut self) -> Option<FunctionBody> {
        if self.expect_operator(";").is_ok() {
            return None;
        }
        if self.peek_is_operator("{") {
            return match self.try_parse(Self::parse_block) {
                Ok(block) => Some(FunctionBody::Block(block)),
                Err(_) => Some(FunctionBody::Missing(self.missing_node())),
            };
        }
        let position = self.missing_position();
        self.error("expected a function body or `;`", position);
        Some(FunctionBody::Missing(self.missing_node()))
    }

    // ------------------------------------------------------------------
    // Top-level items
    // ------------------------------------------------------------------

    /// `using "file.slt";` / `using Some.Namespace;`. Recovers internally
    /// once the keyword is seen.
    pub(crate) fn parse_using(&mut self) -> Result<UsingDefinition, ParseError> {
        let keyword = self.expect_identifier_with("using")?;
        self.tag_previous(AnalyzedKind::Keyword);

        let path = if let Some(token) = self.peek() {
            if token.kind == TokenKind::LiteralString {
                let token = self.advance().ok_or(self.parse_error())?;
                UsingPath::File(token)
            } else {
                let mut parts = vec![];
                match self.expect_identifier() {
                    Ok(first) => {
                        self.tag_previous(AnalyzedKind::Namespace);
                        parts.push(first);
                        while self.expect_operator(".").is_ok() {
                            match self.expect_identifier() {
                                Ok(part) => {
                                    self.tag_previous(AnalyzedKind::Namespace);
                                    parts.push(part);
                                }
                                Err(_) => {
                                    let position = self.missing_position();
                                    self.error("expected a namespace segment after `.`", position);
                                    break;
                                }
                            }
                        }
                    }
                    Err(_) => {
                        let position = self.missing_position();
                        self.error("expected a file or namespace after `using`", position);
                    }
                }
                UsingPath::Namespace(parts)
            }
        } else {
            let position = self.missing_position();
            self.error("expected a file or namespace after `using`", position);
            UsingPath::Namespace(vec![])
        };

        if self.expect_operator(";").is_err() {
            let position = self.missing_position();
            self.warning("missing semicolon", position);
        }
        let position = keyword.position.union(&self.previous_position());
        Ok(UsingDefinition {
            keyword,
            path,
            location: self.location(position),
        })
    }

    /// `attr* modifier* type name template? (params) body`.
    pub(crate) fn parse_function(&mut self) -> Result<FunctionDefinition, ParseError> {
        let attributes = self.parse_attributes();
        let modifiers = self.parse_modifiers();
        let return_type = self.parse_type(AllowedTypes::ANY)?;
        let identifier = self.expect_identifier()?;
        self.tag_previous(AnalyzedKind::FunctionName);
        let template = self.parse_template();
        let parameters =
            self.parse_parameters(FUNCTION_PARAMETER_MODIFIERS, true, true)?;

        // Parameters parsed: the signature is committed.
        self.check_modifiers(&modifiers, FUNCTION_MODIFIERS, "a function");
        let body = self.parse_function_body();

        let position = self.item_position(&attributes, &modifiers, return_type.position());
        Ok(FunctionDefinition {
            attributes,
            modifiers,
            return_type,
            identifier,
            template,
            parameters,
            body,
            location: self.location(position),
        })
    }

    /// `attr* modifier* type OP (params) body` where `OP` is an overloadable
    /// operator or the call operator `()`.
    pub(crate) fn parse_operator(&mut self) -> Result<FunctionDefinition, ParseError> {
        let attributes = self.parse_attributes();
        let modifiers = self.parse_modifiers();
        let mut return_type = self.parse_type(AllowedTypes::ANY)?;

        let identifier = if let Ok(token) =
            self.expect_operator_in(keyword::OVERLOADABLE_OPERATORS)
        {
            token
        } else if self.peek_is_operator("(")
            && self.peek_at_is_operator(1, ")")
            && self.peek_at_is_operator(2, "(")
        {
            let open = self.advance().ok_or(self.parse_error())?;
            let close = self.advance().ok_or(self.parse_error())?;
            self.spell_operator(&[open, close])
        } else if let TypeInstance::Pointer(pointer) = return_type {
            // `int *(int a, int b)` - the `*` greedily parsed as a pointer
            // type is actually the operator being overloaded.
            if self.peek_is_operator("(") {
                return_type = *pointer.inner;
                pointer.star
            } else {
                return Err(self.parse_error());
            }
        } else {
            return Err(self.parse_error());
        };

        let parameters =
            self.parse_parameters(OPERATOR_PARAMETER_MODIFIERS, false, false)?;
        self.check_modifiers(&modifiers, FUNCTION_MODIFIERS, "an operator");
        let body = self.parse_function_body();

        let position = self.item_position(&attributes, &modifiers, return_type.position());
        Ok(FunctionDefinition {
            attributes,
            modifiers,
            return_type,
            identifier,
            template: None,
            parameters,
            body,
            location: self.location(position),
        })
    }

    /// `attr* modifier* alias Name Type ;`.
    pub(crate) fn parse_alias(&mut self) -> Result<AliasDefinition, ParseError> {
        let attributes = self.parse_attributes();
        let modifiers = self.parse_modifiers();
        let keyword = self.expect_identifier_with("alias")?;
        self.tag_previous(AnalyzedKind::Keyword);

        let identifier = match self.expect_identifier() {
            Ok(identifier) => {
                self.tag_previous(AnalyzedKind::Type);
                identifier
            }
            Err(_) => {
                let position = self.missing_position();
                self.error("expected a name after `alias`", position);
                self.missing_token(TokenKind::Identifier, "")
            }
        };
        let value = match self.try_parse(|p| p.parse_type(AllowedTypes::ANY)) {
            Ok(value) => value,
            Err(_) => {
                let position = self.missing_position();
                self.error("expected the aliased type", position);
                self.missing_type()
            }
        };
        self.check_modifiers(&modifiers, ALIAS_MODIFIERS, "an alias");
        if self.expect_operator(";").is_err() {
            let position = self.missing_position();
            self.warning("missing semicolon", position);
        }

        let position = self.item_position(&attributes, &modifiers, keyword.position)
            .union(&self.previous_position());
        Ok(AliasDefinition {
            attributes,
            modifiers,
            keyword,
            identifier,
            value,
            location: self.location(position),
        })
    }

    /// `attr* modifier* struct Name template? { member* }`.
    pub(crate) fn parse_struct(&mut self) -> Result<StructDefinition, ParseError> {
        let attributes = self.parse_attributes();
        let modifiers = self.parse_modifiers();
        let keyword = self.expect_identifier_with("struct")?;
        self.tag_previous(AnalyzedKind::Keyword);
        let name = match self.expect_identifier() {
            Ok(name) => {
                self.tag_previous(AnalyzedKind::Struct);
                name
            }
            Err(_) => {
                let position = self.missing_position();
                self.error("expected a struct name", position);
                self.missing_token(TokenKind::Identifier, "")
            }
        };
        let template = self.parse_template();
        self.check_modifiers(&modifiers, STRUCT_MODIFIERS, "a struct");

        let has_body = self.expect_operator("{").is_ok();
        if !has_body {
            let position = self.missing_position();
            self.error("expected `{` to open the struct body", position);
        }

        let mut definition = StructDefinition {
            attributes,
            modifiers,
            keyword: keyword.clone(),
            name,
            template,
            fields: vec![],
            methods: vec![],
            general_methods: vec![],
            operators: vec![],
            constructors: vec![],
            location: self.location(keyword.position),
        };

        if !has_body {
            // Do not eat unrelated items looking for a `}` that was never
            // opened.
            definition.location = self.location(
                self.item_position(&definition.attributes, &definition.modifiers, keyword.position),
            );
            return Ok(definition);
        }

        let mut stalled = false;
        let close = loop {
            self.guard()?;
            if let Ok(close) = self.expect_operator("}") {
                break close;
            }
            match self.try_parse(Self::parse_struct_member) {
                Ok(member) => {
                    stalled = false;
                    match member {
                        StructMember::Field(field) => definition.fields.push(field),
                        StructMember::Method(method) => definition.methods.push(method),
                        StructMember::General(general) => {
                            definition.general_methods.push(general)
                        }
                        StructMember::Operator(operator) => definition.operators.push(operator),
                        StructMember::Constructor(constructor) => {
                            definition.constructors.push(constructor)
                        }
                    }
                }
                Err(_) => {
                    if !stalled {
                        let position = self.current_position();
                        self.error("expected a struct member", position);
                        stalled = true;
                    }
                    if self.at_end() {
                        break self.missing_token(TokenKind::Operator, "}");
                    }
                    self.advance();
                }
            }
        };

        let position = self
            .item_position(&definition.attributes, &definition.modifiers, keyword.position)
            .union(&close.position);
        definition.location = self.location(position);
        Ok(definition)
    }

    // ------------------------------------------------------------------
    // Struct members
    // ------------------------------------------------------------------

    fn parse_struct_member(&mut self) -> Result<StructMember, ParseError> {
        self.guard()?;
        let attributes = self.parse_attributes();
        let modifiers = self.parse_modifiers();
        let member_type = self.parse_type(AllowedTypes::ANY)?;

        // `type ~(params)` - destructor.
        if self.peek_is_operator("~") && self.peek_at_is_operator(1, "(") {
            let tilde = self.advance().ok_or(self.parse_error())?;
            return self.finish_general_member(
                attributes,
                modifiers,
                member_type,
                GeneralFunctionKind::Destructor,
                tilde,
            );
        }

        // `type [](params)` / `type []=(params)` - indexer getter/setter.
        if self.peek_is_operator("[") && self.peek_at_is_operator(1, "]") {
            let open = self.advance().ok_or(self.parse_error())?;
            let close = self.advance().ok_or(self.parse_error())?;
            let (kind, identifier) = if self.peek_is_operator("=") {
                let assign = self.advance().ok_or(self.parse_error())?;
                (
                    GeneralFunctionKind::IndexerSet,
                    self.spell_operator(&[open, close, assign]),
                )
            } else {
                (
                    GeneralFunctionKind::IndexerGet,
                    self.spell_operator(&[open, close]),
                )
            };
            return self.finish_general_member(attributes, modifiers, member_type, kind, identifier);
        }

        if self.peek_is_operator("(") {
            // `type ()(params)` is the call operator; a bare `type (params)`
            // is a constructor.
            if self.peek_at_is_operator(1, ")") && self.peek_at_is_operator(2, "(") {
                let open = self.advance().ok_or(self.parse_error())?;
                let close = self.advance().ok_or(self.parse_error())?;
                let identifier = self.spell_operator(&[open, close]);
                let parameters =
                    self.parse_parameters(OPERATOR_PARAMETER_MODIFIERS, false, false)?;
                self.check_modifiers(&modifiers, FUNCTION_MODIFIERS, "an operator");
                let body = self.parse_function_body();
                let position =
                    self.item_position(&attributes, &modifiers, member_type.position());
                return Ok(StructMember::Operator(FunctionDefinition {
                    attributes,
                    modifiers,
                    return_type: member_type,
                    identifier,
                    template: None,
                    parameters,
                    body,
                    location: self.location(position),
                }));
            }

            let parameters = self.parse_parameters(OPERATOR_PARAMETER_MODIFIERS, false, true)?;
            self.check_modifiers(&modifiers, CONSTRUCTOR_MODIFIERS, "a constructor");
            let body = self.parse_function_body();
            let position = self.item_position(&attributes, &modifiers, member_type.position());
            return Ok(StructMember::Constructor(ConstructorDefinition {
                attributes,
                modifiers,
                constructed_type: member_type,
                parameters,
                body,
                location: self.location(position),
            }));
        }

        // `type OP(params)` - operator overload member.
        if let Ok(operator) = self.try_parse(|p| {
            let token = p.expect_operator_in(keyword::OVERLOADABLE_OPERATORS)?;
            if !p.peek_is_operator("(") {
                return Err(p.parse_error());
            }
            Ok(token)
        }) {
            let parameters = self.parse_parameters(OPERATOR_PARAMETER_MODIFIERS, false, false)?;
            self.check_modifiers(&modifiers, FUNCTION_MODIFIERS, "an operator");
            let body = self.parse_function_body();
            let position = self.item_position(&attributes, &modifiers, member_type.position());
            return Ok(StructMember::Operator(FunctionDefinition {
                attributes,
                modifiers,
                return_type: member_type,
                identifier: operator,
                template: None,
                parameters,
                body,
                location: self.location(position),
            }));
        }

        let identifier = self.expect_identifier()?;

        if self.peek_is_operator("(") || self.peek_is_operator("<") {
            self.tag_previous(AnalyzedKind::FunctionName);
            let template = self.parse_template();
            let parameters = self.parse_parameters(FUNCTION_PARAMETER_MODIFIERS, true, true)?;
            self.check_modifiers(&modifiers, FUNCTION_MODIFIERS, "a method");
            let body = self.parse_function_body();
            let position = self.item_position(&attributes, &modifiers, member_type.position());
            return Ok(StructMember::Method(FunctionDefinition {
                attributes,
                modifiers,
                return_type: member_type,
                identifier,
                template,
                parameters,
                body,
                location: self.location(position),
            }));
        }

        self.tag_previous(AnalyzedKind::FieldName);
        self.check_modifiers(&modifiers, FIELD_MODIFIERS, "a field");
        if self.expect_operator(";").is_err() {
            let position = self.missing_position();
            self.warning("missing semicolon", position);
        }
        let mut position = self.item_position(&attributes, &modifiers, member_type.position());
        position = position.union(&identifier.position);
        Ok(StructMember::Field(FieldDefinition {
            attributes,
            modifiers,
            field_type: member_type,
            identifier,
            location: self.location(position),
        }))
    }

    fn finish_general_member(
        &mut self,
        attributes: Vec<AttributeUsage>,
        modifiers: Vec<Token>,
        return_type: TypeInstance,
        kind: GeneralFunctionKind,
        identifier: Token,
    ) -> Result<StructMember, ParseError> {
        let parameters = self.parse_parameters(FUNCTION_PARAMETER_MODIFIERS, true, false)?;
        self.check_modifiers(&modifiers, FUNCTION_MODIFIERS, "a general function");
        let body = self.parse_function_body();
        let position = self.item_position(&attributes, &modifiers, return_type.position());
        Ok(StructMember::General(GeneralFunctionDefinition {
            attributes,
            modifiers,
            kind,
            return_type,
            identifier,
            parameters,
            body,
            location: self.location(position),
        }))
    }

    // ------------------------------------------------------------------
    // Small helpers
    // ------------------------------------------------------------------

    /// Joins the given source tokens into one operator token (`[]`, `[]=`,
    /// `()`), spanning all of them.
    fn spell_operator(&self, parts: &[Token]) -> Token {
        let content: String = parts.iter().map(|part| part.content.as_str()).collect();
        let position = parts
            .iter()
            .fold(Position::Unknown, |position, part| {
                position.union(&part.position)
            });
        Token::new(TokenKind::Operator, content, position)
    }

    /// An item's position starts at its first attribute or modifier and ends
    /// wherever parsing of the item stopped.
    fn item_position(
        &self,
        attributes: &[AttributeUsage],
        modifiers: &[Token],
        core: Position,
    ) -> Position {
        let mut position = core;
        if let Some(first) = modifiers.first() {
            position = first.position.union(&position);
        }
        if let Some(first) = attributes.first() {
            position = first.position().union(&position);
        }
        position.union(&self.previous_position())
    }
}

#[cfg(test)]
mod tests {
    use slate_foundation::errors::{DiagnosticsCollection, Severity};
    use slate_foundation::span::SourceUri;
    use slate_lexer::{tokenize, Definitions};

    use crate::ast::{GeneralFunctionKind, UsingPath};
    use crate::parsing::{parse, ParserResult};

    fn parse_source(source: &str) -> (ParserResult, DiagnosticsCollection) {
        let file = SourceUri::from("test.slt");
        let mut diagnostics = DiagnosticsCollection::new();
        let tokens = tokenize(source, &file, &mut diagnostics, Definitions::new());
        let result = parse(tokens, &file, &mut diagnostics);
        (result, diagnostics)
    }

    #[test]
    fn struct_with_fields() {
        let (result, diagnostics) = parse_source("struct Point { int x; int y; }");
        assert!(diagnostics.is_empty(), "{:?}", diagnostics.iter().collect::<Vec<_>>());
        assert_eq!(result.structs.len(), 1);
        let point = &result.structs[0];
        assert_eq!(point.name.content, "Point");
        assert_eq!(point.fields.len(), 2);
        assert_eq!(point.fields[0].identifier.content, "x");
        assert_eq!(point.fields[1].identifier.content, "y");
    }

    #[test]
    fn function_with_body() {
        let (result, diagnostics) = parse_source("int add(int a, int b) { return a + b; }");
        assert!(diagnostics.is_empty());
        assert_eq!(result.functions.len(), 1);
        let add = &result.functions[0];
        assert_eq!(add.identifier.content, "add");
        assert_eq!(add.parameters.parameters.len(), 2);
        assert!(add.body.is_some());
    }

    #[test]
    fn usings_with_both_paths() {
        let (result, diagnostics) =
            parse_source("using \"math.slt\";\nusing Standard.Collections;\nint x;");
        assert!(!diagnostics.has_errors());
        assert_eq!(result.usings.len(), 2);
        assert!(matches!(result.usings[0].path, UsingPath::File(_)));
        assert_eq!(result.usings[0].import_text(), "math.slt");
        assert_eq!(result.usings[1].import_text(), "Standard.Collections");
    }

    #[test]
    fn alias_definition() {
        let (result, diagnostics) = parse_source("alias Bytes u8[16];");
        assert!(!diagnostics.has_errors());
        assert_eq!(result.aliases.len(), 1);
        assert_eq!(result.aliases[0].identifier.content, "Bytes");
    }

    #[test]
    fn operator_definitions_top_level() {
        let (result, diagnostics) =
            parse_source("Point +(Point a, Point b) { return a; }");
        assert!(diagnostics.is_empty(), "{:?}", diagnostics.iter().collect::<Vec<_>>());
        assert_eq!(result.operators.len(), 1);
        assert_eq!(result.operators[0].identifier.content, "+");

        // `*` greedily lexes into the return type and gets peeled back off.
        let (result, diagnostics) = parse_source("int *(int a, int b) { return a; }");
        assert!(diagnostics.is_empty());
        assert_eq!(result.operators.len(), 1);
        assert_eq!(result.operators[0].identifier.content, "*");
        assert!(matches!(
            result.operators[0].return_type,
            crate::ast::TypeInstance::Simple(_)
        ));
    }

    #[test]
    fn struct_members_of_every_kind() {
        let source = r#"
            struct List<T> {
                int length;
                T* items;

                List(int capacity) { }
                int get(this List self, int index) { return index; }
                T [](int index);
                void []=(int index, T value);
                void ~() { }
                List +(List a, List b);
                List ()(int seed);
            }
        "#;
        let (result, diagnostics) = parse_source(source);
        assert!(diagnostics.is_empty(), "{:?}", diagnostics.iter().collect::<Vec<_>>());
        assert_eq!(result.structs.len(), 1);
        let list = &result.structs[0];
        assert_eq!(list.template.as_ref().map(|t| t.parameters.len()), Some(1));
        assert_eq!(list.fields.len(), 2);
        assert_eq!(list.constructors.len(), 1);
        assert_eq!(list.methods.len(), 1);
        assert_eq!(list.general_methods.len(), 3);
        assert_eq!(list.operators.len(), 2);

        let kinds: Vec<_> = list.general_methods.iter().map(|g| g.kind).collect();
        assert_eq!(
            kinds,
            [
                GeneralFunctionKind::IndexerGet,
                GeneralFunctionKind::IndexerSet,
                GeneralFunctionKind::Destructor,
            ]
        );
        assert_eq!(list.operators[1].identifier.content, "()");
    }

    #[test]
    fn attributes_on_definitions() {
        let (result, diagnostics) =
            parse_source("[External(\"malloc\")] void* allocate(int size);");
        assert!(!diagnostics.has_errors());
        assert_eq!(result.functions.len(), 1);
        let function = &result.functions[0];
        assert_eq!(function.attributes.len(), 1);
        assert_eq!(function.attributes[0].identifier.content, "External");
        assert_eq!(function.attributes[0].parameters.len(), 1);
    }

    #[test]
    fn modifier_violations_keep_the_definition() {
        let (result, diagnostics) = parse_source("ref int f() { return 1; }");
        assert_eq!(result.functions.len(), 1);
        assert_eq!(result.functions[0].modifiers.len(), 1);
        assert!(diagnostics
            .iter()
            .any(|d| d.message.contains("`ref` modifier is not allowed")));
    }

    #[test]
    fn this_modifier_only_on_first_parameter() {
        let (_, diagnostics) =
            parse_source("int f(int a, this int b) { return a; }");
        assert!(diagnostics
            .iter()
            .any(|d| d.message.contains("only valid on the first parameter")));
    }

    #[test]
    fn default_value_ordering_is_enforced() {
        let (result, diagnostics) = parse_source("int f(int a = 1, int b) { return b; }");
        assert_eq!(result.functions.len(), 1);
        assert!(diagnostics
            .iter()
            .any(|d| d.message.contains("may not follow")));
    }

    #[test]
    fn empty_template_warns() {
        let (result, diagnostics) = parse_source("struct Empty<> { }");
        assert_eq!(result.structs.len(), 1);
        assert!(diagnostics
            .iter()
            .any(|d| d.severity == Severity::Warning && d.message == "empty template"));
    }

    #[test]
    fn preprocessor_selects_definitions() {
        let source = "#if FEATURE\nint f() {}\n#else\nint g() {}\n#endif\n";

        let file = SourceUri::from("test.slt");
        let mut diagnostics = DiagnosticsCollection::new();
        let tokens = tokenize(
            source,
            &file,
            &mut diagnostics,
            ["FEATURE"].into_iter().collect(),
        );
        let result = parse(tokens, &file, &mut diagnostics);
        assert_eq!(result.functions.len(), 1);
        assert_eq!(result.functions[0].identifier.content, "f");

        let (result, _) = parse_source(source);
        assert_eq!(result.functions.len(), 1);
        assert_eq!(result.functions[0].identifier.content, "g");
    }
}

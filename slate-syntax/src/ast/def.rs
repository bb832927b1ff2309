//! Top-level and struct-member definitions.

use slate_foundation::span::{Location, Position, Positioned};
use slate_lexer::Token;

use super::{
    expr::{Expression, Literal},
    stmt::Block,
    types::TypeInstance,
    IsMissing, MissingNode,
};

/// `using "file.slt";` or `using Some.Namespace;`.
#[derive(Debug, Clone)]
pub struct UsingDefinition {
    pub keyword: Token,
    pub path: UsingPath,
    pub location: Location,
}

#[derive(Debug, Clone)]
pub enum UsingPath {
    /// A string literal naming a source file.
    File(Token),
    /// A dotted namespace path.
    Namespace(Vec<Token>),
}

impl UsingDefinition {
    /// The text handed to source providers when resolving this import.
    pub fn import_text(&self) -> String {
        match &self.path {
            UsingPath::File(token) => token
                .content
                .trim_matches('"')
                .to_owned(),
            UsingPath::Namespace(parts) => {
                let mut text = String::new();
                for (i, part) in parts.iter().enumerate() {
                    if i > 0 {
                        text.push('.');
                    }
                    text.push_str(&part.content);
                }
                text
            }
        }
    }
}

/// `alias Name Type;`.
#[derive(Debug, Clone)]
pub struct AliasDefinition {
    pub attributes: Vec<AttributeUsage>,
    pub modifiers: Vec<Token>,
    pub keyword: Token,
    pub identifier: Token,
    pub value: TypeInstance,
    pub location: Location,
}

#[derive(Debug, Clone)]
pub struct StructDefinition {
    pub attributes: Vec<AttributeUsage>,
    pub modifiers: Vec<Token>,
    pub keyword: Token,
    pub name: Token,
    pub template: Option<TemplateInfo>,
    pub fields: Vec<FieldDefinition>,
    pub methods: Vec<FunctionDefinition>,
    pub general_methods: Vec<GeneralFunctionDefinition>,
    pub operators: Vec<FunctionDefinition>,
    pub constructors: Vec<ConstructorDefinition>,
    pub location: Location,
}

/// A function, method, or operator overload. Operator overloads use the
/// operator token in name position.
#[derive(Debug, Clone)]
pub struct FunctionDefinition {
    pub attributes: Vec<AttributeUsage>,
    pub modifiers: Vec<Token>,
    pub return_type: TypeInstance,
    pub identifier: Token,
    pub template: Option<TemplateInfo>,
    pub parameters: ParameterDefinitionCollection,
    /// `None` when the definition is a bodyless declaration (`;`).
    pub body: Option<FunctionBody>,
    pub location: Location,
}

#[derive(Debug, Clone)]
pub enum FunctionBody {
    Block(Block),
    /// A body was required but could not be parsed.
    Missing(MissingNode),
}

/// Which of the closed set of special member identities a general function
/// has.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GeneralFunctionKind {
    /// `[]` - the indexer getter.
    IndexerGet,
    /// `[]=` - the indexer setter.
    IndexerSet,
    /// `~` - the destructor.
    Destructor,
}

impl GeneralFunctionKind {
    pub fn name(&self) -> &'static str {
        match self {
            GeneralFunctionKind::IndexerGet => "[]",
            GeneralFunctionKind::IndexerSet => "[]=",
            GeneralFunctionKind::Destructor => "~",
        }
    }
}

/// A struct member whose identity is not an ordinary identifier: indexer
/// getter/setter or destructor.
#[derive(Debug, Clone)]
pub struct GeneralFunctionDefinition {
    pub attributes: Vec<AttributeUsage>,
    pub modifiers: Vec<Token>,
    pub kind: GeneralFunctionKind,
    pub return_type: TypeInstance,
    /// The token(s) spelling the identity, joined into one.
    pub identifier: Token,
    pub parameters: ParameterDefinitionCollection,
    pub body: Option<FunctionBody>,
    pub location: Location,
}

/// `TypeName(parameters) { ... }` inside a struct.
#[derive(Debug, Clone)]
pub struct ConstructorDefinition {
    pub attributes: Vec<AttributeUsage>,
    pub modifiers: Vec<Token>,
    pub constructed_type: TypeInstance,
    pub parameters: ParameterDefinitionCollection,
    pub body: Option<FunctionBody>,
    pub location: Location,
}

#[derive(Debug, Clone)]
pub struct FieldDefinition {
    pub attributes: Vec<AttributeUsage>,
    pub modifiers: Vec<Token>,
    pub field_type: TypeInstance,
    pub identifier: Token,
    pub location: Location,
}

#[derive(Debug, Clone)]
pub struct ParameterDefinition {
    pub modifiers: Vec<Token>,
    pub parameter_type: TypeInstance,
    pub identifier: Token,
    pub default_value: Option<Expression>,
    pub location: Location,
}

impl ParameterDefinition {
    pub fn has_modifier(&self, name: &str) -> bool {
        self.modifiers.iter().any(|m| m.content == name)
    }
}

#[derive(Debug, Clone)]
pub struct ParameterDefinitionCollection {
    pub parameters: Vec<ParameterDefinition>,
    pub location: Location,
}

/// `[Name]` or `[Name(literal, ...)]` preceding a definition.
#[derive(Debug, Clone)]
pub struct AttributeUsage {
    pub identifier: Token,
    pub parameters: Vec<Literal>,
    pub location: Location,
}

/// `<T, U>` after a struct or function name.
#[derive(Debug, Clone)]
pub struct TemplateInfo {
    pub parameters: Vec<Token>,
    pub location: Location,
}

impl Positioned for UsingDefinition {
    fn position(&self) -> Position {
        self.location.position
    }
}

impl Positioned for AliasDefinition {
    fn position(&self) -> Position {
        self.location.position
    }
}

impl Positioned for StructDefinition {
    fn position(&self) -> Position {
        self.location.position
    }
}

impl Positioned for FunctionDefinition {
    fn position(&self) -> Position {
        self.location.position
    }
}

impl Positioned for GeneralFunctionDefinition {
    fn position(&self) -> Position {
        self.location.position
    }
}

impl Positioned for ConstructorDefinition {
    fn position(&self) -> Position {
        self.location.position
    }
}

impl Positioned for FieldDefinition {
    fn position(&self) -> Position {
        self.location.position
    }
}

impl Positioned for ParameterDefinition {
    fn position(&self) -> Position {
        self.location.position
    }
}

impl Positioned for ParameterDefinitionCollection {
    fn position(&self) -> Position {
        self.location.position
    }
}

impl Positioned for AttributeUsage {
    fn position(&self) -> Position {
        self.location.position
    }
}

impl IsMissing for FunctionBody {
    fn is_missing(&self) -> bool {
        matches!(self, FunctionBody::Missing(_))
    }
}

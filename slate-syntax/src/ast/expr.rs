//! Value-producing expressions.

use slate_foundation::span::{Location, Position, Positioned};
use slate_lexer::Token;

use super::{
    def::ParameterDefinitionCollection, stmt::Block, types::TypeInstance, CompiledType,
    FunctionReference, IsMissing, MissingNode,
};

#[derive(Debug, Clone)]
pub enum Expression {
    Literal(Literal),
    Identifier(IdentifierExpression),
    FieldAccess(FieldAccess),
    IndexCall(IndexCall),
    AnyCall(AnyCall),
    NewInstance(NewInstance),
    Binary(BinaryOperatorCall),
    Unary(UnaryOperatorCall),
    List(ListExpression),
    Lambda(Lambda),
    GetReference(GetReference),
    Dereference(Dereference),
    ManagedTypeCast(ManagedTypeCast),
    Reinterpret(Reinterpret),
    Missing(MissingNode),
}

/// Which spelling an integer literal used.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IntegerBase {
    Decimal,
    Hex,
    Binary,
}

#[derive(Debug, Clone)]
pub enum Literal {
    Integer(IntegerLiteral),
    Float(FloatLiteral),
    Char(CharLiteral),
    String(StringLiteral),
    /// Stands in where a literal was required but absent, e.g. in attribute
    /// arguments.
    Missing(MissingNode),
}

#[derive(Debug, Clone)]
pub struct IntegerLiteral {
    pub value: i64,
    pub base: IntegerBase,
    pub token: Token,
    pub compiled_type: Option<CompiledType>,
    pub location: Location,
}

#[derive(Debug, Clone)]
pub struct FloatLiteral {
    pub value: f64,
    pub token: Token,
    pub compiled_type: Option<CompiledType>,
    pub location: Location,
}

#[derive(Debug, Clone)]
pub struct CharLiteral {
    pub value: char,
    pub token: Token,
    pub compiled_type: Option<CompiledType>,
    pub location: Location,
}

#[derive(Debug, Clone)]
pub struct StringLiteral {
    pub value: String,
    pub token: Token,
    pub compiled_type: Option<CompiledType>,
    pub location: Location,
}

#[derive(Debug, Clone)]
pub struct IdentifierExpression {
    pub token: Token,
    /// Filled by the semantic phase when the identifier names a function
    /// (function references passed by value).
    pub reference: Option<FunctionReference>,
    pub compiled_type: Option<CompiledType>,
    pub location: Location,
}

/// `object.field`.
#[derive(Debug, Clone)]
pub struct FieldAccess {
    pub object: Box<Expression>,
    pub field: Token,
    pub compiled_type: Option<CompiledType>,
    pub location: Location,
}

/// `object[index]`.
#[derive(Debug, Clone)]
pub struct IndexCall {
    pub object: Box<Expression>,
    pub index: Box<Expression>,
    pub compiled_type: Option<CompiledType>,
    pub location: Location,
}

/// `value(arguments)`. The semantic phase refines this into a direct function
/// call or an indirect call through a function pointer.
#[derive(Debug, Clone)]
pub struct AnyCall {
    pub callee: Box<Expression>,
    pub arguments: ArgumentListExpression,
    pub reference: Option<FunctionReference>,
    pub compiled_type: Option<CompiledType>,
    pub location: Location,
}

/// `new T` or `new T(arguments)`; with arguments this is a constructor call,
/// without it is a bare default instantiation.
#[derive(Debug, Clone)]
pub struct NewInstance {
    pub keyword: Token,
    pub instance_type: TypeInstance,
    pub arguments: Option<ArgumentListExpression>,
    pub constructor_reference: Option<FunctionReference>,
    pub allocator_reference: Option<FunctionReference>,
    pub compiled_type: Option<CompiledType>,
    pub location: Location,
}

#[derive(Debug, Clone)]
pub struct BinaryOperatorCall {
    pub operator: Token,
    pub left: Box<Expression>,
    /// Reassigned while expression parsing re-associates the tree by
    /// precedence; stable afterwards.
    pub right: Box<Expression>,
    /// Trees behind explicit parentheses never re-associate.
    pub parenthesized: bool,
    pub reference: Option<FunctionReference>,
    pub compiled_type: Option<CompiledType>,
    pub location: Location,
}

#[derive(Debug, Clone)]
pub struct UnaryOperatorCall {
    pub operator: Token,
    pub operand: Box<Expression>,
    pub reference: Option<FunctionReference>,
    pub compiled_type: Option<CompiledType>,
    pub location: Location,
}

/// A value in argument position, optionally wrapped in modifiers: `ref x`.
#[derive(Debug, Clone)]
pub enum ArgumentExpression {
    Argument(Argument),
    Missing(MissingNode),
}

#[derive(Debug, Clone)]
pub struct Argument {
    pub modifiers: Vec<Token>,
    pub value: Expression,
    pub location: Location,
}

#[derive(Debug, Clone)]
pub struct ArgumentListExpression {
    pub arguments: Vec<ArgumentExpression>,
    pub location: Location,
}

/// `[a, b, c]`.
#[derive(Debug, Clone)]
pub struct ListExpression {
    pub elements: Vec<Expression>,
    pub compiled_type: Option<CompiledType>,
    pub location: Location,
}

#[derive(Debug, Clone)]
pub struct Lambda {
    pub parameters: ParameterDefinitionCollection,
    pub body: LambdaBody,
    pub compiled_type: Option<CompiledType>,
    pub location: Location,
}

#[derive(Debug, Clone)]
pub enum LambdaBody {
    Block(Block),
    Expression(Box<Expression>),
    Missing(MissingNode),
}

/// `&value`.
#[derive(Debug, Clone)]
pub struct GetReference {
    pub operand: Box<Expression>,
    pub compiled_type: Option<CompiledType>,
    pub location: Location,
}

/// `*pointer`.
#[derive(Debug, Clone)]
pub struct Dereference {
    pub operand: Box<Expression>,
    pub compiled_type: Option<CompiledType>,
    pub location: Location,
}

/// `(T)value` - a checked, conversion-performing cast.
#[derive(Debug, Clone)]
pub struct ManagedTypeCast {
    pub target_type: TypeInstance,
    pub value: Box<Expression>,
    pub compiled_type: Option<CompiledType>,
    pub location: Location,
}

/// `value as T` - a bit-preserving reinterpretation.
#[derive(Debug, Clone)]
pub struct Reinterpret {
    pub value: Box<Expression>,
    pub target_type: TypeInstance,
    pub compiled_type: Option<CompiledType>,
    pub location: Location,
}

impl Expression {
    pub fn location(&self) -> &Location {
        match self {
            Expression::Literal(l) => l.location(),
            Expression::Identifier(e) => &e.location,
            Expression::FieldAccess(e) => &e.location,
            Expression::IndexCall(e) => &e.location,
            Expression::AnyCall(e) => &e.location,
            Expression::NewInstance(e) => &e.location,
            Expression::Binary(e) => &e.location,
            Expression::Unary(e) => &e.location,
            Expression::List(e) => &e.location,
            Expression::Lambda(e) => &e.location,
            Expression::GetReference(e) => &e.location,
            Expression::Dereference(e) => &e.location,
            Expression::ManagedTypeCast(e) => &e.location,
            Expression::Reinterpret(e) => &e.location,
            Expression::Missing(m) => &m.location,
        }
    }

    /// Whether the expression may stand alone as a statement.
    pub fn is_statement_expression(&self) -> bool {
        match self {
            Expression::AnyCall(_) => true,
            Expression::NewInstance(new) => new.arguments.is_some(),
            _ => false,
        }
    }
}

impl Literal {
    pub fn location(&self) -> &Location {
        match self {
            Literal::Integer(l) => &l.location,
            Literal::Float(l) => &l.location,
            Literal::Char(l) => &l.location,
            Literal::String(l) => &l.location,
            Literal::Missing(m) => &m.location,
        }
    }
}

impl ArgumentExpression {
    pub fn location(&self) -> &Location {
        match self {
            ArgumentExpression::Argument(a) => &a.location,
            ArgumentExpression::Missing(m) => &m.location,
        }
    }
}

impl Positioned for Expression {
    fn position(&self) -> Position {
        self.location().position
    }
}

impl Positioned for Literal {
    fn position(&self) -> Position {
        self.location().position
    }
}

impl Positioned for ArgumentExpression {
    fn position(&self) -> Position {
        self.location().position
    }
}

impl IsMissing for Expression {
    fn is_missing(&self) -> bool {
        matches!(self, Expression::Missing(_))
    }
}

impl IsMissing for Literal {
    fn is_missing(&self) -> bool {
        matches!(self, Literal::Missing(_))
    }
}

impl IsMissing for ArgumentExpression {
    fn is_missing(&self) -> bool {
        matches!(self, ArgumentExpression::Missing(_))
    }
}

impl IsMissing for LambdaBody {
    fn is_missing(&self) -> bool {
        matches!(self, LambdaBody::Missing(_))
    }
}

//! Statements - control flow and non-value-producing wrappers.

use slate_foundation::span::{Location, Position, Positioned};
use slate_lexer::Token;

use super::{
    def::AttributeUsage, expr::Expression, types::TypeInstance, FunctionReference, IsMissing,
    MissingNode,
};

#[derive(Debug, Clone)]
pub enum Statement {
    Empty(EmptyStatement),
    Block(Block),
    If(IfStatement),
    While(WhileStatement),
    For(ForStatement),
    Return(KeywordCall),
    Yield(KeywordCall),
    Goto(KeywordCall),
    Break(KeywordCall),
    Crash(KeywordCall),
    Delete(DeleteStatement),
    Label(InstructionLabelDeclaration),
    VariableDefinition(VariableDefinition),
    Assignment(SimpleAssignment),
    CompoundAssignment(CompoundAssignment),
    ShortOperatorCall(ShortOperatorCall),
    Expression(Expression),
    Missing(MissingNode),
}

/// A lone `;`.
#[derive(Debug, Clone)]
pub struct EmptyStatement {
    pub location: Location,
}

#[derive(Debug, Clone)]
pub struct Block {
    pub statements: Vec<Statement>,
    pub location: Location,
}

#[derive(Debug, Clone)]
pub struct IfStatement {
    pub keyword: Token,
    pub condition: Expression,
    pub body: Box<Statement>,
    pub else_branch: Option<Box<Statement>>,
    pub location: Location,
}

#[derive(Debug, Clone)]
pub struct WhileStatement {
    pub keyword: Token,
    pub condition: Expression,
    pub body: Box<Statement>,
    pub location: Location,
}

#[derive(Debug, Clone)]
pub struct ForStatement {
    pub keyword: Token,
    pub initializer: Option<Box<Statement>>,
    pub condition: Option<Expression>,
    pub step: Option<Box<Statement>>,
    pub body: Box<Statement>,
    pub location: Location,
}

/// `return x;`, `yield x;`, `goto label;`, `break;`, `crash "message";` -
/// a statement keyword with an optional value.
#[derive(Debug, Clone)]
pub struct KeywordCall {
    pub keyword: Token,
    pub value: Option<Expression>,
    pub location: Location,
}

/// `delete pointer;`. Carries two reference slots because deleting runs the
/// destructor and then the deallocator, which may or may not alias.
#[derive(Debug, Clone)]
pub struct DeleteStatement {
    pub keyword: Token,
    pub value: Expression,
    pub destructor_reference: Option<FunctionReference>,
    pub deallocator_reference: Option<FunctionReference>,
    pub location: Location,
}

/// `name:` - a jump target for `goto`.
#[derive(Debug, Clone)]
pub struct InstructionLabelDeclaration {
    pub identifier: Token,
    pub location: Location,
}

#[derive(Debug, Clone)]
pub struct VariableDefinition {
    pub attributes: Vec<AttributeUsage>,
    pub modifiers: Vec<Token>,
    /// The declared type; `var` declarations carry the keyword as a simple
    /// type instance.
    pub variable_type: TypeInstance,
    pub identifier: Token,
    pub initial_value: Option<Expression>,
    /// Destructor to run when the variable goes out of scope, if the
    /// semantic phase determines one is needed.
    pub cleanup_reference: Option<FunctionReference>,
    pub location: Location,
}

/// `target = value;`.
#[derive(Debug, Clone)]
pub struct SimpleAssignment {
    pub target: Expression,
    pub operator: Token,
    pub value: Expression,
    pub location: Location,
}

/// `target += value;` and friends.
#[derive(Debug, Clone)]
pub struct CompoundAssignment {
    pub target: Expression,
    pub operator: Token,
    pub value: Expression,
    pub location: Location,
}

/// `target++;` / `target--;`.
#[derive(Debug, Clone)]
pub struct ShortOperatorCall {
    pub target: Expression,
    pub operator: Token,
    pub location: Location,
}

impl Statement {
    pub fn location(&self) -> &Location {
        match self {
            Statement::Empty(s) => &s.location,
            Statement::Block(s) => &s.location,
            Statement::If(s) => &s.location,
            Statement::While(s) => &s.location,
            Statement::For(s) => &s.location,
            Statement::Return(s)
            | Statement::Yield(s)
            | Statement::Goto(s)
            | Statement::Break(s)
            | Statement::Crash(s) => &s.location,
            Statement::Delete(s) => &s.location,
            Statement::Label(s) => &s.location,
            Statement::VariableDefinition(s) => &s.location,
            Statement::Assignment(s) => &s.location,
            Statement::CompoundAssignment(s) => &s.location,
            Statement::ShortOperatorCall(s) => &s.location,
            Statement::Expression(e) => e.location(),
            Statement::Missing(m) => &m.location,
        }
    }

    /// Whether this statement form must be terminated by a semicolon.
    pub fn needs_semicolon(&self) -> bool {
        !matches!(
            self,
            Statement::Empty(_)
                | Statement::Block(_)
                | Statement::If(_)
                | Statement::While(_)
                | Statement::For(_)
                | Statement::Label(_)
                | Statement::Missing(_)
        )
    }
}

impl Positioned for Statement {
    fn position(&self) -> Position {
        self.location().position
    }
}

impl Positioned for Block {
    fn position(&self) -> Position {
        self.location.position
    }
}

impl IsMissing for Statement {
    fn is_missing(&self) -> bool {
        matches!(self, Statement::Missing(_))
    }
}

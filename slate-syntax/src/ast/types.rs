//! Type expressions - types as they appear in type position.

use slate_foundation::span::{Location, Position, Positioned};
use slate_lexer::Token;

use super::{expr::Expression, IsMissing, MissingNode};

#[derive(Debug, Clone)]
pub enum TypeInstance {
    Simple(TypeInstanceSimple),
    Pointer(TypeInstancePointer),
    Function(TypeInstanceFunction),
    StackArray(TypeInstanceStackArray),
    Missing(MissingNode),
}

/// An identifier, optionally with generic arguments: `int`, `List<int>`.
#[derive(Debug, Clone)]
pub struct TypeInstanceSimple {
    pub identifier: Token,
    pub generic_arguments: Vec<TypeInstance>,
    pub location: Location,
}

/// `T*`.
#[derive(Debug, Clone)]
pub struct TypeInstancePointer {
    pub inner: Box<TypeInstance>,
    pub star: Token,
    pub location: Location,
}

/// A function-pointer type: `int(int, int)`, optionally with a closure
/// modifier: `@closure int(int)`.
#[derive(Debug, Clone)]
pub struct TypeInstanceFunction {
    pub return_type: Box<TypeInstance>,
    pub parameters: Vec<TypeInstance>,
    /// The word of the `@word` annotation, when one was attached.
    pub closure_modifier: Option<Token>,
    pub location: Location,
}

/// `T[length]`, or `T[]` where the context allows eliding the length.
#[derive(Debug, Clone)]
pub struct TypeInstanceStackArray {
    pub element: Box<TypeInstance>,
    pub length: Option<Box<Expression>>,
    pub location: Location,
}

impl TypeInstance {
    pub fn location(&self) -> &Location {
        match self {
            TypeInstance::Simple(t) => &t.location,
            TypeInstance::Pointer(t) => &t.location,
            TypeInstance::Function(t) => &t.location,
            TypeInstance::StackArray(t) => &t.location,
            TypeInstance::Missing(m) => &m.location,
        }
    }
}

impl Positioned for TypeInstance {
    fn position(&self) -> Position {
        self.location().position
    }
}

impl IsMissing for TypeInstance {
    fn is_missing(&self) -> bool {
        matches!(self, TypeInstance::Missing(_))
    }
}

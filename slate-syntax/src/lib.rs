//! Syntax analysis for the Slate language: the AST, the recursive-descent
//! parser with recovery, and the statement walker.
//!
//! The parser is deliberately fault-tolerant. Ill-formed input produces
//! positioned diagnostics and `Missing*` placeholder nodes instead of
//! aborting, so embedders (and their editors) always get a tree to work
//! with.

pub mod ast;
pub mod parsing;
pub mod walker;

pub use crate::{
    ast::{CompiledType, FunctionReference, IsMissing, MissingId, MissingNode},
    parsing::{parse, parse_expression, AllowedTypes, ParserResult},
    walker::{walk_statement, walk_statements, walk_statements_with_functions, Node},
};

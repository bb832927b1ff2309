//! Deterministic pre-order traversal over statements.
//!
//! For every node the supplied predicate runs first; returning `false` stops
//! the whole traversal. Children are visited in source order. Each node kind
//! enumerates its children explicitly - there is no reflection and no
//! coroutine machinery, just a driven recursive function.

use crate::ast::{
    ArgumentExpression, Expression, FunctionReference, LambdaBody, ParameterDefinition, Statement,
    TypeInstance,
};

/// A borrowed view of any node the walker can visit.
#[derive(Debug, Clone, Copy)]
pub enum Node<'a> {
    Statement(&'a Statement),
    Expression(&'a Expression),
    Argument(&'a ArgumentExpression),
    TypeInstance(&'a TypeInstance),
    Parameter(&'a ParameterDefinition),
}

/// Walks `statements` in pre-order, visiting every node. Returns `false` if
/// the predicate stopped the traversal.
pub fn walk_statements<'a>(
    statements: &'a [Statement],
    visit: &mut dyn FnMut(Node<'a>) -> bool,
) -> bool {
    let mut walker = Walker {
        visit,
        on_function: None,
    };
    statements.iter().all(|statement| walker.statement(statement))
}

pub fn walk_statement<'a>(
    statement: &'a Statement,
    visit: &mut dyn FnMut(Node<'a>) -> bool,
) -> bool {
    walk_statements(std::slice::from_ref(statement), visit)
}

/// Like [`walk_statements`], and additionally invokes `on_function` for every
/// compiled-function reference a node carries (calls, constructor calls, heap
/// allocations, destructors, operator overloads, variable cleanup).
///
/// A node that holds the same function in two slots - a `delete` whose
/// destructor and deallocator alias - reports it only once.
pub fn walk_statements_with_functions<'a>(
    statements: &'a [Statement],
    visit: &mut dyn FnMut(Node<'a>) -> bool,
    on_function: &mut dyn FnMut(Node<'a>, FunctionReference),
) -> bool {
    let mut walker = Walker {
        visit,
        on_function: Some(on_function),
    };
    statements.iter().all(|statement| walker.statement(statement))
}

struct Walker<'a, 'c> {
    visit: &'c mut dyn FnMut(Node<'a>) -> bool,
    on_function: Option<&'c mut dyn FnMut(Node<'a>, FunctionReference)>,
}

impl<'a, 'c> Walker<'a, 'c> {
    fn report(&mut self, node: Node<'a>, references: &[Option<FunctionReference>]) {
        let Some(on_function) = self.on_function.as_deref_mut() else {
            return;
        };
        let mut seen: Option<FunctionReference> = None;
        for reference in references.iter().flatten() {
            if seen != Some(*reference) {
                on_function(node, *reference);
                seen = Some(*reference);
            }
        }
    }

    fn statement(&mut self, statement: &'a Statement) -> bool {
        let node = Node::Statement(statement);
        if !(self.visit)(node) {
            return false;
        }
        match statement {
            Statement::Empty(_) | Statement::Label(_) | Statement::Missing(_) => true,
            Statement::Block(block) => block.statements.iter().all(|s| self.statement(s)),
            Statement::If(if_statement) => {
                self.expression(&if_statement.condition)
                    && self.statement(&if_statement.body)
                    && if_statement
                        .else_branch
                        .as_deref()
                        .map(|s| self.statement(s))
                        .unwrap_or(true)
            }
            Statement::While(while_statement) => {
                self.expression(&while_statement.condition)
                    && self.statement(&while_statement.body)
            }
            Statement::For(for_statement) => {
                for_statement
                    .initializer
                    .as_deref()
                    .map(|s| self.statement(s))
                    .unwrap_or(true)
                    && for_statement
                        .condition
                        .as_ref()
                        .map(|e| self.expression(e))
                        .unwrap_or(true)
                    && for_statement
                        .step
                        .as_deref()
                        .map(|s| self.statement(s))
                        .unwrap_or(true)
                    && self.statement(&for_statement.body)
            }
            Statement::Return(call)
            | Statement::Yield(call)
            | Statement::Goto(call)
            | Statement::Break(call)
            | Statement::Crash(call) => call
                .value
                .as_ref()
                .map(|e| self.expression(e))
                .unwrap_or(true),
            Statement::Delete(delete) => {
                self.report(
                    node,
                    &[delete.destructor_reference, delete.deallocator_reference],
                );
                self.expression(&delete.value)
            }
            Statement::VariableDefinition(variable) => {
                self.report(node, &[variable.cleanup_reference]);
                self.type_instance(&variable.variable_type)
                    && variable
                        .initial_value
                        .as_ref()
                        .map(|e| self.expression(e))
                        .unwrap_or(true)
            }
            Statement::Assignment(assignment) => {
                self.expression(&assignment.target) && self.expression(&assignment.value)
            }
            Statement::CompoundAssignment(assignment) => {
                self.expression(&assignment.target) && self.expression(&assignment.value)
            }
            Statement::ShortOperatorCall(call) => self.expression(&call.target),
            Statement::Expression(expression) => self.expression(expression),
        }
    }

    fn expression(&mut self, expression: &'a Expression) -> bool {
        let node = Node::Expression(expression);
        if !(self.visit)(node) {
            return false;
        }
        match expression {
            Expression::Literal(_) | Expression::Missing(_) => true,
            Expression::Identifier(identifier) => {
                self.report(node, &[identifier.reference]);
                true
            }
            Expression::FieldAccess(access) => self.expression(&access.object),
            Expression::IndexCall(index) => {
                self.expression(&index.object) && self.expression(&index.index)
            }
            Expression::AnyCall(call) => {
                self.report(node, &[call.reference]);
                self.expression(&call.callee)
                    && call
                        .arguments
                        .arguments
                        .iter()
                        .all(|argument| self.argument(argument))
            }
            Expression::NewInstance(new) => {
                self.report(
                    node,
                    &[new.constructor_reference, new.allocator_reference],
                );
                self.type_instance(&new.instance_type)
                    && new
                        .arguments
                        .as_ref()
                        .map(|list| list.arguments.iter().all(|a| self.argument(a)))
                        .unwrap_or(true)
            }
            Expression::Binary(binary) => {
                self.report(node, &[binary.reference]);
                self.expression(&binary.left) && self.expression(&binary.right)
            }
            Expression::Unary(unary) => {
                self.report(node, &[unary.reference]);
                self.expression(&unary.operand)
            }
            Expression::List(list) => list.elements.iter().all(|e| self.expression(e)),
            Expression::Lambda(lambda) => {
                lambda
                    .parameters
                    .parameters
                    .iter()
                    .all(|parameter| self.parameter(parameter))
                    && match &lambda.body {
                        LambdaBody::Block(block) => {
                            block.statements.iter().all(|s| self.statement(s))
                        }
                        LambdaBody::Expression(expression) => self.expression(expression),
                        LambdaBody::Missing(_) => true,
                    }
            }
            Expression::GetReference(get) => self.expression(&get.operand),
            Expression::Dereference(deref) => self.expression(&deref.operand),
            Expression::ManagedTypeCast(cast) => {
                self.type_instance(&cast.target_type) && self.expression(&cast.value)
            }
            Expression::Reinterpret(reinterpret) => {
                self.expression(&reinterpret.value)
                    && self.type_instance(&reinterpret.target_type)
            }
        }
    }

    fn argument(&mut self, argument: &'a ArgumentExpression) -> bool {
        if !(self.visit)(Node::Argument(argument)) {
            return false;
        }
        match argument {
            ArgumentExpression::Argument(argument) => self.expression(&argument.value),
            ArgumentExpression::Missing(_) => true,
        }
    }

    fn parameter(&mut self, parameter: &'a ParameterDefinition) -> bool {
        if !(self.visit)(Node::Parameter(parameter)) {
            return false;
        }
        self.type_instance(&parameter.parameter_type)
            && parameter
                .default_value
                .as_ref()
                .map(|e| self.expression(e))
                .unwrap_or(true)
    }

    fn type_instance(&mut self, type_instance: &'a TypeInstance) -> bool {
        if !(self.visit)(Node::TypeInstance(type_instance)) {
            return false;
        }
        match type_instance {
            TypeInstance::Simple(simple) => simple
                .generic_arguments
                .iter()
                .all(|argument| self.type_instance(argument)),
            TypeInstance::Pointer(pointer) => self.type_instance(&pointer.inner),
            TypeInstance::Function(function) => {
                self.type_instance(&function.return_type)
                    && function
                        .parameters
                        .iter()
                        .all(|parameter| self.type_instance(parameter))
            }
            TypeInstance::StackArray(array) => {
                self.type_instance(&array.element)
                    && array
                        .length
                        .as_deref()
                        .map(|length| self.expression(length))
                        .unwrap_or(true)
            }
            TypeInstance::Missing(_) => true,
        }
    }
}

//! Canonical text rendering of AST nodes.
//!
//! The output is valid source: re-tokenizing it yields the node's original
//! token sequence, modulo trivia and synthesized placeholders. Fidelity
//! tools and diagnostics use this; it makes no attempt to preserve the
//! original formatting.

use std::fmt::{self, Write};

use super::{
    ArgumentExpression, ArgumentListExpression, AttributeUsage, Block, Expression, FunctionBody,
    LambdaBody, Literal, ParameterDefinition, ParameterDefinitionCollection, Statement,
    TemplateInfo, TypeInstance, UsingPath,
};

impl fmt::Display for TypeInstance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TypeInstance::Simple(simple) => {
                f.write_str(&simple.identifier.content)?;
                if !simple.generic_arguments.is_empty() {
                    f.write_char('<')?;
                    for (i, argument) in simple.generic_arguments.iter().enumerate() {
                        if i > 0 {
                            f.write_str(", ")?;
                        }
                        write!(f, "{argument}")?;
                    }
                    f.write_char('>')?;
                }
                Ok(())
            }
            TypeInstance::Pointer(pointer) => write!(f, "{}*", pointer.inner),
            TypeInstance::Function(function) => {
                if let Some(modifier) = &function.closure_modifier {
                    write!(f, "@{} ", modifier.content)?;
                }
                write!(f, "{}(", function.return_type)?;
                for (i, parameter) in function.parameters.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{parameter}")?;
                }
                f.write_char(')')
            }
            TypeInstance::StackArray(array) => {
                write!(f, "{}[", array.element)?;
                if let Some(length) = &array.length {
                    write!(f, "{length}")?;
                }
                f.write_char(']')
            }
            TypeInstance::Missing(missing) => write!(f, "{missing}"),
        }
    }
}

impl fmt::Display for Literal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Literal::Integer(literal) => f.write_str(&literal.token.content),
            Literal::Float(literal) => f.write_str(&literal.token.content),
            Literal::Char(literal) => f.write_str(&literal.token.content),
            Literal::String(literal) => f.write_str(&literal.token.content),
            Literal::Missing(missing) => write!(f, "{missing}"),
        }
    }
}

impl fmt::Display for Expression {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Expression::Literal(literal) => write!(f, "{literal}"),
            Expression::Identifier(identifier) => f.write_str(&identifier.token.content),
            Expression::FieldAccess(access) => {
                write!(f, "{}.{}", access.object, access.field.content)
            }
            Expression::IndexCall(index) => write!(f, "{}[{}]", index.object, index.index),
            Expression::AnyCall(call) => write!(f, "{}{}", call.callee, call.arguments),
            Expression::NewInstance(new) => {
                write!(f, "new {}", new.instance_type)?;
                if let Some(arguments) = &new.arguments {
                    write!(f, "{arguments}")?;
                }
                Ok(())
            }
            Expression::Binary(binary) => {
                if binary.parenthesized {
                    write!(
                        f,
                        "({} {} {})",
                        binary.left, binary.operator.content, binary.right
                    )
                } else {
                    write!(
                        f,
                        "{} {} {}",
                        binary.left, binary.operator.content, binary.right
                    )
                }
            }
            Expression::Unary(unary) => write!(f, "{}{}", unary.operator.content, unary.operand),
            Expression::List(list) => {
                f.write_char('[')?;
                for (i, element) in list.elements.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{element}")?;
                }
                f.write_char(']')
            }
            Expression::Lambda(lambda) => {
                write!(f, "{} => ", lambda.parameters)?;
                match &lambda.body {
                    LambdaBody::Block(block) => write!(f, "{block}"),
                    LambdaBody::Expression(expression) => write!(f, "{expression}"),
                    LambdaBody::Missing(missing) => write!(f, "{missing}"),
                }
            }
            Expression::GetReference(get) => write!(f, "&{}", get.operand),
            Expression::Dereference(deref) => write!(f, "*{}", deref.operand),
            Expression::ManagedTypeCast(cast) => write!(f, "({}){}", cast.target_type, cast.value),
            Expression::Reinterpret(reinterpret) => {
                write!(f, "{} as {}", reinterpret.value, reinterpret.target_type)
            }
            Expression::Missing(missing) => write!(f, "{missing}"),
        }
    }
}

impl fmt::Display for ArgumentListExpression {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_char('(')?;
        for (i, argument) in self.arguments.iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            write!(f, "{argument}")?;
        }
        f.write_char(')')
    }
}

impl fmt::Display for ArgumentExpression {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ArgumentExpression::Argument(argument) => {
                for modifier in &argument.modifiers {
                    write!(f, "{} ", modifier.content)?;
                }
                write!(f, "{}", argument.value)
            }
            ArgumentExpression::Missing(missing) => write!(f, "{missing}"),
        }
    }
}

impl fmt::Display for ParameterDefinition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for modifier in &self.modifiers {
            write!(f, "{} ", modifier.content)?;
        }
        write!(f, "{} {}", self.parameter_type, self.identifier.content)?;
        if let Some(default) = &self.default_value {
            write!(f, " = {default}")?;
        }
        Ok(())
    }
}

impl fmt::Display for ParameterDefinitionCollection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_char('(')?;
        for (i, parameter) in self.parameters.iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            write!(f, "{parameter}")?;
        }
        f.write_char(')')
    }
}

impl fmt::Display for TemplateInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_char('<')?;
        for (i, parameter) in self.parameters.iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            f.write_str(&parameter.content)?;
        }
        f.write_char('>')
    }
}

impl fmt::Display for AttributeUsage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}", self.identifier.content)?;
        if !self.parameters.is_empty() {
            f.write_char('(')?;
            for (i, parameter) in self.parameters.iter().enumerate() {
                if i > 0 {
                    f.write_str(", ")?;
                }
                write!(f, "{parameter}")?;
            }
            f.write_char(')')?;
        }
        f.write_char(']')
    }
}

impl fmt::Display for Block {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("{ ")?;
        for statement in &self.statements {
            write!(f, "{statement} ")?;
        }
        f.write_char('}')
    }
}

impl fmt::Display for FunctionBody {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FunctionBody::Block(block) => write!(f, "{block}"),
            FunctionBody::Missing(missing) => write!(f, "{missing}"),
        }
    }
}

impl fmt::Display for UsingPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            UsingPath::File(token) => f.write_str(&token.content),
            UsingPath::Namespace(parts) => {
                for (i, part) in parts.iter().enumerate() {
                    if i > 0 {
                        f.write_char('.')?;
                    }
                    f.write_str(&part.content)?;
                }
                Ok(())
            }
        }
    }
}

impl fmt::Display for Statement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Statement::Empty(_) => f.write_char(';'),
            Statement::Block(block) => write!(f, "{block}"),
            Statement::If(if_statement) => {
                write!(f, "if ({}) {}", if_statement.condition, if_statement.body)?;
                if let Some(else_branch) = &if_statement.else_branch {
                    write!(f, " else {else_branch}")?;
                }
                Ok(())
            }
            Statement::While(while_statement) => write!(
                f,
                "while ({}) {}",
                while_statement.condition, while_statement.body
            ),
            Statement::For(for_statement) => {
                f.write_str("for (")?;
                if let Some(initializer) = &for_statement.initializer {
                    write!(f, "{initializer}")?;
                } else {
                    f.write_char(';')?;
                }
                f.write_char(' ')?;
                if let Some(condition) = &for_statement.condition {
                    write!(f, "{condition}")?;
                }
                f.write_str("; ")?;
                if let Some(step) = &for_statement.step {
                    // The step is rendered without its terminator.
                    let step = step.to_string();
                    f.write_str(step.trim_end_matches(';'))?;
                }
                write!(f, ") {}", for_statement.body)
            }
            Statement::Return(call)
            | Statement::Yield(call)
            | Statement::Goto(call)
            | Statement::Break(call)
            | Statement::Crash(call) => {
                f.write_str(&call.keyword.content)?;
                if let Some(value) = &call.value {
                    write!(f, " {value}")?;
                }
                f.write_char(';')
            }
            Statement::Delete(delete) => write!(f, "delete {};", delete.value),
            Statement::Label(label) => write!(f, "{}:", label.identifier.content),
            Statement::VariableDefinition(variable) => {
                for attribute in &variable.attributes {
                    write!(f, "{attribute} ")?;
                }
                for modifier in &variable.modifiers {
                    write!(f, "{} ", modifier.content)?;
                }
                write!(f, "{} {}", variable.variable_type, variable.identifier.content)?;
                if let Some(value) = &variable.initial_value {
                    write!(f, " = {value}")?;
                }
                f.write_char(';')
            }
            Statement::Assignment(assignment) => write!(
                f,
                "{} {} {};",
                assignment.target, assignment.operator.content, assignment.value
            ),
            Statement::CompoundAssignment(assignment) => write!(
                f,
                "{} {} {};",
                assignment.target, assignment.operator.content, assignment.value
            ),
            Statement::ShortOperatorCall(call) => {
                write!(f, "{}{};", call.target, call.operator.content)
            }
            Statement::Expression(expression) => write!(f, "{expression};"),
            Statement::Missing(missing) => write!(f, "{missing}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use slate_foundation::errors::DiagnosticsCollection;
    use slate_foundation::span::SourceUri;
    use slate_lexer::{tokenize, Definitions};

    use crate::parsing::Parser;

    fn render_statement(source: &str) -> String {
        let file = SourceUri::from("test.slt");
        let mut diagnostics = DiagnosticsCollection::new();
        let tokens = tokenize(source, &file, &mut diagnostics, Definitions::new());
        let mut parser = Parser::new(&tokens, file, &mut diagnostics);
        let statement = parser
            .parse_terminated_statement()
            .unwrap_or_else(|_| panic!("statement must parse: {source}"));
        statement.to_string()
    }

    #[test]
    fn statements_render_to_canonical_source() {
        assert_eq!(render_statement("int x=1+2*3;"), "int x = 1 + 2 * 3;");
        assert_eq!(
            render_statement("if(x<2){f( 1 ,2);}"),
            "if (x < 2) { f(1, 2); }"
        );
        assert_eq!(
            render_statement("for(int i=0;i<10;i++) g();"),
            "for (int i = 0; i < 10; i++) g();"
        );
        assert_eq!(
            render_statement("List<Dict<int,int>> m;"),
            "List<Dict<int, int>> m;"
        );
        assert_eq!(render_statement("delete p;"), "delete p;");
        assert_eq!(render_statement("x [ 0 ] += *p;"), "x[0] += *p;");
    }
}

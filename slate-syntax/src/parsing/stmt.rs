//! Statement parsing.

use slate_foundation::span::Positioned;
use slate_lexer::{AnalyzedKind, TokenKind};

use crate::ast::{
    Block, CompoundAssignment, DeleteStatement, EmptyStatement, Expression, ForStatement,
    IdentifierExpression, IfStatement, InstructionLabelDeclaration, KeywordCall, SimpleAssignment,
    ShortOperatorCall, Statement, VariableDefinition, WhileStatement,
};

use super::{keyword, types::AllowedTypes, ParseError, Parser};

/// Modifiers that make sense on a local variable.
const VARIABLE_MODIFIERS: &[&str] = &["const", "temp"];

impl<'a> Parser<'a> {
    /// Parses a statement together with its terminator: statements that are
    /// not blocks, loops, branches or labels must end in `;` (a missing one
    /// is a warning), and a stray `;` after the others is also a warning.
    pub(crate) fn parse_terminated_statement(&mut self) -> Result<Statement, ParseError> {
        let statement = self.parse_statement()?;
        if statement.needs_semicolon() {
            if self.expect_operator(";").is_err() {
                let position = self.missing_position();
                self.warning("missing semicolon", position);
            }
        } else if !matches!(statement, Statement::Empty(_)) {
            if let Ok(extra) = self.expect_operator(";") {
                self.warning("unnecessary semicolon", extra.position);
            }
        }
        Ok(statement)
    }

    /// Parses a bare statement, without terminator handling.
    pub(crate) fn parse_statement(&mut self) -> Result<Statement, ParseError> {
        self.guard()?;

        if let Ok(semicolon) = self.expect_operator(";") {
            self.warning("empty statement", semicolon.position);
            return Ok(Statement::Empty(EmptyStatement {
                location: self.location(semicolon.position),
            }));
        }
        if self.peek_is_operator("{") {
            return Ok(Statement::Block(self.parse_block()?));
        }

        let statement_keyword = self
            .peek()
            .filter(|token| token.kind == TokenKind::Identifier)
            .map(|token| token.content.clone());
        if let Some(statement_keyword) = statement_keyword.as_deref() {
            match statement_keyword {
                "if" => return self.parse_if(),
                "while" => return self.parse_while(),
                "for" => return self.parse_for(),
                "return" => return self.parse_keyword_call(Statement::Return, true),
                "yield" => return self.parse_keyword_call(Statement::Yield, true),
                "crash" => return self.parse_keyword_call(Statement::Crash, true),
                "break" => return self.parse_keyword_call(Statement::Break, false),
                "goto" => return self.parse_goto(),
                "delete" => return self.parse_delete(),
                _ => (),
            }
        }

        // `name:` declares an instruction label.
        if let Some(token) = self.peek() {
            if token.kind == TokenKind::Identifier
                && !keyword::is_reserved(&token.content)
                && self.peek_at_is_operator(1, ":")
            {
                let identifier = self.advance().ok_or(self.parse_error())?;
                let colon = self.advance().ok_or(self.parse_error())?;
                let position = identifier.position.union(&colon.position);
                return Ok(Statement::Label(InstructionLabelDeclaration {
                    identifier,
                    location: self.location(position),
                }));
            }
        }

        if let Ok(variable) = self.try_parse(Self::parse_variable_definition) {
            return Ok(variable);
        }
        self.parse_assignment_or_expression()
    }

    /// `{ statement* }` with stall-based recovery: when something inside
    /// refuses to parse, one diagnostic marks the stall, a missing statement
    /// stands in, and tokens are skipped until parsing can resume. A file
    /// that ends inside the block gets a synthesized `}`.
    pub(crate) fn parse_block(&mut self) -> Result<Block, ParseError> {
        let open = self.expect_operator("{")?;
        let mut statements = vec![];
        let mut stalled = false;
        let close = loop {
            self.guard()?;
            if let Ok(close) = self.expect_operator("}") {
                break close;
            }
            match self.try_parse(Self::parse_terminated_statement) {
                Ok(statement) => {
                    stalled = false;
                    statements.push(statement);
                }
                Err(_) => {
                    if !stalled {
                        let position = self.current_position();
                        self.error("expected a statement", position);
                        statements.push(self.missing_statement());
                        stalled = true;
                    }
                    if self.at_end() {
                        break self.missing_token(TokenKind::Operator, "}");
                    }
                    self.advance();
                }
            }
        };
        let position = open.position.union(&close.position);
        Ok(Block {
            statements,
            location: self.location(position),
        })
    }

    fn parse_if(&mut self) -> Result<Statement, ParseError> {
        let keyword = self.expect_identifier_with("if")?;
        self.tag_previous(AnalyzedKind::Keyword);
        let condition = self.parse_parenthesized_condition("if");
        let body = Box::new(self.parse_terminated_statement()?);
        let else_branch = if self.peek_is_identifier_with("else") {
            self.advance();
            self.tag_previous(AnalyzedKind::Keyword);
            Some(Box::new(self.parse_terminated_statement()?))
        } else {
            None
        };
        let mut position = keyword.position.union(&body.position());
        if let Some(else_branch) = &else_branch {
            position = position.union(&else_branch.position());
        }
        Ok(Statement::If(IfStatement {
            keyword,
            condition,
            body,
            else_branch,
            location: self.location(position),
        }))
    }

    fn parse_while(&mut self) -> Result<Statement, ParseError> {
        let keyword = self.expect_identifier_with("while")?;
        self.tag_previous(AnalyzedKind::Keyword);
        let condition = self.parse_parenthesized_condition("while");
        let body = Box::new(self.parse_terminated_statement()?);
        let position = keyword.position.union(&body.position());
        Ok(Statement::While(WhileStatement {
            keyword,
            condition,
            body,
            location: self.location(position),
        }))
    }

    /// `( expression )` after `if`/`while`, with placeholders for every
    /// missing piece.
    fn parse_parenthesized_condition(&mut self, what: &str) -> Expression {
        if self.expect_operator("(").is_err() {
            let position = self.missing_position();
            self.error(format!("expected `(` after `{what}`"), position);
        }
        let condition = match self.try_parse(Self::parse_expression_value) {
            Ok(condition) => condition,
            Err(_) => {
                let position = self.missing_position();
                self.error(format!("expected a condition in `{what}`"), position);
                self.missing_expression()
            }
        };
        self.close_delimiter(")", "to close the condition");
        condition
    }

    /// `for '(' init? ';' condition? ';' step? ')' body`.
    fn parse_for(&mut self) -> Result<Statement, ParseError> {
        let keyword = self.expect_identifier_with("for")?;
        self.tag_previous(AnalyzedKind::Keyword);
        if self.expect_operator("(").is_err() {
            let position = self.missing_position();
            self.error("expected `(` after `for`", position);
        }

        let initializer = if self.peek_is_operator(";") {
            None
        } else {
            match self.try_parse(Self::parse_simple_statement) {
                Ok(initializer) => Some(Box::new(initializer)),
                Err(_) => {
                    let position = self.current_position();
                    self.error("expected a loop initializer", position);
                    Some(Box::new(self.missing_statement()))
                }
            }
        };
        if self.expect_operator(";").is_err() {
            let position = self.missing_position();
            self.warning("missing semicolon", position);
        }

        let condition = if self.peek_is_operator(";") {
            None
        } else {
            match self.try_parse(Self::parse_expression_value) {
                Ok(condition) => Some(condition),
                Err(_) => {
                    let position = self.current_position();
                    self.error("expected a loop condition", position);
                    Some(self.missing_expression())
                }
            }
        };
        if self.expect_operator(";").is_err() {
            let position = self.missing_position();
            self.warning("missing semicolon", position);
        }

        let step = if self.peek_is_operator(")") {
            None
        } else {
            match self.try_parse(Self::parse_simple_statement) {
                Ok(step) => Some(Box::new(step)),
                Err(_) => {
                    let position = self.current_position();
                    self.error("expected a loop step", position);
                    Some(Box::new(self.missing_statement()))
                }
            }
        };
        self.close_delimiter(")", "to close the `for` header");

        let body = Box::new(self.parse_terminated_statement()?);
        let position = keyword.position.union(&body.position());
        Ok(Statement::For(ForStatement {
            keyword,
            initializer,
            condition,
            step,
            body,
            location: self.location(position),
        }))
    }

    /// The statement forms allowed in a `for` header: a variable definition,
    /// an assignment, or an expression.
    fn parse_simple_statement(&mut self) -> Result<Statement, ParseError> {
        self.guard()?;
        if let Ok(variable) = self.try_parse(Self::parse_variable_definition) {
            return Ok(variable);
        }
        self.parse_assignment_or_expression()
    }

    /// `return`/`yield`/`crash` with an optional value, `break` without one.
    fn parse_keyword_call(
        &mut self,
        build: fn(KeywordCall) -> Statement,
        takes_value: bool,
    ) -> Result<Statement, ParseError> {
        let keyword = self.advance().ok_or(self.parse_error())?;
        self.tag_previous(AnalyzedKind::Keyword);
        let value = match self.try_parse(Self::parse_expression_value) {
            Ok(value) => Some(value),
            Err(_) => None,
        };
        if let (false, Some(value)) = (takes_value, &value) {
            self.error(
                format!("`{}` does not take a value", keyword.content),
                value.position(),
            );
        }
        let mut position = keyword.position;
        if let Some(value) = &value {
            position = position.union(&value.position());
        }
        Ok(build(KeywordCall {
            keyword,
            value,
            location: self.location(position),
        }))
    }

    /// `goto label;`.
    fn parse_goto(&mut self) -> Result<Statement, ParseError> {
        let keyword = self.expect_identifier_with("goto")?;
        self.tag_previous(AnalyzedKind::Keyword);
        let value = match self.expect_identifier() {
            Ok(label) => {
                let position = label.position;
                Some(Expression::Identifier(IdentifierExpression {
                    token: label,
                    reference: None,
                    compiled_type: None,
                    location: self.location(position),
                }))
            }
            Err(_) => {
                let position = self.missing_position();
                self.error("expected a label after `goto`", position);
                Some(self.missing_expression())
            }
        };
        let mut position = keyword.position;
        if let Some(value) = &value {
            position = position.union(&value.position());
        }
        Ok(Statement::Goto(KeywordCall {
            keyword,
            value,
            location: self.location(position),
        }))
    }

    /// `delete value;`.
    fn parse_delete(&mut self) -> Result<Statement, ParseError> {
        let keyword = self.expect_identifier_with("delete")?;
        self.tag_previous(AnalyzedKind::Keyword);
        let value = match self.try_parse(Self::parse_expression_value) {
            Ok(value) => value,
            Err(_) => {
                let position = self.missing_position();
                self.error("expected a value after `delete`", position);
                self.missing_expression()
            }
        };
        let position = keyword.position.union(&value.position());
        Ok(Statement::Delete(DeleteStatement {
            keyword,
            value,
            destructor_reference: None,
            deallocator_reference: None,
            location: self.location(position),
        }))
    }

    /// `modifier* (var | type) name ('=' value)?`.
    fn parse_variable_definition(&mut self) -> Result<Statement, ParseError> {
        let attributes = self.parse_attributes();
        let modifiers = self.parse_modifiers();

        let variable_type = if self.peek_is_identifier_with("var") {
            let keyword = self.advance().ok_or(self.parse_error())?;
            self.tag_previous(AnalyzedKind::Keyword);
            self.var_type_instance(keyword)
        } else {
            self.parse_type(AllowedTypes::ANY)?
        };
        let identifier = self.expect_identifier()?;
        self.tag_previous(AnalyzedKind::VariableName);

        // Committed: from here on everything recovers instead of failing.
        self.check_modifiers(&modifiers, VARIABLE_MODIFIERS, "a variable definition");

        let initial_value = if self.expect_operator("=").is_ok() {
            match self.try_parse(Self::parse_expression_value) {
                Ok(value) => Some(value),
                Err(_) => {
                    let position = self.missing_position();
                    self.error("expected a value after `=`", position);
                    Some(self.missing_expression())
                }
            }
        } else {
            // `type name (` is a signature, not a variable; yield so the
            // function alternatives get to claim it.
            if self.peek_is_operator("(") {
                return Err(self.parse_error());
            }
            None
        };

        let mut position = variable_type.position().union(&identifier.position);
        if let Some(first) = modifiers.first() {
            position = first.position.union(&position);
        }
        if let Some(first) = attributes.first() {
            position = first.position().union(&position);
        }
        if let Some(value) = &initial_value {
            position = position.union(&value.position());
        }
        Ok(Statement::VariableDefinition(VariableDefinition {
            attributes,
            modifiers,
            variable_type,
            identifier,
            initial_value,
            cleanup_reference: None,
            location: self.location(position),
        }))
    }

    /// An expression in statement position, possibly continued into an
    /// assignment, compound assignment, or `++`/`--` short operator call.
    fn parse_assignment_or_expression(&mut self) -> Result<Statement, ParseError> {
        let target = self.parse_expression_value()?;

        if let Ok(operator) = self.expect_operator("=") {
            let value = self.parse_assigned_value();
            let position = target.position().union(&value.position());
            return Ok(Statement::Assignment(SimpleAssignment {
                target,
                operator,
                value,
                location: self.location(position),
            }));
        }
        if let Ok(operator) = self.expect_operator_in(keyword::COMPOUND_ASSIGNMENT_OPERATORS) {
            let value = self.parse_assigned_value();
            let position = target.position().union(&value.position());
            return Ok(Statement::CompoundAssignment(CompoundAssignment {
                target,
                operator,
                value,
                location: self.location(position),
            }));
        }
        if let Ok(operator) = self.expect_operator_in(keyword::INCREMENT_DECREMENT_OPERATORS) {
            let position = target.position().union(&operator.position);
            return Ok(Statement::ShortOperatorCall(ShortOperatorCall {
                target,
                operator,
                location: self.location(position),
            }));
        }

        if !target.is_statement_expression() {
            self.error(
                "this expression cannot be used as a statement",
                target.position(),
            );
        }
        Ok(Statement::Expression(target))
    }

    fn parse_assigned_value(&mut self) -> Expression {
        match self.try_parse(Self::parse_expression_value) {
            Ok(value) => value,
            Err(_) => {
                let position = self.missing_position();
                self.error("expected a value to assign", position);
                self.missing_expression()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use slate_foundation::errors::{DiagnosticsCollection, Severity};
    use slate_foundation::span::SourceUri;
    use slate_lexer::{tokenize, Definitions};

    use crate::ast::{Expression, IsMissing, Literal, Statement};
    use crate::parsing::Parser;

    fn parse_stmt(source: &str) -> (Statement, DiagnosticsCollection) {
        let file = SourceUri::from("test.slt");
        let mut diagnostics = DiagnosticsCollection::new();
        let tokens = tokenize(source, &file, &mut diagnostics, Definitions::new());
        let mut parser = Parser::new(&tokens, file, &mut diagnostics);
        let statement = parser
            .parse_terminated_statement()
            .unwrap_or_else(|_| panic!("statement must parse: {source}"));
        (statement, diagnostics)
    }

    #[test]
    fn variable_definition_with_initializer() {
        let (statement, diagnostics) = parse_stmt("int x = 1 + 2 * 3;");
        assert!(!diagnostics.has_errors());
        let Statement::VariableDefinition(variable) = &statement else {
            panic!("expected a variable definition");
        };
        assert_eq!(variable.identifier.content, "x");
        // Precedence: the initializer is + with a * on the right.
        let Some(Expression::Binary(binary)) = variable.initial_value.as_ref() else {
            panic!("expected a binary initializer");
        };
        assert_eq!(binary.operator.content, "+");
        let Expression::Binary(right) = binary.right.as_ref() else {
            panic!("expected a nested binary");
        };
        assert_eq!(right.operator.content, "*");
    }

    #[test]
    fn var_declaration_keeps_the_keyword_as_type() {
        let (statement, diagnostics) = parse_stmt("var total = 0;");
        assert!(!diagnostics.has_errors());
        let Statement::VariableDefinition(variable) = &statement else {
            panic!("expected a variable definition");
        };
        let crate::ast::TypeInstance::Simple(simple) = &variable.variable_type else {
            panic!("expected a simple type");
        };
        assert_eq!(simple.identifier.content, "var");
    }

    #[test]
    fn assignment_forms() {
        let (statement, _) = parse_stmt("x = 5;");
        assert!(matches!(statement, Statement::Assignment(_)));

        let (statement, _) = parse_stmt("x += 5;");
        assert!(matches!(statement, Statement::CompoundAssignment(_)));

        let (statement, _) = parse_stmt("x++;");
        assert!(matches!(statement, Statement::ShortOperatorCall(_)));

        let (statement, _) = parse_stmt("x[0] = 5;");
        let Statement::Assignment(assignment) = &statement else {
            panic!("expected an assignment");
        };
        assert!(matches!(assignment.target, Expression::IndexCall(_)));
    }

    #[test]
    fn call_statements_pass_other_expressions_complain() {
        let (statement, diagnostics) = parse_stmt("update(1);");
        assert!(!diagnostics.has_errors());
        assert!(matches!(statement, Statement::Expression(_)));

        let (_, diagnostics) = parse_stmt("1 + 2;");
        assert!(diagnostics
            .iter()
            .any(|d| d.message.contains("cannot be used as a statement")));
    }

    #[test]
    fn empty_statement_warns() {
        let (statement, diagnostics) = parse_stmt(";");
        assert!(matches!(statement, Statement::Empty(_)));
        assert!(diagnostics
            .iter()
            .any(|d| d.severity == Severity::Warning && d.message == "empty statement"));
    }

    #[test]
    fn missing_semicolon_warns() {
        let (statement, diagnostics) = parse_stmt("return 1");
        assert!(matches!(statement, Statement::Return(_)));
        assert!(diagnostics
            .iter()
            .any(|d| d.severity == Severity::Warning && d.message == "missing semicolon"));
    }

    #[test]
    fn if_else_chain() {
        let (statement, diagnostics) = parse_stmt("if (x < 2) { f(); } else if (y) g(); else h();");
        assert!(!diagnostics.has_errors());
        let Statement::If(if_statement) = &statement else {
            panic!("expected an if");
        };
        let Some(else_branch) = &if_statement.else_branch else {
            panic!("expected an else branch");
        };
        assert!(matches!(else_branch.as_ref(), Statement::If(_)));
    }

    #[test]
    fn while_and_for_loops() {
        let (statement, diagnostics) = parse_stmt("while (running) step();");
        assert!(!diagnostics.has_errors());
        assert!(matches!(statement, Statement::While(_)));

        let (statement, diagnostics) = parse_stmt("for (int i = 0; i < 10; i++) { use(i); }");
        assert!(!diagnostics.has_errors());
        let Statement::For(for_statement) = &statement else {
            panic!("expected a for");
        };
        assert!(for_statement.initializer.is_some());
        assert!(for_statement.condition.is_some());
        assert!(for_statement.step.is_some());
    }

    #[test]
    fn for_allows_empty_components() {
        let (statement, diagnostics) = parse_stmt("for (;;) { }");
        assert!(!diagnostics.has_errors());
        let Statement::For(for_statement) = &statement else {
            panic!("expected a for");
        };
        assert!(for_statement.initializer.is_none());
        assert!(for_statement.condition.is_none());
        assert!(for_statement.step.is_none());
    }

    #[test]
    fn keyword_calls() {
        let (statement, _) = parse_stmt("return;");
        let Statement::Return(call) = &statement else {
            panic!("expected a return");
        };
        assert!(call.value.is_none());

        let (statement, _) = parse_stmt("yield x;");
        assert!(matches!(statement, Statement::Yield(_)));

        let (statement, _) = parse_stmt("goto done;");
        assert!(matches!(statement, Statement::Goto(_)));

        let (statement, _) = parse_stmt("crash \"unreachable\";");
        let Statement::Crash(call) = &statement else {
            panic!("expected a crash");
        };
        assert!(matches!(
            call.value,
            Some(Expression::Literal(Literal::String(_)))
        ));

        let (statement, _) = parse_stmt("delete p;");
        assert!(matches!(statement, Statement::Delete(_)));

        let (_, diagnostics) = parse_stmt("break 1;");
        assert!(diagnostics
            .iter()
            .any(|d| d.message.contains("does not take a value")));
    }

    #[test]
    fn label_declaration() {
        let (statement, diagnostics) = parse_stmt("again:");
        assert!(!diagnostics.has_errors());
        let Statement::Label(label) = &statement else {
            panic!("expected a label");
        };
        assert_eq!(label.identifier.content, "again");
    }

    #[test]
    fn unclosed_block_recovers_with_placeholders() {
        let (statement, diagnostics) = parse_stmt("{ f(); @");
        let Statement::Block(block) = &statement else {
            panic!("expected a block");
        };
        // One real statement, one missing placeholder for the garbage.
        assert_eq!(block.statements.len(), 2);
        assert!(block.statements[1].is_missing());
        let errors: Vec<_> = diagnostics
            .iter()
            .filter(|d| d.severity == Severity::Error)
            .collect();
        assert_eq!(errors.len(), 1, "exactly one stall diagnostic: {errors:?}");
        assert!(errors[0].message.contains("expected a statement"));
    }
}

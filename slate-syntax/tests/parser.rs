//! End-to-end parses of whole source files, plus the structural invariants
//! the tree is supposed to uphold.

use indoc::indoc;
use slate_foundation::{
    errors::{DiagnosticsCollection, Severity},
    span::{Positioned, SourceUri},
};
use slate_lexer::{tokenize, Definitions, TokenKind};
use slate_syntax::{
    ast::{Expression, Literal, Statement},
    parse, parse_expression, walk_statements, IsMissing, Node, ParserResult,
};

fn parse_source(source: &str) -> (ParserResult, DiagnosticsCollection) {
    parse_with(source, Definitions::new())
}

fn parse_with(source: &str, definitions: Definitions) -> (ParserResult, DiagnosticsCollection) {
    let file = SourceUri::from("test.slt");
    let mut diagnostics = DiagnosticsCollection::new();
    let tokens = tokenize(source, &file, &mut diagnostics, definitions);
    let result = parse(tokens, &file, &mut diagnostics);
    (result, diagnostics)
}

#[test]
fn struct_with_two_fields() {
    let (result, diagnostics) = parse_source("struct Point { int x; int y; }");
    assert!(diagnostics.is_empty());
    assert_eq!(result.structs.len(), 1);
    assert_eq!(result.structs[0].fields.len(), 2);
}

#[test]
fn function_returning_a_sum() {
    let (result, diagnostics) = parse_source("int add(int a, int b) { return a + b; }");
    assert!(diagnostics.is_empty());
    assert_eq!(result.functions.len(), 1);

    let body = match &result.functions[0].body {
        Some(slate_syntax::ast::FunctionBody::Block(block)) => block,
        other => panic!("expected a block body, got {other:?}"),
    };
    assert_eq!(body.statements.len(), 1);
    let Statement::Return(call) = &body.statements[0] else {
        panic!("expected a return statement");
    };
    let Some(Expression::Binary(binary)) = &call.value else {
        panic!("expected a binary return value");
    };
    assert_eq!(binary.operator.content, "+");
    assert!(matches!(binary.left.as_ref(), Expression::Identifier(i) if i.token.content == "a"));
    assert!(matches!(binary.right.as_ref(), Expression::Identifier(i) if i.token.content == "b"));
}

#[test]
fn precedence_in_initializer() {
    let (result, diagnostics) = parse_source("int x = 1 + 2 * 3;");
    assert!(diagnostics.is_empty());
    let Statement::VariableDefinition(variable) = &result.top_level_statements[0] else {
        panic!("expected a variable definition");
    };
    let Some(Expression::Binary(plus)) = &variable.initial_value else {
        panic!("expected a binary initializer");
    };
    assert_eq!(plus.operator.content, "+");
    let Expression::Binary(times) = plus.right.as_ref() else {
        panic!("expected multiplication on the right");
    };
    assert_eq!(times.operator.content, "*");
    assert!(
        matches!(plus.left.as_ref(), Expression::Literal(Literal::Integer(l)) if l.value == 1)
    );
    assert!(
        matches!(times.left.as_ref(), Expression::Literal(Literal::Integer(l)) if l.value == 2)
    );
    assert!(
        matches!(times.right.as_ref(), Expression::Literal(Literal::Integer(l)) if l.value == 3)
    );
}

#[test]
fn preprocessor_selects_a_branch() {
    let source = indoc! {"
        #if FEATURE
        int f() {}
        #else
        int g() {}
        #endif
    "};

    let (result, diagnostics) = parse_with(source, ["FEATURE"].into_iter().collect());
    assert!(diagnostics.is_empty());
    assert_eq!(result.functions.len(), 1);
    assert_eq!(result.functions[0].identifier.content, "f");

    let (result, diagnostics) = parse_source(source);
    assert!(diagnostics.is_empty());
    assert_eq!(result.functions.len(), 1);
    assert_eq!(result.functions[0].identifier.content, "g");
}

#[test]
fn truncated_function_reports_at_end_of_input() {
    let source = "int f(";
    let (result, diagnostics) = parse_source(source);
    assert_eq!(result.functions.len(), 0);
    assert!(diagnostics.has_errors());

    let parameter_type = diagnostics
        .iter()
        .find(|d| d.message.contains("parameter type"))
        .expect("expected a parameter-type diagnostic");
    let position = parameter_type
        .location
        .as_ref()
        .expect("the diagnostic must be positioned")
        .position;
    assert_eq!(position.start().map(|p| p.offset), Some(source.len()));
}

#[test]
fn nested_generics_match_the_spaced_spelling() {
    let (result, diagnostics) = parse_source("List<Dict<int, int>> m;");
    assert!(diagnostics.is_empty());
    let Statement::VariableDefinition(variable) = &result.top_level_statements[0] else {
        panic!("expected a variable definition");
    };
    let slate_syntax::ast::TypeInstance::Simple(list) = &variable.variable_type else {
        panic!("expected a simple type");
    };
    assert_eq!(list.identifier.content, "List");
    let slate_syntax::ast::TypeInstance::Simple(dict) = &list.generic_arguments[0] else {
        panic!("expected a nested simple type");
    };
    assert_eq!(dict.identifier.content, "Dict");
    assert_eq!(dict.generic_arguments.len(), 2);

    // The token list contains two separate `>` tokens where the source had
    // one `>>`.
    let closers = result
        .filtered_tokens
        .iter()
        .filter(|t| t.content == ">")
        .count();
    assert_eq!(closers, 2);
    assert!(!result.filtered_tokens.iter().any(|t| t.content == ">>"));

    // And it parses identically to the spaced spelling.
    let (spaced, _) = parse_source("List < Dict < int , int > > m;");
    let Statement::VariableDefinition(spaced_variable) = &spaced.top_level_statements[0] else {
        panic!("expected a variable definition");
    };
    let slate_syntax::ast::TypeInstance::Simple(spaced_list) = &spaced_variable.variable_type
    else {
        panic!("expected a simple type");
    };
    assert_eq!(spaced_list.identifier.content, "List");
    assert_eq!(spaced_list.generic_arguments.len(), 1);
}

#[test]
fn token_counts_differ_only_by_documented_splits() {
    let source = "List<Dict<int, int>> m; @closure int(int) f;";
    let (result, _) = parse_source(source);

    let original_non_trivia = result
        .original_tokens
        .iter()
        .filter(|t| !t.kind.is_trivia())
        .count();
    // One `>>` became `>` + `>` and one `@closure` became `@` + `closure`.
    assert_eq!(result.filtered_tokens.len(), original_non_trivia + 2);
}

#[test]
fn missing_brace_synthesizes_and_stalls_once() {
    let (result, diagnostics) = parse_source("int f() { g();");
    assert_eq!(result.functions.len(), 1);

    let errors: Vec<_> = diagnostics
        .iter()
        .filter(|d| d.severity == Severity::Error)
        .collect();
    assert_eq!(errors.len(), 1, "{errors:?}");
    assert!(errors[0].message.contains("expected a statement"));

    let Some(slate_syntax::ast::FunctionBody::Block(block)) = &result.functions[0].body else {
        panic!("expected a block body");
    };
    assert!(block.statements.iter().any(|s| s.is_missing()));
}

#[test]
fn empty_input_is_silent() {
    let (result, diagnostics) = parse_source("");
    assert!(result.functions.is_empty());
    assert!(result.operators.is_empty());
    assert!(result.structs.is_empty());
    assert!(result.usings.is_empty());
    assert!(result.aliases.is_empty());
    assert!(result.top_level_statements.is_empty());
    assert!(!diagnostics.iter().any(|d| d.severity > Severity::Information));
}

#[test]
fn hex_and_binary_boundary_literals() {
    let (result, diagnostics) = parse_source("int a = 0x; int b = 0b;");
    assert!(diagnostics.iter().any(|d| d.message == "Invalid hex literal"));
    assert!(diagnostics
        .iter()
        .any(|d| d.message == "Invalid binary literal"));

    for statement in &result.top_level_statements {
        let Statement::VariableDefinition(variable) = statement else {
            panic!("expected variable definitions");
        };
        match &variable.initial_value {
            Some(Expression::Literal(Literal::Integer(literal))) => {
                assert_eq!(literal.value, 0);
            }
            other => panic!("expected an integer literal, got {other:?}"),
        }
    }
}

#[test]
fn underscore_only_digits_are_zero() {
    let (result, diagnostics) = parse_source("int a = 0x__;");
    assert!(
        !diagnostics.iter().any(|d| d.message.contains("Invalid")),
        "underscore-only digits are not invalid: {:?}",
        diagnostics.iter().collect::<Vec<_>>()
    );
    let Statement::VariableDefinition(variable) = &result.top_level_statements[0] else {
        panic!("expected a variable definition");
    };
    assert!(matches!(
        &variable.initial_value,
        Some(Expression::Literal(Literal::Integer(l))) if l.value == 0
    ));
}

#[test]
fn every_node_sits_inside_its_parent() {
    let source = indoc! {r#"
        using "math.slt";

        struct Counter {
            int value;

            void bump(this Counter self) {
                self.value += 1;
            }
        }

        int main() {
            var counter = new Counter();
            for (int i = 0; i < 10; i++) {
                if (i % 2 == 0) {
                    counter.bump();
                } else {
                    log("odd", [i, i * 2]);
                }
            }
            return counter.value;
        }
    "#};
    let (result, diagnostics) = parse_source(source);
    assert!(
        !diagnostics.has_errors(),
        "{:?}",
        diagnostics.iter().collect::<Vec<_>>()
    );

    // Every node of a statement subtree must sit inside that subtree root's
    // bounding box; applying this to *every* statement in the file gives the
    // parent-containment property transitively.
    let mut bodies: Vec<&[Statement]> = vec![&result.top_level_statements];
    for function in &result.functions {
        if let Some(slate_syntax::ast::FunctionBody::Block(block)) = &function.body {
            bodies.push(&block.statements);
        }
    }
    for definition in &result.structs {
        for method in &definition.methods {
            if let Some(slate_syntax::ast::FunctionBody::Block(block)) = &method.body {
                bodies.push(&block.statements);
            }
        }
    }

    let mut roots: Vec<&Statement> = vec![];
    for body in &bodies {
        walk_statements(body, &mut |node| {
            if let Node::Statement(statement) = node {
                roots.push(statement);
            }
            true
        });
    }
    assert!(roots.len() > 10, "the fixture should produce a deep tree");

    for root in roots {
        let enclosing = root.position();
        slate_syntax::walk_statement(root, &mut |node: Node<'_>| {
            let position = match node {
                Node::Statement(s) => s.position(),
                Node::Expression(e) => e.position(),
                Node::Argument(a) => a.position(),
                Node::TypeInstance(t) => t.position(),
                Node::Parameter(p) => p.position(),
            };
            assert!(
                enclosing.contains(&position),
                "node at {position:?} escapes its enclosing statement at {enclosing:?}"
            );
            true
        });
    }
}

#[test]
fn walker_visits_in_source_order_and_short_circuits() {
    let (result, _) = parse_source("int main() { first(); second(); third(); }");
    let Some(slate_syntax::ast::FunctionBody::Block(block)) = &result.functions[0].body else {
        panic!("expected a block body");
    };

    let mut calls = vec![];
    walk_statements(&block.statements, &mut |node| {
        if let Node::Expression(Expression::Identifier(identifier)) = node {
            calls.push(identifier.token.content.clone());
        }
        true
    });
    assert_eq!(calls, ["first", "second", "third"]);

    // Stop after the first call.
    let mut visited = 0;
    let completed = walk_statements(&block.statements, &mut |node| {
        if matches!(node, Node::Expression(Expression::AnyCall(_))) {
            visited += 1;
            return false;
        }
        true
    });
    assert!(!completed);
    assert_eq!(visited, 1);
}

#[test]
fn parse_expression_entry_accepts_a_bare_expression() {
    let file = SourceUri::from("test.slt");
    let mut diagnostics = DiagnosticsCollection::new();
    let tokens = tokenize("1 + 2 * x", &file, &mut diagnostics, Definitions::new());
    let result = parse_expression(tokens, &file, &mut diagnostics);
    assert!(!diagnostics.has_errors());
    assert_eq!(result.top_level_statements.len(), 1);
    assert!(matches!(
        result.top_level_statements[0],
        Statement::Expression(Expression::Binary(_))
    ));
}

#[test]
fn analyzed_kinds_land_on_the_token_buffer() {
    let (result, _) = parse_source("struct Point { int x; }");
    let kind_of = |content: &str| {
        result
            .filtered_tokens
            .iter()
            .find(|t| t.content == content)
            .map(|t| t.analyzed_kind)
    };
    assert_eq!(kind_of("struct"), Some(slate_lexer::AnalyzedKind::Keyword));
    assert_eq!(kind_of("Point"), Some(slate_lexer::AnalyzedKind::Struct));
    assert_eq!(kind_of("int"), Some(slate_lexer::AnalyzedKind::Keyword));
    assert_eq!(kind_of("x"), Some(slate_lexer::AnalyzedKind::FieldName));
}

#[test]
fn lambdas_and_closure_types_round_trip_through_statements() {
    let source = indoc! {"
        int apply(@closure int(int) transform, int value) {
            return transform(value);
        }

        int main() {
            var doubler = (int x) => x * 2;
            return apply(doubler, 21);
        }
    "};
    let (result, diagnostics) = parse_source(source);
    assert!(
        !diagnostics.has_errors(),
        "{:?}",
        diagnostics.iter().collect::<Vec<_>>()
    );
    assert_eq!(result.functions.len(), 2);

    let apply = &result.functions[0];
    let slate_syntax::ast::TypeInstance::Function(function_type) =
        &apply.parameters.parameters[0].parameter_type
    else {
        panic!("expected a function pointer parameter");
    };
    assert_eq!(
        function_type
            .closure_modifier
            .as_ref()
            .map(|m| m.content.as_str()),
        Some("closure")
    );

    // `@closure` arrived as one token and was split in place.
    assert!(result
        .original_tokens
        .iter()
        .any(|t| t.content == "@closure" && t.kind == TokenKind::Identifier));
    assert!(result
        .filtered_tokens
        .iter()
        .any(|t| t.content == "@" && t.kind == TokenKind::Operator));
}

#[test]
fn rendering_a_subtree_retokenizes_to_the_same_sequence() {
    let source = "int x = items[0].update(1 + 2 * 3, new Point(4, 5));";
    let (result, diagnostics) = parse_source(source);
    assert!(!diagnostics.has_errors());

    let rendered = result.top_level_statements[0].to_string();
    let file = SourceUri::from("rendered.slt");
    let mut rendered_diagnostics = DiagnosticsCollection::new();
    let rendered_tokens = tokenize(
        &rendered,
        &file,
        &mut rendered_diagnostics,
        Definitions::new(),
    );

    let contents = |tokens: &[slate_lexer::Token]| -> Vec<String> {
        tokens
            .iter()
            .filter(|t| !t.kind.is_trivia() && !t.is_synthetic)
            .map(|t| t.content.clone())
            .collect::<Vec<_>>()
    };
    assert_eq!(contents(&rendered_tokens), contents(&result.original_tokens));
}

#[test]
fn lambda_parameters_never_keep_default_values() {
    let (result, diagnostics) = parse_source("var f = (int x = 1) => x;");
    assert!(diagnostics
        .iter()
        .any(|d| d.message.contains("default value is not allowed")));

    let Statement::VariableDefinition(variable) = &result.top_level_statements[0] else {
        panic!("expected a variable definition");
    };
    let Some(Expression::Lambda(lambda)) = &variable.initial_value else {
        panic!("expected a lambda initializer");
    };
    assert!(lambda
        .parameters
        .parameters
        .iter()
        .all(|parameter| parameter.default_value.is_none()));
}

#[test]
fn goto_label_round_trip() {
    let source = indoc! {"
        int main() {
            int i = 0;
        again:
            i += 1;
            if (i < 3) goto again;
            return i;
        }
    "};
    let (result, diagnostics) = parse_source(source);
    assert!(
        !diagnostics.has_errors(),
        "{:?}",
        diagnostics.iter().collect::<Vec<_>>()
    );
    let Some(slate_syntax::ast::FunctionBody::Block(block)) = &result.functions[0].body else {
        panic!("expected a block body");
    };
    assert!(block
        .statements
        .iter()
        .any(|s| matches!(s, Statement::Label(_))));
    assert!(block.statements.iter().any(|s| matches!(s, Statement::If(_))));
}

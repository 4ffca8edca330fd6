mod cases;

use cases::{ENGINE, host};
use pretty_assertions::assert_eq;
use shaperule::{
    Engine, EngineOptions, Error, ExecutionOptions, ParseErrorKind, ParseOptions, Severity, Span,
    render_error_to_string_no_color,
};

// ======== Malformed expressions ========

test_case! {
    name: unclosed_group,
    input: "(1+2",
    error: "P002",
}

test_case! {
    name: stray_closing_bracket,
    input: "sizes[1))",
    error: "P002",
}

test_case! {
    name: unterminated_string,
    input: "'abc + 1",
    error: "P002",
}

test_case! {
    name: empty_formula,
    input: "",
    error: "P001",
}

test_case! {
    name: missing_operand,
    input: "width *",
    error: "P001",
}

test_case! {
    name: not_a_term,
    input: "3 apples",
    error: "P003",
}

test_case! {
    name: malformed_numeral,
    input: "floors * 1.5.2",
    error: "P003",
}

test_case! {
    name: trailing_minus,
    input: "f(x) -",
    error: "P001",
}

test_case! {
    name: optional_with_one_argument,
    input: "optional(depth)",
    error: "P005",
}

#[test]
fn parse_failures_are_malformed_expressions() {
    for source in ["(1+2", "", "   ", "1 +", "switch(x, 1: 2)"] {
        let err = ENGINE.parse(source).unwrap_err();
        assert!(
            matches!(err, Error::MalformedExpression(_)),
            "'{}' gave {:?}",
            source,
            err
        );
        assert!(!err.is_resource_exceeded());
    }
}

#[test]
fn unbalanced_delimiter_points_at_the_bracket() {
    let Err(Error::MalformedExpression(err)) = ENGINE.parse("max(1, (2)") else {
        panic!("expected a parse error");
    };
    assert_eq!(err.kind, ParseErrorKind::UnbalancedDelimiter { delimiter: '(' });
    assert_eq!(err.span, Span(3..4));
    assert_eq!(err.src, "max(1, (2)");
}

#[test]
fn nesting_limit_is_a_parse_error() {
    let engine = Engine::new(EngineOptions {
        parse: ParseOptions { max_depth: 8 },
        ..Default::default()
    });
    let source = format!("{}1{}", "(".repeat(20), ")".repeat(20));
    let err = engine.parse(&source).unwrap_err();
    assert_eq!(err.to_diagnostic().code.as_deref(), Some("P009"));
}

// ======== Evaluation errors ========

#[test]
fn evaluation_error_carries_source_and_span() {
    let err = ENGINE.run("floors + name * 2", &mut host()).unwrap_err();
    assert!(matches!(err, Error::Evaluation(_)));
    assert_eq!(err.source_text(), "floors + name * 2");

    let diagnostic = err.to_diagnostic();
    assert_eq!(diagnostic.severity, Severity::Error);
    assert_eq!(diagnostic.code.as_deref(), Some("E001"));
    assert_eq!(diagnostic.span, Span(9..17));
}

#[test]
fn undefined_function_names_the_function() {
    let err = ENGINE.run("frobnicate(1)", &mut host()).unwrap_err();
    let diagnostic = err.to_diagnostic();
    assert_eq!(diagnostic.code.as_deref(), Some("E003"));
    assert!(diagnostic.message.contains("frobnicate"), "{}", diagnostic.message);
    assert!(diagnostic.help.is_some());
}

#[test]
fn execution_depth_limit_is_a_resource_error() {
    let engine = Engine::new(EngineOptions {
        execution: ExecutionOptions { max_depth: 16 },
        ..Default::default()
    });
    let source = format!("{}1{}", "(1 + ".repeat(30), ")".repeat(30));
    let err = engine.run(&source, &mut host()).unwrap_err();
    assert!(err.is_resource_exceeded());
    assert_eq!(err.to_diagnostic().code.as_deref(), Some("E005"));
}

#[test]
fn deep_formula_within_limits_evaluates() {
    let source = format!("{}1{}", "(1 + ".repeat(30), ")".repeat(30));
    assert_eq!(cases::evaluate(&source), shaperule::Value::Float(31.0));
}

// ======== Rendering ========

#[test]
fn rendered_parse_error_shows_code_and_formula() {
    let err = ENGINE.parse("width * (height").unwrap_err();
    let text = render_error_to_string_no_color(&err);
    assert!(text.contains("P002"), "{}", text);
    assert!(text.contains("width * (height"), "{}", text);
    assert!(text.contains("<formula>"), "{}", text);
}

#[test]
fn rendered_evaluation_error_shows_code() {
    let err = ENGINE.run("sizes[3]", &mut host()).unwrap_err();
    let text = render_error_to_string_no_color(&err);
    assert!(text.contains("E004"), "{}", text);
    assert!(text.contains("sizes[3]"), "{}", text);
}

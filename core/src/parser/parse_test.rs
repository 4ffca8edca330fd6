use super::{ParseErrorKind, ParseOptions, parse, parse_with_options};
use crate::ast::{BinaryOp, CombinedInequality, CompareOp, Inequality, TermKind};
use pretty_assertions::assert_eq;

fn error_kind(source: &str) -> ParseErrorKind {
    match parse(source) {
        Ok(expr) => panic!("expected '{}' to fail, got {}", source, expr),
        Err(e) => e.kind,
    }
}

#[test]
fn test_number_constant() {
    let expr = parse("  42.5 ").unwrap();
    match expr.root().kind() {
        TermKind::Constant { text, number } => {
            assert_eq!(text.as_str(), "42.5");
            assert_eq!(*number, Some(42.5));
        }
        other => panic!("unexpected {:?}", other),
    }
    assert_eq!(expr.root().span().0, 2..6);
}

#[test]
fn test_word_constant_has_no_number() {
    let expr = parse("width").unwrap();
    assert!(matches!(
        expr.root().kind(),
        TermKind::Constant { number: None, .. }
    ));
}

#[test]
fn test_string_literals() {
    for (source, expected) in [("'abc'", "abc"), ("\"a'b\"", "a'b"), ("'a + b'", "a + b")] {
        let expr = parse(source).unwrap();
        match expr.root().kind() {
            TermKind::Str(s) => assert_eq!(s.as_str(), expected),
            other => panic!("unexpected {:?}", other),
        }
    }
}

#[test]
fn test_binary_children_offsets() {
    let expr = parse("ab + cd").unwrap();
    let root = expr.root();
    let TermKind::Binary { op, left, right } = root.kind() else {
        panic!("expected binary");
    };
    assert_eq!(*op, BinaryOp::Add);
    assert_eq!(expr.term(*left).text(), "ab");
    assert_eq!(expr.term(*right).text(), "cd");
    assert_eq!(expr.term(*right).offset(), 5);
}

#[test]
fn test_array_literal() {
    let expr = parse("(1; x; 'a')").unwrap();
    let TermKind::Array(elements) = expr.root().kind() else {
        panic!("expected array");
    };
    assert_eq!(elements.len(), 3);
    assert_eq!(expr.root().span().0, 0..11);
    assert_eq!(expr.term(elements[1]).absolute_offset(), 4);
}

#[test]
fn test_redundant_parentheses_are_dropped() {
    let expr = parse("((x))").unwrap();
    assert_eq!(expr.len(), 1);
    assert_eq!(expr.root().text(), "x");
}

#[test]
fn test_index() {
    let expr = parse("list[i + 1]").unwrap();
    let TermKind::Index { array, index } = expr.root().kind() else {
        panic!("expected index");
    };
    assert_eq!(expr.term(*array).text(), "list");
    assert_eq!(expr.term(*index).text(), "i + 1");
    assert_eq!(expr.to_string(), "list[(i + 1)]");
}

#[test]
fn test_call_arguments() {
    let expr = parse("max(a, f(b, c), (1; 2))").unwrap();
    let TermKind::Call { name, args } = expr.root().kind() else {
        panic!("expected call");
    };
    assert_eq!(name.as_str(), "max");
    let texts: Vec<&str> = args.iter().map(|a| expr.term(*a).text()).collect();
    assert_eq!(texts, vec!["a", "f(b, c)", "(1; 2)"]);
}

#[test]
fn test_call_without_arguments() {
    let expr = parse("rand()").unwrap();
    assert!(matches!(
        expr.root().kind(),
        TermKind::Call { args, .. } if args.is_empty()
    ));
}

#[test]
fn test_member_call() {
    let expr = parse("shape -> extrude(2)").unwrap();
    let TermKind::MemberCall { object, name, args } = expr.root().kind() else {
        panic!("expected member call");
    };
    assert_eq!(expr.term(*object).text(), "shape");
    assert_eq!(name.as_str(), "extrude");
    assert_eq!(expr.term(args[0]).absolute_offset(), 17);
}

#[test]
fn test_if_form() {
    let expr = parse("if(a < 2 && b, 10, 20)").unwrap();
    let TermKind::Conditional { condition, .. } = expr.root().kind() else {
        panic!("expected conditional");
    };
    let CombinedInequality::And(parts) = condition else {
        panic!("expected conjunction");
    };
    assert!(matches!(
        parts[0],
        CombinedInequality::Leaf(Inequality::Compare {
            op: CompareOp::Lt,
            ..
        })
    ));
    assert!(matches!(
        parts[1],
        CombinedInequality::Leaf(Inequality::Truthy(_))
    ));
    assert_eq!(expr.to_string(), "if(a < 2 && b, 10, 20)");
}

#[test]
fn test_switch_form() {
    let expr = parse("switch(k, 1: 'one', 2.5: 'two', default: 'many')").unwrap();
    let TermKind::Switch { cases, default, .. } = expr.root().kind() else {
        panic!("expected switch");
    };
    let keys: Vec<f64> = cases.iter().map(|c| c.key).collect();
    assert_eq!(keys, vec![1.0, 2.5]);
    assert_eq!(expr.term(*default).text(), "'many'");
}

#[test]
fn test_optional_form() {
    for source in ["optional(depth, 3)", "optional('depth', 3)"] {
        let expr = parse(source).unwrap();
        let TermKind::Optional { name, fallback } = expr.root().kind() else {
            panic!("expected optional");
        };
        assert_eq!(name.as_str(), "depth");
        assert_eq!(expr.term(*fallback).text(), "3");
    }
}

#[test]
fn test_not() {
    let expr = parse("!(a == b)").unwrap();
    let TermKind::Not(operand) = expr.root().kind() else {
        panic!("expected not");
    };
    assert!(matches!(
        expr.term(*operand).kind(),
        TermKind::Inequality(Inequality::Compare {
            op: CompareOp::Eq,
            ..
        })
    ));
}

#[test]
fn test_quoted_operators_are_opaque() {
    let expr = parse("'a == b' + f(')')").unwrap();
    assert!(matches!(
        expr.root().kind(),
        TermKind::Binary {
            op: BinaryOp::Add,
            ..
        }
    ));
}

#[test]
fn test_empty_input() {
    assert_eq!(error_kind(""), ParseErrorKind::Empty);
    assert_eq!(error_kind("   "), ParseErrorKind::Empty);
    assert_eq!(error_kind("1 +"), ParseErrorKind::Empty);
    assert_eq!(error_kind("f(1, )"), ParseErrorKind::Empty);
}

#[test]
fn test_unbalanced() {
    assert_eq!(
        error_kind("(1 + 2"),
        ParseErrorKind::UnbalancedDelimiter { delimiter: '(' }
    );
    assert_eq!(
        error_kind("a[1))"),
        ParseErrorKind::UnbalancedDelimiter { delimiter: ')' }
    );
    assert_eq!(
        error_kind("'abc"),
        ParseErrorKind::UnbalancedDelimiter { delimiter: '\'' }
    );
}

#[test]
fn test_no_production() {
    assert!(matches!(error_kind("a b"), ParseErrorKind::NoProduction { .. }));
    assert!(matches!(error_kind("1; 2"), ParseErrorKind::NoProduction { .. }));
    assert!(matches!(error_kind("(a)(b)"), ParseErrorKind::NoProduction { .. }));
    assert!(matches!(error_kind("a = b"), ParseErrorKind::NoProduction { .. }));
}

#[test]
fn test_malformed_numerals_are_not_names() {
    for (source, text) in [("1.5.2", "1.5.2"), ("2x + 1", "2x"), ("w * .5.", ".5.")] {
        assert_eq!(
            error_kind(source),
            ParseErrorKind::NoProduction {
                text: text.to_string()
            },
            "{}",
            source
        );
    }
    // Names may still carry digits and dots after the first character.
    assert!(parse("lot.w2 + v1.5").is_ok());
}

#[test]
fn test_misplaced_unary_minus() {
    assert_eq!(error_kind("a, -1"), ParseErrorKind::MisplacedUnaryMinus);
}

#[test]
fn test_special_form_arity() {
    assert_eq!(
        error_kind("if(1, 2)"),
        ParseErrorKind::WrongArity {
            form: "if",
            expected: "3",
            found: 2
        }
    );
    assert_eq!(
        error_kind("optional(x)"),
        ParseErrorKind::WrongArity {
            form: "optional",
            expected: "2",
            found: 1
        }
    );
    assert_eq!(
        error_kind("switch(x)"),
        ParseErrorKind::WrongArity {
            form: "switch",
            expected: "at least 2",
            found: 1
        }
    );
}

#[test]
fn test_switch_errors() {
    assert_eq!(
        error_kind("switch(x, a: 1, default: 2)"),
        ParseErrorKind::InvalidCaseKey { key: "a".into() }
    );
    assert_eq!(
        error_kind("switch(x, 1: 1, 1.0: 2, default: 3)"),
        ParseErrorKind::DuplicateCaseKey { key: "1.0".into() }
    );
    assert_eq!(error_kind("switch(x, 1: 1)"), ParseErrorKind::MissingDefault);
}

#[test]
fn test_max_depth() {
    let source = format!("{}1{}", "(".repeat(20), ")".repeat(20));
    let options = ParseOptions { max_depth: 8 };
    let err = parse_with_options(&source, &options).unwrap_err();
    assert_eq!(err.kind, ParseErrorKind::MaxDepthExceeded { max_depth: 8 });
    assert!(parse(&source).is_ok());
}

#[test]
fn test_flat_chain_counts_one_level_per_term() {
    let chain = |terms: usize| vec!["w"; terms].join(" + ");
    assert!(parse(&chain(256)).is_ok());
    assert_eq!(
        error_kind(&chain(257)),
        ParseErrorKind::MaxDepthExceeded { max_depth: 256 }
    );
    let options = ParseOptions { max_depth: 512 };
    assert!(parse_with_options(&chain(400), &options).is_ok());
}

#[test]
fn test_error_span_points_at_offender() {
    let err = parse("1 + (2 * 3))").unwrap_err();
    assert_eq!(err.span.0, 11..12);
    let diagnostic = err.to_diagnostic();
    assert_eq!(diagnostic.code.as_deref(), Some("P002"));
}

//! Grammar tests for the condition language: clause shapes, connectives,
//! literal typing, and rejection of anything outside the grammar.

use condition_syntax::{parse, Comparator, ConditionError, Connective, Literal};

#[test]
fn parses_single_clause() {
    let cond = parse("pe < 40").unwrap();
    assert_eq!(cond.clauses.len(), 1);
    assert_eq!(cond.clauses[0].field, "pe");
    assert_eq!(cond.clauses[0].comparator, Comparator::LessThan);
    assert_eq!(cond.clauses[0].literal, Literal::Number(40.0));
}

#[test]
fn parses_and_joined_clauses() {
    let cond = parse("pe < 40 AND roe > 20").unwrap();
    assert_eq!(cond.connective, Connective::And);
    assert_eq!(cond.clauses.len(), 2);
    assert_eq!(cond.clauses[1].field, "roe");
}

#[test]
fn parses_or_joined_clauses() {
    let cond = parse("pe_percentile > 20 OR pb_percentile > 20").unwrap();
    assert_eq!(cond.connective, Connective::Or);
    assert_eq!(cond.clauses.len(), 2);
}

#[test]
fn connective_keywords_are_case_insensitive() {
    for text in ["pe < 40 and roe > 20", "pe < 40 And roe > 20", "pe < 40 AND roe > 20"] {
        let cond = parse(text).unwrap();
        assert_eq!(cond.connective, Connective::And, "input: {text}");
        assert_eq!(cond.clauses.len(), 2);
    }
}

#[test]
fn cjk_field_names_pass_through_verbatim() {
    let cond = parse("近3年 > 10 AND 手续费 < 1.2").unwrap();
    assert_eq!(cond.clauses[0].field, "近3年");
    assert_eq!(cond.clauses[1].field, "手续费");
    assert_eq!(cond.clauses[1].literal, Literal::Number(1.2));
}

#[test]
fn field_case_is_preserved() {
    let cond = parse("turnoverRate < 5").unwrap();
    assert_eq!(cond.clauses[0].field, "turnoverRate");
}

#[test]
fn whitespace_around_comparator_is_optional() {
    let cond = parse("pe<40 AND roe>=20").unwrap();
    assert_eq!(cond.clauses[0].field, "pe");
    assert_eq!(cond.clauses[0].literal, Literal::Number(40.0));
    assert_eq!(cond.clauses[1].comparator, Comparator::GreaterOrEqual);
}

#[test]
fn empty_input_accepts_all() {
    assert!(parse("").unwrap().is_empty());
    assert!(parse("   \t ").unwrap().is_empty());
}

#[test]
fn quoted_text_literals_compare_with_equality() {
    let cond = parse("date == '2023-01-01'").unwrap();
    assert_eq!(cond.clauses[0].literal, Literal::Text("2023-01-01".into()));

    let cond = parse("赎回状态 != \"封闭期\"").unwrap();
    assert_eq!(cond.clauses[0].comparator, Comparator::NotEqual);
    assert_eq!(cond.clauses[0].literal, Literal::Text("封闭期".into()));
}

#[test]
fn signed_and_decimal_numbers_are_numeric_literals() {
    let cond = parse("riseFall > -1.5").unwrap();
    assert_eq!(cond.clauses[0].literal, Literal::Number(-1.5));
}

#[test]
fn mixed_connectives_are_malformed() {
    let err = parse("pe < 40 AND roe > 20 OR pb < 1").unwrap_err();
    assert!(matches!(err, ConditionError::MalformedCondition { .. }));
}

#[test]
fn clause_without_comparator_reports_fragment() {
    let err = parse("pe < 40 OR roe AND 20").unwrap_err();
    match err {
        // "AND" next to "OR" trips the uniform-connective rule before the
        // broken clause is even looked at.
        ConditionError::MalformedCondition { .. } => {}
        other => panic!("unexpected error: {other:?}"),
    }

    let err = parse("roe 20").unwrap_err();
    match err {
        ConditionError::MalformedCondition { fragment, .. } => {
            assert_eq!(fragment, "roe 20");
        }
        other => panic!("unexpected error: {other:?}"),
    }
}

#[test]
fn dangling_connective_is_malformed() {
    for text in ["AND pe < 40", "pe < 40 AND", "pe < 40 AND AND roe > 20"] {
        let err = parse(text).unwrap_err();
        assert!(
            matches!(err, ConditionError::MalformedCondition { .. }),
            "input: {text}"
        );
    }
}

#[test]
fn ordering_on_text_literal_is_a_type_mismatch() {
    let err = parse("date >= '2023-01-01'").unwrap_err();
    match err {
        ConditionError::TypeMismatch { comparator, literal } => {
            assert_eq!(comparator, Comparator::GreaterOrEqual);
            assert_eq!(literal, "'2023-01-01'");
        }
        other => panic!("unexpected error: {other:?}"),
    }
}

#[test]
fn equality_on_text_literal_is_fine() {
    assert!(parse("基金类型 == 股票型").is_ok());
}

#[test]
fn missing_sides_are_malformed() {
    assert!(matches!(
        parse("< 40").unwrap_err(),
        ConditionError::MalformedCondition { .. }
    ));
    assert!(matches!(
        parse("pe <").unwrap_err(),
        ConditionError::MalformedCondition { .. }
    ));
}

use crate::ast::clause::{Clause, Condition};
use crate::ast::literal::Literal;
use crate::ast::operator::{Comparator, Connective};
use crate::error::ConditionError;
use tracing::debug;

/// Parse a condition string into an ordered, uniformly-connected sequence
/// of comparison clauses.
///
/// Empty or whitespace-only input yields the accept-all condition. The
/// scan splits on the connective keywords first (case-insensitive,
/// whitespace-delimited), then decomposes each fragment around its first
/// comparator. Field names pass through exactly as written, CJK labels
/// included, because row keys must match character for character.
pub fn parse(input: &str) -> Result<Condition, ConditionError> {
    let text = input.trim();
    if text.is_empty() {
        return Ok(Condition::accept_all());
    }

    let (fragments, connective) = split_on_connectives(text)?;
    let mut clauses = Vec::with_capacity(fragments.len());
    for fragment in fragments {
        clauses.push(parse_clause(fragment)?);
    }

    let condition = Condition {
        connective: connective.unwrap_or(Connective::And),
        clauses,
    };
    debug!(
        clauses = condition.clauses.len(),
        connective = %condition.connective,
        "parsed condition"
    );
    Ok(condition)
}

/// Cut the text at every standalone AND/OR word. Returns the clause
/// fragments between them and the single connective in use. Mixing AND
/// with OR is ambiguous-precedence territory and is rejected outright.
fn split_on_connectives(
    text: &str,
) -> Result<(Vec<&str>, Option<Connective>), ConditionError> {
    let mut fragments = Vec::new();
    let mut connective: Option<Connective> = None;
    let mut start = 0usize;

    for (word_start, word_end) in word_spans(text) {
        let word = &text[word_start..word_end];
        let found = if word.eq_ignore_ascii_case("and") {
            Some(Connective::And)
        } else if word.eq_ignore_ascii_case("or") {
            Some(Connective::Or)
        } else {
            None
        };
        let Some(next) = found else { continue };

        if let Some(prev) = connective
            && prev != next
        {
            return Err(ConditionError::malformed(
                text,
                "mixed AND/OR connectives",
            ));
        }
        connective = Some(next);
        fragments.push(&text[start..word_start]);
        start = word_end;
    }
    fragments.push(&text[start..]);
    Ok((fragments, connective))
}

/// Byte spans of maximal non-whitespace runs.
fn word_spans(text: &str) -> Vec<(usize, usize)> {
    let mut spans = Vec::new();
    let mut start: Option<usize> = None;
    for (i, ch) in text.char_indices() {
        if ch.is_whitespace() {
            if let Some(s) = start.take() {
                spans.push((s, i));
            }
        } else if start.is_none() {
            start = Some(i);
        }
    }
    if let Some(s) = start {
        spans.push((s, text.len()));
    }
    spans
}

fn parse_clause(fragment: &str) -> Result<Clause, ConditionError> {
    let text = fragment.trim();
    if text.is_empty() {
        return Err(ConditionError::malformed(fragment, "empty clause"));
    }

    let (at, comparator, op_len) = find_comparator(text)
        .ok_or_else(|| ConditionError::malformed(text, "no comparator"))?;

    let field = text[..at].trim();
    if field.is_empty() {
        return Err(ConditionError::malformed(text, "empty field name"));
    }
    let literal_text = text[at + op_len..].trim();
    if literal_text.is_empty() {
        return Err(ConditionError::malformed(text, "empty literal"));
    }

    let literal = parse_literal(literal_text);
    if comparator.is_ordering() && literal.is_text() {
        return Err(ConditionError::TypeMismatch {
            comparator,
            literal: literal_text.to_string(),
        });
    }

    Ok(Clause {
        field: field.to_string(),
        comparator,
        literal,
    })
}

/// First comparator occurrence in the fragment. Two-character tokens are
/// tried before single-character ones at each position so `<` never
/// matches inside `<=`. A lone `=` is accepted as an equality spelling
/// and maps to `==`.
fn find_comparator(text: &str) -> Option<(usize, Comparator, usize)> {
    const TWO_CHAR: [(&str, Comparator); 4] = [
        ("<=", Comparator::LessOrEqual),
        (">=", Comparator::GreaterOrEqual),
        ("==", Comparator::Equal),
        ("!=", Comparator::NotEqual),
    ];

    for (i, _) in text.char_indices() {
        let rest = &text[i..];
        for (token, comparator) in TWO_CHAR {
            if rest.starts_with(token) {
                return Some((i, comparator, token.len()));
            }
        }
        if rest.starts_with('<') {
            return Some((i, Comparator::LessThan, 1));
        }
        if rest.starts_with('>') {
            return Some((i, Comparator::GreaterThan, 1));
        }
        if rest.starts_with('=') {
            return Some((i, Comparator::Equal, 1));
        }
    }
    None
}

fn parse_literal(text: &str) -> Literal {
    match parse_number(text) {
        Some(n) => Literal::Number(n),
        None => Literal::Text(unquote(text).to_string()),
    }
}

/// Numeric pattern: optional sign, digits, at most one decimal point.
fn parse_number(text: &str) -> Option<f64> {
    let unsigned = text
        .strip_prefix(['+', '-'])
        .unwrap_or(text);
    let mut digits = 0usize;
    let mut dots = 0usize;
    for ch in unsigned.chars() {
        if ch.is_ascii_digit() {
            digits += 1;
        } else if ch == '.' {
            dots += 1;
            if dots > 1 {
                return None;
            }
        } else {
            return None;
        }
    }
    if digits == 0 {
        return None;
    }
    text.parse::<f64>().ok()
}

fn unquote(text: &str) -> &str {
    let bytes = text.as_bytes();
    if bytes.len() >= 2 {
        let (first, last) = (bytes[0], bytes[bytes.len() - 1]);
        if (first == b'\'' && last == b'\'') || (first == b'"' && last == b'"') {
            return &text[1..text.len() - 1];
        }
    }
    text
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn two_char_comparators_win_over_single() {
        let cond = parse("pe <= 40").unwrap();
        assert_eq!(cond.clauses[0].comparator, Comparator::LessOrEqual);
        let cond = parse("roe >= 20").unwrap();
        assert_eq!(cond.clauses[0].comparator, Comparator::GreaterOrEqual);
    }

    #[test]
    fn bare_equal_sign_means_equality() {
        let cond = parse("基金类型 = '股票型'").unwrap();
        assert_eq!(cond.clauses[0].comparator, Comparator::Equal);
        assert_eq!(cond.clauses[0].literal, Literal::Text("股票型".into()));
    }

    #[test]
    fn literal_may_contain_operator_characters() {
        let cond = parse("tag == a=b").unwrap();
        assert_eq!(cond.clauses[0].field, "tag");
        assert_eq!(cond.clauses[0].literal, Literal::Text("a=b".into()));
    }

    #[test]
    fn number_pattern_accepts_signs_and_one_dot() {
        assert_eq!(parse_number("-1.5"), Some(-1.5));
        assert_eq!(parse_number("+40"), Some(40.0));
        assert_eq!(parse_number(".5"), Some(0.5));
        assert_eq!(parse_number("1.2.3"), None);
        assert_eq!(parse_number("2023-01-01"), None);
        assert_eq!(parse_number("''"), None);
    }

    #[test]
    fn word_spans_handle_multibyte_text() {
        let spans = word_spans("近3年 > 10");
        assert_eq!(spans.len(), 3);
        let text = "近3年 > 10";
        assert_eq!(&text[spans[0].0..spans[0].1], "近3年");
    }
}

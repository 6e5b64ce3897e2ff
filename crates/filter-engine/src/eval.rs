use condition_syntax::{parse, Clause, Condition, ConditionError, Connective, Literal};
use model::{Row, Table, Value};
use tracing::trace;

/// Parse a condition string and filter a table with it in one pass. The
/// shape every tool uses: absent or empty condition text returns the
/// table untouched; a parse failure surfaces before any row is examined.
pub fn apply_filter(table: &Table, condition_text: &str) -> Result<Table, ConditionError> {
    let condition = parse(condition_text)?;
    Ok(filter(table, &condition))
}

/// Rows of `table` satisfying `condition`, in their original order. The
/// input is never mutated; a fresh table referencing only qualifying rows
/// comes back.
pub fn filter(table: &Table, condition: &Condition) -> Table {
    if condition.is_empty() {
        return table.clone();
    }
    let result: Table = table
        .iter()
        .filter(|row| row_matches(row, condition))
        .cloned()
        .collect();
    trace!(kept = result.len(), total = table.len(), "filtered table");
    result
}

/// AND-joined conditions need every clause, OR-joined at least one. An
/// empty condition accepts the row.
pub fn row_matches(row: &Row, condition: &Condition) -> bool {
    if condition.is_empty() {
        return true;
    }
    match condition.connective {
        Connective::And => condition.clauses.iter().all(|c| clause_matches(row, c)),
        Connective::Or => condition.clauses.iter().any(|c| clause_matches(row, c)),
    }
}

/// A clause never errors at evaluation time. A field the row does not
/// carry, a Null cell, or a row value whose type cannot meet the literal
/// all degrade to `false`; upstream tables are heterogeneous and rows may
/// omit optional metrics.
fn clause_matches(row: &Row, clause: &Clause) -> bool {
    let Some(value) = row.value(&clause.field) else {
        return false;
    };
    let literal = literal_value(&clause.literal);
    match value.compare(&literal) {
        Some(ord) => clause.comparator.holds(ord),
        None => false,
    }
}

fn literal_value(literal: &Literal) -> Value {
    match literal {
        Literal::Number(n) => Value::Float(*n),
        Literal::Text(s) => Value::String(s.clone()),
    }
}

//! Pipe-table rendering of result tables: a leading ordinal column, a
//! header row, a separator, one line per row. Cells whose field a row
//! lacks render empty.

use model::Table;

pub fn to_markdown(table: &Table) -> String {
    let columns = table.columns();
    if columns.is_empty() {
        return String::new();
    }

    let mut out = String::new();
    out.push_str("|    |");
    for col in &columns {
        out.push(' ');
        out.push_str(col);
        out.push_str(" |");
    }
    out.push('\n');

    out.push_str("|---|");
    for _ in &columns {
        out.push_str("---|");
    }
    out.push('\n');

    for (i, row) in table.iter().enumerate() {
        out.push_str(&format!("| {i} |"));
        for col in &columns {
            out.push(' ');
            if let Some(value) = row.value(col) {
                out.push_str(&value.to_string());
            }
            out.push_str(" |");
        }
        out.push('\n');
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use model::{FieldValue, Row, Value};

    #[test]
    fn renders_header_separator_and_rows() {
        let table = Table::new(vec![
            Row::new(vec![
                FieldValue::new("pe", Value::Float(35.0)),
                FieldValue::new("name", Value::String("招商银行".into())),
            ]),
            Row::new(vec![FieldValue::new("pe", Value::Float(20.0))]),
        ]);
        let md = to_markdown(&table);
        let lines: Vec<&str> = md.lines().collect();
        assert_eq!(lines[0], "|    | pe | name |");
        assert_eq!(lines[1], "|---|---|---|");
        assert_eq!(lines[2], "| 0 | 35 | 招商银行 |");
        // Second row lacks 'name'; the cell renders empty.
        assert_eq!(lines[3], "| 1 | 20 |  |");
    }

    #[test]
    fn empty_table_renders_nothing() {
        assert_eq!(to_markdown(&Table::empty()), "");
    }
}

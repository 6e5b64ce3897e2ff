use crate::records::row::Row;
use serde::{Deserialize, Serialize};

/// An ordered sequence of rows. Order is meaningful: filtering and
/// truncation must never reorder what the upstream source returned.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct Table {
    pub rows: Vec<Row>,
}

impl Table {
    pub fn new(rows: Vec<Row>) -> Self {
        Table { rows }
    }

    pub fn empty() -> Self {
        Table { rows: Vec::new() }
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Row> {
        self.rows.iter()
    }

    /// First `n` rows, in order.
    pub fn head(&self, n: usize) -> Table {
        Table {
            rows: self.rows.iter().take(n).cloned().collect(),
        }
    }

    /// Column names in first-seen order across all rows. Rows fetched from
    /// heterogeneous sources may carry extra fields; later columns append.
    pub fn columns(&self) -> Vec<String> {
        let mut cols: Vec<String> = Vec::new();
        for row in &self.rows {
            for field in &row.fields {
                if !cols.iter().any(|c| c == &field.name) {
                    cols.push(field.name.clone());
                }
            }
        }
        cols
    }

    /// Stable descending sort on a numeric column. Rows where the column is
    /// absent or non-numeric sink to the end.
    pub fn sort_desc_by(&mut self, field: &str) {
        self.rows.sort_by(|a, b| {
            let av = a.value(field).and_then(|v| v.as_f64());
            let bv = b.value(field).and_then(|v| v.as_f64());
            match (av, bv) {
                (Some(x), Some(y)) => y.partial_cmp(&x).unwrap_or(std::cmp::Ordering::Equal),
                (Some(_), None) => std::cmp::Ordering::Less,
                (None, Some(_)) => std::cmp::Ordering::Greater,
                (None, None) => std::cmp::Ordering::Equal,
            }
        });
    }
}

impl FromIterator<Row> for Table {
    fn from_iter<T: IntoIterator<Item = Row>>(iter: T) -> Self {
        Table {
            rows: iter.into_iter().collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::value::{FieldValue, Value};

    fn table() -> Table {
        let mk = |pe: f64| Row::new(vec![FieldValue::new("pe", Value::Float(pe))]);
        Table::new(vec![mk(35.0), mk(45.0), mk(20.0)])
    }

    #[test]
    fn head_keeps_order() {
        let t = table().head(2);
        assert_eq!(t.len(), 2);
        assert_eq!(t.rows[0].value("pe"), Some(&Value::Float(35.0)));
        assert_eq!(t.rows[1].value("pe"), Some(&Value::Float(45.0)));
    }

    #[test]
    fn columns_union_in_first_seen_order() {
        let mut t = table();
        t.rows[2].push("roe", Value::Float(10.0));
        assert_eq!(t.columns(), vec!["pe".to_string(), "roe".to_string()]);
    }

    #[test]
    fn sort_desc_sinks_missing_values() {
        let mut t = table();
        t.rows.push(Row::new(vec![FieldValue::new(
            "name",
            Value::String("x".into()),
        )]));
        t.sort_desc_by("pe");
        assert_eq!(t.rows[0].value("pe"), Some(&Value::Float(45.0)));
        assert_eq!(t.rows[2].value("pe"), Some(&Value::Float(20.0)));
        assert!(t.rows[3].value("pe").is_none());
    }
}

use crate::core::value::{FieldValue, Value};
use serde::{Deserialize, Serialize};

/// One record of tabular market data, keyed by field name.
///
/// Field order is preserved for rendering. Lookup is by exact name: row
/// keys come straight from the upstream table (ASCII metric names or CJK
/// labels alike) and must match the condition text character for character.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct Row {
    pub fields: Vec<FieldValue>,
}

impl Row {
    pub fn new(fields: Vec<FieldValue>) -> Self {
        Row { fields }
    }

    pub fn push(&mut self, name: impl Into<String>, value: Value) {
        self.fields.push(FieldValue::new(name, value));
    }

    pub fn get(&self, field: &str) -> Option<&FieldValue> {
        self.fields.iter().find(|f| f.name == field)
    }

    pub fn value(&self, field: &str) -> Option<&Value> {
        self.get(field).map(|f| &f.value)
    }

    pub fn set(&mut self, field: &str, value: Value) {
        match self.fields.iter_mut().find(|f| f.name == field) {
            Some(existing) => existing.value = value,
            None => self.push(field.to_string(), value),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row() -> Row {
        Row::new(vec![
            FieldValue::new("pe", Value::Float(35.0)),
            FieldValue::new("近3年", Value::Float(12.0)),
        ])
    }

    #[test]
    fn lookup_is_exact() {
        let r = row();
        assert!(r.value("pe").is_some());
        assert!(r.value("PE").is_none());
        assert!(r.value("近3年").is_some());
        assert!(r.value("近3月").is_none());
    }

    #[test]
    fn set_replaces_in_place() {
        let mut r = row();
        r.set("pe", Value::Float(40.0));
        assert_eq!(r.value("pe"), Some(&Value::Float(40.0)));
        assert_eq!(r.fields.len(), 2);
        r.set("roe", Value::Float(20.0));
        assert_eq!(r.fields.len(), 3);
    }
}

use serde::{Deserialize, Serialize};
use std::fmt;

/// Right-hand side of a clause. The type is inferred from the surface
/// form: anything matching the numeric pattern is a number, the rest is
/// text (with symmetric surrounding quotes stripped).
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub enum Literal {
    Number(f64),
    Text(String),
}

impl Literal {
    pub fn is_text(&self) -> bool {
        matches!(self, Literal::Text(_))
    }
}

impl fmt::Display for Literal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Literal::Number(n) => write!(f, "{n}"),
            Literal::Text(s) => write!(f, "'{s}'"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn literal_display() {
        assert_eq!(format!("{}", Literal::Number(42.5)), "42.5");
        assert_eq!(format!("{}", Literal::Text("股票型".into())), "'股票型'");
    }
}

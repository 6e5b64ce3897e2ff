use serde::{Deserialize, Serialize};
use std::{cmp::Ordering, fmt};

/// Comparison operators of the condition language.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Comparator {
    LessThan,
    LessOrEqual,
    GreaterThan,
    GreaterOrEqual,
    Equal,
    NotEqual,
}

impl Comparator {
    /// Ordering comparators require numeric literals; only equality works
    /// on text.
    pub fn is_ordering(&self) -> bool {
        !matches!(self, Comparator::Equal | Comparator::NotEqual)
    }

    /// Whether a concrete ordering between row value and literal satisfies
    /// this comparator.
    pub fn holds(&self, ord: Ordering) -> bool {
        match self {
            Comparator::LessThan => ord == Ordering::Less,
            Comparator::LessOrEqual => ord != Ordering::Greater,
            Comparator::GreaterThan => ord == Ordering::Greater,
            Comparator::GreaterOrEqual => ord != Ordering::Less,
            Comparator::Equal => ord == Ordering::Equal,
            Comparator::NotEqual => ord != Ordering::Equal,
        }
    }
}

impl fmt::Display for Comparator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Comparator::LessThan => write!(f, "<"),
            Comparator::LessOrEqual => write!(f, "<="),
            Comparator::GreaterThan => write!(f, ">"),
            Comparator::GreaterOrEqual => write!(f, ">="),
            Comparator::Equal => write!(f, "=="),
            Comparator::NotEqual => write!(f, "!="),
        }
    }
}

/// The logical connective joining clauses. One condition uses exactly one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Connective {
    And,
    Or,
}

impl fmt::Display for Connective {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Connective::And => write!(f, "AND"),
            Connective::Or => write!(f, "OR"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn comparator_display() {
        assert_eq!(format!("{}", Comparator::Equal), "==");
        assert_eq!(format!("{}", Comparator::LessOrEqual), "<=");
        assert_eq!(format!("{}", Connective::Or), "OR");
    }

    #[test]
    fn holds_covers_boundaries() {
        assert!(Comparator::LessOrEqual.holds(Ordering::Equal));
        assert!(Comparator::GreaterOrEqual.holds(Ordering::Equal));
        assert!(!Comparator::LessThan.holds(Ordering::Equal));
        assert!(Comparator::NotEqual.holds(Ordering::Less));
    }
}

use crate::ast::literal::Literal;
use crate::ast::operator::{Comparator, Connective};
use serde::{Deserialize, Serialize};
use std::fmt;

/// A single field/comparator/literal triple.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Clause {
    pub field: String,
    pub comparator: Comparator,
    pub literal: Literal,
}

impl fmt::Display for Clause {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {} {}", self.field, self.comparator, self.literal)
    }
}

/// An ordered sequence of clauses joined by one uniform connective.
///
/// Built fresh from each incoming condition string and discarded after a
/// single evaluation pass; holds no state across calls. Zero clauses means
/// "accept every row".
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Condition {
    pub connective: Connective,
    pub clauses: Vec<Clause>,
}

impl Condition {
    pub fn accept_all() -> Self {
        Condition {
            connective: Connective::And,
            clauses: Vec::new(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.clauses.is_empty()
    }
}

use crate::ast::operator::Comparator;
use thiserror::Error;

#[derive(Debug, Error, PartialEq)]
pub enum ConditionError {
    /// The text cannot be decomposed into uniform-connective comparison
    /// clauses. Carries the offending fragment so the caller can point at
    /// the exact part of the condition string that failed.
    #[error("Malformed condition: {detail} in '{fragment}'")]
    MalformedCondition { fragment: String, detail: String },

    /// An ordering comparator was written against a text literal. Raised
    /// at parse time; evaluation never sees such a clause.
    #[error("Type mismatch: comparator '{comparator}' requires a numeric literal, got '{literal}'")]
    TypeMismatch {
        comparator: Comparator,
        literal: String,
    },
}

impl ConditionError {
    pub(crate) fn malformed(fragment: &str, detail: impl Into<String>) -> Self {
        ConditionError::MalformedCondition {
            fragment: fragment.trim().to_string(),
            detail: detail.into(),
        }
    }
}

pub mod eval;

pub use condition_syntax::ConditionError;
pub use eval::{apply_filter, filter, row_matches};

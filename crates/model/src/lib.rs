pub mod core;
pub mod records;

pub use crate::core::value::{FieldValue, Value};
pub use crate::records::row::Row;
pub use crate::records::table::Table;

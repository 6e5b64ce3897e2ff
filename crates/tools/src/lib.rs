pub mod error;
pub mod funds;
pub mod indexes;
pub mod params;
pub mod registry;
pub mod render;
pub mod stocks;

use async_trait::async_trait;
use serde_json::Value;

pub use error::ToolError;
pub use registry::ToolRegistry;

/// Declarative description of a tool: its wire name and a JSON-Schema
/// object for the parameters, the shape callers list before invoking.
pub struct ToolSchema {
    pub name: &'static str,
    pub description: &'static str,
    pub parameters: Value,
}

/// A remote-callable market-data operation. `execute` returns the result
/// table rendered as markdown, ready for transport.
#[async_trait]
pub trait Tool: Send + Sync {
    fn schema(&self) -> ToolSchema;

    fn validate(&self, params: &Value) -> Result<(), ToolError> {
        let _ = params;
        Ok(())
    }

    async fn execute(&self, params: Value) -> Result<String, ToolError>;
}

/// Apply an optional condition string to a fetched table. Absent or empty
/// conditions pass the table through untouched.
pub(crate) fn maybe_filter(
    table: model::Table,
    condition: Option<&str>,
) -> Result<model::Table, ToolError> {
    match condition {
        Some(text) => Ok(filter_engine::apply_filter(&table, text)?),
        None => Ok(table),
    }
}

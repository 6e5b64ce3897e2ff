use condition_syntax::ConditionError;
use connectors::ConnectorError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ToolError {
    #[error("Invalid parameters: {0}")]
    InvalidParams(String),

    #[error("Unknown tool: {0}")]
    UnknownTool(String),

    #[error(transparent)]
    Condition(#[from] ConditionError),

    #[error("Data source error: {0}")]
    Connector(#[from] ConnectorError),
}

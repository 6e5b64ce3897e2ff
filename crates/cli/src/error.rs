use connectors::ConnectorError;
use thiserror::Error;
use tools::ToolError;

#[derive(Error, Debug)]
pub enum CliError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse parameters as JSON: {0}")]
    ParamsParse(#[from] serde_json::Error),

    #[error("Failed to serialize data to JSON: {0}")]
    JsonSerialize(serde_json::Error),

    #[error(transparent)]
    Tool(#[from] ToolError),

    #[error("Data source error: {0}")]
    Connector(#[from] ConnectorError),
}

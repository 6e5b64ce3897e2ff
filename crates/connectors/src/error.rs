use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConnectorError {
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Unexpected status {status} from {url}")]
    Status { url: String, status: u16 },

    #[error("Failed to decode payload from {source_name}: {detail}")]
    Decode {
        source_name: &'static str,
        detail: String,
    },

    #[error("No data returned for '{0}'")]
    NoData(String),

    #[error("Unrecognized symbol '{0}'")]
    UnknownSymbol(String),
}

impl ConnectorError {
    pub(crate) fn decode(source_name: &'static str, detail: impl Into<String>) -> Self {
        ConnectorError::Decode {
            source_name,
            detail: detail.into(),
        }
    }
}

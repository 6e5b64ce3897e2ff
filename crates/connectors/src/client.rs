use crate::error::ConnectorError;
use std::time::Duration;
use tracing::debug;

const USER_AGENT: &str =
    "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) AppleWebKit/537.36";

/// Shared HTTP handle for all market-data sources. The quote hosts reject
/// clients without a browser-like User-Agent and a matching Referer, so
/// both are attached on every request.
#[derive(Debug, Clone)]
pub struct MarketClient {
    http: reqwest::Client,
}

impl MarketClient {
    pub fn new() -> Result<Self, ConnectorError> {
        let http = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .timeout(Duration::from_secs(15))
            .build()?;
        Ok(MarketClient { http })
    }

    pub(crate) async fn get_json(
        &self,
        url: &str,
        referer: &str,
    ) -> Result<serde_json::Value, ConnectorError> {
        debug!(url, "GET json");
        let resp = self.http.get(url).header("Referer", referer).send().await?;
        let status = resp.status();
        if !status.is_success() {
            return Err(ConnectorError::Status {
                url: url.to_string(),
                status: status.as_u16(),
            });
        }
        Ok(resp.json().await?)
    }

    pub(crate) async fn get_text(
        &self,
        url: &str,
        referer: &str,
    ) -> Result<String, ConnectorError> {
        debug!(url, "GET text");
        let resp = self.http.get(url).header("Referer", referer).send().await?;
        let status = resp.status();
        if !status.is_success() {
            return Err(ConnectorError::Status {
                url: url.to_string(),
                status: status.as_u16(),
            });
        }
        Ok(resp.text().await?)
    }
}

//! Index history tools, served from the Sina kline endpoints.

use crate::error::ToolError;
use crate::params::{condition_param, str_param};
use crate::{maybe_filter, render, Tool, ToolSchema};
use async_trait::async_trait;
use connectors::{sina, MarketClient};
use serde_json::json;
use std::sync::Arc;

fn index_parameters(desc: &str, default: &str) -> serde_json::Value {
    json!({
        "type": "object",
        "properties": {
            "symbol": {
                "type": "string",
                "description": desc,
                "default": default,
            },
            "condition": {
                "type": "string",
                "description": "Row filter over returned fields, e.g. \"close > 20000\"",
            },
        },
        "required": [],
    })
}

pub struct HkIndexInfoTool {
    client: Arc<MarketClient>,
}

impl HkIndexInfoTool {
    pub fn new(client: Arc<MarketClient>) -> Self {
        HkIndexInfoTool { client }
    }
}

#[async_trait]
impl Tool for HkIndexInfoTool {
    fn schema(&self) -> ToolSchema {
        ToolSchema {
            name: "get_hk_index_info",
            description: "Daily history for a Hong Kong index. HSI (恒生指数) by default; also \
                          HSCEI (恒生国企指数), HSCCI (恒生红筹指数).",
            parameters: index_parameters("HK index code", "HSI"),
        }
    }

    async fn execute(&self, params: serde_json::Value) -> Result<String, ToolError> {
        let symbol = str_param(&params, "symbol").unwrap_or("HSI");
        let table = sina::hk_index_daily(&self.client, symbol).await?;
        let table = maybe_filter(table, condition_param(&params))?;
        Ok(render::to_markdown(&table.head(10)))
    }
}

pub struct UsIndexInfoTool {
    client: Arc<MarketClient>,
}

impl UsIndexInfoTool {
    pub fn new(client: Arc<MarketClient>) -> Self {
        UsIndexInfoTool { client }
    }
}

#[async_trait]
impl Tool for UsIndexInfoTool {
    fn schema(&self) -> ToolSchema {
        ToolSchema {
            name: "get_us_index_info",
            description: "Daily history for a US index. .IXIC (Nasdaq) by default; also .DJI \
                          (Dow Jones), .INX (S&P 500).",
            parameters: index_parameters("US index code", ".IXIC"),
        }
    }

    async fn execute(&self, params: serde_json::Value) -> Result<String, ToolError> {
        let symbol = str_param(&params, "symbol").unwrap_or(".IXIC");
        let table = sina::us_index_daily(&self.client, symbol).await?;
        let table = maybe_filter(table, condition_param(&params))?;
        Ok(render::to_markdown(&table.head(10)))
    }
}

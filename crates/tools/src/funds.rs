//! Fund-side tools: fund directory, index-fund rankings, the realtime ETF
//! board, ETF history from two sources, and the HK fund ranking list.

use crate::error::ToolError;
use crate::params::{condition_param, enum_param, str_param, validate_compact_date};
use crate::{maybe_filter, render, Tool, ToolSchema};
use async_trait::async_trait;
use connectors::eastmoney::{self, Adjust, KlineBar, KlinePeriod};
use connectors::{sina, MarketClient};
use model::{Table, Value};
use serde_json::json;
use std::sync::Arc;

const FUND_SYMBOLS: [&str; 8] = [
    "全部", "沪深指数", "行业主题", "大盘指数", "中盘指数", "小盘指数", "股票指数", "债券指数",
];
const FUND_INDICATORS: [&str; 3] = ["全部", "被动指数型", "增强指数型"];
const PERIODS: [&str; 3] = ["daily", "weekly", "monthly"];
const ADJUSTS: [&str; 3] = ["", "qfq", "hfq"];

/// Preferred sort columns for fund rankings, best available wins.
const SORT_PREFERENCE: [&str; 4] = ["近1周", "近1月", "近3月", "近1年"];

pub struct FundNameTool {
    client: Arc<MarketClient>,
}

impl FundNameTool {
    pub fn new(client: Arc<MarketClient>) -> Self {
        FundNameTool { client }
    }
}

#[async_trait]
impl Tool for FundNameTool {
    fn schema(&self) -> ToolSchema {
        ToolSchema {
            name: "fund_name_em",
            description: "All funds' code, abbreviation, name and type.",
            parameters: json!({ "type": "object", "properties": {}, "required": [] }),
        }
    }

    async fn execute(&self, _params: serde_json::Value) -> Result<String, ToolError> {
        let table = eastmoney::fund_names(&self.client).await?;
        Ok(render::to_markdown(&table))
    }
}

/// Index-fund rankings: NAV, growth rates over standard horizons, fees.
pub struct FundInfoIndexTool {
    client: Arc<MarketClient>,
}

impl FundInfoIndexTool {
    pub fn new(client: Arc<MarketClient>) -> Self {
        FundInfoIndexTool { client }
    }
}

#[async_trait]
impl Tool for FundInfoIndexTool {
    fn schema(&self) -> ToolSchema {
        ToolSchema {
            name: "fund_info_index_em",
            description: "Index fund rankings with NAV, growth rates (近1周 … 成立来) and fees \
                          (手续费). Filter with conditions like \"近3年 > 5 AND 手续费 < 1.5\".",
            parameters: json!({
                "type": "object",
                "properties": {
                    "symbol": {
                        "type": "string",
                        "description": "Index family",
                        "enum": FUND_SYMBOLS,
                        "default": "沪深指数",
                    },
                    "indicator": {
                        "type": "string",
                        "description": "Tracking style",
                        "enum": FUND_INDICATORS,
                        "default": "被动指数型",
                    },
                    "condition": {
                        "type": "string",
                        "description": "Row filter over returned fields",
                    },
                },
                "required": [],
            }),
        }
    }

    fn validate(&self, params: &serde_json::Value) -> Result<(), ToolError> {
        enum_param(params, "symbol", "沪深指数", &FUND_SYMBOLS)?;
        enum_param(params, "indicator", "被动指数型", &FUND_INDICATORS)?;
        Ok(())
    }

    async fn execute(&self, params: serde_json::Value) -> Result<String, ToolError> {
        let symbol = enum_param(&params, "symbol", "沪深指数", &FUND_SYMBOLS)?;
        let indicator = enum_param(&params, "indicator", "被动指数型", &FUND_INDICATORS)?;

        let mut table = eastmoney::fund_rankings(&self.client, symbol, indicator).await?;
        let columns = table.columns();
        if let Some(sort_col) = SORT_PREFERENCE
            .iter()
            .find(|c| columns.iter().any(|col| col == *c))
        {
            table.sort_desc_by(sort_col);
        }
        let table = maybe_filter(table, condition_param(&params))?;
        Ok(render::to_markdown(&table.head(10)))
    }
}

/// Realtime ETF board.
pub struct FundEtfSpotTool {
    client: Arc<MarketClient>,
}

impl FundEtfSpotTool {
    pub fn new(client: Arc<MarketClient>) -> Self {
        FundEtfSpotTool { client }
    }
}

#[async_trait]
impl Tool for FundEtfSpotTool {
    fn schema(&self) -> ToolSchema {
        ToolSchema {
            name: "fund_etf_spot_ths",
            description: "Realtime ETF quotes. Optional date stamps the 查询日期 column; empty \
                          means the latest session.",
            parameters: json!({
                "type": "object",
                "properties": {
                    "date": {
                        "type": "string",
                        "description": "Query date (yyyyMMdd); empty for latest",
                        "default": "",
                    },
                    "condition": {
                        "type": "string",
                        "description": "Row filter over returned fields",
                    },
                },
                "required": [],
            }),
        }
    }

    fn validate(&self, params: &serde_json::Value) -> Result<(), ToolError> {
        if let Some(date) = str_param(params, "date")
            && !date.is_empty()
        {
            validate_compact_date("date", date)?;
        }
        Ok(())
    }

    async fn execute(&self, params: serde_json::Value) -> Result<String, ToolError> {
        self.validate(&params)?;
        let date = str_param(&params, "date").unwrap_or("");
        let stamp = if date.is_empty() {
            chrono::Local::now().format("%Y%m%d").to_string()
        } else {
            date.to_string()
        };

        let mut table = eastmoney::etf_spot(&self.client).await?;
        for row in &mut table.rows {
            row.push("查询日期", Value::String(stamp.clone()));
        }
        let table = maybe_filter(table, condition_param(&params))?;
        Ok(render::to_markdown(&table))
    }
}

/// ETF K-line history with period and adjustment options.
pub struct FundEtfHistTool {
    client: Arc<MarketClient>,
}

impl FundEtfHistTool {
    pub fn new(client: Arc<MarketClient>) -> Self {
        FundEtfHistTool { client }
    }
}

#[async_trait]
impl Tool for FundEtfHistTool {
    fn schema(&self) -> ToolSchema {
        ToolSchema {
            name: "fund_etf_hist_em",
            description: "ETF K-line history (日期/开盘/收盘/最高/最低/成交量/成交额/振幅/涨跌幅/\
                          涨跌额/换手率). Filter with conditions like \"收盘 > 1 AND 成交量 > 100000\".",
            parameters: json!({
                "type": "object",
                "properties": {
                    "symbol": {
                        "type": "string",
                        "description": "ETF code",
                        "examples": ["159707", "510300"],
                        "default": "159707",
                    },
                    "period": {
                        "type": "string",
                        "enum": PERIODS,
                        "default": "daily",
                    },
                    "start_date": {
                        "type": "string",
                        "description": "Start date (yyyyMMdd)",
                        "pattern": "^\\d{8}$",
                        "default": "19700101",
                    },
                    "end_date": {
                        "type": "string",
                        "description": "End date (yyyyMMdd)",
                        "pattern": "^\\d{8}$",
                        "default": "20500101",
                    },
                    "adjust": {
                        "type": "string",
                        "enum": ADJUSTS,
                        "default": "",
                    },
                    "condition": {
                        "type": "string",
                        "description": "Row filter over returned fields",
                    },
                },
                "required": ["symbol"],
            }),
        }
    }

    fn validate(&self, params: &serde_json::Value) -> Result<(), ToolError> {
        enum_param(params, "period", "daily", &PERIODS)?;
        enum_param(params, "adjust", "", &ADJUSTS)?;
        if let Some(date) = str_param(params, "start_date") {
            validate_compact_date("start_date", date)?;
        }
        if let Some(date) = str_param(params, "end_date") {
            validate_compact_date("end_date", date)?;
        }
        Ok(())
    }

    async fn execute(&self, params: serde_json::Value) -> Result<String, ToolError> {
        self.validate(&params)?;
        let symbol = str_param(&params, "symbol").unwrap_or("159707");
        let period = enum_param(&params, "period", "daily", &PERIODS)?;
        let period = KlinePeriod::from_name(period)
            .ok_or_else(|| ToolError::InvalidParams(format!("bad period '{period}'")))?;
        let adjust = enum_param(&params, "adjust", "", &ADJUSTS)?;
        let adjust = Adjust::from_name(adjust)
            .ok_or_else(|| ToolError::InvalidParams(format!("bad adjust '{adjust}'")))?;
        let start = str_param(&params, "start_date").unwrap_or("19700101");
        let end = str_param(&params, "end_date").unwrap_or("20500101");

        let (_, bars) =
            eastmoney::kline(&self.client, symbol, period, adjust, start, end).await?;
        let table: Table = bars.iter().map(KlineBar::to_full_row_cn).collect();
        let table = maybe_filter(table, condition_param(&params))?;
        Ok(render::to_markdown(&table))
    }
}

/// ETF daily history from Sina.
pub struct FundEtfHistSinaTool {
    client: Arc<MarketClient>,
}

impl FundEtfHistSinaTool {
    pub fn new(client: Arc<MarketClient>) -> Self {
        FundEtfHistSinaTool { client }
    }
}

#[async_trait]
impl Tool for FundEtfHistSinaTool {
    fn schema(&self) -> ToolSchema {
        ToolSchema {
            name: "fund_etf_hist_sina",
            description: "ETF daily history (date/open/high/low/close/volume) from Sina.",
            parameters: json!({
                "type": "object",
                "properties": {
                    "symbol": {
                        "type": "string",
                        "description": "Exchange-prefixed ETF code",
                        "examples": ["sh510050", "sz159915"],
                        "default": "sh510050",
                    },
                    "condition": {
                        "type": "string",
                        "description": "Row filter over returned fields",
                    },
                },
                "required": ["symbol"],
            }),
        }
    }

    async fn execute(&self, params: serde_json::Value) -> Result<String, ToolError> {
        let symbol = str_param(&params, "symbol").unwrap_or("sh510050");
        let table = sina::etf_hist(&self.client, symbol).await?;
        let table = maybe_filter(table, condition_param(&params))?;
        Ok(render::to_markdown(&table))
    }
}

/// HK fund ranking list.
pub struct FundHkRankTool {
    client: Arc<MarketClient>,
}

impl FundHkRankTool {
    pub fn new(client: Arc<MarketClient>) -> Self {
        FundHkRankTool { client }
    }
}

#[async_trait]
impl Tool for FundHkRankTool {
    fn schema(&self) -> ToolSchema {
        ToolSchema {
            name: "fund_hk_rank_em",
            description: "Hong Kong fund rankings (币种/单位净值/日增长率/近1周 … 成立来/可购买). \
                          Filter with conditions like \"日增长率 > 0 AND 近1年 > 10\".",
            parameters: json!({
                "type": "object",
                "properties": {
                    "condition": {
                        "type": "string",
                        "description": "Row filter over returned fields",
                    },
                },
                "required": [],
            }),
        }
    }

    async fn execute(&self, params: serde_json::Value) -> Result<String, ToolError> {
        let table = eastmoney::hk_fund_rankings(&self.client).await?;
        let table = maybe_filter(table, condition_param(&params))?;
        Ok(render::to_markdown(&table))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn fund_info_rejects_unknown_families() {
        let client = Arc::new(MarketClient::new().unwrap());
        let tool = FundInfoIndexTool::new(client);
        assert!(tool.validate(&json!({"symbol": "外汇"})).is_err());
        assert!(tool.validate(&json!({"indicator": "主动型"})).is_err());
        assert!(tool.validate(&json!({})).is_ok());
    }

    #[test]
    fn etf_hist_validates_dates_and_enums() {
        let client = Arc::new(MarketClient::new().unwrap());
        let tool = FundEtfHistTool::new(client);
        assert!(tool
            .validate(&json!({"symbol": "159707", "period": "hourly"}))
            .is_err());
        assert!(tool
            .validate(&json!({"symbol": "159707", "start_date": "2023"}))
            .is_err());
        assert!(tool
            .validate(&json!({"symbol": "159707", "period": "weekly", "adjust": "qfq"}))
            .is_ok());
    }

    #[test]
    fn etf_spot_accepts_empty_date() {
        let client = Arc::new(MarketClient::new().unwrap());
        let tool = FundEtfSpotTool::new(client);
        assert!(tool.validate(&json!({"date": ""})).is_ok());
        assert!(tool.validate(&json!({"date": "20240620"})).is_ok());
        assert!(tool.validate(&json!({"date": "June 20"})).is_err());
    }
}

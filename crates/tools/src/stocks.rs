//! Stock-side tools: HK/US daily history, the merged A-share history with
//! valuation metrics, and the index indicator screen.

use crate::error::ToolError;
use crate::params::{
    condition_param, enum_param, required_str, u64_param, validate_compact_date,
};
use crate::{maybe_filter, render, Tool, ToolSchema};
use async_trait::async_trait;
use connectors::eastmoney::{self, Adjust, KlineBar, KlinePeriod};
use connectors::{valuation, ConnectorError, MarketClient};
use model::{Table, Value};
use serde_json::json;
use std::sync::Arc;
use std::time::Duration;
use tracing::warn;

/// Open-ended date range for history fetches.
const OPEN_START: &str = "19700101";
const OPEN_END: &str = "20500101";

/// Index family whose equal-weight rolling PE gets merged onto single-stock
/// history.
const DEFAULT_PE_INDEX: &str = "沪深300";

const ADJUST_VALUES: [&str; 3] = ["qfq", "hfq", ""];

const INDICATOR_TYPES: [&str; 12] = [
    "上证50", "沪深300", "上证380", "创业板50", "中证500", "上证180",
    "深证红利", "深证100", "中证1000", "上证红利", "中证100", "中证800",
];

/// Daily OHLCV history for one stock, filtered and truncated the way the
/// HK/US history tools return it.
async fn stock_history(
    client: &MarketClient,
    code: &str,
    adjust: Adjust,
    condition: Option<&str>,
) -> Result<String, ToolError> {
    let (_, bars) = eastmoney::kline(
        client,
        code,
        KlinePeriod::Daily,
        adjust,
        OPEN_START,
        OPEN_END,
    )
    .await?;
    let table: Table = bars.iter().map(KlineBar::to_ohlcv_row).collect();
    let table = maybe_filter(table, condition)?;
    Ok(render::to_markdown(&table.head(10)))
}

fn history_parameters(code_desc: &str, code_examples: &[&str]) -> serde_json::Value {
    json!({
        "type": "object",
        "properties": {
            "stock_code": {
                "type": "string",
                "description": code_desc,
                "examples": code_examples,
            },
            "adjust": {
                "type": "string",
                "description": "Price adjustment: qfq (forward), hfq (backward), \"\" (raw)",
                "enum": ADJUST_VALUES,
                "default": "qfq",
            },
            "condition": {
                "type": "string",
                "description": "Row filter over returned fields, e.g. \"close > 300 AND volume > 1000000\"",
            },
        },
        "required": ["stock_code"],
    })
}

pub struct HkStockInfoTool {
    client: Arc<MarketClient>,
}

impl HkStockInfoTool {
    pub fn new(client: Arc<MarketClient>) -> Self {
        HkStockInfoTool { client }
    }
}

#[async_trait]
impl Tool for HkStockInfoTool {
    fn schema(&self) -> ToolSchema {
        ToolSchema {
            name: "get_hk_stock_info",
            description: "Daily history (date/open/high/low/close/volume) for a Hong Kong stock, \
                          optionally filtered by a condition string.",
            parameters: history_parameters("HK stock code", &["00700", "09988"]),
        }
    }

    fn validate(&self, params: &serde_json::Value) -> Result<(), ToolError> {
        required_str(params, "stock_code")?;
        enum_param(params, "adjust", "qfq", &ADJUST_VALUES)?;
        Ok(())
    }

    async fn execute(&self, params: serde_json::Value) -> Result<String, ToolError> {
        let code = required_str(&params, "stock_code")?;
        let adjust = enum_param(&params, "adjust", "qfq", &ADJUST_VALUES)?;
        let adjust = Adjust::from_name(adjust)
            .ok_or_else(|| ToolError::InvalidParams(format!("bad adjust '{adjust}'")))?;
        stock_history(&self.client, code, adjust, condition_param(&params)).await
    }
}

pub struct UsStockInfoTool {
    client: Arc<MarketClient>,
}

impl UsStockInfoTool {
    pub fn new(client: Arc<MarketClient>) -> Self {
        UsStockInfoTool { client }
    }
}

#[async_trait]
impl Tool for UsStockInfoTool {
    fn schema(&self) -> ToolSchema {
        ToolSchema {
            name: "get_us_stock_info",
            description: "Daily history (date/open/high/low/close/volume) for a US stock, \
                          optionally filtered by a condition string.",
            parameters: history_parameters("US ticker", &["AAPL", "TSLA"]),
        }
    }

    fn validate(&self, params: &serde_json::Value) -> Result<(), ToolError> {
        required_str(params, "stock_code")?;
        enum_param(params, "adjust", "qfq", &ADJUST_VALUES)?;
        Ok(())
    }

    async fn execute(&self, params: serde_json::Value) -> Result<String, ToolError> {
        let code = required_str(&params, "stock_code")?;
        let adjust = enum_param(&params, "adjust", "qfq", &ADJUST_VALUES)?;
        let adjust = Adjust::from_name(adjust)
            .ok_or_else(|| ToolError::InvalidParams(format!("bad adjust '{adjust}'")))?;
        stock_history(&self.client, code, adjust, condition_param(&params)).await
    }
}

/// A-share daily history in a date range, enriched with the index-level
/// equal-weight rolling PE and the stock's quarterly ROE, both merged
/// as-of backward onto the trading dates.
pub struct SingleStockInfoTool {
    client: Arc<MarketClient>,
}

impl SingleStockInfoTool {
    pub fn new(client: Arc<MarketClient>) -> Self {
        SingleStockInfoTool { client }
    }

    async fn fetch(&self, code: &str, start: &str, end: &str) -> Result<Table, ToolError> {
        let (_, bars) = eastmoney::kline(
            &self.client,
            code,
            KlinePeriod::Daily,
            Adjust::Backward,
            start,
            end,
        )
        .await?;
        if bars.is_empty() {
            return Err(ConnectorError::NoData(code.to_string()).into());
        }
        let dates: Vec<String> = bars.iter().map(|b| b.date.clone()).collect();

        let points = valuation::index_valuation(&self.client, DEFAULT_PE_INDEX).await?;
        let pe_series: Vec<(String, f64)> = points
            .iter()
            .filter_map(|p| p.pe.map(|pe| (p.date.clone(), pe)))
            .collect();
        let pe = valuation::merge_backward(&dates, &pe_series);
        // Gaps fall back to the median of the values that did merge.
        let pe_median = median(pe.iter().flatten().copied().collect());

        let roe_series = eastmoney::roe_series(&self.client, code).await?;
        let roe = valuation::merge_backward(&dates, &roe_series);

        let mut rows = Vec::with_capacity(bars.len());
        for (i, bar) in bars.iter().enumerate() {
            let mut row = bar.to_full_row_en();
            row.push("code", Value::String(code.to_string()));
            let pe_cell = pe[i].or(pe_median).map(Value::Float).unwrap_or(Value::Null);
            row.push("pe", pe_cell);
            row.push("roe", roe[i].map(Value::Float).unwrap_or(Value::Null));
            rows.push(row);
        }
        Ok(Table::new(rows))
    }
}

#[async_trait]
impl Tool for SingleStockInfoTool {
    fn schema(&self) -> ToolSchema {
        ToolSchema {
            name: "get_single_stock_info",
            description: "A-share daily history with PE and ROE columns merged in. Supports a \
                          condition filter over the returned fields, e.g. \"pe > 20 AND roe >= 0.15\".",
            parameters: json!({
                "type": "object",
                "properties": {
                    "stock_code": {
                        "type": "string",
                        "description": "A-share code",
                        "examples": ["600000", "000001"],
                    },
                    "start_date": {
                        "type": "string",
                        "description": "Start date, yyyyMMdd",
                        "pattern": "^\\d{8}$",
                    },
                    "end_date": {
                        "type": "string",
                        "description": "End date, yyyyMMdd",
                        "pattern": "^\\d{8}$",
                    },
                    "retry": {
                        "type": "integer",
                        "description": "Fetch attempts before giving up",
                        "default": 3,
                        "minimum": 1,
                        "maximum": 5,
                    },
                    "condition": {
                        "type": "string",
                        "description": "Row filter over returned fields",
                    },
                },
                "required": ["stock_code", "start_date", "end_date"],
            }),
        }
    }

    fn validate(&self, params: &serde_json::Value) -> Result<(), ToolError> {
        required_str(params, "stock_code")?;
        validate_compact_date("start_date", required_str(params, "start_date")?)?;
        validate_compact_date("end_date", required_str(params, "end_date")?)?;
        Ok(())
    }

    async fn execute(&self, params: serde_json::Value) -> Result<String, ToolError> {
        let code = required_str(&params, "stock_code")?;
        let start = required_str(&params, "start_date")?;
        let end = required_str(&params, "end_date")?;
        validate_compact_date("start_date", start)?;
        validate_compact_date("end_date", end)?;
        let retry = u64_param(&params, "retry", 3).clamp(1, 5);

        let mut attempt = 0;
        let table = loop {
            attempt += 1;
            match self.fetch(code, start, end).await {
                Ok(table) => break table,
                Err(err) if attempt < retry => {
                    warn!(error = %err, attempt, code, "fetch failed, retrying");
                    tokio::time::sleep(Duration::from_secs(1)).await;
                }
                Err(err) => return Err(err),
            }
        };

        match condition_param(&params) {
            Some(text) => {
                let filtered = filter_engine::apply_filter(&table, text)?;
                Ok(render::to_markdown(&filtered))
            }
            None => Ok(render::to_markdown(&table.head(10))),
        }
    }
}

/// Index daily history merged with valuation percentiles: equal-weight
/// rolling PE/PB plus their five-year historical percentile ranks.
pub struct StockIndicatorTool {
    client: Arc<MarketClient>,
}

impl StockIndicatorTool {
    pub fn new(client: Arc<MarketClient>) -> Self {
        StockIndicatorTool { client }
    }

    /// Daily closes for the code, trying bare and exchange-prefixed
    /// spellings until one of them carries data.
    async fn load_index_daily(&self, code: &str) -> Result<Vec<KlineBar>, ToolError> {
        let candidates: Vec<String> = if code.starts_with("sh") || code.starts_with("sz") {
            vec![code.to_string()]
        } else {
            vec![code.to_string(), format!("sh{code}"), format!("sz{code}")]
        };
        let mut last_err: Option<ConnectorError> = None;
        for candidate in &candidates {
            match eastmoney::kline(
                &self.client,
                candidate,
                KlinePeriod::Daily,
                Adjust::None,
                OPEN_START,
                OPEN_END,
            )
            .await
            {
                Ok((_, bars)) if !bars.is_empty() => return Ok(bars),
                Ok(_) => continue,
                Err(err) => last_err = Some(err),
            }
        }
        Err(last_err
            .unwrap_or_else(|| ConnectorError::NoData(code.to_string()))
            .into())
    }

    /// Percentile rank series for one metric: 3σ trim, rolling five-year
    /// percentile, gap fill.
    fn percentile_ranks(series: &[(String, f64)]) -> Vec<(String, f64)> {
        let cleaned = valuation::drop_outliers_3sigma(series);
        let values: Vec<f64> = cleaned.iter().map(|(_, v)| *v).collect();
        let ranks = valuation::rolling_percentile(
            &values,
            valuation::PERCENTILE_WINDOW,
            valuation::PERCENTILE_MIN_OBS,
        );
        let filled = valuation::fill_gaps(&ranks);
        cleaned
            .iter()
            .zip(filled)
            .filter_map(|((date, _), rank)| rank.map(|r| (date.clone(), r)))
            .collect()
    }
}

#[async_trait]
impl Tool for StockIndicatorTool {
    fn schema(&self) -> ToolSchema {
        ToolSchema {
            name: "get_stock_indicator",
            description: "Index daily history with PE/PB and their five-year percentile ranks \
                          merged in. Supports conditions like \"pe_percentile > 20 OR pb_percentile > 20\".",
            parameters: json!({
                "type": "object",
                "properties": {
                    "stock_code": {
                        "type": "string",
                        "description": "Index or stock code",
                        "examples": ["600000", "000300"],
                    },
                    "indicator_type": {
                        "type": "string",
                        "description": "Index family for the valuation series",
                        "enum": INDICATOR_TYPES,
                        "default": "沪深300",
                    },
                    "condition": {
                        "type": "string",
                        "description": "Row filter over returned fields",
                    },
                },
                "required": ["stock_code"],
            }),
        }
    }

    fn validate(&self, params: &serde_json::Value) -> Result<(), ToolError> {
        required_str(params, "stock_code")?;
        enum_param(params, "indicator_type", "沪深300", &INDICATOR_TYPES)?;
        Ok(())
    }

    async fn execute(&self, params: serde_json::Value) -> Result<String, ToolError> {
        let code = required_str(&params, "stock_code")?;
        let indicator_type = enum_param(&params, "indicator_type", "沪深300", &INDICATOR_TYPES)?;

        let bars = self.load_index_daily(code).await?;
        let dates: Vec<String> = bars.iter().map(|b| b.date.clone()).collect();

        let points = valuation::index_valuation(&self.client, indicator_type).await?;
        let pe_series: Vec<(String, f64)> = points
            .iter()
            .filter_map(|p| p.pe.map(|v| (p.date.clone(), v)))
            .collect();
        let pb_series: Vec<(String, f64)> = points
            .iter()
            .filter_map(|p| p.pb.map(|v| (p.date.clone(), v)))
            .collect();

        let pe = valuation::merge_backward(&dates, &pe_series);
        let pb = valuation::merge_backward(&dates, &pb_series);
        let pe_pct =
            valuation::fill_gaps(&valuation::merge_backward(&dates, &Self::percentile_ranks(&pe_series)));
        let pb_pct =
            valuation::fill_gaps(&valuation::merge_backward(&dates, &Self::percentile_ranks(&pb_series)));

        let cell = |v: Option<f64>| v.map(Value::Float).unwrap_or(Value::Null);
        let mut rows = Vec::with_capacity(bars.len());
        for (i, bar) in bars.iter().enumerate() {
            let mut row = bar.to_ohlcv_row();
            row.push("pe", cell(pe[i]));
            row.push("pe_percentile", cell(pe_pct[i]));
            row.push("pb", cell(pb[i]));
            row.push("pb_percentile", cell(pb_pct[i]));
            rows.push(row);
        }
        let table = maybe_filter(Table::new(rows), condition_param(&params))?;
        Ok(render::to_markdown(&table))
    }
}

fn median(mut values: Vec<f64>) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    values.sort_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));
    let mid = values.len() / 2;
    if values.len() % 2 == 1 {
        Some(values[mid])
    } else {
        Some((values[mid - 1] + values[mid]) / 2.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn median_of_even_and_odd_sets() {
        assert_eq!(median(vec![3.0, 1.0, 2.0]), Some(2.0));
        assert_eq!(median(vec![4.0, 1.0, 2.0, 3.0]), Some(2.5));
        assert_eq!(median(vec![]), None);
    }

    #[test]
    fn hk_tool_validation_requires_code() {
        let client = Arc::new(MarketClient::new().unwrap());
        let tool = HkStockInfoTool::new(client);
        assert!(tool.validate(&json!({})).is_err());
        assert!(tool.validate(&json!({"stock_code": "00700"})).is_ok());
        assert!(tool
            .validate(&json!({"stock_code": "00700", "adjust": "bogus"}))
            .is_err());
    }

    #[test]
    fn single_stock_validation_checks_dates() {
        let client = Arc::new(MarketClient::new().unwrap());
        let tool = SingleStockInfoTool::new(client);
        let bad = json!({"stock_code": "600000", "start_date": "2023-01-01", "end_date": "20231231"});
        assert!(tool.validate(&bad).is_err());
        let good = json!({"stock_code": "600000", "start_date": "20230101", "end_date": "20231231"});
        assert!(tool.validate(&good).is_ok());
    }

    #[test]
    fn indicator_tool_rejects_unknown_index_family() {
        let client = Arc::new(MarketClient::new().unwrap());
        let tool = StockIndicatorTool::new(client);
        let params = json!({"stock_code": "600000", "indicator_type": "纳斯达克"});
        assert!(tool.validate(&params).is_err());
    }
}

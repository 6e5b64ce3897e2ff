//! Index valuation series and the statistics the indicator tool layers on
//! top of them: 3σ outlier trimming, rolling historical percentile (five
//! trading years, minimum 60 observations) and backward as-of merging.

use crate::client::MarketClient;
use crate::error::ConnectorError;
use tracing::debug;

const DATA_REFERER: &str = "https://data.eastmoney.com";

/// Trading days in five years, the percentile lookback window.
pub const PERCENTILE_WINDOW: usize = 1260;
/// Fewer observations than this yield no percentile.
pub const PERCENTILE_MIN_OBS: usize = 60;

/// One day of index-level valuation.
#[derive(Debug, Clone, PartialEq)]
pub struct ValuationPoint {
    pub date: String,
    pub pe: Option<f64>,
    pub pb: Option<f64>,
}

/// Daily equal-weight rolling PE / PB for a named index family
/// (沪深300, 上证50, …), ascending by date.
pub async fn index_valuation(
    client: &MarketClient,
    indicator_type: &str,
) -> Result<Vec<ValuationPoint>, ConnectorError> {
    let index_code = index_code_for(indicator_type)
        .ok_or_else(|| ConnectorError::UnknownSymbol(indicator_type.to_string()))?;
    let url = format!(
        "https://datacenter-web.eastmoney.com/api/data/v1/get?reportName=RPT_VALUEINDEX\
         &columns=TRADE_DATE,INDEX_CODE,PE_TTM,PB&filter=(INDEX_CODE=\"{index_code}\")\
         &pageSize=50000&sortColumns=TRADE_DATE&sortTypes=1&source=WEB&client=DATACENTER"
    );
    let body = client.get_json(&url, DATA_REFERER).await?;
    decode_valuation(&body)
}

fn index_code_for(indicator_type: &str) -> Option<&'static str> {
    match indicator_type {
        "上证50" => Some("000016"),
        "沪深300" => Some("000300"),
        "上证380" => Some("000009"),
        "创业板50" => Some("399673"),
        "中证500" => Some("000905"),
        "上证180" => Some("000010"),
        "深证红利" => Some("399324"),
        "深证100" => Some("399330"),
        "中证1000" => Some("000852"),
        "上证红利" => Some("000015"),
        "中证100" => Some("000903"),
        "中证800" => Some("000906"),
        _ => None,
    }
}

fn decode_valuation(body: &serde_json::Value) -> Result<Vec<ValuationPoint>, ConnectorError> {
    let data = body["result"]["data"]
        .as_array()
        .ok_or_else(|| ConnectorError::decode("eastmoney valuation", "missing 'result.data'"))?;

    let mut points = Vec::with_capacity(data.len());
    for item in data {
        let date = item["TRADE_DATE"].as_str().unwrap_or_default();
        let date = date.split_whitespace().next().unwrap_or(date).to_string();
        points.push(ValuationPoint {
            date,
            pe: item["PE_TTM"].as_f64().filter(|v| v.is_finite()),
            pb: item["PB"].as_f64().filter(|v| v.is_finite()),
        });
    }
    points.sort_by(|a, b| a.date.cmp(&b.date));
    debug!(points = points.len(), "decoded valuation series");
    Ok(points)
}

/// Drop observations outside mean ± 3σ. Applied to valuation series
/// before percentile ranking.
pub fn drop_outliers_3sigma(series: &[(String, f64)]) -> Vec<(String, f64)> {
    if series.is_empty() {
        return Vec::new();
    }
    let n = series.len() as f64;
    let mean = series.iter().map(|(_, v)| v).sum::<f64>() / n;
    let variance = series.iter().map(|(_, v)| (v - mean).powi(2)).sum::<f64>() / n;
    let sigma = variance.sqrt();
    let (lower, upper) = (mean - 3.0 * sigma, mean + 3.0 * sigma);
    series
        .iter()
        .filter(|(_, v)| *v > lower && *v < upper)
        .cloned()
        .collect()
}

/// Rolling percentile of each observation within its trailing window:
/// the share of preceding window values strictly below the current one,
/// scaled to 0..100. Positions with fewer than `min_obs` observations get
/// `None`.
pub fn rolling_percentile(values: &[f64], window: usize, min_obs: usize) -> Vec<Option<f64>> {
    let mut out = Vec::with_capacity(values.len());
    for i in 0..values.len() {
        let start = (i + 1).saturating_sub(window);
        let slice = &values[start..=i];
        if slice.len() < min_obs {
            out.push(None);
            continue;
        }
        let current = values[i];
        let history = &slice[..slice.len() - 1];
        let below = history.iter().filter(|v| current > **v).count();
        out.push(Some(below as f64 / history.len() as f64 * 100.0));
    }
    out
}

/// Forward- then backward-fill the gaps a rolling statistic leaves at the
/// series head. A series with no values at all comes back unchanged.
pub fn fill_gaps(series: &[Option<f64>]) -> Vec<Option<f64>> {
    let mut filled: Vec<Option<f64>> = Vec::with_capacity(series.len());
    let mut last = None;
    for v in series {
        if v.is_some() {
            last = *v;
        }
        filled.push(last);
    }
    let mut next = None;
    for v in filled.iter_mut().rev() {
        if v.is_some() {
            next = *v;
        } else {
            *v = next;
        }
    }
    filled
}

/// As-of backward merge: for each base date, the latest series value whose
/// date is at or before it. `series` must be ascending by date; ISO dates
/// compare lexically.
pub fn merge_backward(dates: &[String], series: &[(String, f64)]) -> Vec<Option<f64>> {
    let mut out = Vec::with_capacity(dates.len());
    for date in dates {
        let value = series
            .iter()
            .take_while(|(d, _)| d <= date)
            .last()
            .map(|(_, v)| *v);
        out.push(value);
    }
    out
}

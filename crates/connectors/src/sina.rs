//! Sina kline services. HK/US index dailies and CN ETF history all come
//! back as JSONP arrays of day objects with stringly-typed numbers.

use crate::client::MarketClient;
use crate::error::ConnectorError;
use crate::jsonp::strip_jsonp;
use model::{Row, Table, Value};

const REFERER: &str = "https://finance.sina.com.cn";

/// Daily history for an HK index (`HSI`, `HSCEI`, `HSCCI`).
pub async fn hk_index_daily(client: &MarketClient, symbol: &str) -> Result<Table, ConnectorError> {
    let url = format!(
        "https://quotes.sina.cn/hk/api/jsonp_v2.php/var%20_{}=/HK_MarketDataService.getKLineData?symbol={}&scale=240&datalen=1023",
        var_name(symbol),
        urlencoding::encode(symbol),
    );
    let body = client.get_text(&url, REFERER).await?;
    decode_day_objects(&body)
}

/// Daily history for a US index (`.IXIC`, `.DJI`, `.INX`).
pub async fn us_index_daily(client: &MarketClient, symbol: &str) -> Result<Table, ConnectorError> {
    let url = format!(
        "https://stock.finance.sina.com.cn/usstock/api/jsonp_v2.php/var%20_{}=/US_MarketDataService.getKLineData?symbol={}",
        var_name(symbol),
        urlencoding::encode(symbol),
    );
    let body = client.get_text(&url, REFERER).await?;
    decode_day_objects(&body)
}

/// Daily history for a CN-listed ETF (`sh510050`, `sz159915`).
pub async fn etf_hist(client: &MarketClient, symbol: &str) -> Result<Table, ConnectorError> {
    let url = format!(
        "https://quotes.sina.cn/cn/api/jsonp_v2.php/var%20_{}=/CN_MarketDataService.getKLineData?symbol={}&scale=240&ma=no&datalen=1023",
        var_name(symbol),
        urlencoding::encode(symbol),
    );
    let body = client.get_text(&url, REFERER).await?;
    decode_day_objects(&body)
}

/// The callback variable may only contain identifier characters; index
/// symbols like `.IXIC` need the dot replaced.
fn var_name(symbol: &str) -> String {
    symbol
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() { c } else { '_' })
        .collect()
}

fn decode_day_objects(body: &str) -> Result<Table, ConnectorError> {
    let json_text = strip_jsonp(body)?;
    let payload: serde_json::Value = serde_json::from_str(json_text)
        .map_err(|e| ConnectorError::decode("sina kline", e.to_string()))?;
    let entries = payload
        .as_array()
        .ok_or_else(|| ConnectorError::decode("sina kline", "expected array"))?;

    let mut rows = Vec::with_capacity(entries.len());
    for entry in entries {
        let date = entry["day"]
            .as_str()
            .or_else(|| entry["date"].as_str())
            .ok_or_else(|| ConnectorError::decode("sina kline", "entry without day/date"))?;
        let mut row = Row::default();
        row.push("date", Value::String(date.to_string()));
        for key in ["open", "high", "low", "close", "volume"] {
            row.push(key, numeric(&entry[key]));
        }
        rows.push(row);
    }
    Ok(Table::new(rows))
}

fn numeric(v: &serde_json::Value) -> Value {
    match v {
        serde_json::Value::String(s) => s
            .trim()
            .parse::<f64>()
            .map(Value::Float)
            .unwrap_or(Value::Null),
        other => match Value::from_json(other) {
            Value::Int(i) => Value::Float(i as f64),
            value => value,
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decode_day_objects_parses_string_numbers() {
        let body = concat!(
            "var _sh510050=([",
            r#"{"day":"2024-01-02","open":"2.480","high":"2.520","low":"2.460","close":"2.500","volume":"68154429"},"#,
            r#"{"day":"2024-01-03","open":"2.500","high":"2.510","low":"2.470","close":"2.480","volume":"51200000"}"#,
            "]);"
        );
        let table = decode_day_objects(body).unwrap();
        assert_eq!(table.len(), 2);
        assert_eq!(
            table.rows[0].value("date"),
            Some(&Value::String("2024-01-02".into()))
        );
        assert_eq!(table.rows[0].value("close"), Some(&Value::Float(2.5)));
        assert_eq!(table.rows[1].value("volume"), Some(&Value::Float(51_200_000.0)));
    }

    #[test]
    fn decode_day_objects_requires_dates() {
        let body = r#"cb([{"open":"1.0"}]);"#;
        assert!(decode_day_objects(body).is_err());
    }

    #[test]
    fn var_name_sanitizes_symbols() {
        assert_eq!(var_name(".IXIC"), "_IXIC");
        assert_eq!(var_name("sh510050"), "sh510050");
    }
}

//! Eastmoney endpoints: K-line history (stocks and ETFs across A-share,
//! HK and US markets), fund rankings, the realtime ETF board and the
//! financial-indicator report used for ROE.
//!
//! Fetching and payload decoding are kept apart so the decoders can be
//! exercised against canned payloads.

use crate::client::MarketClient;
use crate::error::ConnectorError;
use crate::jsonp::strip_js_assignment;
use crate::symbols::{secid_candidates, Market};
use model::{Row, Table, Value};
use tracing::{debug, warn};

const QUOTE_REFERER: &str = "https://quote.eastmoney.com";
const FUND_REFERER: &str = "https://fund.eastmoney.com";
const DATA_REFERER: &str = "https://data.eastmoney.com";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KlinePeriod {
    Daily,
    Weekly,
    Monthly,
}

impl KlinePeriod {
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "daily" => Some(KlinePeriod::Daily),
            "weekly" => Some(KlinePeriod::Weekly),
            "monthly" => Some(KlinePeriod::Monthly),
            _ => None,
        }
    }

    fn klt(&self) -> &'static str {
        match self {
            KlinePeriod::Daily => "101",
            KlinePeriod::Weekly => "102",
            KlinePeriod::Monthly => "103",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Adjust {
    /// Raw prices.
    None,
    /// 前复权.
    Forward,
    /// 后复权.
    Backward,
}

impl Adjust {
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "" => Some(Adjust::None),
            "qfq" => Some(Adjust::Forward),
            "hfq" => Some(Adjust::Backward),
            _ => None,
        }
    }

    fn fqt(&self) -> &'static str {
        match self {
            Adjust::None => "0",
            Adjust::Forward => "1",
            Adjust::Backward => "2",
        }
    }
}

/// One decoded K-line entry. The wire format is a comma-joined line:
/// date,open,close,high,low,volume,amount,amplitude,change%,change,turnover%.
#[derive(Debug, Clone, PartialEq)]
pub struct KlineBar {
    pub date: String,
    pub open: f64,
    pub close: f64,
    pub high: f64,
    pub low: f64,
    pub volume: f64,
    pub amount: f64,
    pub amplitude: f64,
    pub change_pct: f64,
    pub change: f64,
    pub turnover: f64,
}

impl KlineBar {
    /// The six-column shape the HK/US stock and index tools return.
    pub fn to_ohlcv_row(&self) -> Row {
        let mut row = Row::default();
        row.push("date", Value::String(self.date.clone()));
        row.push("open", Value::Float(self.open));
        row.push("high", Value::Float(self.high));
        row.push("low", Value::Float(self.low));
        row.push("close", Value::Float(self.close));
        row.push("volume", Value::Float(self.volume));
        row
    }

    /// Full A-share history shape with English metric names.
    pub fn to_full_row_en(&self) -> Row {
        let mut row = self.to_ohlcv_row();
        row.push("transAmount", Value::Float(self.amount));
        row.push("amplitude", Value::Float(self.amplitude));
        row.push("riseFall", Value::Float(self.change_pct));
        row.push("riseFallAmount", Value::Float(self.change));
        row.push("turnoverRate", Value::Float(self.turnover));
        row
    }

    /// Full history shape with the Chinese labels the ETF tool returns.
    pub fn to_full_row_cn(&self) -> Row {
        let mut row = Row::default();
        row.push("日期", Value::String(self.date.clone()));
        row.push("开盘", Value::Float(self.open));
        row.push("收盘", Value::Float(self.close));
        row.push("最高", Value::Float(self.high));
        row.push("最低", Value::Float(self.low));
        row.push("成交量", Value::Float(self.volume));
        row.push("成交额", Value::Float(self.amount));
        row.push("振幅", Value::Float(self.amplitude));
        row.push("涨跌幅", Value::Float(self.change_pct));
        row.push("涨跌额", Value::Float(self.change));
        row.push("换手率", Value::Float(self.turnover));
        row
    }
}

/// Fetch K-line history for a stock or ETF. US tickers resolve through
/// multiple exchange prefixes; candidates are tried in order until one
/// returns data.
pub async fn kline(
    client: &MarketClient,
    symbol: &str,
    period: KlinePeriod,
    adjust: Adjust,
    start_date: &str,
    end_date: &str,
) -> Result<(Market, Vec<KlineBar>), ConnectorError> {
    let (market, candidates) = secid_candidates(symbol)?;
    for secid in &candidates {
        let url = format!(
            "https://push2his.eastmoney.com/api/qt/stock/kline/get?secid={secid}\
             &fields1=f1,f2,f3,f4,f5,f6\
             &fields2=f51,f52,f53,f54,f55,f56,f57,f58,f59,f60,f61\
             &klt={}&fqt={}&beg={start_date}&end={end_date}&lmt=10000",
            period.klt(),
            adjust.fqt(),
        );
        let body = client.get_json(&url, QUOTE_REFERER).await?;
        let data = &body["data"];
        if data.is_null() {
            debug!(secid, "no kline data, trying next candidate");
            continue;
        }
        return Ok((market, decode_kline(data)?));
    }
    Err(ConnectorError::NoData(symbol.to_string()))
}

fn decode_kline(data: &serde_json::Value) -> Result<Vec<KlineBar>, ConnectorError> {
    let lines = data["klines"]
        .as_array()
        .ok_or_else(|| ConnectorError::decode("eastmoney kline", "missing 'klines' array"))?;

    let mut bars = Vec::with_capacity(lines.len());
    for line in lines {
        let line = line
            .as_str()
            .ok_or_else(|| ConnectorError::decode("eastmoney kline", "non-string kline entry"))?;
        let parts: Vec<&str> = line.split(',').collect();
        if parts.len() < 11 {
            return Err(ConnectorError::decode(
                "eastmoney kline",
                format!("short kline entry: '{line}'"),
            ));
        }
        let num = |i: usize| -> Result<f64, ConnectorError> {
            parts[i].parse::<f64>().map_err(|_| {
                ConnectorError::decode("eastmoney kline", format!("bad number in '{line}'"))
            })
        };
        bars.push(KlineBar {
            date: parts[0].to_string(),
            open: num(1)?,
            close: num(2)?,
            high: num(3)?,
            low: num(4)?,
            volume: num(5)?,
            amount: num(6)?,
            amplitude: num(7)?,
            change_pct: num(8)?,
            change: num(9)?,
            turnover: num(10)?,
        });
    }
    Ok(bars)
}

/// Index-fund ranking table (the 指数型基金 screen). `symbol` narrows the
/// index family, `indicator` picks passive vs enhanced tracking.
pub async fn fund_rankings(
    client: &MarketClient,
    symbol: &str,
    indicator: &str,
) -> Result<Table, ConnectorError> {
    let family = match symbol {
        "全部" => "",
        "沪深指数" => "053",
        "行业主题" => "054",
        "大盘指数" => "01",
        "中盘指数" => "02",
        "小盘指数" => "03",
        "股票指数" => "050",
        "债券指数" => "051",
        other => return Err(ConnectorError::UnknownSymbol(other.to_string())),
    };
    let tracking = match indicator {
        "全部" => "",
        "被动指数型" => "1",
        "增强指数型" => "2",
        other => return Err(ConnectorError::UnknownSymbol(other.to_string())),
    };
    let url = format!(
        "https://fund.eastmoney.com/data/rankhandler.aspx?op=ph&dt=kf&ft=zs&rs=&gs=0\
         &sc=1nzf&st=desc&qdii={tracking}&tabSubtype={family}&pi=1&pn=10000&dx=1"
    );
    let body = client.get_text(&url, FUND_REFERER).await?;
    decode_rank_rows(&body)
}

/// rankhandler payloads arrive as `var rankData = {datas:[...]}` where each
/// entry is one comma-joined fund record.
fn decode_rank_rows(body: &str) -> Result<Table, ConnectorError> {
    let json_text = strip_js_assignment(body)?;
    let payload: serde_json::Value = serde_json::from_str(json_text)
        .map_err(|e| ConnectorError::decode("eastmoney fund rank", e.to_string()))?;
    let datas = payload["datas"]
        .as_array()
        .ok_or_else(|| ConnectorError::decode("eastmoney fund rank", "missing 'datas'"))?;

    // Record positions: code, name, pinyin, date, nav, cumulative nav,
    // daily%, 1w, 1m, 3m, 6m, 1y, 2y, 3y, ytd, since, ..., fee at 20.
    const RETURN_COLS: [(usize, &str); 10] = [
        (6, "日增长率"),
        (7, "近1周"),
        (8, "近1月"),
        (9, "近3月"),
        (10, "近6月"),
        (11, "近1年"),
        (12, "近2年"),
        (13, "近3年"),
        (14, "今年来"),
        (15, "成立来"),
    ];

    let mut rows = Vec::with_capacity(datas.len());
    for entry in datas {
        let Some(record) = entry.as_str() else {
            continue;
        };
        let parts: Vec<&str> = record.split(',').collect();
        if parts.len() < 16 {
            warn!(record, "skipping short fund rank record");
            continue;
        }
        let mut row = Row::default();
        row.push("基金代码", Value::String(parts[0].to_string()));
        row.push("基金名称", Value::String(parts[1].to_string()));
        row.push("日期", Value::String(parts[3].to_string()));
        row.push("单位净值", parse_cell(parts[4]));
        row.push("累计净值", parse_cell(parts[5]));
        for (idx, name) in RETURN_COLS {
            row.push(name, parse_cell(parts[idx]));
        }
        let fee = parts.get(20).copied().unwrap_or("");
        row.push("手续费", parse_cell(fee.trim_end_matches('%')));
        rows.push(row);
    }
    Ok(Table::new(rows))
}

/// Realtime ETF board via the clist endpoint.
pub async fn etf_spot(client: &MarketClient) -> Result<Table, ConnectorError> {
    let url = "https://push2.eastmoney.com/api/qt/clist/get?pn=1&pz=10000&po=1&np=1\
               &fltt=2&invt=2&fid=f3&fs=b:MK0021,b:MK0022,b:MK0023,b:MK0024\
               &fields=f12,f14,f2,f3,f4,f5,f6,f17,f15,f16,f18";
    let body = client.get_json(url, QUOTE_REFERER).await?;
    decode_etf_spot(&body)
}

fn decode_etf_spot(body: &serde_json::Value) -> Result<Table, ConnectorError> {
    let diff = body["data"]["diff"]
        .as_array()
        .ok_or_else(|| ConnectorError::decode("eastmoney etf spot", "missing 'data.diff'"))?;

    const FIELDS: [(&str, &str); 11] = [
        ("f12", "基金代码"),
        ("f14", "基金名称"),
        ("f2", "最新价"),
        ("f3", "涨跌幅"),
        ("f4", "涨跌额"),
        ("f5", "成交量"),
        ("f6", "成交额"),
        ("f17", "开盘"),
        ("f15", "最高"),
        ("f16", "最低"),
        ("f18", "昨收"),
    ];

    let mut rows = Vec::with_capacity(diff.len());
    for item in diff {
        let mut row = Row::default();
        for (key, name) in FIELDS {
            row.push(name, Value::from_json(&item[key]));
        }
        rows.push(row);
    }
    Ok(Table::new(rows))
}

/// HK fund ranking list from the overseas fund API.
pub async fn hk_fund_rankings(client: &MarketClient) -> Result<Table, ConnectorError> {
    let url = "https://overseas.1234567.com.cn/overseasapi/OpenApiHander.ashx?api=HKFDApi\
               &m=MethodFundList&action=1&pageindex=0&pagesize=5000&dy=1&sortfield=W&sorttype=-1";
    let body = client.get_json(url, FUND_REFERER).await?;
    decode_hk_funds(&body)
}

fn decode_hk_funds(body: &serde_json::Value) -> Result<Table, ConnectorError> {
    let data = body["Data"]
        .as_array()
        .ok_or_else(|| ConnectorError::decode("eastmoney hk funds", "missing 'Data'"))?;

    const FIELDS: [(&str, &str); 16] = [
        ("FCODE", "基金代码"),
        ("SHORTNAME", "基金简称"),
        ("CURRENCY", "币种"),
        ("FSRQ", "日期"),
        ("DWJZ", "单位净值"),
        ("RZDF", "日增长率"),
        ("W", "近1周"),
        ("M", "近1月"),
        ("Q", "近3月"),
        ("HY", "近6月"),
        ("Y", "近1年"),
        ("TWY", "近2年"),
        ("TY", "近3年"),
        ("SYL_JN", "今年来"),
        ("SYL_LN", "成立来"),
        ("ISBUY", "可购买"),
    ];

    let mut rows = Vec::with_capacity(data.len());
    for (i, item) in data.iter().enumerate() {
        let mut row = Row::default();
        row.push("序号", Value::Int((i + 1) as i64));
        for (key, name) in FIELDS {
            // Numeric cells arrive as strings; the identity columns stay text.
            let value = match name {
                "基金代码" | "基金简称" | "币种" | "日期" => {
                    Value::String(item[key].as_str().unwrap_or_default().to_string())
                }
                _ => match &item[key] {
                    serde_json::Value::String(s) => parse_cell(s),
                    other => Value::from_json(other),
                },
            };
            row.push(name, value);
        }
        row.push(
            "香港基金代码",
            Value::String(item["HKFCODE"].as_str().unwrap_or_default().to_string()),
        );
        rows.push(row);
    }
    Ok(Table::new(rows))
}

/// All funds' code/abbreviation/name/type from the fund search seed file.
pub async fn fund_names(client: &MarketClient) -> Result<Table, ConnectorError> {
    let url = "https://fund.eastmoney.com/js/fundcode_search.js";
    let body = client.get_text(url, FUND_REFERER).await?;
    decode_fund_names(&body)
}

fn decode_fund_names(body: &str) -> Result<Table, ConnectorError> {
    let json_text = strip_js_assignment(body)?;
    let payload: serde_json::Value = serde_json::from_str(json_text)
        .map_err(|e| ConnectorError::decode("eastmoney fund names", e.to_string()))?;
    let entries = payload
        .as_array()
        .ok_or_else(|| ConnectorError::decode("eastmoney fund names", "expected array"))?;

    const NAMES: [&str; 5] = ["基金代码", "拼音缩写", "基金简称", "基金类型", "拼音全称"];

    let mut rows = Vec::with_capacity(entries.len());
    for entry in entries {
        let Some(fields) = entry.as_array() else {
            continue;
        };
        let mut row = Row::default();
        for (i, name) in NAMES.iter().enumerate() {
            let text = fields.get(i).and_then(|v| v.as_str()).unwrap_or_default();
            row.push(*name, Value::String(text.to_string()));
        }
        rows.push(row);
    }
    Ok(Table::new(rows))
}

/// Quarterly weighted-average ROE for a single A-share, ascending by
/// report date, as fractions (the wire carries percentages).
pub async fn roe_series(
    client: &MarketClient,
    symbol: &str,
) -> Result<Vec<(String, f64)>, ConnectorError> {
    let (market, candidates) = secid_candidates(symbol)?;
    let suffix = match market {
        Market::ShanghaiA => "SH",
        Market::ShenzhenA => "SZ",
        _ => return Err(ConnectorError::UnknownSymbol(symbol.to_string())),
    };
    let code = candidates[0].split('.').nth(1).unwrap_or(symbol);
    let secucode = format!("{code}.{suffix}");
    let url = format!(
        "https://datacenter-web.eastmoney.com/api/data/v1/get?reportName=RPT_DMSK_FN_INDICATOR\
         &columns=SECUCODE,REPORT_DATE,WEIGHTAVG_ROE&filter=(SECUCODE=\"{secucode}\")\
         &pageSize=40&sortColumns=REPORT_DATE&sortTypes=-1&source=WEB&client=DATACENTER"
    );
    let body = client.get_json(&url, DATA_REFERER).await?;
    decode_roe(&body)
}

fn decode_roe(body: &serde_json::Value) -> Result<Vec<(String, f64)>, ConnectorError> {
    let data = body["result"]["data"]
        .as_array()
        .ok_or_else(|| ConnectorError::decode("eastmoney roe", "missing 'result.data'"))?;

    let mut series = Vec::with_capacity(data.len());
    for item in data {
        let date = item["REPORT_DATE"].as_str().unwrap_or_default();
        let date = date.split_whitespace().next().unwrap_or(date).to_string();
        if let Some(roe) = item["WEIGHTAVG_ROE"].as_f64() {
            series.push((date, roe / 100.0));
        }
    }
    series.sort_by(|a, b| a.0.cmp(&b.0));
    Ok(series)
}

/// Numeric fund cells arrive as strings; blanks and dashes mean "no data".
fn parse_cell(text: &str) -> Value {
    let trimmed = text.trim();
    if trimmed.is_empty() || trimmed == "-" || trimmed == "--" {
        return Value::Null;
    }
    match trimmed.parse::<f64>() {
        Ok(n) => Value::Float(n),
        Err(_) => Value::String(trimmed.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn decode_kline_splits_comma_records() {
        let data = json!({
            "klines": [
                "2024-01-02,10.0,10.5,10.8,9.9,120000,1500000.0,9.0,5.0,0.5,1.1",
                "2024-01-03,10.5,10.2,10.6,10.1,90000,1000000.0,4.8,-2.9,-0.3,0.8"
            ]
        });
        let bars = decode_kline(&data).unwrap();
        assert_eq!(bars.len(), 2);
        assert_eq!(bars[0].date, "2024-01-02");
        assert_eq!(bars[0].close, 10.5);
        assert_eq!(bars[1].change_pct, -2.9);
    }

    #[test]
    fn decode_kline_rejects_short_records() {
        let data = json!({ "klines": ["2024-01-02,10.0"] });
        assert!(decode_kline(&data).is_err());
    }

    #[test]
    fn kline_rows_carry_the_expected_columns() {
        let bar = KlineBar {
            date: "2024-01-02".into(),
            open: 1.0,
            close: 2.0,
            high: 3.0,
            low: 0.5,
            volume: 100.0,
            amount: 200.0,
            amplitude: 9.0,
            change_pct: 5.0,
            change: 0.1,
            turnover: 1.2,
        };
        let en = bar.to_full_row_en();
        assert_eq!(en.value("riseFall"), Some(&Value::Float(5.0)));
        let cn = bar.to_full_row_cn();
        assert_eq!(cn.value("涨跌幅"), Some(&Value::Float(5.0)));
        assert_eq!(cn.value("日期"), Some(&Value::String("2024-01-02".into())));
    }

    #[test]
    fn decode_rank_rows_maps_positions_to_labels() {
        let body = concat!(
            "var rankData = {datas:[",
            "\"000001,华夏成长,HXCZ,2024-06-28,1.06,3.40,0.5,1.2,2.0,4.5,8.0,12.0,20.0,30.0,6.0,120.0,2001-12-18,1,1.5,1,0.15%,1,0.15%\"",
            "],allRecords:1};"
        );
        let table = decode_rank_rows(body).unwrap();
        assert_eq!(table.len(), 1);
        let row = &table.rows[0];
        assert_eq!(row.value("基金代码"), Some(&Value::String("000001".into())));
        assert_eq!(row.value("近3年"), Some(&Value::Float(30.0)));
        assert_eq!(row.value("手续费"), Some(&Value::Float(0.15)));
    }

    #[test]
    fn decode_rank_rows_nulls_dashes() {
        let body = "var rankData = {datas:[\"000002,测试,CS,2024-06-28,1.0,1.0,--,1,1,1,1,1,1,--,1,1,d,1,1,1,0.1%\"]};";
        let table = decode_rank_rows(body).unwrap();
        let row = &table.rows[0];
        assert_eq!(row.value("日增长率"), Some(&Value::Null));
        assert_eq!(row.value("近3年"), Some(&Value::Null));
    }

    #[test]
    fn decode_etf_spot_reads_clist_diff() {
        let body = json!({
            "data": { "diff": [
                { "f12": "510050", "f14": "上证50ETF", "f2": 2.5, "f3": 1.2,
                  "f4": 0.03, "f5": 100000, "f6": 250000.0, "f17": 2.48,
                  "f15": 2.52, "f16": 2.46, "f18": 2.47 }
            ]}
        });
        let table = decode_etf_spot(&body).unwrap();
        assert_eq!(table.len(), 1);
        assert_eq!(
            table.rows[0].value("基金代码"),
            Some(&Value::String("510050".into()))
        );
        assert_eq!(table.rows[0].value("涨跌幅"), Some(&Value::Float(1.2)));
    }

    #[test]
    fn decode_roe_strips_timestamps_and_scales() {
        let body = json!({
            "result": { "data": [
                { "REPORT_DATE": "2023-12-31 00:00:00", "WEIGHTAVG_ROE": 12.5 },
                { "REPORT_DATE": "2023-06-30 00:00:00", "WEIGHTAVG_ROE": 6.0 }
            ]}
        });
        let series = decode_roe(&body).unwrap();
        assert_eq!(series[0], ("2023-06-30".to_string(), 0.06));
        assert_eq!(series[1], ("2023-12-31".to_string(), 0.125));
    }

    #[test]
    fn decode_fund_names_reads_nested_arrays() {
        let body = r#"var r = [["000001","HXCZ","华夏成长","混合型-灵活","HUAXIACHENGZHANG"]];"#;
        let table = decode_fund_names(body).unwrap();
        assert_eq!(table.len(), 1);
        assert_eq!(
            table.rows[0].value("基金类型"),
            Some(&Value::String("混合型-灵活".into()))
        );
    }

    #[test]
    fn decode_hk_funds_numbers_rows() {
        let body = json!({
            "Data": [
                { "FCODE": "968012", "SHORTNAME": "测试基金", "CURRENCY": "USD",
                  "FSRQ": "2024-06-28", "DWJZ": "10.5", "RZDF": "0.3",
                  "W": "1.0", "M": "2.0", "Q": "3.0", "HY": "4.0", "Y": "10.0",
                  "TWY": "15.0", "TY": "20.0", "SYL_JN": "5.0", "SYL_LN": "80.0",
                  "ISBUY": "1", "HKFCODE": "HK0001" }
            ]
        });
        let table = decode_hk_funds(&body).unwrap();
        let row = &table.rows[0];
        assert_eq!(row.value("序号"), Some(&Value::Int(1)));
        assert_eq!(row.value("近1年"), Some(&Value::Float(10.0)));
        assert_eq!(row.value("币种"), Some(&Value::String("USD".into())));
        assert_eq!(row.value("香港基金代码"), Some(&Value::String("HK0001".into())));
    }
}

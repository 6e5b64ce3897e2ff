use crate::error::ConnectorError;

/// Market a symbol resolves to, as Eastmoney partitions them.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Market {
    ShanghaiA,
    ShenzhenA,
    HongKong,
    Us,
}

/// Map a user-facing stock code to Eastmoney `secid` candidates.
///
/// A-share and HK codes resolve unambiguously from their shape. US tickers
/// do not carry their exchange, so all three exchange prefixes come back
/// and the caller tries them in order until one returns data.
pub fn secid_candidates(symbol: &str) -> Result<(Market, Vec<String>), ConnectorError> {
    let code = symbol.trim();
    if code.is_empty() {
        return Err(ConnectorError::UnknownSymbol(symbol.to_string()));
    }

    if let Some(rest) = strip_market_prefix(code, &["sh", "SH"]) {
        return Ok((Market::ShanghaiA, vec![format!("1.{rest}")]));
    }
    if let Some(rest) = strip_market_prefix(code, &["sz", "SZ"]) {
        return Ok((Market::ShenzhenA, vec![format!("0.{rest}")]));
    }

    if code.len() == 6 && code.bytes().all(|b| b.is_ascii_digit()) {
        // 6xxxxx trades in Shanghai, 0xxxxx/3xxxxx in Shenzhen.
        return match &code[..1] {
            "6" => Ok((Market::ShanghaiA, vec![format!("1.{code}")])),
            "0" | "3" => Ok((Market::ShenzhenA, vec![format!("0.{code}")])),
            _ => Err(ConnectorError::UnknownSymbol(symbol.to_string())),
        };
    }

    if code.len() == 5 && code.bytes().all(|b| b.is_ascii_digit()) {
        return Ok((Market::HongKong, vec![format!("116.{code}")]));
    }

    if code.bytes().all(|b| b.is_ascii_alphanumeric() || b == b'.') && code.len() <= 6 {
        let ticker = code.to_ascii_uppercase();
        return Ok((
            Market::Us,
            vec![
                format!("105.{ticker}"),
                format!("106.{ticker}"),
                format!("107.{ticker}"),
            ],
        ));
    }

    Err(ConnectorError::UnknownSymbol(symbol.to_string()))
}

fn strip_market_prefix<'a>(code: &'a str, prefixes: &[&str]) -> Option<&'a str> {
    for prefix in prefixes {
        if let Some(rest) = code.strip_prefix(prefix)
            && rest.len() == 6
            && rest.bytes().all(|b| b.is_ascii_digit())
        {
            return Some(rest);
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn a_share_codes_resolve_by_prefix_digit() {
        let (market, ids) = secid_candidates("600000").unwrap();
        assert_eq!(market, Market::ShanghaiA);
        assert_eq!(ids, vec!["1.600000"]);

        let (market, ids) = secid_candidates("000001").unwrap();
        assert_eq!(market, Market::ShenzhenA);
        assert_eq!(ids, vec!["0.000001"]);

        let (market, _) = secid_candidates("300750").unwrap();
        assert_eq!(market, Market::ShenzhenA);
    }

    #[test]
    fn explicit_exchange_prefix_wins() {
        let (market, ids) = secid_candidates("sh000300").unwrap();
        assert_eq!(market, Market::ShanghaiA);
        assert_eq!(ids, vec!["1.000300"]);
    }

    #[test]
    fn five_digit_codes_are_hong_kong() {
        let (market, ids) = secid_candidates("00700").unwrap();
        assert_eq!(market, Market::HongKong);
        assert_eq!(ids, vec!["116.00700"]);
    }

    #[test]
    fn us_tickers_fan_out_over_exchanges() {
        let (market, ids) = secid_candidates("AAPL").unwrap();
        assert_eq!(market, Market::Us);
        assert_eq!(ids, vec!["105.AAPL", "106.AAPL", "107.AAPL"]);
    }

    #[test]
    fn garbage_is_rejected() {
        assert!(secid_candidates("").is_err());
        assert!(secid_candidates("9999999999").is_err());
    }
}

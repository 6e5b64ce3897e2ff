//! Small accessors for the JSON parameter objects tools receive.

use crate::error::ToolError;
use chrono::NaiveDate;
use serde_json::Value;

pub(crate) fn str_param<'a>(params: &'a Value, key: &str) -> Option<&'a str> {
    params.get(key).and_then(|v| v.as_str())
}

pub(crate) fn required_str<'a>(params: &'a Value, key: &str) -> Result<&'a str, ToolError> {
    match str_param(params, key) {
        Some(text) if !text.trim().is_empty() => Ok(text),
        _ => Err(ToolError::InvalidParams(format!("'{key}' is required"))),
    }
}

/// The optional condition string; empty means "no filtering".
pub(crate) fn condition_param<'a>(params: &'a Value) -> Option<&'a str> {
    str_param(params, "condition").filter(|text| !text.trim().is_empty())
}

/// Enumerated string parameter with a default.
pub(crate) fn enum_param<'a>(
    params: &'a Value,
    key: &str,
    default: &'a str,
    allowed: &[&str],
) -> Result<&'a str, ToolError> {
    let value = str_param(params, key).unwrap_or(default);
    if allowed.contains(&value) {
        Ok(value)
    } else {
        Err(ToolError::InvalidParams(format!(
            "'{key}' must be one of {allowed:?}, got '{value}'"
        )))
    }
}

pub(crate) fn u64_param(params: &Value, key: &str, default: u64) -> u64 {
    params.get(key).and_then(|v| v.as_u64()).unwrap_or(default)
}

/// Dates arrive in the compact `yyyyMMdd` form.
pub(crate) fn validate_compact_date(key: &str, text: &str) -> Result<(), ToolError> {
    NaiveDate::parse_from_str(text, "%Y%m%d").map_err(|_| {
        ToolError::InvalidParams(format!("'{key}' must be yyyyMMdd, got '{text}'"))
    })?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn condition_param_ignores_blank_strings() {
        assert_eq!(condition_param(&json!({"condition": "pe < 40"})), Some("pe < 40"));
        assert_eq!(condition_param(&json!({"condition": "  "})), None);
        assert_eq!(condition_param(&json!({})), None);
    }

    #[test]
    fn enum_param_falls_back_to_default() {
        let params = json!({});
        assert_eq!(
            enum_param(&params, "adjust", "qfq", &["qfq", "hfq", ""]).unwrap(),
            "qfq"
        );
        let params = json!({"adjust": "bogus"});
        assert!(enum_param(&params, "adjust", "qfq", &["qfq", "hfq", ""]).is_err());
    }

    #[test]
    fn compact_dates_are_validated() {
        assert!(validate_compact_date("start_date", "20230101").is_ok());
        assert!(validate_compact_date("start_date", "2023-01-01").is_err());
        assert!(validate_compact_date("start_date", "20231340").is_err());
    }
}

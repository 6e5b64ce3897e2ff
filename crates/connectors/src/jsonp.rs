use crate::error::ConnectorError;

/// Extract the JSON body from a JSONP-wrapped payload
/// (`callback({...});` or `var _sym=({...});`).
pub fn strip_jsonp(body: &str) -> Result<&str, ConnectorError> {
    let start = body
        .find('(')
        .ok_or_else(|| ConnectorError::decode("jsonp", "no opening parenthesis"))?;
    let end = body
        .rfind(')')
        .filter(|end| *end > start)
        .ok_or_else(|| ConnectorError::decode("jsonp", "no closing parenthesis"))?;
    Ok(&body[start + 1..end])
}

/// Extract the right-hand side of a `var name = <json>;` assignment, the
/// framing the fund list and ranking endpoints use.
pub fn strip_js_assignment(body: &str) -> Result<&str, ConnectorError> {
    let eq = body
        .find('=')
        .ok_or_else(|| ConnectorError::decode("jsonp", "no assignment"))?;
    Ok(body[eq + 1..].trim().trim_end_matches(';').trim())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strips_callback_wrapper() {
        let body = r#"var _sh510050=({"day":"2024-01-02"});"#;
        assert_eq!(strip_jsonp(body).unwrap(), r#"{"day":"2024-01-02"}"#);
    }

    #[test]
    fn strips_assignment_wrapper() {
        let body = r#"var r = [["000001","HXCZ"]];"#;
        assert_eq!(strip_js_assignment(body).unwrap(), r#"[["000001","HXCZ"]]"#);
    }

    #[test]
    fn rejects_unwrapped_payloads() {
        assert!(strip_jsonp("plain text").is_err());
        assert!(strip_js_assignment("plain text").is_err());
    }
}

//! Request validation
//!
//! Accepts the JSON body a caller sends (`url` or `urls`, optional `format`)
//! and turns it into a trimmed, de-duplicated URL list plus a typed format
//! token. Nothing here touches the engine or the cache.

use crate::formats::{FormatToken, UnsupportedFormat};
use crate::utils::error::VidmetaError;
use serde_json::Value;
use std::collections::HashSet;

/// A request that passed validation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidatedRequest {
    /// Non-empty, trimmed, in first-seen order
    pub urls: Vec<String>,
    pub format: FormatToken,
}

fn invalid(message: impl Into<String>) -> VidmetaError {
    VidmetaError::Validation(message.into())
}

pub fn validate(request: &Value) -> Result<ValidatedRequest, VidmetaError> {
    let body = match request.as_object() {
        Some(body) if !body.is_empty() => body,
        _ => return Err(invalid("No JSON data provided")),
    };

    if !body.contains_key("url") && !body.contains_key("urls") {
        return Err(invalid("URL or URLs list is required"));
    }

    let format = match body.get("format") {
        None | Some(Value::Null) => FormatToken::default(),
        Some(Value::String(raw)) => raw
            .parse()
            .map_err(|e: UnsupportedFormat| invalid(e.to_string()))?,
        Some(other) => return Err(invalid(UnsupportedFormat(other.to_string()).to_string())),
    };

    let urls = match body.get("url") {
        Some(url) => vec![single_url(url)?],
        None => url_list(body.get("urls").unwrap_or(&Value::Null))?,
    };

    Ok(ValidatedRequest { urls, format })
}

fn single_url(value: &Value) -> Result<String, VidmetaError> {
    match value.as_str().map(str::trim) {
        Some(url) if !url.is_empty() => Ok(url.to_string()),
        _ => Err(invalid("URL must be a valid string")),
    }
}

fn url_list(value: &Value) -> Result<Vec<String>, VidmetaError> {
    let items = value
        .as_array()
        .ok_or_else(|| invalid("URLs must be a list of strings"))?;

    let mut seen = HashSet::new();
    let mut urls = Vec::with_capacity(items.len());
    for item in items {
        let url = item
            .as_str()
            .ok_or_else(|| invalid("URLs must be a list of strings"))?
            .trim();
        if !url.is_empty() && seen.insert(url) {
            urls.push(url.to_string());
        }
    }

    if urls.is_empty() {
        return Err(invalid("No valid URLs provided"));
    }
    Ok(urls)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn message(request: Value) -> String {
        match validate(&request) {
            Err(VidmetaError::Validation(message)) => message,
            other => panic!("expected a validation error, got {:?}", other),
        }
    }

    #[test]
    fn test_single_url_is_trimmed() {
        let request = validate(&json!({"url": "  https://youtu.be/abc  "})).unwrap();
        assert_eq!(request.urls, ["https://youtu.be/abc"]);
        assert_eq!(request.format, FormatToken::Best);
    }

    #[test]
    fn test_url_list_drops_blanks_and_duplicates() {
        let request = validate(&json!({
            "urls": ["https://a", "  ", "https://b", " https://a "],
            "format": "720p"
        }))
        .unwrap();
        assert_eq!(request.urls, ["https://a", "https://b"]);
        assert_eq!(request.format, FormatToken::P720);
    }

    #[test]
    fn test_url_wins_over_urls() {
        let request = validate(&json!({"url": "https://a", "urls": ["https://b"]})).unwrap();
        assert_eq!(request.urls, ["https://a"]);
    }

    #[test]
    fn test_missing_body_and_fields() {
        assert_eq!(message(Value::Null), "No JSON data provided");
        assert_eq!(message(json!({})), "No JSON data provided");
        assert_eq!(message(json!({"format": "best"})), "URL or URLs list is required");
    }

    #[test]
    fn test_bad_urls() {
        assert_eq!(message(json!({"url": "   "})), "URL must be a valid string");
        assert_eq!(message(json!({"url": 42})), "URL must be a valid string");
        assert_eq!(message(json!({"urls": "https://a"})), "URLs must be a list of strings");
        assert_eq!(message(json!({"urls": ["https://a", 1]})), "URLs must be a list of strings");
        assert_eq!(message(json!({"urls": [" ", ""]})), "No valid URLs provided");
        assert_eq!(message(json!({"urls": []})), "No valid URLs provided");
    }

    #[test]
    fn test_unsupported_format_lists_supported_set() {
        let text = message(json!({"url": "https://a", "format": "8k"}));
        assert!(text.starts_with("Unsupported format '8k'"));
        for token in FormatToken::ALL {
            assert!(text.contains(token.as_str()), "missing {}", token);
        }

        let text = message(json!({"url": "https://a", "format": 720}));
        assert!(text.starts_with("Unsupported format"));
    }
}

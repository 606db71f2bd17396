// file: src/utils/validation.rs
// description: data validation utilities and helpers
// reference: input validation patterns

use crate::error::{ConnectorError, Result};
use serde_json::Value;

pub const MAX_BUNDLE_SIZE: usize = 100_000;

pub struct Validator;

impl Validator {
    pub fn validate_url(url: &str) -> Result<()> {
        if !url.starts_with("http://") && !url.starts_with("https://") {
            return Err(ConnectorError::Config(format!(
                "Invalid URL format: {}",
                url
            )));
        }
        Ok(())
    }

    pub fn validate_bundle_size(size: usize) -> Result<()> {
        if size == 0 {
            return Err(ConnectorError::Config(
                "max_objects_per_bundle must be greater than 0".to_string(),
            ));
        }

        if size > MAX_BUNDLE_SIZE {
            return Err(ConnectorError::Config(format!(
                "max_objects_per_bundle too large (max {})",
                MAX_BUNDLE_SIZE
            )));
        }

        Ok(())
    }

    /// Keeps at most `max_chars` characters, never splitting a code point.
    pub fn truncate_text(text: &str, max_chars: usize) -> String {
        match text.char_indices().nth(max_chars) {
            None => text.to_string(),
            Some((cut, _)) => text[..cut].to_string(),
        }
    }

    /// Pretty-printed, truncated rendering of a payload for diagnostics.
    pub fn preview_json(value: &Value, max_chars: usize) -> String {
        let rendered = serde_json::to_string_pretty(value).unwrap_or_else(|_| value.to_string());
        Self::truncate_text(&rendered, max_chars)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_validate_url() {
        assert!(Validator::validate_url("https://example.com").is_ok());
        assert!(Validator::validate_url("http://example.com").is_ok());
        assert!(Validator::validate_url("example.com").is_err());
        assert!(Validator::validate_url("ftp://example.com").is_err());
    }

    #[test]
    fn test_validate_bundle_size() {
        assert!(Validator::validate_bundle_size(5000).is_ok());
        assert!(Validator::validate_bundle_size(0).is_err());
        assert!(Validator::validate_bundle_size(MAX_BUNDLE_SIZE + 1).is_err());
    }

    #[test]
    fn test_truncate_text() {
        assert_eq!(Validator::truncate_text("short", 10), "short");
        assert_eq!(Validator::truncate_text("this is a very long text", 10), "this is a ");
        assert_eq!(Validator::truncate_text("ééééé", 3), "ééé");
    }

    #[test]
    fn test_preview_json_is_bounded() {
        let value = json!({"objects": vec!["x"; 500]});
        assert_eq!(Validator::preview_json(&value, 800).chars().count(), 800);
    }
}

// src/types/api_key.rs

use super::ValidationError;
use std::fmt;

/// A validated Notion integration token.
///
/// The Display impl redacts everything past the prefix so the token can
/// never leak into logs wholesale.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiKey(String);

impl ApiKey {
    /// Create a new API key with validation.
    pub fn new(key: impl Into<String>) -> Result<Self, ValidationError> {
        let key = key.into();

        if key.is_empty() {
            return Err(ValidationError::InvalidApiKey {
                reason: "API key cannot be empty".to_string(),
            });
        }

        if !key.starts_with("secret_") && !key.starts_with("ntn_") {
            return Err(ValidationError::InvalidApiKey {
                reason: "API key must start with 'secret_' or 'ntn_'".to_string(),
            });
        }

        if key.len() < 20 {
            return Err(ValidationError::InvalidApiKey {
                reason: "API key is too short".to_string(),
            });
        }

        Ok(Self(key))
    }

    /// Get the API key as a string reference.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ApiKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let visible = self.0.chars().take(10).collect::<String>();
        write!(f, "{}...", visible)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn valid_key_with_secret_prefix() {
        let key = ApiKey::new("secret_abcdefghijklmnopqrstuvwxyz");
        assert!(key.is_ok());
    }

    #[test]
    fn valid_key_with_ntn_prefix() {
        let key = ApiKey::new("ntn_abcdefghijklmnopqrstuvwxyz");
        assert!(key.is_ok());
    }

    #[test]
    fn empty_key_rejected() {
        assert!(matches!(
            ApiKey::new(""),
            Err(ValidationError::InvalidApiKey { reason }) if reason.contains("empty")
        ));
    }

    #[test]
    fn wrong_prefix_rejected() {
        assert!(matches!(
            ApiKey::new("token_abcdefghijklmnopqrstuvwxyz"),
            Err(ValidationError::InvalidApiKey { reason }) if reason.contains("must start with")
        ));
    }

    #[test]
    fn display_redacts_value() {
        let key = ApiKey::new("secret_supersecretkey123456").unwrap();
        let display = format!("{}", key);
        assert_eq!(display, "secret_sup...");
        assert!(!display.contains("supersecretkey"));
    }
}

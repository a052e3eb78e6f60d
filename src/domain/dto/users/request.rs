use serde::Deserialize;
use validator::{Validate, ValidationError};

use crate::utils::string_utils::deserialize_trimmed_string;

/// Letters, digits and underscores only
pub fn validate_username(username: &str) -> Result<(), ValidationError> {
    if username.chars().all(|c| c.is_ascii_alphanumeric() || c == '_') {
        Ok(())
    } else {
        let mut error = ValidationError::new("invalid_username");
        error.message = Some("Username may only contain letters, digits and underscores".into());
        Err(error)
    }
}

/// Body of `POST /api/auth/register`; profile fields come from the token.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct RegisterRequest {
    #[serde(deserialize_with = "deserialize_trimmed_string")]
    #[validate(
        length(min = 3, max = 30, message = "Username must be 3-30 characters"),
        custom(function = "validate_username")
    )]
    pub username: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request(username: &str) -> RegisterRequest {
        serde_json::from_value(serde_json::json!({ "username": username })).unwrap()
    }

    #[test]
    fn test_username_rules() {
        assert!(request(" ada_l ").validate().is_ok());
        assert!(request("ab").validate().is_err());
        assert!(request(&"a".repeat(31)).validate().is_err());
        assert!(request("ada lovelace").validate().is_err());
        assert!(request("ada-l").validate().is_err());
    }

    #[test]
    fn test_username_is_trimmed() {
        assert_eq!(request("  grace ").username, "grace");
    }
}

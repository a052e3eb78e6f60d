use actix_web::http::StatusCode;
use serde::Serialize;
use validator::ValidationError;

/// `{"success": {"status": 200, "message": ...}}`
#[derive(Debug, Serialize)]
pub struct SuccessResponse<M = String> {
    pub success: SuccessDetail<M>,
}

#[derive(Debug, Serialize)]
pub struct SuccessDetail<M> {
    pub status: u16,
    pub message: M,
}

impl<M: Serialize> SuccessResponse<M> {
    pub fn new(status: StatusCode, message: M) -> Self {
        Self {
            success: SuccessDetail { status: status.as_u16(), message },
        }
    }

    pub fn ok(message: M) -> Self {
        Self::new(StatusCode::OK, message)
    }
}

/// Rejects entries that are blank after trimming.
pub fn validate_non_blank_items(items: &[String]) -> Result<(), ValidationError> {
    if items.iter().any(|item| item.trim().is_empty()) {
        let mut error = ValidationError::new("blank_item");
        error.message = Some("Entries must not be blank".into());
        return Err(error);
    }
    Ok(())
}

/// Accepts only `http://` or `https://` URLs.
pub fn validate_http_url(url: &str) -> Result<(), ValidationError> {
    let url = url.trim();
    if url.starts_with("http://") || url.starts_with("https://") {
        Ok(())
    } else {
        let mut error = ValidationError::new("invalid_url");
        error.message = Some("Must be an http(s) URL".into());
        Err(error)
    }
}

/// 24 hex characters
pub fn validate_object_id(value: &str) -> Result<(), ValidationError> {
    if value.len() == 24 && value.chars().all(|c| c.is_ascii_hexdigit()) {
        Ok(())
    } else {
        let mut error = ValidationError::new("invalid_object_id");
        error.message = Some("Must be a valid id".into());
        Err(error)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_success_response_shape() {
        let json = serde_json::to_value(SuccessResponse::ok("Book deleted")).unwrap();
        assert_eq!(json["success"]["status"], 200);
        assert_eq!(json["success"]["message"], "Book deleted");
    }

    #[test]
    fn test_validators() {
        assert!(validate_non_blank_items(&["a".to_string()]).is_ok());
        assert!(validate_non_blank_items(&["a".to_string(), " ".to_string()]).is_err());

        assert!(validate_http_url("https://img.test/a.png").is_ok());
        assert!(validate_http_url("ftp://img.test/a.png").is_err());

        assert!(validate_object_id("64b7f0c2a1b2c3d4e5f60718").is_ok());
        assert!(validate_object_id("64b7f0c2").is_err());
        assert!(validate_object_id("zzb7f0c2a1b2c3d4e5f60718").is_err());
    }
}

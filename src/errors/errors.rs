//! Application-wide error type
//!
//! Every layer returns [`AppError`]. `thiserror` provides the `Display` impl
//! and `actix_web::ResponseError` turns each variant into a status code and
//! a uniform JSON body:
//!
//! ```json
//! { "error": { "status": 404, "message": "Book not found" } }
//! ```
//!
//! Server-side failures (5xx) are logged with their details and reported to
//! the client as a generic message.
//!
//! ## Example
//!
//! ```rust,ignore
//! use crate::errors::AppError;
//!
//! async fn find_book(id: &str) -> Result<BookResponse, AppError> {
//!     let oid = parse_object_id(id)?;
//!     let book = book_repo.find_by_id(&oid).await?
//!         .ok_or_else(|| AppError::NotFound("Book not found".to_string()))?;
//!     Ok(book.into())
//! }
//! ```

use actix_web::http::StatusCode;
use actix_web::HttpResponse;
use serde::Serialize;
use thiserror::Error;

/// Application-wide error type
#[derive(Error, Debug)]
pub enum AppError {
    /// MongoDB failure (500)
    #[error("Database error: {0}")]
    DatabaseError(String),

    /// Redis failure (500)
    #[error("Redis error: {0}")]
    RedisError(String),

    /// Invalid input (400)
    #[error("Validation error: {0}")]
    ValidationError(String),

    /// Missing resource (404)
    #[error("Not found: {0}")]
    NotFound(String),

    /// Duplicate resource (409)
    #[error("Conflict error: {0}")]
    ConflictError(String),

    /// Missing or invalid credentials (401)
    #[error("Authentication error: {0}")]
    AuthenticationError(String),

    /// Authenticated but not allowed (403)
    #[error("Authorization error: {0}")]
    AuthorizationError(String),

    /// Request quota exhausted (429)
    #[error("Too many requests: {0}")]
    TooManyRequests(String),

    /// Upstream service failure, e.g. the identity provider JWKS endpoint (500)
    #[error("External service error: {0}")]
    ExternalServiceError(String),

    /// Anything else (500)
    #[error("Internal server error: {0}")]
    InternalError(String),
}

/// Inner part of the error envelope
#[derive(Debug, Serialize)]
pub struct ErrorDetail {
    pub status: u16,
    pub message: String,
}

/// JSON envelope returned for every error response
#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub error: ErrorDetail,
}

impl ErrorBody {
    pub fn new(status: StatusCode, message: impl Into<String>) -> Self {
        Self {
            error: ErrorDetail {
                status: status.as_u16(),
                message: message.into(),
            },
        }
    }
}

impl AppError {
    /// Message sent to the client.
    ///
    /// Client errors echo their own message. Server errors are masked.
    pub fn public_message(&self) -> String {
        match self {
            AppError::ValidationError(msg)
            | AppError::NotFound(msg)
            | AppError::ConflictError(msg)
            | AppError::AuthenticationError(msg)
            | AppError::AuthorizationError(msg)
            | AppError::TooManyRequests(msg) => msg.clone(),
            _ => "Internal Server Error".to_string(),
        }
    }
}

impl actix_web::ResponseError for AppError {
    fn status_code(&self) -> StatusCode {
        match self {
            AppError::ValidationError(_) => StatusCode::BAD_REQUEST,
            AppError::AuthenticationError(_) => StatusCode::UNAUTHORIZED,
            AppError::AuthorizationError(_) => StatusCode::FORBIDDEN,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::ConflictError(_) => StatusCode::CONFLICT,
            AppError::TooManyRequests(_) => StatusCode::TOO_MANY_REQUESTS,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        let status = self.status_code();

        if status.is_server_error() {
            log::error!("{}", self);
        }

        HttpResponse::build(status).json(ErrorBody::new(status, self.public_message()))
    }
}

/// Result alias used across services and repositories
pub type AppResult<T> = Result<T, AppError>;

/// Converts foreign errors into [`AppError::InternalError`] with context
pub trait ErrorContext<T> {
    fn context(self, msg: &str) -> AppResult<T>;

    fn with_context<F>(self, f: F) -> AppResult<T>
    where
        F: FnOnce() -> String;
}

impl<T, E> ErrorContext<T> for Result<T, E>
where
    E: std::fmt::Display,
{
    fn context(self, msg: &str) -> AppResult<T> {
        self.map_err(|e| AppError::InternalError(format!("{}: {}", msg, e)))
    }

    fn with_context<F>(self, f: F) -> AppResult<T>
    where
        F: FnOnce() -> String,
    {
        self.map_err(|e| AppError::InternalError(format!("{}: {}", f(), e)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::body::to_bytes;
    use actix_web::ResponseError;

    async fn body_json(error: AppError) -> serde_json::Value {
        let response = error.error_response();
        let bytes = to_bytes(response.into_body()).await.unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[test]
    fn test_validation_error_response() {
        let error = AppError::ValidationError("Title is required".to_string());
        assert_eq!(error.error_response().status(), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn test_not_found_error_response() {
        let error = AppError::NotFound("Book not found".to_string());
        assert_eq!(error.error_response().status(), StatusCode::NOT_FOUND);
    }

    #[test]
    fn test_authentication_error_response() {
        let error = AppError::AuthenticationError("Invalid token".to_string());
        assert_eq!(error.error_response().status(), StatusCode::UNAUTHORIZED);
    }

    #[test]
    fn test_authorization_error_response() {
        let error = AppError::AuthorizationError("Not the owner".to_string());
        assert_eq!(error.error_response().status(), StatusCode::FORBIDDEN);
    }

    #[test]
    fn test_conflict_and_rate_limit_responses() {
        assert_eq!(
            AppError::ConflictError("dup".to_string()).error_response().status(),
            StatusCode::CONFLICT
        );
        assert_eq!(
            AppError::TooManyRequests("slow down".to_string()).error_response().status(),
            StatusCode::TOO_MANY_REQUESTS
        );
    }

    #[test]
    fn test_internal_error_response() {
        let error = AppError::DatabaseError("connection reset".to_string());
        assert_eq!(error.error_response().status(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[actix_web::test]
    async fn test_error_body_shape() {
        let body = body_json(AppError::NotFound("Book not found".to_string())).await;

        assert_eq!(body["error"]["status"], 404);
        assert_eq!(body["error"]["message"], "Book not found");
    }

    #[actix_web::test]
    async fn test_server_error_message_is_masked() {
        let body = body_json(AppError::DatabaseError("mongodb://secret@host".to_string())).await;

        assert_eq!(body["error"]["status"], 500);
        assert_eq!(body["error"]["message"], "Internal Server Error");
    }

    #[test]
    fn test_error_context_trait() {
        let result: Result<(), &str> = Err("original error");
        let app_result = result.context("Additional context");

        match app_result {
            Err(AppError::InternalError(msg)) => {
                assert!(msg.contains("Additional context"));
                assert!(msg.contains("original error"));
            }
            _ => panic!("Expected InternalError"),
        }
    }
}

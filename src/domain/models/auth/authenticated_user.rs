use std::future::{ready, Ready};

use actix_web::{FromRequest, HttpMessage, HttpRequest};
use serde::{Deserialize, Serialize};

use crate::domain::models::auth::identity_claims::IdentityClaims;
use crate::errors::AppError;

/// Caller identity placed in request extensions by `AuthMiddleware`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AuthenticatedUser {
    /// Identity provider uid, the `userId` used across every collection
    pub uid: String,
    pub email: Option<String>,
    pub name: Option<String>,
    pub picture: Option<String>,
}

impl AuthenticatedUser {
    /// Fails with 403 unless the caller is `user_id`.
    pub fn ensure_owner(&self, user_id: &str) -> Result<(), AppError> {
        if self.uid == user_id.trim() {
            Ok(())
        } else {
            Err(AppError::AuthorizationError(
                "You are not allowed to act on behalf of another user".to_string(),
            ))
        }
    }
}

impl From<IdentityClaims> for AuthenticatedUser {
    fn from(claims: IdentityClaims) -> Self {
        Self {
            uid: claims.sub,
            email: claims.email,
            name: claims.name,
            picture: claims.picture,
        }
    }
}

/// Requires a verified caller; 401 otherwise.
impl FromRequest for AuthenticatedUser {
    type Error = AppError;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _payload: &mut actix_web::dev::Payload) -> Self::Future {
        match req.extensions().get::<AuthenticatedUser>() {
            Some(user) => ready(Ok(user.clone())),
            None => ready(Err(AppError::AuthenticationError(
                "Authentication token is required".to_string(),
            ))),
        }
    }
}

/// Caller identity when a valid token was sent, `None` for anonymous requests
#[derive(Debug, Clone)]
pub struct OptionalUser(pub Option<AuthenticatedUser>);

impl FromRequest for OptionalUser {
    type Error = AppError;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _payload: &mut actix_web::dev::Payload) -> Self::Future {
        let user = req.extensions().get::<AuthenticatedUser>().cloned();
        ready(Ok(OptionalUser(user)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::test::TestRequest;

    fn reader() -> AuthenticatedUser {
        AuthenticatedUser {
            uid: "uid-123".to_string(),
            email: Some("reader@example.com".to_string()),
            name: Some("Reader".to_string()),
            picture: None,
        }
    }

    #[test]
    fn test_ensure_owner() {
        let user = reader();
        assert!(user.ensure_owner("uid-123").is_ok());
        assert!(matches!(
            user.ensure_owner("uid-999"),
            Err(AppError::AuthorizationError(_))
        ));
    }

    #[actix_web::test]
    async fn test_extractor_rejects_anonymous() {
        let req = TestRequest::default().to_http_request();
        let result = AuthenticatedUser::extract(&req).await;
        assert!(matches!(result, Err(AppError::AuthenticationError(_))));
    }

    #[actix_web::test]
    async fn test_extractors_read_extensions() {
        let req = TestRequest::default().to_http_request();
        req.extensions_mut().insert(reader());

        let user = AuthenticatedUser::extract(&req).await.unwrap();
        assert_eq!(user.uid, "uid-123");

        let OptionalUser(optional) = OptionalUser::extract(&req).await.unwrap();
        assert_eq!(optional, Some(reader()));
    }

    #[actix_web::test]
    async fn test_optional_user_is_none_without_identity() {
        let req = TestRequest::default().to_http_request();
        let OptionalUser(optional) = OptionalUser::extract(&req).await.unwrap();
        assert!(optional.is_none());
    }
}

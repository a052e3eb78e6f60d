//! Request-time half of [`AuthMiddleware`](super::AuthMiddleware)
use std::rc::Rc;

use actix_web::body::EitherBody;
use actix_web::dev::{forward_ready, Service, ServiceRequest, ServiceResponse};
use actix_web::http::header;
use actix_web::{Error, HttpMessage, ResponseError};
use futures_util::future::LocalBoxFuture;

use crate::errors::AppError;
use crate::middlewares::auth_middleware::AuthMode;
use crate::services::auth::IdentityService;

pub struct AuthMiddlewareService<S> {
    pub service: Rc<S>,
    pub mode: AuthMode,
}

impl<S, B> Service<ServiceRequest> for AuthMiddlewareService<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<EitherBody<B>>;
    type Error = Error;
    type Future = LocalBoxFuture<'static, actix_web::Result<Self::Response, Self::Error>>;

    forward_ready!(service);

    fn call(&self, req: ServiceRequest) -> Self::Future {
        let service = self.service.clone();
        let mode = self.mode;

        Box::pin(async move {
            match authenticate(&req, mode).await {
                Ok(Some(user)) => {
                    log::debug!("Authenticated caller {}", user.uid);
                    req.extensions_mut().insert(user);
                }
                Ok(None) => log::debug!("Anonymous request to {}", req.path()),
                Err(err) => {
                    log::warn!("Authentication failed for {}: {}", req.path(), err);
                    let response = err.error_response();
                    let (req, _) = req.into_parts();
                    return Ok(ServiceResponse::new(req, response).map_into_right_body());
                }
            }

            let res = service.call(req).await?;
            Ok(res.map_into_left_body())
        })
    }
}

/// `Ok(None)` only for an anonymous request in optional mode.
async fn authenticate(
    req: &ServiceRequest,
    mode: AuthMode,
) -> Result<Option<crate::domain::models::auth::AuthenticatedUser>, AppError> {
    let Some(value) = req.headers().get(header::AUTHORIZATION) else {
        return match mode {
            AuthMode::Required => Err(AppError::AuthenticationError(
                "Authentication token is required".to_string(),
            )),
            AuthMode::Optional => Ok(None),
        };
    };

    let value = value
        .to_str()
        .map_err(|_| AppError::AuthenticationError("Invalid Authorization header".to_string()))?;
    let token = bearer_token(value)?;

    IdentityService::instance().verify(token).await.map(Some)
}

/// Extracts the token of a `Bearer <token>` header value.
pub fn bearer_token(value: &str) -> Result<&str, AppError> {
    value
        .trim()
        .strip_prefix("Bearer ")
        .map(str::trim)
        .filter(|token| !token.is_empty())
        .ok_or_else(|| AppError::AuthenticationError("Authorization header must be 'Bearer <token>'".to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bearer_token() {
        assert_eq!(bearer_token("Bearer abc.def.ghi").unwrap(), "abc.def.ghi");
        assert_eq!(bearer_token("  Bearer   abc  ").unwrap(), "abc");
        assert!(bearer_token("Bearer ").is_err());
        assert!(bearer_token("Token abc").is_err());
        assert!(bearer_token("abc").is_err());
    }
}

//! Bearer token authentication middleware
//!
//! Verifies `Authorization: Bearer <id token>` and stores the resulting
//! [`AuthenticatedUser`](crate::domain::models::auth::AuthenticatedUser) in
//! the request extensions, where the handler extractors pick it up.

use std::future::{ready, Ready};
use std::rc::Rc;

use actix_web::{
    body::EitherBody,
    dev::{Service, ServiceRequest, ServiceResponse, Transform},
    Error, Result,
};

use crate::middlewares::auth_inner::AuthMiddlewareService;

/// How a missing token is treated
///
/// A token that is present but fails verification is rejected with 401 in
/// both modes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthMode {
    /// Anonymous requests are rejected with 401
    Required,
    /// Anonymous requests pass through without an identity
    Optional,
}

pub struct AuthMiddleware {
    mode: AuthMode,
}

impl AuthMiddleware {
    pub fn new(mode: AuthMode) -> Self {
        Self { mode }
    }

    pub fn required() -> Self {
        Self::new(AuthMode::Required)
    }

    pub fn optional() -> Self {
        Self::new(AuthMode::Optional)
    }
}

impl<S, B> Transform<S, ServiceRequest> for AuthMiddleware
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<EitherBody<B>>;
    type Error = Error;
    type Transform = AuthMiddlewareService<S>;
    type InitError = ();
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ready(Ok(AuthMiddlewareService {
            service: Rc::new(service),
            mode: self.mode,
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::models::auth::OptionalUser;
    use actix_web::{http::StatusCode, test, web, App, HttpResponse};

    async fn whoami(user: OptionalUser) -> HttpResponse {
        match user.0 {
            Some(user) => HttpResponse::Ok().body(user.uid),
            None => HttpResponse::Ok().body("anonymous"),
        }
    }

    #[actix_web::test]
    async fn test_required_rejects_missing_token() {
        let app = test::init_service(
            App::new().service(web::scope("/private").wrap(AuthMiddleware::required()).route("", web::get().to(whoami))),
        )
        .await;

        let req = test::TestRequest::get().uri("/private").to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);

        let body: serde_json::Value = test::read_body_json(resp).await;
        assert_eq!(body["error"]["status"], 401);
        assert_eq!(body["error"]["message"], "Authentication token is required");
    }

    #[actix_web::test]
    async fn test_optional_lets_anonymous_through() {
        let app = test::init_service(
            App::new().service(web::scope("/public").wrap(AuthMiddleware::optional()).route("", web::get().to(whoami))),
        )
        .await;

        let req = test::TestRequest::get().uri("/public").to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::OK);

        let body = test::read_body(resp).await;
        assert_eq!(body, "anonymous");
    }

    #[actix_web::test]
    async fn test_malformed_header_is_rejected_in_optional_mode() {
        let app = test::init_service(
            App::new().service(web::scope("/public").wrap(AuthMiddleware::optional()).route("", web::get().to(whoami))),
        )
        .await;

        let req = test::TestRequest::get()
            .uri("/public")
            .insert_header(("Authorization", "Basic dXNlcjpwYXNz"))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
    }
}

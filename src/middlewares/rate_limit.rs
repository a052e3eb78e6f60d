//! Per-client rate limiting
//!
//! Built on `actix-governor`. Clients are keyed by peer IP and a rejected
//! request gets the same JSON error body as every other failure:
//!
//! ```json
//! {"error": {"status": 429, "message": "Too many requests, retry in 9s"}}
//! ```

use std::net::IpAddr;

use actix_governor::governor::clock::{Clock, DefaultClock, QuantaInstant};
use actix_governor::governor::middleware::StateInformationMiddleware;
use actix_governor::governor::NotUntil;
use actix_governor::{GovernorConfig, GovernorConfigBuilder, KeyExtractor, SimpleKeyExtractionError};
use actix_web::dev::ServiceRequest;
use actix_web::http::StatusCode;
use actix_web::{HttpResponse, HttpResponseBuilder};

use crate::config::RateLimitConfig;
use crate::errors::{AppError, ErrorBody};

#[derive(Debug, Clone, Copy, Default)]
pub struct ClientIpKeyExtractor;

impl KeyExtractor for ClientIpKeyExtractor {
    type Key = IpAddr;
    type KeyExtractionError = SimpleKeyExtractionError<&'static str>;

    fn extract(&self, req: &ServiceRequest) -> Result<Self::Key, Self::KeyExtractionError> {
        req.peer_addr()
            .map(|socket| socket.ip())
            .ok_or_else(|| SimpleKeyExtractionError::new("Could not determine client IP address"))
    }

    fn exceed_rate_limit_response(
        &self,
        negative: &NotUntil<QuantaInstant>,
        mut response: HttpResponseBuilder,
    ) -> HttpResponse {
        let wait_time = negative.wait_time_from(DefaultClock::default().now()).as_secs();
        let error = AppError::TooManyRequests(format!("Too many requests, retry in {}s", wait_time));

        response.json(ErrorBody::new(StatusCode::TOO_MANY_REQUESTS, error.public_message()))
    }
}

pub type RateLimiterConfig = GovernorConfig<ClientIpKeyExtractor, StateInformationMiddleware>;

/// Governor quota for `config`, with `x-ratelimit-*` headers enabled.
pub fn governor_config(config: &RateLimitConfig) -> Result<RateLimiterConfig, AppError> {
    GovernorConfigBuilder::default()
        .seconds_per_request(config.replenish_seconds())
        .burst_size(config.burst_size())
        .key_extractor(ClientIpKeyExtractor)
        .use_headers()
        .finish()
        .ok_or_else(|| AppError::InternalError("Invalid rate limit configuration".to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_governor::Governor;
    use actix_web::{test, web, App};
    use std::net::SocketAddr;

    fn peer() -> SocketAddr {
        "10.1.2.3:40000".parse().unwrap()
    }

    #[actix_web::test]
    async fn test_extracts_peer_ip() {
        let req = test::TestRequest::default().peer_addr(peer()).to_srv_request();
        assert_eq!(ClientIpKeyExtractor.extract(&req).unwrap(), peer().ip());
    }

    #[actix_web::test]
    async fn test_missing_peer_is_an_error() {
        let req = test::TestRequest::default().to_srv_request();
        assert!(ClientIpKeyExtractor.extract(&req).is_err());
    }

    #[actix_web::test]
    async fn test_quota_overflow_returns_json_429() {
        let config = governor_config(&RateLimitConfig::new(3600, 1)).unwrap();
        let app = test::init_service(
            App::new()
                .wrap(Governor::new(&config))
                .route("/", web::get().to(|| async { HttpResponse::Ok().finish() })),
        )
        .await;

        let first = test::call_service(&app, test::TestRequest::get().uri("/").peer_addr(peer()).to_request()).await;
        assert_eq!(first.status(), StatusCode::OK);

        let second = test::call_service(&app, test::TestRequest::get().uri("/").peer_addr(peer()).to_request()).await;
        assert_eq!(second.status(), StatusCode::TOO_MANY_REQUESTS);

        let body: serde_json::Value = test::read_body_json(second).await;
        assert_eq!(body["error"]["status"], 429);
        assert!(body["error"]["message"].as_str().unwrap().starts_with("Too many requests"));
    }
}

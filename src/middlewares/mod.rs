//! Middlewares
//!
//! - [`AuthMiddleware`]: verifies provider ID tokens, either required or
//!   optional per scope.
//! - [`rate_limit`]: per-IP quota through `actix-governor`.
//!
//! ```rust,ignore
//! App::new()
//!     .wrap(Governor::new(&rate_limit::governor_config(&RateLimitConfig::from_env())?))
//!     .service(
//!         web::scope("/api/auth")
//!             .wrap(AuthMiddleware::required())
//!             .service(register),
//!     )
//! ```

pub mod auth_middleware;
mod auth_inner;
pub mod rate_limit;

pub use auth_middleware::{AuthMiddleware, AuthMode};

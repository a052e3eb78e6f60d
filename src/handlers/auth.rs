//! # Registration
//!
//! `POST /api/auth/register` creates the local user record for a caller
//! already signed in with the identity provider.
//!
//! ```bash
//! curl -X POST http://localhost:8080/api/auth/register \
//!   -H "Authorization: Bearer <id token>" \
//!   -H "Content-Type: application/json" \
//!   -d '{"username":"ada_l"}'
//! ```
//!
//! - `201` with `{info:{message,user}}` for a new user
//! - `200` with the same shape when the uid is already registered
//! - `409` when another user holds the username

use actix_web::{post, web, HttpResponse};
use validator::Validate;

use crate::domain::dto::users::{RegisterRequest, RegisterResponse};
use crate::domain::models::auth::AuthenticatedUser;
use crate::errors::AppError;
use crate::services::users::{Registration, UserService};

#[post("/register")]
pub async fn register(
    caller: AuthenticatedUser,
    payload: web::Json<RegisterRequest>,
) -> Result<HttpResponse, AppError> {
    payload.validate()
        .map_err(|e| AppError::ValidationError(e.to_string()))?;

    let service = UserService::instance();

    match service.register(&caller, payload.into_inner()).await? {
        Registration::Existing(user) => {
            Ok(HttpResponse::Ok().json(RegisterResponse::new("User already registered", user)))
        }
        Registration::Created(user) => {
            Ok(HttpResponse::Created().json(RegisterResponse::new("User registered", user)))
        }
    }
}

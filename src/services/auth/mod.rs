//! Caller authentication against the external identity provider.
//!
//! The backend never issues tokens; it verifies provider ID tokens and turns
//! their claims into an [`AuthenticatedUser`](crate::domain::models::auth::AuthenticatedUser).

pub mod identity_service;

pub use identity_service::{verify_with_key_set, IdentityService, TokenError};

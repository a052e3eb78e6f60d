//! Non-persistent domain models
//!
//! - [`auth`]: caller identity and identity-provider token claims
//! - [`pagination`]: page resolution and page metadata

pub mod auth;
pub mod pagination;

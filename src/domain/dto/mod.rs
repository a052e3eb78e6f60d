//! Request and response shapes of the REST API
//!
//! Requests derive `validator::Validate`; handlers call `validate()` before
//! touching a service. Responses serialize in camelCase and expose ids as
//! hex strings and timestamps as RFC 3339.

pub mod books;
pub mod collections;
pub mod comments;
pub mod common;
pub mod favorites;
pub mod users;

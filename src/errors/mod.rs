//! Error handling
//!
//! See [`errors::AppError`] for the variant to status mapping.

#[allow(clippy::module_inception)]
pub mod errors;

pub use errors::*;

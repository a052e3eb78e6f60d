//! Application configuration
//!
//! Static accessors over environment variables, grouped by concern.
//!
//! ```rust,ignore
//! use crate::config::{CacheConfig, ServerConfig};
//!
//! let addr = ServerConfig::bind_address();
//! let ttl = CacheConfig::books_ttl();
//! ```

pub mod app_config;
pub mod identity_config;

pub use app_config::*;
pub use identity_config::*;

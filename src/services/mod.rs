//! Business logic layer.
//!
//! Services are `#[service]` singletons resolved through the registry. Each
//! one owns the rules of a resource (ownership checks, 404s, cascades) and
//! delegates storage to the repositories.
//!
//! ```rust,ignore
//! use crate::services::books::BookService;
//!
//! let books = BookService::instance();
//! let page = books.list(pagination, &links).await?;
//! ```

pub mod auth;
pub mod books;
pub mod collections;
pub mod comments;
pub mod favorites;
pub mod users;

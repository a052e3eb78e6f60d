//! Data access layer
//!
//! Every repository is a `#[repository]` singleton with an injected
//! [`Database`](crate::db::Database); the book and user repositories also
//! receive the [`RedisClient`](crate::caching::redis::RedisClient) for
//! caching. Query and update documents are built by pure functions in the
//! `*_queries` modules.
//!
//! # Examples
//!
//! ```rust,ignore
//! use crate::repositories::books::BookRepository;
//!
//! let page = BookRepository::instance().find_page(Pagination::default()).await?;
//! ```

pub mod books;
pub mod collections;
pub mod comments;
pub mod favorites;
pub mod users;

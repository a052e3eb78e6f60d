//! Caching layer
//!
//! Redis-backed JSON cache shared by the repositories.
//!
//! | Key | Owner | TTL |
//! |-----|-------|-----|
//! | `book_repository:collection:page:{page}:limit:{limit}` | book listing | `BOOKS_CACHE_TTL_SECONDS` |
//! | `book_repository:collection:filter:{sha256}` | filtered listing | `BOOKS_CACHE_TTL_SECONDS` |
//! | `book_repository:collection:options` | filter options | `BOOKS_CACHE_TTL_SECONDS` |
//! | `user_repository:{uid}` | user by uid | `USERS_CACHE_TTL_SECONDS` |
//! | `identity:jwks` | provider signing keys | `JWKS_CACHE_TTL_SECONDS` |
//!
//! Every `book_repository:collection*` key is dropped when a book is
//! created, updated or deleted.

pub mod redis;

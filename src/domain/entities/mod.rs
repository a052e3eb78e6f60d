//! Documents persisted in MongoDB
//!
//! | Entity | Collection | Key constraint |
//! |--------|------------|----------------|
//! | [`books::Book`] | `books` | unique `pathUrl` |
//! | [`users::User`] | `users` | unique `uid`, unique `username` |
//! | [`favorites::Favorite`] | `favorites` | unique `userId` |
//! | [`collections::UserCollections`] | `collections` | unique `userId` |
//! | [`comments::Comment`] | `comments` | - |
//!
//! Field names are stored in camelCase. Book references inside favorites and
//! collections are ObjectIds into `books` and may dangle after a book is
//! deleted; readers remove them lazily.

pub mod books;
pub mod collections;
pub mod comments;
pub mod favorites;
pub mod users;

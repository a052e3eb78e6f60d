//! # Domain layer
//!
//! ```text
//! domain/
//! ├── entities   MongoDB documents
//! ├── dto        API request/response shapes
//! └── models     caller identity, token claims, pagination
//! ```

pub mod dto;
pub mod entities;
pub mod models;

//! # Core
//!
//! Dependency injection container backing the `#[service]` and
//! `#[repository]` macros.
//!
//! | Piece | Role |
//! |-------|------|
//! | [`registry::ServiceLocator`] | type-keyed singleton container |
//! | [`registry::ServiceRegistration`] | emitted by `#[service]` |
//! | [`registry::RepositoryRegistration`] | emitted by `#[repository]` |
//!
//! Adding a component:
//! 1. Annotate the struct with `#[service(name = "...")]` or `#[repository(...)]`.
//! 2. Declare dependencies as `Arc<T>` fields.
//! 3. Call `T::instance()` where it is needed.

pub mod registry;

pub use registry::*;

//! Book catalog service backend
//!
//! REST API over a MongoDB book catalog with per-user favorites, named
//! collections and comments. Callers sign in with an external identity
//! provider; the service verifies their ID tokens and never stores
//! credentials.
//!
//! # Features
//!
//! - **Catalog**: paged listings, faceted filtering, search, recommendations, view counts
//! - **Users**: registration from verified identity claims, cascade deletion
//! - **Favorites & collections**: nested array mutations with dangling-id cleanup
//! - **Comments**: like/dislike reactions with one reaction per user
//! - **Caching**: Redis for listing pages, filter results, profiles and signing keys
//! - **Singleton DI**: `#[service]` / `#[repository]` components resolved at startup
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────┐
//! │   HTTP Routes   │ ← scopes, auth mode, rate limit
//! └─────────────────┘
//!          │
//!          ▼
//! ┌─────────────────┐
//! │    Handlers     │ ← extraction, validation, status codes
//! └─────────────────┘
//!          │
//!          ▼
//! ┌─────────────────┐
//! │    Services     │ ← ownership checks, 404s, cascades
//! └─────────────────┘
//!          │
//!          ▼
//! ┌─────────────────┐
//! │  Repositories   │ ← queries, pipelines, cache keys
//! └─────────────────┘
//!          │
//!          ▼
//! ┌─────────────────┐
//! │ MongoDB + Redis │
//! └─────────────────┘
//! ```
//!
//! # Examples
//!
//! ```rust,ignore
//! use catalog_service_backend::services::books::BookService;
//!
//! let service = BookService::instance();
//! let page = service.list(pagination, &links).await?;
//! ```

pub mod core;
pub mod config;
pub mod db;
pub mod caching;
pub mod domain;
pub mod repositories;
pub mod services;
pub mod utils;
pub mod routes;
pub mod handlers;
pub mod errors;
pub mod middlewares;

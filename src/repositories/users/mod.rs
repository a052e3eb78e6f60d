//! User data access through [`UserRepository`](user_repo::UserRepository).

pub mod user_repo;

pub use user_repo::UserRepository;

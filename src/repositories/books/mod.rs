//! Book data access: [`BookRepository`](book_repo::BookRepository) and the
//! pure query builders in [`book_queries`].

pub mod book_queries;
pub mod book_repo;

pub use book_queries::{BookFilter, FilteredPage};
pub use book_repo::{BookPage, BookRepository};

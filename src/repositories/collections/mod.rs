pub mod collection_queries;
pub mod collection_repo;

pub use collection_queries::OwnedEntry;
pub use collection_repo::CollectionRepository;

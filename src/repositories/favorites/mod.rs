pub mod favorite_queries;
pub mod favorite_repo;

pub use favorite_repo::FavoriteRepository;

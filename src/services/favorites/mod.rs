pub mod favorite_service;

pub use favorite_service::FavoriteService;

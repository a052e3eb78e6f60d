use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::domain::entities::favorites::Favorite;
use crate::utils::mongo_utils::to_chrono;

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FavoriteResponse {
    pub id: String,
    pub user_id: String,
    pub favorite_books: Vec<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<Favorite> for FavoriteResponse {
    fn from(favorite: Favorite) -> Self {
        Self {
            id: favorite.id.map(|id| id.to_hex()).unwrap_or_default(),
            user_id: favorite.user_id,
            favorite_books: favorite.favorite_books.iter().map(|id| id.to_hex()).collect(),
            created_at: to_chrono(favorite.created_at),
            updated_at: to_chrono(favorite.updated_at),
        }
    }
}

use mongodb::bson::{oid::ObjectId, DateTime};
use serde::{Deserialize, Serialize};

/// Favorites document, one per user (`favorites` collection)
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Favorite {
    #[serde(rename = "_id", skip_serializing_if = "Option::is_none")]
    pub id: Option<ObjectId>,
    pub user_id: String,
    /// Set semantics, maintained with `$addToSet` / `$pull`
    #[serde(default)]
    pub favorite_books: Vec<ObjectId>,
    pub created_at: DateTime,
    #[serde(default = "DateTime::now")]
    pub updated_at: DateTime,
}

impl Favorite {
    pub fn contains(&self, book_id: &ObjectId) -> bool {
        self.favorite_books.contains(book_id)
    }
}

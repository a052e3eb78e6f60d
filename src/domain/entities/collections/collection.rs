use mongodb::bson::{oid::ObjectId, DateTime};
use serde::{Deserialize, Serialize};

/// Named reading list inside a user's collections document
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CollectionEntry {
    #[serde(rename = "_id")]
    pub id: ObjectId,
    pub name: String,
    #[serde(default)]
    pub books: Vec<ObjectId>,
    /// Set to true when a book is toggled into the entry
    #[serde(default)]
    pub checked: bool,
    pub created_at: DateTime,
}

impl CollectionEntry {
    pub fn new(name: String) -> Self {
        Self {
            id: ObjectId::new(),
            name,
            books: Vec::new(),
            checked: false,
            created_at: DateTime::now(),
        }
    }

    pub fn contains(&self, book_id: &ObjectId) -> bool {
        self.books.contains(book_id)
    }
}

/// Collections document, one per user (`collections` collection)
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserCollections {
    #[serde(rename = "_id", skip_serializing_if = "Option::is_none")]
    pub id: Option<ObjectId>,
    pub user_id: String,
    #[serde(default)]
    pub collections: Vec<CollectionEntry>,
    pub created_at: DateTime,
    #[serde(default = "DateTime::now")]
    pub updated_at: DateTime,
}

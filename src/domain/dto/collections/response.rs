use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::domain::dto::books::BookSummary;
use crate::domain::entities::collections::CollectionEntry;
use crate::utils::mongo_utils::to_chrono;

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CollectionSummary {
    pub id: String,
    pub name: String,
    pub created_at: DateTime<Utc>,
}

impl From<&CollectionEntry> for CollectionSummary {
    fn from(entry: &CollectionEntry) -> Self {
        Self {
            id: entry.id.to_hex(),
            name: entry.name.clone(),
            created_at: to_chrono(entry.created_at),
        }
    }
}

/// `GET /api/collections/{userId}`
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CollectionListResponse {
    pub total_collections: usize,
    pub collections: Vec<CollectionSummary>,
}

impl CollectionListResponse {
    /// Newest entries first
    pub fn from_entries(entries: &[CollectionEntry]) -> Self {
        let mut collections: Vec<CollectionSummary> = entries.iter().map(CollectionSummary::from).collect();
        collections.sort_by(|a, b| b.created_at.cmp(&a.created_at));

        Self {
            total_collections: collections.len(),
            collections,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct CollectionCreatedResponse {
    pub message: String,
    pub collection: CollectionSummary,
}

/// `GET /api/collections/collection/{collectionId}`
#[derive(Debug, Clone, Serialize)]
pub struct CollectionDetailResponse {
    pub id: String,
    pub name: String,
    pub books: Vec<BookSummary>,
}

/// Whether one book sits in one of the user's entries
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CollectionMembership {
    pub id: String,
    pub name: String,
    pub checked: bool,
    pub is_in_collection: bool,
}

impl CollectionMembership {
    pub fn for_book(entries: &[CollectionEntry], book_id: &mongodb::bson::oid::ObjectId) -> Vec<Self> {
        entries
            .iter()
            .map(|entry| Self {
                id: entry.id.to_hex(),
                name: entry.name.clone(),
                checked: entry.checked,
                is_in_collection: entry.contains(book_id),
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mongodb::bson::{oid::ObjectId, DateTime as BsonDateTime};

    fn entry(name: &str, created_millis: i64, books: Vec<ObjectId>) -> CollectionEntry {
        CollectionEntry {
            id: ObjectId::new(),
            name: name.to_string(),
            books,
            checked: !name.is_empty(),
            created_at: BsonDateTime::from_millis(created_millis),
        }
    }

    #[test]
    fn test_list_is_newest_first() {
        let entries = vec![entry("old", 1_000, vec![]), entry("new", 2_000, vec![])];
        let response = CollectionListResponse::from_entries(&entries);

        assert_eq!(response.total_collections, 2);
        assert_eq!(response.collections[0].name, "new");
    }

    #[test]
    fn test_membership_for_book() {
        let book = ObjectId::new();
        let entries = vec![entry("with", 0, vec![book]), entry("without", 0, vec![ObjectId::new()])];
        let summary = CollectionMembership::for_book(&entries, &book);

        assert!(summary[0].is_in_collection);
        assert!(!summary[1].is_in_collection);
        let json = serde_json::to_value(&summary[0]).unwrap();
        assert_eq!(json["isInCollection"], true);
    }
}

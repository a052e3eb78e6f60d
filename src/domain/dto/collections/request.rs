use serde::{Deserialize, Serialize};
use validator::{Validate, ValidationError};

use crate::domain::dto::common::validate_object_id;
use crate::utils::string_utils::deserialize_trimmed_string;

pub const MAX_COLLECTION_NAME: u64 = 30;

/// Body of `POST /api/collections/{userId}`
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct CreateCollectionRequest {
    #[serde(deserialize_with = "deserialize_trimmed_string")]
    #[validate(length(min = 1, max = MAX_COLLECTION_NAME, message = "Collection name must be 1-30 characters"))]
    pub name: String,
}

/// Body of `PATCH /api/collections/collection/{collectionId}`
#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct RenameCollectionRequest {
    #[serde(deserialize_with = "deserialize_trimmed_string")]
    #[validate(length(min = 1, message = "userId is required"))]
    pub user_id: String,
    #[serde(deserialize_with = "deserialize_trimmed_string")]
    #[validate(length(min = 1, max = MAX_COLLECTION_NAME, message = "Collection name must be 1-30 characters"))]
    pub name: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct ToggleEntry {
    /// Collection entry id
    #[validate(custom(function = "validate_object_id"))]
    pub id: String,
    /// `true` adds the book to the entry, `false` removes it
    pub checked: bool,
}

/// Body of `PATCH /api/collections/books/toggle`
#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct ToggleBooksRequest {
    #[serde(deserialize_with = "deserialize_trimmed_string")]
    #[validate(length(min = 1, message = "userId is required"))]
    pub user_id: String,
    #[serde(deserialize_with = "deserialize_trimmed_string")]
    #[validate(custom(function = "validate_object_id"))]
    pub book_id: String,
    #[validate(length(min = 1, message = "At least one collection is required"), nested)]
    pub collections: Vec<ToggleEntry>,
}

/// A single id or a list of ids
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum OneOrMany {
    One(String),
    Many(Vec<String>),
}

impl OneOrMany {
    pub fn to_vec(&self) -> Vec<String> {
        match self {
            OneOrMany::One(id) => vec![id.clone()],
            OneOrMany::Many(ids) => ids.clone(),
        }
    }
}

fn validate_collection_ids(ids: &OneOrMany) -> Result<(), ValidationError> {
    let ids = ids.to_vec();
    if ids.is_empty() {
        let mut error = ValidationError::new("empty_ids");
        error.message = Some("At least one collectionId is required".into());
        return Err(error);
    }
    ids.iter().try_for_each(|id| validate_object_id(id))
}

/// Body of `PATCH /api/collections/remove`
#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct RemoveBookRequest {
    #[serde(deserialize_with = "deserialize_trimmed_string")]
    #[validate(length(min = 1, message = "userId is required"))]
    pub user_id: String,
    #[serde(deserialize_with = "deserialize_trimmed_string")]
    #[validate(custom(function = "validate_object_id"))]
    pub book_id: String,
    #[validate(custom(function = "validate_collection_ids"))]
    pub collection_id: OneOrMany,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    const ID: &str = "64b7f0c2a1b2c3d4e5f60718";

    #[test]
    fn test_collection_name_length() {
        let ok: CreateCollectionRequest = serde_json::from_value(json!({ "name": " Summer " })).unwrap();
        assert!(ok.validate().is_ok());
        assert_eq!(ok.name, "Summer");

        let long: CreateCollectionRequest = serde_json::from_value(json!({ "name": "x".repeat(31) })).unwrap();
        assert!(long.validate().is_err());

        let blank: CreateCollectionRequest = serde_json::from_value(json!({ "name": "  " })).unwrap();
        assert!(blank.validate().is_err());
    }

    #[test]
    fn test_remove_accepts_one_or_many_ids() {
        let one: RemoveBookRequest =
            serde_json::from_value(json!({ "userId": "u", "bookId": ID, "collectionId": ID })).unwrap();
        assert_eq!(one.collection_id.to_vec(), vec![ID.to_string()]);
        assert!(one.validate().is_ok());

        let many: RemoveBookRequest =
            serde_json::from_value(json!({ "userId": "u", "bookId": ID, "collectionId": [ID, ID] })).unwrap();
        assert_eq!(many.collection_id.to_vec().len(), 2);

        let empty: RemoveBookRequest =
            serde_json::from_value(json!({ "userId": "u", "bookId": ID, "collectionId": [] })).unwrap();
        assert!(empty.validate().is_err());
    }

    #[test]
    fn test_toggle_validates_entries() {
        let request: ToggleBooksRequest = serde_json::from_value(json!({
            "userId": "u",
            "bookId": ID,
            "collections": [{ "id": ID, "checked": true }, { "id": "bad", "checked": false }]
        }))
        .unwrap();
        assert!(request.validate().is_err());

        let empty: ToggleBooksRequest =
            serde_json::from_value(json!({ "userId": "u", "bookId": ID, "collections": [] })).unwrap();
        assert!(empty.validate().is_err());
    }
}

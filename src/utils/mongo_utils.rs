//! Helpers at the boundary between BSON documents and JSON DTOs.

use std::collections::HashSet;

use chrono::{DateTime, Utc};
use futures_util::TryStreamExt;
use mongodb::bson::{self, oid::ObjectId, Document};
use mongodb::Collection;
use serde::de::DeserializeOwned;

use crate::errors::AppError;

/// Parses a hex id from a path or body. Invalid ids are a 400.
pub fn parse_object_id(value: &str, field_name: &str) -> Result<ObjectId, AppError> {
    ObjectId::parse_str(value.trim())
        .map_err(|_| AppError::ValidationError(format!("Invalid {}: {}", field_name, value)))
}

/// Parses several ids, failing on the first invalid one.
pub fn parse_object_ids(values: &[String], field_name: &str) -> Result<Vec<ObjectId>, AppError> {
    values.iter().map(|v| parse_object_id(v, field_name)).collect()
}

/// Ids of `stored` that are absent from `existing`, each reported once.
pub fn missing_ids(stored: &[ObjectId], existing: &[ObjectId]) -> Vec<ObjectId> {
    let existing: HashSet<&ObjectId> = existing.iter().collect();
    let mut seen = HashSet::new();

    stored
        .iter()
        .filter(|id| !existing.contains(id) && seen.insert(**id))
        .copied()
        .collect()
}

pub fn to_chrono(value: bson::DateTime) -> DateTime<Utc> {
    DateTime::from_timestamp_millis(value.timestamp_millis()).unwrap_or_default()
}

/// Deserializes one aggregation output document.
fn from_document<T: DeserializeOwned>(document: Document) -> Result<T, AppError> {
    bson::from_document(document).map_err(|e| AppError::DatabaseError(format!("Unexpected document shape: {}", e)))
}

/// Runs `pipeline` and deserializes every output document into `T`.
pub async fn aggregate_as<C, T>(collection: &Collection<C>, pipeline: Vec<Document>) -> Result<Vec<T>, AppError>
where
    C: Send + Sync,
    T: DeserializeOwned,
{
    let documents: Vec<Document> = collection
        .aggregate(pipeline)
        .await
        .map_err(db_error)?
        .try_collect()
        .await
        .map_err(db_error)?;

    documents.into_iter().map(from_document).collect()
}

pub fn db_error(error: mongodb::error::Error) -> AppError {
    AppError::DatabaseError(error.to_string())
}

/// True for a unique index violation (E11000).
pub fn is_duplicate_key(error: &mongodb::error::Error) -> bool {
    use mongodb::error::{ErrorKind, WriteFailure};

    match error.kind.as_ref() {
        ErrorKind::Write(WriteFailure::WriteError(write_error)) => write_error.code == 11000,
        ErrorKind::Command(command_error) => command_error.code == 11000,
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mongodb::bson::doc;
    use serde::Deserialize;

    #[test]
    fn test_missing_ids() {
        let (a, b, c) = (ObjectId::new(), ObjectId::new(), ObjectId::new());

        assert!(missing_ids(&[], &[a]).is_empty());
        assert!(missing_ids(&[a, b], &[b, a]).is_empty());
        assert_eq!(missing_ids(&[a, b], &[]), vec![a, b]);
        assert_eq!(missing_ids(&[a, b, c], &[b]), vec![a, c]);
    }

    #[test]
    fn test_missing_ids_reports_duplicates_once() {
        let (a, b) = (ObjectId::new(), ObjectId::new());
        assert_eq!(missing_ids(&[a, b, a, a], &[b]), vec![a]);
    }

    #[test]
    fn test_parse_object_id() {
        let oid = ObjectId::new();
        assert_eq!(parse_object_id(&oid.to_hex(), "book id").unwrap(), oid);

        match parse_object_id("not-an-id", "book id") {
            Err(AppError::ValidationError(msg)) => assert!(msg.contains("book id")),
            other => panic!("expected validation error, got {:?}", other),
        }
    }

    #[test]
    fn test_parse_object_ids_fails_on_any_invalid() {
        let ids = vec![ObjectId::new().to_hex(), "bad".to_string()];
        assert!(parse_object_ids(&ids, "collection id").is_err());
    }

    #[test]
    fn test_to_chrono_keeps_millis() {
        let dt = bson::DateTime::from_millis(1_700_000_000_123);
        assert_eq!(to_chrono(dt).timestamp_millis(), 1_700_000_000_123);
    }

    #[test]
    fn test_from_document() {
        #[derive(Deserialize)]
        struct Count {
            total: i64,
        }

        let parsed: Count = from_document(doc! { "total": 3_i64 }).unwrap();
        assert_eq!(parsed.total, 3);
        assert!(from_document::<Count>(doc! { "other": 1 }).is_err());
    }
}

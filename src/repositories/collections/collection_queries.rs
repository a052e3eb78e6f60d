//! Filters and updates for the nested `collections` array.
//!
//! Entries are addressed either with the positional `$` operator (one
//! entry matched by the filter) or with the `$[entry]` filtered operator
//! plus an `arrayFilters` document (several entries at once).

use mongodb::bson::{self, doc, oid::ObjectId, DateTime, Document};
use serde::Deserialize;

use crate::domain::entities::collections::CollectionEntry;
use crate::errors::{AppResult, ErrorContext};

/// One entry together with the user that owns it
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OwnedEntry {
    pub user_id: String,
    pub entry: CollectionEntry,
}

/// Upsert-safe push of a new entry.
pub fn push_entry_update(entry: &CollectionEntry) -> AppResult<Document> {
    let entry = bson::to_bson(entry).context("Failed to encode collection entry")?;
    let now = DateTime::now();

    Ok(doc! {
        "$push": { "collections": entry },
        "$set": { "updatedAt": now },
        "$setOnInsert": { "createdAt": now },
    })
}

/// Matches the user's document when it holds any of `entry_ids`.
pub fn owned_entries_filter(user_id: &str, entry_ids: &[ObjectId]) -> Document {
    doc! { "userId": user_id, "collections._id": { "$in": entry_ids } }
}

/// `arrayFilters` selecting `entry_ids` as `$[entry]`
pub fn entry_array_filter(entry_ids: &[ObjectId]) -> Document {
    doc! { "entry._id": { "$in": entry_ids } }
}

pub fn rename_update(name: &str) -> Document {
    doc! {
        "$set": { "collections.$.name": name, "updatedAt": DateTime::now() },
    }
}

/// Adds the book to every `$[entry]` and marks them checked.
pub fn add_book_update(book_id: ObjectId) -> Document {
    doc! {
        "$addToSet": { "collections.$[entry].books": book_id },
        "$set": { "collections.$[entry].checked": true, "updatedAt": DateTime::now() },
    }
}

/// Removes the book from every `$[entry]` and clears `checked`.
pub fn remove_book_update(book_id: ObjectId) -> Document {
    doc! {
        "$pull": { "collections.$[entry].books": book_id },
        "$set": { "collections.$[entry].checked": false, "updatedAt": DateTime::now() },
    }
}

pub fn remove_entry_update(entry_id: ObjectId) -> Document {
    doc! {
        "$pull": { "collections": { "_id": entry_id } },
        "$set": { "updatedAt": DateTime::now() },
    }
}

/// Drops dangling book references from the entry matched positionally.
pub fn pull_missing_books_update(book_ids: &[ObjectId]) -> Document {
    doc! {
        "$pull": { "collections.$.books": { "$in": book_ids } },
    }
}

/// Extracts a single entry and its owner.
pub fn entry_pipeline(entry_id: ObjectId) -> Vec<Document> {
    vec![
        doc! { "$match": { "collections._id": entry_id } },
        doc! { "$unwind": "$collections" },
        doc! { "$match": { "collections._id": entry_id } },
        doc! { "$project": { "_id": 0, "userId": 1, "entry": "$collections" } },
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_push_entry_update() {
        let entry = CollectionEntry::new("Summer".to_string());
        let update = push_entry_update(&entry).unwrap();
        let pushed = update.get_document("$push").unwrap().get_document("collections").unwrap();

        assert_eq!(pushed.get_object_id("_id").unwrap(), entry.id);
        assert_eq!(pushed.get_str("name").unwrap(), "Summer");
        assert!(!pushed.get_bool("checked").unwrap());
        assert!(update.get_document("$setOnInsert").unwrap().contains_key("createdAt"));
    }

    #[test]
    fn test_add_and_remove_toggle_checked() {
        let book = ObjectId::new();

        let add = add_book_update(book);
        assert!(add.get_document("$set").unwrap().get_bool("collections.$[entry].checked").unwrap());
        assert_eq!(
            add.get_document("$addToSet").unwrap().get_object_id("collections.$[entry].books").unwrap(),
            book
        );

        let remove = remove_book_update(book);
        assert!(!remove.get_document("$set").unwrap().get_bool("collections.$[entry].checked").unwrap());
    }

    #[test]
    fn test_array_filter_targets_entry_ids() {
        let ids = vec![ObjectId::new()];
        let filter = entry_array_filter(&ids);
        assert_eq!(filter.get_document("entry._id").unwrap().get_array("$in").unwrap().len(), 1);

        let owned = owned_entries_filter("uid-1", &ids);
        assert_eq!(owned.get_str("userId").unwrap(), "uid-1");
    }

    #[test]
    fn test_entry_pipeline_reads_owned_entry() {
        let id = ObjectId::new();
        let pipeline = entry_pipeline(id);
        assert_eq!(pipeline.len(), 4);

        let output = doc! {
            "userId": "uid-1",
            "entry": { "_id": id, "name": "Summer", "books": [], "createdAt": DateTime::now() },
        };
        let owned: OwnedEntry = bson::from_document(output).unwrap();
        assert_eq!(owned.entry.id, id);
        assert!(!owned.entry.checked);
    }
}

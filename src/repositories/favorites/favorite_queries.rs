//! Update documents for the per-user favorites document.
//!
//! `favoriteBooks` behaves as a set: additions go through `$addToSet` and
//! removals through `$pull`, so concurrent requests never duplicate an id.

use mongodb::bson::{doc, oid::ObjectId, DateTime, Document};

/// Upsert-safe addition; the first call creates the document.
pub fn add_book_update(book_id: ObjectId) -> Document {
    let now = DateTime::now();
    doc! {
        "$addToSet": { "favoriteBooks": book_id },
        "$set": { "updatedAt": now },
        "$setOnInsert": { "createdAt": now },
    }
}

pub fn remove_book_update(book_id: ObjectId) -> Document {
    doc! {
        "$pull": { "favoriteBooks": book_id },
        "$set": { "updatedAt": DateTime::now() },
    }
}

/// Drops references to books that no longer exist.
pub fn pull_books_update(book_ids: &[ObjectId]) -> Document {
    doc! {
        "$pull": { "favoriteBooks": { "$in": book_ids } },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_add_uses_add_to_set_and_set_on_insert() {
        let id = ObjectId::new();
        let update = add_book_update(id);

        assert_eq!(update.get_document("$addToSet").unwrap().get_object_id("favoriteBooks").unwrap(), id);
        assert!(update.get_document("$setOnInsert").unwrap().contains_key("createdAt"));
        assert!(!update.get_document("$set").unwrap().contains_key("createdAt"));
    }

    #[test]
    fn test_pull_books_uses_in() {
        let ids = vec![ObjectId::new(), ObjectId::new()];
        let update = pull_books_update(&ids);
        let pulled = update.get_document("$pull").unwrap().get_document("favoriteBooks").unwrap();

        assert_eq!(pulled.get_array("$in").unwrap().len(), 2);
    }
}

//! # Collection repository
//!
//! One document per user in `collections`; named entries live in its
//! `collections` array and are mutated in place.

use std::sync::Arc;

use mongodb::{
    bson::{doc, oid::ObjectId, Document},
    options::{IndexOptions, UpdateOptions},
    IndexModel,
};
use singleton_macro::repository;

use crate::{
    db::Database,
    domain::entities::collections::{CollectionEntry, UserCollections},
    errors::AppError,
    repositories::collections::collection_queries::{self, OwnedEntry},
    utils::mongo_utils::{aggregate_as, db_error},
};

#[repository(name = "collection", collection = "collections")]
pub struct CollectionRepository {
    db: Arc<Database>,
}

impl CollectionRepository {
    pub async fn find_by_user(&self, user_id: &str) -> Result<Option<UserCollections>, AppError> {
        self.collection::<UserCollections>()
            .find_one(doc! { "userId": user_id })
            .await
            .map_err(db_error)
    }

    /// Appends `entry`, creating the user's document when needed.
    pub async fn push_entry(&self, user_id: &str, entry: &CollectionEntry) -> Result<(), AppError> {
        let options = UpdateOptions::builder().upsert(true).build();

        self.collection::<UserCollections>()
            .update_one(doc! { "userId": user_id }, collection_queries::push_entry_update(entry)?)
            .with_options(options)
            .await
            .map_err(db_error)?;
        Ok(())
    }

    pub async fn find_entry(&self, entry_id: ObjectId) -> Result<Option<OwnedEntry>, AppError> {
        let entries: Vec<OwnedEntry> =
            aggregate_as(&self.collection::<UserCollections>(), collection_queries::entry_pipeline(entry_id)).await?;
        Ok(entries.into_iter().next())
    }

    pub async fn pull_missing_books(&self, entry_id: ObjectId, book_ids: &[ObjectId]) -> Result<(), AppError> {
        if book_ids.is_empty() {
            return Ok(());
        }

        self.collection::<UserCollections>()
            .update_one(
                doc! { "collections._id": entry_id },
                collection_queries::pull_missing_books_update(book_ids),
            )
            .await
            .map_err(db_error)?;
        Ok(())
    }

    /// `false` when the user holds no entry `entry_id`.
    pub async fn rename(&self, user_id: &str, entry_id: ObjectId, name: &str) -> Result<bool, AppError> {
        let result = self
            .collection::<UserCollections>()
            .update_one(
                doc! { "userId": user_id, "collections._id": entry_id },
                collection_queries::rename_update(name),
            )
            .await
            .map_err(db_error)?;
        Ok(result.matched_count > 0)
    }

    /// Adds `book_id` to the entries `entry_ids`. Returns whether any matched.
    pub async fn add_book(&self, user_id: &str, entry_ids: &[ObjectId], book_id: ObjectId) -> Result<bool, AppError> {
        self.update_entries(user_id, entry_ids, collection_queries::add_book_update(book_id)).await
    }

    /// Removes `book_id` from the entries `entry_ids`. Returns whether any matched.
    pub async fn remove_book(&self, user_id: &str, entry_ids: &[ObjectId], book_id: ObjectId) -> Result<bool, AppError> {
        self.update_entries(user_id, entry_ids, collection_queries::remove_book_update(book_id)).await
    }

    async fn update_entries(&self, user_id: &str, entry_ids: &[ObjectId], update: Document) -> Result<bool, AppError> {
        let options = UpdateOptions::builder()
            .array_filters(vec![collection_queries::entry_array_filter(entry_ids)])
            .build();

        let result = self
            .collection::<UserCollections>()
            .update_one(collection_queries::owned_entries_filter(user_id, entry_ids), update)
            .with_options(options)
            .await
            .map_err(db_error)?;
        Ok(result.matched_count > 0)
    }

    pub async fn remove_entry(&self, user_id: &str, entry_id: ObjectId) -> Result<(), AppError> {
        self.collection::<UserCollections>()
            .update_one(doc! { "userId": user_id }, collection_queries::remove_entry_update(entry_id))
            .await
            .map_err(db_error)?;
        Ok(())
    }

    pub async fn delete_by_user(&self, user_id: &str) -> Result<bool, AppError> {
        let result = self
            .collection::<UserCollections>()
            .delete_one(doc! { "userId": user_id })
            .await
            .map_err(db_error)?;
        Ok(result.deleted_count > 0)
    }

    pub async fn create_indexes(&self) -> Result<(), AppError> {
        let user_index = IndexModel::builder()
            .keys(doc! { "userId": 1 })
            .options(IndexOptions::builder().unique(true).name("user_id_unique".to_string()).build())
            .build();

        self.collection::<UserCollections>()
            .create_indexes([user_index])
            .await
            .map_err(db_error)?;
        Ok(())
    }
}

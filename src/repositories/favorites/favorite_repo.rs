//! # Favorite repository
//!
//! One document per user in `favorites`, keyed by the unique `userId`.

use std::sync::Arc;

use mongodb::{
    bson::{doc, oid::ObjectId},
    options::{FindOneAndUpdateOptions, IndexOptions, ReturnDocument},
    IndexModel,
};
use singleton_macro::repository;

use crate::{
    db::Database,
    domain::entities::favorites::Favorite,
    errors::AppError,
    repositories::favorites::favorite_queries,
    utils::mongo_utils::db_error,
};

#[repository(name = "favorite", collection = "favorites")]
pub struct FavoriteRepository {
    db: Arc<Database>,
}

impl FavoriteRepository {
    pub async fn find_by_user(&self, user_id: &str) -> Result<Option<Favorite>, AppError> {
        self.collection::<Favorite>()
            .find_one(doc! { "userId": user_id })
            .await
            .map_err(db_error)
    }

    pub async fn is_favorite(&self, user_id: &str, book_id: ObjectId) -> Result<bool, AppError> {
        let count = self
            .collection::<Favorite>()
            .count_documents(doc! { "userId": user_id, "favoriteBooks": book_id })
            .await
            .map_err(db_error)?;
        Ok(count > 0)
    }

    /// Adds `book_id`, creating the user's document when needed.
    pub async fn add_book(&self, user_id: &str, book_id: ObjectId) -> Result<Favorite, AppError> {
        let options = FindOneAndUpdateOptions::builder()
            .return_document(ReturnDocument::After)
            .upsert(true)
            .build();

        self.collection::<Favorite>()
            .find_one_and_update(doc! { "userId": user_id }, favorite_queries::add_book_update(book_id))
            .with_options(options)
            .await
            .map_err(db_error)?
            .ok_or_else(|| AppError::InternalError("Favorite upsert returned no document".to_string()))
    }

    /// Removes `book_id`; `None` when the user has no favorites document.
    pub async fn remove_book(&self, user_id: &str, book_id: ObjectId) -> Result<Option<Favorite>, AppError> {
        let options = FindOneAndUpdateOptions::builder()
            .return_document(ReturnDocument::After)
            .build();

        self.collection::<Favorite>()
            .find_one_and_update(doc! { "userId": user_id }, favorite_queries::remove_book_update(book_id))
            .with_options(options)
            .await
            .map_err(db_error)
    }

    pub async fn pull_books(&self, user_id: &str, book_ids: &[ObjectId]) -> Result<(), AppError> {
        if book_ids.is_empty() {
            return Ok(());
        }

        self.collection::<Favorite>()
            .update_one(doc! { "userId": user_id }, favorite_queries::pull_books_update(book_ids))
            .await
            .map_err(db_error)?;
        Ok(())
    }

    pub async fn delete_by_user(&self, user_id: &str) -> Result<bool, AppError> {
        let result = self
            .collection::<Favorite>()
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

        self.collection::<Favorite>()
            .create_indexes([user_index])
            .await
            .map_err(db_error)?;
        Ok(())
    }
}

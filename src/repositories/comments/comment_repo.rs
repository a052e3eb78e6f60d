//! # Comment repository
//!
//! Data access for `comments`, listed newest first.

use std::sync::Arc;

use futures_util::TryStreamExt;
use mongodb::{
    bson::{doc, oid::ObjectId},
    options::{FindOneAndUpdateOptions, IndexOptions, ReturnDocument},
    IndexModel,
};
use singleton_macro::repository;

use crate::{
    db::Database,
    domain::dto::comments::CommentStats,
    domain::entities::comments::{Comment, ReactionChange},
    errors::AppError,
    repositories::comments::comment_queries,
    utils::mongo_utils::{aggregate_as, db_error},
};

#[repository(name = "comment", collection = "comments")]
pub struct CommentRepository {
    db: Arc<Database>,
}

impl CommentRepository {
    pub async fn create(&self, mut comment: Comment) -> Result<Comment, AppError> {
        let result = self
            .collection::<Comment>()
            .insert_one(&comment)
            .await
            .map_err(db_error)?;

        comment.id = result.inserted_id.as_object_id();
        Ok(comment)
    }

    pub async fn find_by_id(&self, id: ObjectId) -> Result<Option<Comment>, AppError> {
        self.collection::<Comment>()
            .find_one(doc! { "_id": id })
            .await
            .map_err(db_error)
    }

    /// One window of a book's comments and the book's total.
    pub async fn find_by_book(&self, book_id: ObjectId, limit: u64, offset: u64) -> Result<(Vec<Comment>, u64), AppError> {
        let collection = self.collection::<Comment>();

        let total = collection
            .count_documents(doc! { "bookId": book_id })
            .await
            .map_err(db_error)?;

        let comments: Vec<Comment> = collection
            .find(doc! { "bookId": book_id })
            .sort(doc! { "createdAt": -1 })
            .skip(offset)
            .limit(limit as i64)
            .await
            .map_err(db_error)?
            .try_collect()
            .await
            .map_err(db_error)?;

        Ok((comments, total))
    }

    pub async fn find_by_author(&self, user_id: &str) -> Result<Vec<Comment>, AppError> {
        self.collection::<Comment>()
            .find(doc! { "author.userId": user_id })
            .sort(doc! { "createdAt": -1 })
            .await
            .map_err(db_error)?
            .try_collect()
            .await
            .map_err(db_error)
    }

    pub async fn update_text(&self, id: ObjectId, text: &str) -> Result<Option<Comment>, AppError> {
        let options = FindOneAndUpdateOptions::builder()
            .return_document(ReturnDocument::After)
            .build();

        self.collection::<Comment>()
            .find_one_and_update(doc! { "_id": id }, comment_queries::edit_update(text))
            .with_options(options)
            .await
            .map_err(db_error)
    }

    pub async fn apply_reaction(
        &self,
        id: ObjectId,
        user_id: &str,
        change: ReactionChange,
    ) -> Result<Option<Comment>, AppError> {
        let options = FindOneAndUpdateOptions::builder()
            .return_document(ReturnDocument::After)
            .build();

        self.collection::<Comment>()
            .find_one_and_update(doc! { "_id": id }, comment_queries::reaction_pipeline(user_id, change))
            .with_options(options)
            .await
            .map_err(db_error)
    }

    pub async fn delete(&self, id: ObjectId) -> Result<bool, AppError> {
        let result = self
            .collection::<Comment>()
            .delete_one(doc! { "_id": id })
            .await
            .map_err(db_error)?;
        Ok(result.deleted_count > 0)
    }

    pub async fn stats(&self, book_id: ObjectId) -> Result<CommentStats, AppError> {
        let stats: Vec<CommentStats> =
            aggregate_as(&self.collection::<Comment>(), comment_queries::stats_pipeline(book_id)).await?;
        Ok(stats.into_iter().next().unwrap_or_default())
    }

    pub async fn create_indexes(&self) -> Result<(), AppError> {
        let book_index = IndexModel::builder()
            .keys(doc! { "bookId": 1, "createdAt": -1 })
            .options(IndexOptions::builder().name("book_id_created_at".to_string()).build())
            .build();

        let author_index = IndexModel::builder()
            .keys(doc! { "author.userId": 1 })
            .options(IndexOptions::builder().name("author_user_id".to_string()).build())
            .build();

        self.collection::<Comment>()
            .create_indexes([book_index, author_index])
            .await
            .map_err(db_error)?;
        Ok(())
    }
}

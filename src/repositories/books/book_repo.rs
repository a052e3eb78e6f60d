//! # Book repository
//!
//! Data access for the `books` collection with Redis caching of the
//! listing endpoints.
//!
//! ## Cache keys
//!
//! - page listing: `book_repository:collection:page:{page}:limit:{limit}`
//! - filtered listing: `book_repository:collection:filter:{sha256}`
//! - options: `book_repository:collection:options`
//!
//! Every write drops all `book_repository:collection*` keys. A failed
//! invalidation is logged and never fails the write.

use std::sync::Arc;

use log::{debug, warn};
use mongodb::{
    bson::{doc, oid::ObjectId, Document},
    options::{FindOneAndUpdateOptions, IndexOptions, ReturnDocument},
    IndexModel,
};
use serde::{Deserialize, Serialize};
use singleton_macro::repository;

use crate::{
    caching::redis::RedisClient,
    config::CacheConfig,
    core::registry::Repository,
    db::Database,
    domain::dto::books::{BookOptions, BookSummary, BookTeaser, ViewedBook},
    domain::entities::books::Book,
    domain::models::pagination::Pagination,
    errors::AppError,
    repositories::books::book_queries::{self, BookFilter, FilteredPage},
    utils::mongo_utils::{aggregate_as, db_error, is_duplicate_key},
};

/// One page of summaries and the size of the whole result set
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BookPage {
    pub results: Vec<BookSummary>,
    pub total: u64,
}

#[repository(name = "book", collection = "books")]
pub struct BookRepository {
    db: Arc<Database>,
    redis: Arc<RedisClient>,
}

impl BookRepository {
    /// Newest-first page of the whole catalog, cached per page.
    pub async fn find_page(&self, pagination: Pagination) -> Result<BookPage, AppError> {
        let cache_key = self.collection_cache_key(Some(&pagination.cache_suffix()));

        if let Some(cached) = self.redis.get_or_miss::<BookPage>(&cache_key).await {
            debug!("Cache hit: {}", cache_key);
            return Ok(cached);
        }

        let page = self.find_page_matching(doc! {}, pagination).await?;
        self.redis.store(&cache_key, &page, CacheConfig::books_ttl()).await;

        Ok(page)
    }

    /// Newest-first page of the books owned by `user_id`.
    pub async fn find_page_by_user(&self, user_id: &str, pagination: Pagination) -> Result<BookPage, AppError> {
        self.find_page_matching(doc! { "userId": user_id }, pagination).await
    }

    /// Newest-first page restricted to `ids`.
    pub async fn find_page_by_ids(&self, ids: &[ObjectId], pagination: Pagination) -> Result<BookPage, AppError> {
        self.find_page_matching(doc! { "_id": { "$in": ids } }, pagination).await
    }

    /// Summaries of `ids`, newest first, without paging.
    pub async fn find_summaries_by_ids(&self, ids: &[ObjectId]) -> Result<Vec<BookSummary>, AppError> {
        let pipeline = vec![
            doc! { "$match": { "_id": { "$in": ids } } },
            doc! { "$sort": { "_id": -1 } },
            doc! { "$project": book_queries::summary_projection() },
        ];
        aggregate_as(&self.collection::<Book>(), pipeline).await
    }

    async fn find_page_matching(&self, filter: Document, pagination: Pagination) -> Result<BookPage, AppError> {
        let collection = self.collection::<Book>();

        let total = collection
            .count_documents(filter.clone())
            .await
            .map_err(db_error)?;

        let results = if total == 0 {
            Vec::new()
        } else {
            aggregate_as(&collection, book_queries::list_pipeline(filter, pagination)).await?
        };

        Ok(BookPage { results, total })
    }

    /// Faceted listing for `filter`, cached by its fingerprint.
    pub async fn find_filtered(&self, filter: &BookFilter, pagination: Pagination) -> Result<FilteredPage, AppError> {
        let suffix = format!("filter:{}", filter.cache_fingerprint(pagination));
        let cache_key = self.collection_cache_key(Some(&suffix));

        if let Some(cached) = self.redis.get_or_miss::<FilteredPage>(&cache_key).await {
            debug!("Cache hit: {}", cache_key);
            return Ok(cached);
        }

        let page = aggregate_as::<_, FilteredPage>(
            &self.collection::<Book>(),
            book_queries::filtering_pipeline(filter, pagination),
        )
        .await?
        .into_iter()
        .next()
        .unwrap_or_default();

        self.redis.store(&cache_key, &page, CacheConfig::books_ttl()).await;

        Ok(page)
    }

    pub async fn find_options(&self) -> Result<BookOptions, AppError> {
        let cache_key = self.collection_cache_key(Some("options"));

        if let Some(cached) = self.redis.get_or_miss::<BookOptions>(&cache_key).await {
            return Ok(cached);
        }

        let options = aggregate_as::<_, BookOptions>(&self.collection::<Book>(), book_queries::options_pipeline())
            .await?
            .into_iter()
            .next()
            .unwrap_or_default();

        self.redis.store(&cache_key, &options, CacheConfig::books_ttl()).await;

        Ok(options)
    }

    pub async fn search(&self, term: &str) -> Result<Vec<BookTeaser>, AppError> {
        let pipeline = vec![
            doc! { "$match": book_queries::search_filter(term) },
            doc! { "$sort": { "_id": -1 } },
            doc! { "$project": book_queries::teaser_projection() },
        ];
        aggregate_as(&self.collection::<Book>(), pipeline).await
    }

    /// Random teasers among the books matching `filter`.
    pub async fn sample(&self, filter: Document) -> Result<Vec<BookTeaser>, AppError> {
        aggregate_as(&self.collection::<Book>(), book_queries::sample_pipeline(filter)).await
    }

    pub async fn most_viewed_summary(&self) -> Result<Vec<ViewedBook>, AppError> {
        let pipeline = book_queries::most_viewed_pipeline(book_queries::viewed_projection());
        aggregate_as(&self.collection::<Book>(), pipeline).await
    }

    pub async fn most_viewed_full(&self) -> Result<Vec<BookSummary>, AppError> {
        let pipeline = book_queries::most_viewed_pipeline(book_queries::summary_projection());
        aggregate_as(&self.collection::<Book>(), pipeline).await
    }

    pub async fn find_by_id(&self, id: ObjectId) -> Result<Option<Book>, AppError> {
        self.collection::<Book>()
            .find_one(doc! { "_id": id })
            .await
            .map_err(db_error)
    }

    pub async fn find_by_path_url(&self, path_url: &str) -> Result<Option<Book>, AppError> {
        self.collection::<Book>()
            .find_one(doc! { "pathUrl": path_url })
            .await
            .map_err(db_error)
    }

    pub async fn exists(&self, id: ObjectId) -> Result<bool, AppError> {
        let count = self
            .collection::<Book>()
            .count_documents(doc! { "_id": id })
            .await
            .map_err(db_error)?;
        Ok(count > 0)
    }

    /// The subset of `ids` that still exist.
    pub async fn find_existing_ids(&self, ids: &[ObjectId]) -> Result<Vec<ObjectId>, AppError> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }

        #[derive(Deserialize)]
        struct IdOnly {
            #[serde(rename = "_id")]
            id: ObjectId,
        }

        let pipeline = vec![
            doc! { "$match": { "_id": { "$in": ids } } },
            doc! { "$project": { "_id": 1 } },
        ];
        let found: Vec<IdOnly> = aggregate_as(&self.collection::<Book>(), pipeline).await?;

        Ok(found.into_iter().map(|book| book.id).collect())
    }

    /// Increments `views` and returns the updated book.
    pub async fn record_view(&self, id: ObjectId) -> Result<Option<Book>, AppError> {
        let options = FindOneAndUpdateOptions::builder()
            .return_document(ReturnDocument::After)
            .build();

        self.collection::<Book>()
            .find_one_and_update(doc! { "_id": id }, doc! { "$inc": { "views": 1 } })
            .with_options(options)
            .await
            .map_err(db_error)
    }

    /// Inserts `book`; a taken `pathUrl` is a 409.
    pub async fn create(&self, mut book: Book) -> Result<Book, AppError> {
        let result = self
            .collection::<Book>()
            .insert_one(&book)
            .await
            .map_err(|e| {
                if is_duplicate_key(&e) {
                    AppError::ConflictError(format!("A book with pathUrl '{}' already exists", book.path_url))
                } else {
                    db_error(e)
                }
            })?;

        book.id = result.inserted_id.as_object_id();
        self.invalidate_listings().await;

        Ok(book)
    }

    /// Applies `update` and returns the new document, `None` when missing.
    pub async fn update(&self, id: ObjectId, update: Document) -> Result<Option<Book>, AppError> {
        let options = FindOneAndUpdateOptions::builder()
            .return_document(ReturnDocument::After)
            .build();

        let updated = self
            .collection::<Book>()
            .find_one_and_update(doc! { "_id": id }, update)
            .with_options(options)
            .await
            .map_err(|e| {
                if is_duplicate_key(&e) {
                    AppError::ConflictError("Another book already uses this pathUrl".to_string())
                } else {
                    db_error(e)
                }
            })?;

        if updated.is_some() {
            self.invalidate_listings().await;
        }

        Ok(updated)
    }

    pub async fn delete(&self, id: ObjectId) -> Result<bool, AppError> {
        let result = self
            .collection::<Book>()
            .delete_one(doc! { "_id": id })
            .await
            .map_err(db_error)?;

        if result.deleted_count > 0 {
            self.invalidate_listings().await;
        }

        Ok(result.deleted_count > 0)
    }

    /// Removes every book owned by `user_id`.
    pub async fn delete_by_user(&self, user_id: &str) -> Result<u64, AppError> {
        let result = self
            .collection::<Book>()
            .delete_many(doc! { "userId": user_id })
            .await
            .map_err(db_error)?;

        if result.deleted_count > 0 {
            self.invalidate_listings().await;
        }

        Ok(result.deleted_count)
    }

    async fn invalidate_listings(&self) {
        let pattern = format!("{}*", self.collection_cache_key(None));
        if let Err(e) = self.invalidate_pattern_cache(&pattern).await {
            warn!("Failed to invalidate book listing cache: {}", e);
        }
    }

    pub async fn create_indexes(&self) -> Result<(), AppError> {
        let path_url_index = IndexModel::builder()
            .keys(doc! { "pathUrl": 1 })
            .options(IndexOptions::builder().unique(true).name("path_url_unique".to_string()).build())
            .build();

        let user_index = IndexModel::builder()
            .keys(doc! { "userId": 1 })
            .options(IndexOptions::builder().name("user_id".to_string()).build())
            .build();

        let views_index = IndexModel::builder()
            .keys(doc! { "views": -1 })
            .options(IndexOptions::builder().name("views_desc".to_string()).build())
            .build();

        self.collection::<Book>()
            .create_indexes([path_url_index, user_index, views_index])
            .await
            .map_err(db_error)?;

        Ok(())
    }
}

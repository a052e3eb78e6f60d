//! # Collection service
//!
//! Named reading lists kept inside one document per user. Every mutation
//! goes through the owner check of the caller's identity first.

use std::sync::Arc;

use futures_util::future::try_join_all;
use log::{debug, info};
use singleton_macro::service;

use crate::{
    domain::dto::collections::{
        CollectionCreatedResponse, CollectionDetailResponse, CollectionListResponse, CollectionMembership,
        CollectionSummary, CreateCollectionRequest, RemoveBookRequest, RenameCollectionRequest, ToggleBooksRequest,
    },
    domain::entities::collections::CollectionEntry,
    domain::models::auth::AuthenticatedUser,
    errors::AppError,
    repositories::{books::BookRepository, collections::CollectionRepository},
    utils::mongo_utils::{missing_ids, parse_object_id, parse_object_ids},
};

#[service(name = "collection")]
pub struct CollectionService {
    collection_repo: Arc<CollectionRepository>,
    book_repo: Arc<BookRepository>,
}

fn collection_not_found() -> AppError {
    AppError::NotFound("Collection not found".to_string())
}

impl CollectionService {
    pub async fn list(&self, user_id: &str) -> Result<CollectionListResponse, AppError> {
        let entries = self.entries_of(user_id.trim()).await?;
        Ok(CollectionListResponse::from_entries(&entries))
    }

    pub async fn create(
        &self,
        caller: &AuthenticatedUser,
        user_id: &str,
        request: CreateCollectionRequest,
    ) -> Result<CollectionCreatedResponse, AppError> {
        caller.ensure_owner(user_id)?;

        let entry = CollectionEntry::new(request.name);
        self.collection_repo.push_entry(user_id.trim(), &entry).await?;
        info!("Collection '{}' created for {}", entry.name, caller.uid);

        Ok(CollectionCreatedResponse {
            message: format!("Collection {} created", entry.name),
            collection: CollectionSummary::from(&entry),
        })
    }

    /// Idempotent; returns whether the user had any collections.
    pub async fn delete_all(&self, caller: &AuthenticatedUser, user_id: &str) -> Result<bool, AppError> {
        caller.ensure_owner(user_id)?;
        self.collection_repo.delete_by_user(user_id.trim()).await
    }

    /// One entry with its books; references to deleted books are pruned.
    pub async fn detail(&self, collection_id: &str) -> Result<CollectionDetailResponse, AppError> {
        let entry_id = parse_object_id(collection_id, "collection id")?;
        let owned = self
            .collection_repo
            .find_entry(entry_id)
            .await?
            .ok_or_else(collection_not_found)?;

        let entry = owned.entry;
        let existing = self.book_repo.find_existing_ids(&entry.books).await?;
        let missing = missing_ids(&entry.books, &existing);

        if !missing.is_empty() {
            debug!("Pruning {} missing books from collection {}", missing.len(), entry.id);
            self.collection_repo.pull_missing_books(entry.id, &missing).await?;
        }

        let books = self.book_repo.find_summaries_by_ids(&existing).await?;

        Ok(CollectionDetailResponse {
            id: entry.id.to_hex(),
            name: entry.name,
            books,
        })
    }

    pub async fn rename(
        &self,
        caller: &AuthenticatedUser,
        collection_id: &str,
        request: RenameCollectionRequest,
    ) -> Result<String, AppError> {
        caller.ensure_owner(&request.user_id)?;
        let entry_id = parse_object_id(collection_id, "collection id")?;

        if !self.collection_repo.rename(&request.user_id, entry_id, &request.name).await? {
            return Err(collection_not_found());
        }

        Ok(format!("Collection renamed to {}", request.name))
    }

    /// Idempotent
    pub async fn delete_entry(&self, caller: &AuthenticatedUser, user_id: &str, collection_id: &str) -> Result<(), AppError> {
        caller.ensure_owner(user_id)?;
        let entry_id = parse_object_id(collection_id, "collection id")?;
        self.collection_repo.remove_entry(user_id.trim(), entry_id).await
    }

    /// Membership of `book_id` in each of the user's entries.
    pub async fn summary(&self, user_id: &str, book_id: &str) -> Result<Vec<CollectionMembership>, AppError> {
        let book_id = parse_object_id(book_id, "book id")?;
        let entries = self.entries_of(user_id.trim()).await?;
        Ok(CollectionMembership::for_book(&entries, &book_id))
    }

    /// Adds or removes one book across several entries at once.
    pub async fn toggle(&self, caller: &AuthenticatedUser, request: ToggleBooksRequest) -> Result<Vec<String>, AppError> {
        caller.ensure_owner(&request.user_id)?;
        let book_id = parse_object_id(&request.book_id, "book id")?;

        if !self.book_repo.exists(book_id).await? {
            return Err(AppError::NotFound("Book not found".to_string()));
        }

        let entries = self.entries_of(&request.user_id).await?;

        let mut changes = Vec::with_capacity(request.collections.len());
        for toggle in &request.collections {
            let entry_id = parse_object_id(&toggle.id, "collection id")?;
            let entry = entries
                .iter()
                .find(|entry| entry.id == entry_id)
                .ok_or_else(collection_not_found)?;
            changes.push((entry, toggle.checked));
        }

        let user_id = request.user_id.as_str();
        let messages = try_join_all(changes.into_iter().map(|(entry, checked)| async move {
            let ids = [entry.id];
            if checked {
                self.collection_repo.add_book(user_id, &ids, book_id).await?;
                Ok::<_, AppError>(format!("Book added to collection {}", entry.name))
            } else {
                self.collection_repo.remove_book(user_id, &ids, book_id).await?;
                Ok(format!("Book removed from collection {}", entry.name))
            }
        }))
        .await?;

        Ok(messages)
    }

    /// Pulls one book from one or several entries.
    pub async fn remove_book(&self, caller: &AuthenticatedUser, request: RemoveBookRequest) -> Result<(), AppError> {
        caller.ensure_owner(&request.user_id)?;
        let book_id = parse_object_id(&request.book_id, "book id")?;
        let entry_ids = parse_object_ids(&request.collection_id.to_vec(), "collection id")?;

        if !self.collection_repo.remove_book(&request.user_id, &entry_ids, book_id).await? {
            return Err(collection_not_found());
        }

        Ok(())
    }

    async fn entries_of(&self, user_id: &str) -> Result<Vec<CollectionEntry>, AppError> {
        Ok(self
            .collection_repo
            .find_by_user(user_id)
            .await?
            .map(|document| document.collections)
            .unwrap_or_default())
    }
}

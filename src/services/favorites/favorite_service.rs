//! # Favorite service
//!
//! Reads prune references to deleted books before paging, so the returned
//! totals always match what can actually be listed.

use std::sync::Arc;

use log::debug;
use singleton_macro::service;

use crate::{
    domain::dto::books::BookListResponse,
    domain::dto::favorites::{FavoriteResponse, UpdateFavoriteRequest},
    domain::models::auth::AuthenticatedUser,
    domain::models::pagination::{PageLinks, Pagination, PaginationInfo},
    errors::AppError,
    repositories::{books::BookRepository, favorites::FavoriteRepository},
    utils::mongo_utils::{missing_ids, parse_object_id},
};

#[service(name = "favorite")]
pub struct FavoriteService {
    favorite_repo: Arc<FavoriteRepository>,
    book_repo: Arc<BookRepository>,
}

impl FavoriteService {
    /// Paged favorites, newest book first. No favorites is an empty page.
    pub async fn list(&self, user_id: &str, pagination: Pagination, links: &PageLinks) -> Result<BookListResponse, AppError> {
        let Some(favorite) = self.favorite_repo.find_by_user(user_id.trim()).await? else {
            return Ok(BookListResponse {
                info: PaginationInfo::new(0, pagination, links),
                results: Vec::new(),
            });
        };

        let existing = self.book_repo.find_existing_ids(&favorite.favorite_books).await?;
        let missing = missing_ids(&favorite.favorite_books, &existing);

        if !missing.is_empty() {
            debug!("Pruning {} missing books from favorites of {}", missing.len(), favorite.user_id);
            self.favorite_repo.pull_books(&favorite.user_id, &missing).await?;
        }

        let page = self.book_repo.find_page_by_ids(&existing, pagination).await?;

        Ok(BookListResponse {
            info: PaginationInfo::new(page.total, pagination, links),
            results: page.results,
        })
    }

    pub async fn update(&self, caller: &AuthenticatedUser, request: UpdateFavoriteRequest) -> Result<FavoriteResponse, AppError> {
        caller.ensure_owner(&request.user_id)?;
        let book_id = parse_object_id(&request.id, "book id")?;

        if !self.book_repo.exists(book_id).await? {
            return Err(AppError::NotFound("Book not found".to_string()));
        }

        let favorite = if request.is_favorite {
            self.favorite_repo.add_book(&request.user_id, book_id).await?
        } else {
            self.favorite_repo
                .remove_book(&request.user_id, book_id)
                .await?
                .ok_or_else(|| AppError::NotFound("This user has no favorites".to_string()))?
        };

        Ok(FavoriteResponse::from(favorite))
    }

    /// Idempotent; returns whether a favorites document existed.
    pub async fn delete_all(&self, caller: &AuthenticatedUser, user_id: &str) -> Result<bool, AppError> {
        caller.ensure_owner(user_id)?;
        self.favorite_repo.delete_by_user(user_id.trim()).await
    }
}

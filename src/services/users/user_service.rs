//! # User service
//!
//! Registration from verified identity claims, profile lookups and account
//! removal.
//!
//! ## Account deletion
//!
//! Deleting a user cascades to everything keyed by their uid:
//!
//! ```text
//! books (userId) → collections (userId) → favorites (userId) → users (uid)
//! ```
//!
//! The user record goes last, so a failed cascade can be retried.

use std::sync::Arc;

use log::info;
use singleton_macro::service;

use crate::{
    domain::dto::users::{RegisterRequest, UserBooksResponse, UserProfile},
    domain::entities::users::User,
    domain::models::auth::AuthenticatedUser,
    domain::models::pagination::{PageLinks, Pagination, PaginationInfo},
    errors::AppError,
    repositories::{
        books::BookRepository, collections::CollectionRepository, favorites::FavoriteRepository,
        users::UserRepository,
    },
};

/// Outcome of `POST /api/auth/register`
#[derive(Debug, Clone)]
pub enum Registration {
    /// The caller's uid already had a record
    Existing(UserProfile),
    Created(UserProfile),
}

#[service(name = "user")]
pub struct UserService {
    user_repo: Arc<UserRepository>,
    book_repo: Arc<BookRepository>,
    collection_repo: Arc<CollectionRepository>,
    favorite_repo: Arc<FavoriteRepository>,
}

fn user_not_found() -> AppError {
    AppError::NotFound("User not found".to_string())
}

impl UserService {
    pub async fn list_users(&self) -> Result<Vec<UserProfile>, AppError> {
        self.user_repo.find_all().await
    }

    pub async fn get_profile(&self, uid: &str) -> Result<UserProfile, AppError> {
        self.user_repo
            .find_profile_by_uid(uid.trim())
            .await?
            .ok_or_else(user_not_found)
    }

    /// Creates the caller's record, or returns the existing one.
    pub async fn register(&self, caller: &AuthenticatedUser, request: RegisterRequest) -> Result<Registration, AppError> {
        if let Some(existing) = self.user_repo.find_by_uid(&caller.uid).await? {
            return Ok(Registration::Existing(UserProfile::from(existing)));
        }

        if self.user_repo.find_by_username(&request.username).await?.is_some() {
            return Err(AppError::ConflictError(format!(
                "Username '{}' is already taken",
                request.username
            )));
        }

        let user = self
            .user_repo
            .create(User::from_identity(caller, request.username))
            .await?;
        info!("User registered: {} ({})", user.username, user.uid);

        Ok(Registration::Created(UserProfile::from(user)))
    }

    /// Paged books of `uid`; both the user and at least one book must exist.
    pub async fn user_books(
        &self,
        caller: &AuthenticatedUser,
        uid: &str,
        username: &str,
        pagination: Pagination,
        links: &PageLinks,
    ) -> Result<UserBooksResponse, AppError> {
        caller.ensure_owner(uid)?;

        let user = self.get_profile(uid).await?;
        if user.username != username.trim() {
            return Err(user_not_found());
        }

        let page = self.book_repo.find_page_by_user(&user.uid, pagination).await?;
        if page.results.is_empty() {
            return Err(AppError::NotFound("This user has no books".to_string()));
        }

        Ok(UserBooksResponse {
            info: PaginationInfo::new(page.total, pagination, links),
            user,
            results: page.results,
        })
    }

    pub async fn delete_account(&self, caller: &AuthenticatedUser, uid: &str) -> Result<(), AppError> {
        caller.ensure_owner(uid)?;
        let uid = uid.trim();

        if self.user_repo.find_by_uid(uid).await?.is_none() {
            return Err(user_not_found());
        }

        let books = self.book_repo.delete_by_user(uid).await?;
        self.collection_repo.delete_by_user(uid).await?;
        self.favorite_repo.delete_by_user(uid).await?;
        self.user_repo.delete_by_uid(uid).await?;

        info!("Account deleted: {} ({} books removed)", uid, books);
        Ok(())
    }
}

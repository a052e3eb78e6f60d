//! # User repository
//!
//! Data access for the `users` collection. Users are addressed by their
//! identity-provider `uid`, never by ObjectId.
//!
//! ## Caching
//!
//! Profiles are cached as [`UserProfile`] under `user_repository:{uid}`
//! for `USERS_CACHE_TTL_SECONDS` and dropped on delete.

use std::sync::Arc;

use futures_util::TryStreamExt;
use log::warn;
use mongodb::{bson::doc, options::IndexOptions, IndexModel};
use singleton_macro::repository;

use crate::{
    caching::redis::RedisClient,
    config::CacheConfig,
    core::registry::Repository,
    db::Database,
    domain::dto::users::UserProfile,
    domain::entities::users::User,
    errors::AppError,
    utils::mongo_utils::{db_error, is_duplicate_key},
};

/// User data access repository
///
/// ```rust,ignore
/// let repo = UserRepository::instance();
///
/// if repo.find_by_username("ada_l").await?.is_some() {
///     return Err(AppError::ConflictError("Username already taken".to_string()));
/// }
/// let user = repo.create(User::from_identity(&caller, "ada_l".to_string())).await?;
/// ```
#[repository(name = "user", collection = "users")]
pub struct UserRepository {
    db: Arc<Database>,
    redis: Arc<RedisClient>,
}

impl UserRepository {
    /// Profile by provider uid, served from cache when possible.
    pub async fn find_profile_by_uid(&self, uid: &str) -> Result<Option<UserProfile>, AppError> {
        let cache_key = self.cache_key(uid);

        if let Some(cached) = self.redis.get_or_miss::<UserProfile>(&cache_key).await {
            return Ok(Some(cached));
        }

        let profile = self.find_by_uid(uid).await?.map(UserProfile::from);

        if let Some(ref profile) = profile {
            self.redis.store(&cache_key, profile, CacheConfig::users_ttl()).await;
        }

        Ok(profile)
    }

    pub async fn find_by_uid(&self, uid: &str) -> Result<Option<User>, AppError> {
        self.collection::<User>()
            .find_one(doc! { "uid": uid })
            .await
            .map_err(db_error)
    }

    pub async fn find_by_username(&self, username: &str) -> Result<Option<User>, AppError> {
        self.collection::<User>()
            .find_one(doc! { "username": username })
            .await
            .map_err(db_error)
    }

    /// Every profile, newest first.
    pub async fn find_all(&self) -> Result<Vec<UserProfile>, AppError> {
        let users: Vec<User> = self
            .collection::<User>()
            .find(doc! {})
            .sort(doc! { "createdAt": -1 })
            .await
            .map_err(db_error)?
            .try_collect()
            .await
            .map_err(db_error)?;

        Ok(users.into_iter().map(UserProfile::from).collect())
    }

    /// Inserts `user`; a taken uid or username is a 409.
    pub async fn create(&self, mut user: User) -> Result<User, AppError> {
        let result = self
            .collection::<User>()
            .insert_one(&user)
            .await
            .map_err(|e| {
                if is_duplicate_key(&e) {
                    AppError::ConflictError(format!("Username '{}' is already taken", user.username))
                } else {
                    db_error(e)
                }
            })?;

        user.id = result.inserted_id.as_object_id();

        Ok(user)
    }

    pub async fn delete_by_uid(&self, uid: &str) -> Result<bool, AppError> {
        let result = self
            .collection::<User>()
            .delete_one(doc! { "uid": uid })
            .await
            .map_err(db_error)?;

        if let Err(e) = self.invalidate_cache(uid).await {
            warn!("Failed to invalidate user cache for {}: {}", uid, e);
        }

        Ok(result.deleted_count > 0)
    }

    pub async fn create_indexes(&self) -> Result<(), AppError> {
        let uid_index = IndexModel::builder()
            .keys(doc! { "uid": 1 })
            .options(IndexOptions::builder().unique(true).name("uid_unique".to_string()).build())
            .build();

        let username_index = IndexModel::builder()
            .keys(doc! { "username": 1 })
            .options(IndexOptions::builder().unique(true).name("username_unique".to_string()).build())
            .build();

        self.collection::<User>()
            .create_indexes([uid_index, username_index])
            .await
            .map_err(db_error)?;

        Ok(())
    }
}

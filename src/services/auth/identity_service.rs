//! # Identity token verification
//!
//! Callers authenticate with an ID token issued by the external identity
//! provider. This service checks the RS256 signature against the provider's
//! published JSON Web Key Set and validates `aud`, `iss` and `exp`.
//!
//! ## Key set caching
//!
//! The JWKS is cached in Redis under `identity:jwks` for
//! `JWKS_CACHE_TTL_SECONDS`, together with the time it was fetched. A token
//! signed with a `kid` that is not in the cached set triggers one refetch,
//! but at most once per `JWKS_REFRESH_COOLDOWN_SECONDS`; inside that window
//! the token is rejected without contacting the provider.
//!
//! ```rust,ignore
//! let identity = IdentityService::instance();
//! let caller = identity.verify(bearer_token).await?;
//! assert!(!caller.uid.is_empty());
//! ```

use std::sync::Arc;

use chrono::Utc;
use jsonwebtoken::{decode, decode_header, errors::ErrorKind, jwk::JwkSet, Algorithm, DecodingKey, Validation};
use log::{debug, warn};
use serde::{Deserialize, Serialize};
use singleton_macro::service;
use thiserror::Error;

use crate::{
    caching::redis::RedisClient,
    config::{CacheConfig, IdentityConfig},
    domain::models::auth::{AuthenticatedUser, IdentityClaims},
    errors::AppError,
};

const JWKS_CACHE_KEY: &str = "identity:jwks";

/// Why a token was rejected
#[derive(Debug, Error, PartialEq)]
pub enum TokenError {
    #[error("Unknown signing key")]
    UnknownKey,

    #[error("Token expired")]
    Expired,

    #[error("Invalid token: {0}")]
    Invalid(String),
}

impl From<TokenError> for AppError {
    fn from(error: TokenError) -> Self {
        AppError::AuthenticationError(error.to_string())
    }
}

/// Verifies `token` against `keys` for the given provider project.
pub fn verify_with_key_set(token: &str, keys: &JwkSet, project_id: &str) -> Result<IdentityClaims, TokenError> {
    let header = decode_header(token).map_err(|e| TokenError::Invalid(e.to_string()))?;
    let kid = header
        .kid
        .ok_or_else(|| TokenError::Invalid("missing kid".to_string()))?;

    let jwk = keys.find(&kid).ok_or(TokenError::UnknownKey)?;
    let key = DecodingKey::from_jwk(jwk).map_err(|e| TokenError::Invalid(e.to_string()))?;

    let mut validation = Validation::new(Algorithm::RS256);
    validation.set_audience(&[project_id]);
    validation.set_issuer(&[IdentityConfig::issuer_for(project_id)]);

    decode::<IdentityClaims>(token, &key, &validation)
        .map(|data| data.claims)
        .map_err(|e| match e.kind() {
            ErrorKind::ExpiredSignature => TokenError::Expired,
            _ => TokenError::Invalid(e.to_string()),
        })
}

/// Key set as cached in Redis
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CachedKeySet {
    pub keys: JwkSet,
    /// Unix seconds
    pub fetched_at: i64,
}

impl CachedKeySet {
    pub fn new(keys: JwkSet, fetched_at: i64) -> Self {
        Self { keys, fetched_at }
    }

    /// Whether an unknown `kid` may trigger a refetch at `now`.
    pub fn refresh_allowed(&self, now: i64, cooldown_seconds: i64) -> bool {
        now.saturating_sub(self.fetched_at) >= cooldown_seconds
    }
}

#[service(name = "identity")]
pub struct IdentityService {
    redis: Arc<RedisClient>,
    http: reqwest::Client,
}

impl IdentityService {
    /// Resolves the caller behind a bearer token.
    pub async fn verify(&self, token: &str) -> Result<AuthenticatedUser, AppError> {
        let project_id = IdentityConfig::project_id().ok_or_else(|| {
            warn!("IDENTITY_PROJECT_ID is not set; rejecting token");
            AppError::AuthenticationError("Token verification is not configured".to_string())
        })?;

        let cached = self.key_set().await?;

        let claims = match verify_with_key_set(token, &cached.keys, &project_id) {
            Err(TokenError::UnknownKey)
                if cached.refresh_allowed(Utc::now().timestamp(), CacheConfig::jwks_refresh_cooldown()) =>
            {
                debug!("Unknown kid, refreshing JWKS");
                let refreshed = self.refresh_key_set().await?;
                verify_with_key_set(token, &refreshed.keys, &project_id)?
            }
            other => other?,
        };

        Ok(AuthenticatedUser::from(claims))
    }

    async fn key_set(&self) -> Result<CachedKeySet, AppError> {
        match self.redis.get_or_miss::<CachedKeySet>(JWKS_CACHE_KEY).await {
            Some(cached) => Ok(cached),
            None => self.refresh_key_set().await,
        }
    }

    async fn refresh_key_set(&self) -> Result<CachedKeySet, AppError> {
        let cached = CachedKeySet::new(self.fetch_key_set().await?, Utc::now().timestamp());
        self.redis.store(JWKS_CACHE_KEY, &cached, CacheConfig::jwks_ttl()).await;

        Ok(cached)
    }

    async fn fetch_key_set(&self) -> Result<JwkSet, AppError> {
        let url = IdentityConfig::jwks_url();

        let response = self
            .http
            .get(&url)
            .send()
            .await
            .map_err(|e| AppError::ExternalServiceError(format!("JWKS request failed: {}", e)))?;

        if !response.status().is_success() {
            return Err(AppError::ExternalServiceError(format!(
                "JWKS request returned {}",
                response.status()
            )));
        }

        response
            .json::<JwkSet>()
            .await
            .map_err(|e| AppError::ExternalServiceError(format!("Invalid JWKS response: {}", e)))
    }
}

//! Server, cache, rate limit and CORS settings
//!
//! Every value comes from the environment (loaded from `.env.<profile>` by
//! `main.rs`) and falls back to a development-friendly default.

use std::env;
use std::str::FromStr;

/// Reads `key` and parses it, falling back to `default` when unset or invalid.
fn env_or<T: FromStr>(key: &str, default: T) -> T {
    match env::var(key) {
        Ok(raw) => raw.trim().parse().unwrap_or_else(|_| {
            log::warn!("{} has an invalid value '{}', using default", key, raw);
            default
        }),
        Err(_) => default,
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Environment {
    Development,
    Test,
    Staging,
    Production,
}

impl Environment {
    pub fn current() -> Self {
        let raw = env::var("ENVIRONMENT")
            .or_else(|_| env::var("PROFILE"))
            .unwrap_or_else(|_| "production".to_string());
        Self::from_str(&raw)
    }

    #[allow(clippy::should_implement_trait)]
    pub fn from_str(s: &str) -> Self {
        match s.to_lowercase().as_str() {
            "development" | "dev" => Environment::Development,
            "test" | "testing" => Environment::Test,
            "staging" | "stage" => Environment::Staging,
            _ => Environment::Production,
        }
    }

    pub fn is_production(&self) -> bool {
        matches!(self, Environment::Production)
    }
}

pub struct ServerConfig;

impl ServerConfig {
    pub fn port() -> u16 {
        env_or("PORT", 8080)
    }

    pub fn host() -> String {
        env::var("HOST").unwrap_or_else(|_| "0.0.0.0".to_string())
    }

    /// Actix worker threads
    pub fn workers() -> usize {
        env_or("SERVER_WORKERS", 4)
    }

    pub fn bind_address() -> String {
        format!("{}:{}", Self::host(), Self::port())
    }
}

/// Allowed browser origins
pub struct CorsConfig;

impl CorsConfig {
    pub const DEFAULT_ORIGINS: &'static str = "http://localhost:3000,http://127.0.0.1:3000";

    /// Comma separated list in `CORS_ALLOWED_ORIGINS`
    pub fn allowed_origins() -> Vec<String> {
        let raw = env::var("CORS_ALLOWED_ORIGINS").unwrap_or_else(|_| Self::DEFAULT_ORIGINS.to_string());
        Self::parse_origins(&raw)
    }

    pub fn parse_origins(raw: &str) -> Vec<String> {
        raw.split(',')
            .map(str::trim)
            .filter(|origin| !origin.is_empty())
            .map(str::to_string)
            .collect()
    }
}

/// Fixed-window style quota expressed as a GCRA replenish interval.
///
/// The default allows 200 requests per client IP per 30 minutes.
#[derive(Debug, Clone, PartialEq)]
pub struct RateLimitConfig {
    pub window_seconds: u64,
    pub max_requests: u32,
}

impl RateLimitConfig {
    pub const DEFAULT_WINDOW_SECONDS: u64 = 30 * 60;
    pub const DEFAULT_MAX_REQUESTS: u32 = 200;

    pub fn from_env() -> Self {
        Self::new(
            env_or("RATE_LIMIT_WINDOW_SECONDS", Self::DEFAULT_WINDOW_SECONDS),
            env_or("RATE_LIMIT_MAX_REQUESTS", Self::DEFAULT_MAX_REQUESTS),
        )
    }

    /// Zero values are replaced by the defaults.
    pub fn new(window_seconds: u64, max_requests: u32) -> Self {
        Self {
            window_seconds: if window_seconds == 0 { Self::DEFAULT_WINDOW_SECONDS } else { window_seconds },
            max_requests: if max_requests == 0 { Self::DEFAULT_MAX_REQUESTS } else { max_requests },
        }
    }

    /// Seconds needed to regain one request, at least 1.
    pub fn replenish_seconds(&self) -> u64 {
        (self.window_seconds / u64::from(self.max_requests)).max(1)
    }

    pub fn burst_size(&self) -> u32 {
        self.max_requests
    }
}

/// Redis TTLs in seconds
pub struct CacheConfig;

impl CacheConfig {
    /// Book listing pages and filter results
    pub fn books_ttl() -> usize {
        env_or("BOOKS_CACHE_TTL_SECONDS", 300)
    }

    /// Users looked up by uid
    pub fn users_ttl() -> usize {
        env_or("USERS_CACHE_TTL_SECONDS", 600)
    }

    /// Identity provider signing keys
    pub fn jwks_ttl() -> usize {
        env_or("JWKS_CACHE_TTL_SECONDS", 3600)
    }

    /// Minimum seconds between key set refetches caused by an unknown `kid`
    pub fn jwks_refresh_cooldown() -> i64 {
        env_or("JWKS_REFRESH_COOLDOWN_SECONDS", 60)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_environment_from_string() {
        assert_eq!(Environment::from_str("development"), Environment::Development);
        assert_eq!(Environment::from_str("dev"), Environment::Development);
        assert_eq!(Environment::from_str("test"), Environment::Test);
        assert_eq!(Environment::from_str("production"), Environment::Production);
        assert_eq!(Environment::from_str("unknown"), Environment::Production);
        assert!(Environment::Production.is_production());
    }

    #[test]
    fn test_server_config_defaults() {
        if env::var("PORT").is_err() {
            assert_eq!(ServerConfig::port(), 8080);
        }

        if env::var("HOST").is_err() {
            assert_eq!(ServerConfig::host(), "0.0.0.0");
        }
    }

    #[test]
    fn test_parse_origins_skips_blanks() {
        let origins = CorsConfig::parse_origins(" http://a.test , ,http://b.test,");
        assert_eq!(origins, vec!["http://a.test".to_string(), "http://b.test".to_string()]);
    }

    #[test]
    fn test_rate_limit_default_quota() {
        let config = RateLimitConfig::new(
            RateLimitConfig::DEFAULT_WINDOW_SECONDS,
            RateLimitConfig::DEFAULT_MAX_REQUESTS,
        );

        assert_eq!(config.replenish_seconds(), 9);
        assert_eq!(config.burst_size(), 200);
    }

    #[test]
    fn test_rate_limit_zero_values_fall_back() {
        let config = RateLimitConfig::new(0, 0);
        assert_eq!(config.window_seconds, 1800);
        assert_eq!(config.max_requests, 200);
    }

    #[test]
    fn test_rate_limit_replenish_never_zero() {
        let config = RateLimitConfig::new(10, 1000);
        assert_eq!(config.replenish_seconds(), 1);
    }
}

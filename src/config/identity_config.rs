//! # Identity Provider Configuration
//!
//! Users sign in with an external provider (Firebase Authentication) and send
//! its ID token as `Authorization: Bearer <token>`. The backend only verifies
//! those tokens; it never issues its own.
//!
//! ## Environment
//!
//! ```bash
//! IDENTITY_PROJECT_ID="my-firebase-project"      # required for verification
//! IDENTITY_JWKS_URL="https://www.googleapis.com/service_accounts/v1/jwk/securetoken@system.gserviceaccount.com"
//! IDENTITY_ISSUER_PREFIX="https://securetoken.google.com/"
//! ```
//!
//! The expected token claims are:
//!
//! | Claim | Value |
//! |-------|-------|
//! | `aud` | `IDENTITY_PROJECT_ID` |
//! | `iss` | `IDENTITY_ISSUER_PREFIX` + `IDENTITY_PROJECT_ID` |
//! | `alg` | `RS256`, `kid` present in the JWKS |

use std::env;

pub struct IdentityConfig;

impl IdentityConfig {
    pub const DEFAULT_JWKS_URL: &'static str =
        "https://www.googleapis.com/service_accounts/v1/jwk/securetoken@system.gserviceaccount.com";
    pub const DEFAULT_ISSUER_PREFIX: &'static str = "https://securetoken.google.com/";

    /// Returns `None` when unset, which makes every token verification fail.
    pub fn project_id() -> Option<String> {
        env::var("IDENTITY_PROJECT_ID")
            .ok()
            .map(|id| id.trim().to_string())
            .filter(|id| !id.is_empty())
    }

    pub fn jwks_url() -> String {
        env::var("IDENTITY_JWKS_URL").unwrap_or_else(|_| Self::DEFAULT_JWKS_URL.to_string())
    }

    pub fn issuer_prefix() -> String {
        env::var("IDENTITY_ISSUER_PREFIX").unwrap_or_else(|_| Self::DEFAULT_ISSUER_PREFIX.to_string())
    }

    pub fn issuer_for(project_id: &str) -> String {
        format!("{}{}", Self::issuer_prefix(), project_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_issuer() {
        if env::var("IDENTITY_ISSUER_PREFIX").is_err() {
            assert_eq!(
                IdentityConfig::issuer_for("catalog-app"),
                "https://securetoken.google.com/catalog-app"
            );
        }
    }

    #[test]
    fn test_default_jwks_url() {
        if env::var("IDENTITY_JWKS_URL").is_err() {
            assert!(IdentityConfig::jwks_url().ends_with("securetoken@system.gserviceaccount.com"));
        }
    }
}

use serde::{Deserialize, Serialize};

/// Claims carried by an identity provider ID token
///
/// `aud`, `iss` and `exp` are checked by `jsonwebtoken::Validation`; the
/// remaining profile fields are optional and used to create the user record
/// on registration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IdentityClaims {
    /// Provider uid
    pub sub: String,
    pub aud: String,
    pub iss: String,
    pub exp: i64,
    #[serde(default)]
    pub iat: i64,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub email_verified: Option<bool>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub picture: Option<String>,
}

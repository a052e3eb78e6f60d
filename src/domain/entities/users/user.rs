//! User document
//!
//! Accounts live at the identity provider; this record only links the
//! provider `uid` to a public username and profile fields copied from the
//! token at registration.

use mongodb::bson::{oid::ObjectId, DateTime};
use serde::{Deserialize, Serialize};

use crate::domain::models::auth::AuthenticatedUser;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    #[serde(rename = "_id", skip_serializing_if = "Option::is_none")]
    pub id: Option<ObjectId>,
    /// Identity provider uid (unique)
    pub uid: String,
    #[serde(default)]
    pub name: Option<String>,
    /// Public handle (unique)
    pub username: String,
    #[serde(default)]
    pub picture: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    pub created_at: DateTime,
}

impl User {
    /// New record from the verified caller's token profile
    pub fn from_identity(identity: &AuthenticatedUser, username: String) -> Self {
        Self {
            id: None,
            uid: identity.uid.clone(),
            name: identity.name.clone().or_else(|| Some(username.clone())),
            username,
            picture: identity.picture.clone(),
            email: identity.email.clone(),
            created_at: DateTime::now(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn identity(name: Option<&str>) -> AuthenticatedUser {
        AuthenticatedUser {
            uid: "uid-42".to_string(),
            email: Some("ada@example.com".to_string()),
            name: name.map(str::to_string),
            picture: Some("https://img.test/ada.png".to_string()),
        }
    }

    #[test]
    fn test_from_identity_copies_profile() {
        let user = User::from_identity(&identity(Some("Ada")), "ada_l".to_string());

        assert_eq!(user.uid, "uid-42");
        assert_eq!(user.username, "ada_l");
        assert_eq!(user.name.as_deref(), Some("Ada"));
        assert_eq!(user.email.as_deref(), Some("ada@example.com"));
        assert!(user.id.is_none());
    }

    #[test]
    fn test_from_identity_falls_back_to_username() {
        let user = User::from_identity(&identity(None), "ada_l".to_string());
        assert_eq!(user.name.as_deref(), Some("ada_l"));
    }
}

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::dto::books::BookSummary;
use crate::domain::entities::users::User;
use crate::domain::models::pagination::PaginationInfo;
use crate::utils::mongo_utils::to_chrono;

/// Public view of a user; also the cached form under `user:{uid}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserProfile {
    pub id: String,
    pub uid: String,
    pub name: Option<String>,
    pub username: String,
    pub picture: Option<String>,
    pub email: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl From<User> for UserProfile {
    fn from(user: User) -> Self {
        Self {
            id: user.id.map(|id| id.to_hex()).unwrap_or_default(),
            uid: user.uid,
            name: user.name,
            username: user.username,
            picture: user.picture,
            email: user.email,
            created_at: to_chrono(user.created_at),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct RegisterInfo {
    pub message: String,
    pub user: UserProfile,
}

/// `{"info": {"message", "user"}}`
#[derive(Debug, Clone, Serialize)]
pub struct RegisterResponse {
    pub info: RegisterInfo,
}

impl RegisterResponse {
    pub fn new(message: impl Into<String>, user: UserProfile) -> Self {
        Self {
            info: RegisterInfo { message: message.into(), user },
        }
    }
}

/// `GET /api/users/{uid}/{username}/my-books`
#[derive(Debug, Clone, Serialize)]
pub struct UserBooksResponse {
    pub info: PaginationInfo,
    pub user: UserProfile,
    pub results: Vec<BookSummary>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use mongodb::bson::{oid::ObjectId, DateTime as BsonDateTime};

    #[test]
    fn test_register_response_shape() {
        let user = User {
            id: Some(ObjectId::new()),
            uid: "uid-1".to_string(),
            name: Some("Ada".to_string()),
            username: "ada_l".to_string(),
            picture: None,
            email: None,
            created_at: BsonDateTime::from_millis(0),
        };
        let json = serde_json::to_value(RegisterResponse::new("User created", user.into())).unwrap();

        assert_eq!(json["info"]["message"], "User created");
        assert_eq!(json["info"]["user"]["username"], "ada_l");
        assert_eq!(json["info"]["user"]["createdAt"], "1970-01-01T00:00:00Z");
    }
}

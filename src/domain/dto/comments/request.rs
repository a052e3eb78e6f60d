use serde::Deserialize;
use validator::Validate;

use crate::domain::dto::common::validate_object_id;
use crate::domain::entities::comments::{CommentAuthor, ReactionType};
use crate::errors::AppError;
use crate::utils::string_utils::deserialize_trimmed_string;

pub const MAX_COMMENT_LENGTH: u64 = 1500;
pub const DEFAULT_COMMENT_LIMIT: u64 = 10;
pub const MAX_COMMENT_LIMIT: u64 = 100;

#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct AuthorInput {
    #[serde(deserialize_with = "deserialize_trimmed_string")]
    #[validate(length(min = 1, message = "author.userId is required"))]
    pub user_id: String,
    #[serde(deserialize_with = "deserialize_trimmed_string")]
    #[validate(length(min = 1, message = "author.username is required"))]
    pub username: String,
}

impl From<AuthorInput> for CommentAuthor {
    fn from(input: AuthorInput) -> Self {
        Self {
            user_id: input.user_id,
            username: input.username,
        }
    }
}

/// Body of `POST /api/comments/comment`
#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateCommentRequest {
    #[serde(deserialize_with = "deserialize_trimmed_string")]
    #[validate(length(min = 1, max = MAX_COMMENT_LENGTH, message = "Comment must be 1-1500 characters"))]
    pub text: String,
    #[serde(deserialize_with = "deserialize_trimmed_string")]
    #[validate(custom(function = "validate_object_id"))]
    pub book_id: String,
    #[validate(nested)]
    pub author: AuthorInput,
}

/// Body of `PATCH /api/comments/comment/{commentId}/{userId}`
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct UpdateCommentRequest {
    #[serde(deserialize_with = "deserialize_trimmed_string")]
    #[validate(length(min = 1, max = MAX_COMMENT_LENGTH, message = "Comment must be 1-1500 characters"))]
    pub text: String,
}

/// Body of the reaction endpoint; the type is parsed so bad values are a 400.
#[derive(Debug, Clone, Deserialize)]
pub struct ReactionRequest {
    #[serde(rename = "type")]
    pub reaction_type: String,
}

impl ReactionRequest {
    pub fn reaction(&self) -> Result<ReactionType, AppError> {
        self.reaction_type.parse()
    }
}

/// `?limit&offset` of the book comment listing
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CommentListQuery {
    pub limit: Option<String>,
    pub offset: Option<String>,
}

impl CommentListQuery {
    /// `(limit, offset)`; invalid values fall back to 10 and 0, offsets are
    /// capped at `i64::MAX`.
    pub fn resolve(&self) -> (u64, u64) {
        let limit = self
            .limit
            .as_deref()
            .and_then(|value| value.trim().parse::<u64>().ok())
            .filter(|value| *value >= 1)
            .unwrap_or(DEFAULT_COMMENT_LIMIT)
            .min(MAX_COMMENT_LIMIT);
        let offset = self
            .offset
            .as_deref()
            .and_then(|value| value.trim().parse::<u64>().ok())
            .unwrap_or(0)
            .min(i64::MAX as u64);

        (limit, offset)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn create(text: &str) -> CreateCommentRequest {
        serde_json::from_value(json!({
            "text": text,
            "bookId": "64b7f0c2a1b2c3d4e5f60718",
            "author": { "userId": "uid-1", "username": "ada_l" }
        }))
        .unwrap()
    }

    #[test]
    fn test_comment_length() {
        assert!(create("Loved it").validate().is_ok());
        assert!(create("   ").validate().is_err());
        assert!(create(&"x".repeat(1500)).validate().is_ok());
        assert!(create(&"x".repeat(1501)).validate().is_err());
    }

    #[test]
    fn test_reaction_request() {
        let like: ReactionRequest = serde_json::from_value(json!({ "type": "like" })).unwrap();
        assert_eq!(like.reaction().unwrap(), ReactionType::Like);

        let bad: ReactionRequest = serde_json::from_value(json!({ "type": "meh" })).unwrap();
        assert!(matches!(bad.reaction(), Err(AppError::ValidationError(_))));
    }

    #[test]
    fn test_comment_list_query_defaults() {
        assert_eq!(CommentListQuery::default().resolve(), (10, 0));

        let query = CommentListQuery { limit: Some("500".into()), offset: Some("20".into()) };
        assert_eq!(query.resolve(), (100, 20));

        let query = CommentListQuery { limit: Some("0".into()), offset: Some("-3".into()) };
        assert_eq!(query.resolve(), (10, 0));
    }

    #[test]
    fn test_comment_list_query_caps_offset() {
        let query = CommentListQuery { limit: None, offset: Some(u64::MAX.to_string()) };
        assert_eq!(query.resolve(), (10, i64::MAX as u64));
    }
}

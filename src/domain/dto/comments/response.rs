use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::entities::comments::{Comment, CommentAuthor, Reaction, ReactionType};
use crate::utils::mongo_utils::to_chrono;

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CommentResponse {
    pub id: String,
    pub text: String,
    pub author: CommentAuthor,
    pub book_id: String,
    pub reactions: Vec<Reaction>,
    pub likes_count: i64,
    pub dislikes_count: i64,
    pub is_edited: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<Comment> for CommentResponse {
    fn from(comment: Comment) -> Self {
        Self {
            id: comment.id.map(|id| id.to_hex()).unwrap_or_default(),
            text: comment.text,
            author: comment.author,
            book_id: comment.book_id.to_hex(),
            reactions: comment.reactions,
            likes_count: comment.likes_count,
            dislikes_count: comment.dislikes_count,
            is_edited: comment.is_edited,
            created_at: to_chrono(comment.created_at),
            updated_at: to_chrono(comment.updated_at),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CommentListResponse {
    pub total_comments: u64,
    pub results: Vec<CommentResponse>,
}

/// Counts after a reaction and what the caller now holds
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReactionResponse {
    pub message: String,
    pub likes_count: i64,
    pub dislikes_count: i64,
    pub user_reaction: Option<ReactionType>,
}

impl ReactionResponse {
    pub fn from_comment(comment: &Comment, user_id: &str) -> Self {
        let user_reaction = comment.reaction_of(user_id);
        let message = match user_reaction {
            Some(reaction) => format!("Reaction '{}' saved", reaction),
            None => "Reaction removed".to_string(),
        };

        Self {
            message,
            likes_count: comment.likes_count,
            dislikes_count: comment.dislikes_count,
            user_reaction,
        }
    }
}

/// `GET /api/comments/comment/stats/{bookId}`
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CommentStats {
    #[serde(default)]
    pub total_comments: i64,
    #[serde(default)]
    pub total_likes: i64,
    #[serde(default)]
    pub total_dislikes: i64,
}

#[cfg(test)]
mod tests {
    use super::*;
    use mongodb::bson::oid::ObjectId;

    #[test]
    fn test_reaction_response_reports_user_reaction() {
        let mut comment = Comment::new(
            "Nice".to_string(),
            CommentAuthor { user_id: "a".to_string(), username: "writer".to_string() },
            ObjectId::new(),
        );
        comment.reactions = vec![Reaction { user_id: "u1".to_string(), reaction_type: ReactionType::Like }];
        comment.likes_count = 1;

        let response = ReactionResponse::from_comment(&comment, "u1");
        assert_eq!(response.user_reaction, Some(ReactionType::Like));
        assert_eq!(response.likes_count, 1);

        let json = serde_json::to_value(ReactionResponse::from_comment(&comment, "u2")).unwrap();
        assert_eq!(json["userReaction"], serde_json::Value::Null);
        assert_eq!(json["message"], "Reaction removed");
    }

    #[test]
    fn test_stats_default_to_zero() {
        let json = serde_json::to_value(CommentStats::default()).unwrap();
        assert_eq!(json["totalComments"], 0);
        assert_eq!(json["totalDislikes"], 0);
    }
}

//! Comment document and reaction rules
//!
//! Each user holds at most one reaction per comment. Sending the same
//! reaction again withdraws it; sending the other one replaces it.

use std::fmt;
use std::str::FromStr;

use mongodb::bson::{oid::ObjectId, DateTime};
use serde::{Deserialize, Serialize};

use crate::errors::AppError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReactionType {
    Like,
    Dislike,
}

impl ReactionType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ReactionType::Like => "like",
            ReactionType::Dislike => "dislike",
        }
    }
}

impl fmt::Display for ReactionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ReactionType {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "like" => Ok(ReactionType::Like),
            "dislike" => Ok(ReactionType::Dislike),
            other => Err(AppError::ValidationError(format!(
                "Invalid reaction type '{}', expected 'like' or 'dislike'",
                other
            ))),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Reaction {
    pub user_id: String,
    #[serde(rename = "type")]
    pub reaction_type: ReactionType,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CommentAuthor {
    pub user_id: String,
    pub username: String,
}

/// Outcome of a reaction request for one user
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReactionChange {
    Set(ReactionType),
    Remove,
}

impl ReactionChange {
    pub fn resulting_reaction(&self) -> Option<ReactionType> {
        match self {
            ReactionChange::Set(reaction) => Some(*reaction),
            ReactionChange::Remove => None,
        }
    }
}

/// Comment document (`comments` collection)
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Comment {
    #[serde(rename = "_id", skip_serializing_if = "Option::is_none")]
    pub id: Option<ObjectId>,
    pub text: String,
    pub author: CommentAuthor,
    pub book_id: ObjectId,
    #[serde(default)]
    pub reactions: Vec<Reaction>,
    #[serde(default)]
    pub likes_count: i64,
    #[serde(default)]
    pub dislikes_count: i64,
    #[serde(default)]
    pub is_edited: bool,
    pub created_at: DateTime,
    pub updated_at: DateTime,
}

impl Comment {
    pub fn new(text: String, author: CommentAuthor, book_id: ObjectId) -> Self {
        let now = DateTime::now();
        Self {
            id: None,
            text,
            author,
            book_id,
            reactions: Vec::new(),
            likes_count: 0,
            dislikes_count: 0,
            is_edited: false,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn is_authored_by(&self, user_id: &str) -> bool {
        self.author.user_id == user_id
    }

    pub fn reaction_of(&self, user_id: &str) -> Option<ReactionType> {
        self.reactions
            .iter()
            .find(|reaction| reaction.user_id == user_id)
            .map(|reaction| reaction.reaction_type)
    }

    /// Decides what a `requested` reaction from `user_id` does to this comment.
    pub fn resolve_reaction(&self, user_id: &str, requested: ReactionType) -> ReactionChange {
        match self.reaction_of(user_id) {
            Some(current) if current == requested => ReactionChange::Remove,
            _ => ReactionChange::Set(requested),
        }
    }
}

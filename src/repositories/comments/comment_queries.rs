//! Update pipelines and aggregations for `comments`.
//!
//! A reaction is applied with one pipeline update: the caller's previous
//! reaction is filtered out, the new one (if any) appended, and both
//! counters recomputed from the resulting array. The counters therefore
//! always equal the tally of `reactions`.

use mongodb::bson::{doc, oid::ObjectId, Bson, DateTime, Document};

use crate::domain::entities::comments::{ReactionChange, ReactionType};

fn count_of(reaction_type: ReactionType) -> Document {
    doc! {
        "$size": {
            "$filter": {
                "input": "$reactions",
                "as": "reaction",
                "cond": { "$eq": ["$$reaction.type", reaction_type.as_str()] },
            }
        }
    }
}

/// Pipeline update applying `change` for `user_id`.
pub fn reaction_pipeline(user_id: &str, change: ReactionChange) -> Vec<Document> {
    let appended: Vec<Bson> = match change.resulting_reaction() {
        Some(reaction) => vec![Bson::Document(doc! { "userId": user_id, "type": reaction.as_str() })],
        None => Vec::new(),
    };

    vec![
        doc! {
            "$set": {
                "reactions": {
                    "$concatArrays": [
                        {
                            "$filter": {
                                "input": { "$ifNull": ["$reactions", []] },
                                "as": "reaction",
                                "cond": { "$ne": ["$$reaction.userId", { "$literal": user_id }] },
                            }
                        },
                        { "$literal": appended },
                    ]
                }
            }
        },
        doc! {
            "$set": {
                "likesCount": count_of(ReactionType::Like),
                "dislikesCount": count_of(ReactionType::Dislike),
            }
        },
    ]
}

pub fn edit_update(text: &str) -> Document {
    doc! {
        "$set": { "text": text, "isEdited": true, "updatedAt": DateTime::now() },
    }
}

/// Totals for one book; no output document when it has no comments.
pub fn stats_pipeline(book_id: ObjectId) -> Vec<Document> {
    vec![
        doc! { "$match": { "bookId": book_id } },
        doc! {
            "$group": {
                "_id": Bson::Null,
                "totalComments": { "$sum": 1 },
                "totalLikes": { "$sum": "$likesCount" },
                "totalDislikes": { "$sum": "$dislikesCount" },
            }
        },
        doc! { "$project": { "_id": 0 } },
    ]
}

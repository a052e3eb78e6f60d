pub mod comment;

pub use comment::{Comment, CommentAuthor, Reaction, ReactionChange, ReactionType};

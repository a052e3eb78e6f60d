//! # Comment service
//!
//! Comments on books with like/dislike reactions. Each user holds at most
//! one reaction per comment; sending the same reaction again removes it.

use std::sync::Arc;

use log::info;
use singleton_macro::service;

use crate::{
    domain::dto::comments::{
        CommentListQuery, CommentListResponse, CommentResponse, CommentStats, CreateCommentRequest, ReactionRequest,
        ReactionResponse, UpdateCommentRequest,
    },
    domain::entities::comments::Comment,
    domain::models::auth::AuthenticatedUser,
    errors::AppError,
    repositories::{books::BookRepository, comments::CommentRepository},
    utils::mongo_utils::parse_object_id,
};

#[service(name = "comment")]
pub struct CommentService {
    comment_repo: Arc<CommentRepository>,
    book_repo: Arc<BookRepository>,
}

fn comment_not_found() -> AppError {
    AppError::NotFound("Comment not found".to_string())
}

impl CommentService {
    pub async fn list_for_book(&self, book_id: &str, query: &CommentListQuery) -> Result<CommentListResponse, AppError> {
        let book_id = parse_object_id(book_id, "book id")?;
        let (limit, offset) = query.resolve();

        let (comments, total_comments) = self.comment_repo.find_by_book(book_id, limit, offset).await?;

        Ok(CommentListResponse {
            total_comments,
            results: comments.into_iter().map(CommentResponse::from).collect(),
        })
    }

    pub async fn list_for_user(&self, user_id: &str) -> Result<Vec<CommentResponse>, AppError> {
        let comments = self.comment_repo.find_by_author(user_id.trim()).await?;
        Ok(comments.into_iter().map(CommentResponse::from).collect())
    }

    pub async fn create(&self, caller: &AuthenticatedUser, request: CreateCommentRequest) -> Result<CommentResponse, AppError> {
        caller.ensure_owner(&request.author.user_id)?;
        let book_id = parse_object_id(&request.book_id, "book id")?;

        if !self.book_repo.exists(book_id).await? {
            return Err(AppError::NotFound("Book not found".to_string()));
        }

        let comment = Comment::new(request.text, request.author.into(), book_id);
        let comment = self.comment_repo.create(comment).await?;
        info!("Comment added to book {} by {}", book_id, caller.uid);

        Ok(CommentResponse::from(comment))
    }

    pub async fn update(
        &self,
        caller: &AuthenticatedUser,
        comment_id: &str,
        user_id: &str,
        request: &UpdateCommentRequest,
    ) -> Result<CommentResponse, AppError> {
        let comment = self.find_authored(caller, comment_id, user_id).await?;
        let id = comment.id.ok_or_else(comment_not_found)?;

        self.comment_repo
            .update_text(id, &request.text)
            .await?
            .map(CommentResponse::from)
            .ok_or_else(comment_not_found)
    }

    pub async fn delete(&self, caller: &AuthenticatedUser, comment_id: &str, user_id: &str) -> Result<(), AppError> {
        let comment = self.find_authored(caller, comment_id, user_id).await?;
        let id = comment.id.ok_or_else(comment_not_found)?;

        if !self.comment_repo.delete(id).await? {
            return Err(comment_not_found());
        }
        Ok(())
    }

    /// Sets, switches or removes the caller's reaction on a comment.
    pub async fn react(
        &self,
        caller: &AuthenticatedUser,
        comment_id: &str,
        user_id: &str,
        request: &ReactionRequest,
    ) -> Result<ReactionResponse, AppError> {
        caller.ensure_owner(user_id)?;
        let requested = request.reaction()?;
        let id = parse_object_id(comment_id, "comment id")?;

        let comment = self.comment_repo.find_by_id(id).await?.ok_or_else(comment_not_found)?;
        let change = comment.resolve_reaction(&caller.uid, requested);

        let updated = self
            .comment_repo
            .apply_reaction(id, &caller.uid, change)
            .await?
            .ok_or_else(comment_not_found)?;

        Ok(ReactionResponse::from_comment(&updated, &caller.uid))
    }

    pub async fn stats(&self, book_id: &str) -> Result<CommentStats, AppError> {
        let book_id = parse_object_id(book_id, "book id")?;
        self.comment_repo.stats(book_id).await
    }

    async fn find_authored(&self, caller: &AuthenticatedUser, comment_id: &str, user_id: &str) -> Result<Comment, AppError> {
        caller.ensure_owner(user_id)?;
        let id = parse_object_id(comment_id, "comment id")?;

        let comment = self.comment_repo.find_by_id(id).await?.ok_or_else(comment_not_found)?;

        if !comment.is_authored_by(&caller.uid) {
            return Err(AppError::AuthorizationError(
                "Only the author can modify this comment".to_string(),
            ));
        }

        Ok(comment)
    }
}

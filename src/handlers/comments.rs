//! # Comment handlers
//!
//! `/api/comments`. Listing and stats are public. Writes take the acting
//! user in the path and require it to be the caller.

use actix_web::{delete, get, patch, post, web, HttpResponse};
use validator::Validate;

use crate::domain::dto::comments::{CommentListQuery, CreateCommentRequest, ReactionRequest, UpdateCommentRequest};
use crate::domain::dto::common::SuccessResponse;
use crate::domain::models::auth::AuthenticatedUser;
use crate::errors::AppError;
use crate::services::comments::CommentService;

#[get("/book-comments/{book_id}")]
pub async fn book_comments(
    book_id: web::Path<String>,
    query: web::Query<CommentListQuery>,
) -> Result<HttpResponse, AppError> {
    let service = CommentService::instance();
    let response = service.list_for_book(&book_id, &query).await?;

    Ok(HttpResponse::Ok().json(response))
}

#[get("/user-comments/{user_id}")]
pub async fn user_comments(user_id: web::Path<String>) -> Result<HttpResponse, AppError> {
    let service = CommentService::instance();
    let comments = service.list_for_user(&user_id).await?;

    Ok(HttpResponse::Ok().json(comments))
}

#[get("/comment/stats/{book_id}")]
pub async fn comment_stats(book_id: web::Path<String>) -> Result<HttpResponse, AppError> {
    let service = CommentService::instance();
    let stats = service.stats(&book_id).await?;

    Ok(HttpResponse::Ok().json(stats))
}

#[post("/comment")]
pub async fn create_comment(
    caller: AuthenticatedUser,
    payload: web::Json<CreateCommentRequest>,
) -> Result<HttpResponse, AppError> {
    payload.validate()
        .map_err(|e| AppError::ValidationError(e.to_string()))?;

    let service = CommentService::instance();
    let comment = service.create(&caller, payload.into_inner()).await?;

    Ok(HttpResponse::Created().json(comment))
}

#[patch("/comment/{comment_id}/{user_id}")]
pub async fn update_comment(
    caller: AuthenticatedUser,
    path: web::Path<(String, String)>,
    payload: web::Json<UpdateCommentRequest>,
) -> Result<HttpResponse, AppError> {
    payload.validate()
        .map_err(|e| AppError::ValidationError(e.to_string()))?;
    let (comment_id, user_id) = path.into_inner();

    let service = CommentService::instance();
    let comment = service.update(&caller, &comment_id, &user_id, &payload).await?;

    Ok(HttpResponse::Ok().json(comment))
}

#[delete("/comment/{comment_id}/{user_id}")]
pub async fn delete_comment(
    caller: AuthenticatedUser,
    path: web::Path<(String, String)>,
) -> Result<HttpResponse, AppError> {
    let (comment_id, user_id) = path.into_inner();

    let service = CommentService::instance();
    service.delete(&caller, &comment_id, &user_id).await?;

    Ok(HttpResponse::Ok().json(SuccessResponse::ok("Comment deleted")))
}

/// Like/dislike toggle; repeating the same reaction removes it.
#[post("/comment/{comment_id}/{user_id}/reaction")]
pub async fn react_to_comment(
    caller: AuthenticatedUser,
    path: web::Path<(String, String)>,
    payload: web::Json<ReactionRequest>,
) -> Result<HttpResponse, AppError> {
    let (comment_id, user_id) = path.into_inner();

    let service = CommentService::instance();
    let response = service.react(&caller, &comment_id, &user_id, &payload).await?;

    Ok(HttpResponse::Ok().json(response))
}

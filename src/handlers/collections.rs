//! # Collection handlers
//!
//! `/api/collections`. Static segments (`/collection`, `/books/toggle`,
//! `/remove`) are registered before the `/{user_id}` routes.

use actix_web::{delete, get, patch, post, web, HttpResponse};
use validator::Validate;

use crate::domain::dto::collections::{
    CreateCollectionRequest, RemoveBookRequest, RenameCollectionRequest, ToggleBooksRequest,
};
use crate::domain::dto::common::SuccessResponse;
use crate::domain::models::auth::AuthenticatedUser;
use crate::errors::AppError;
use crate::handlers::deleted_response;
use crate::services::collections::CollectionService;

#[get("/collection/{collection_id}")]
pub async fn get_collection(collection_id: web::Path<String>) -> Result<HttpResponse, AppError> {
    let service = CollectionService::instance();
    let collection = service.detail(&collection_id).await?;

    Ok(HttpResponse::Ok().json(collection))
}

#[patch("/collection/{collection_id}")]
pub async fn rename_collection(
    caller: AuthenticatedUser,
    collection_id: web::Path<String>,
    payload: web::Json<RenameCollectionRequest>,
) -> Result<HttpResponse, AppError> {
    payload.validate()
        .map_err(|e| AppError::ValidationError(e.to_string()))?;

    let service = CollectionService::instance();
    let message = service.rename(&caller, &collection_id, payload.into_inner()).await?;

    Ok(HttpResponse::Ok().json(SuccessResponse::ok(message)))
}

#[patch("/books/toggle")]
pub async fn toggle_books(
    caller: AuthenticatedUser,
    payload: web::Json<ToggleBooksRequest>,
) -> Result<HttpResponse, AppError> {
    payload.validate()
        .map_err(|e| AppError::ValidationError(e.to_string()))?;

    let service = CollectionService::instance();
    let messages = service.toggle(&caller, payload.into_inner()).await?;

    Ok(HttpResponse::Ok().json(SuccessResponse::ok(messages)))
}

#[patch("/remove")]
pub async fn remove_book(
    caller: AuthenticatedUser,
    payload: web::Json<RemoveBookRequest>,
) -> Result<HttpResponse, AppError> {
    payload.validate()
        .map_err(|e| AppError::ValidationError(e.to_string()))?;

    let service = CollectionService::instance();
    service.remove_book(&caller, payload.into_inner()).await?;

    Ok(HttpResponse::Ok().json(SuccessResponse::ok("Book removed from collection")))
}

#[get("/{user_id}")]
pub async fn list_collections(user_id: web::Path<String>) -> Result<HttpResponse, AppError> {
    let service = CollectionService::instance();
    let collections = service.list(&user_id).await?;

    Ok(HttpResponse::Ok().json(collections))
}

#[post("/{user_id}")]
pub async fn create_collection(
    caller: AuthenticatedUser,
    user_id: web::Path<String>,
    payload: web::Json<CreateCollectionRequest>,
) -> Result<HttpResponse, AppError> {
    payload.validate()
        .map_err(|e| AppError::ValidationError(e.to_string()))?;

    let service = CollectionService::instance();
    let response = service.create(&caller, &user_id, payload.into_inner()).await?;

    Ok(HttpResponse::Created().json(response))
}

#[delete("/{user_id}")]
pub async fn delete_collections(caller: AuthenticatedUser, user_id: web::Path<String>) -> Result<HttpResponse, AppError> {
    let service = CollectionService::instance();
    let removed = service.delete_all(&caller, &user_id).await?;

    Ok(deleted_response("Collections deleted", removed))
}

#[delete("/{user_id}/collection/{collection_id}")]
pub async fn delete_collection(
    caller: AuthenticatedUser,
    path: web::Path<(String, String)>,
) -> Result<HttpResponse, AppError> {
    let (user_id, collection_id) = path.into_inner();

    let service = CollectionService::instance();
    service.delete_entry(&caller, &user_id, &collection_id).await?;

    Ok(HttpResponse::Ok().json(SuccessResponse::ok("Collection deleted")))
}

/// Which of the user's collections hold `book_id`
#[get("/{user_id}/summary/{book_id}")]
pub async fn collection_summary(path: web::Path<(String, String)>) -> Result<HttpResponse, AppError> {
    let (user_id, book_id) = path.into_inner();

    let service = CollectionService::instance();
    let summary = service.summary(&user_id, &book_id).await?;

    Ok(HttpResponse::Ok().json(summary))
}

//! # Favorite handlers
//!
//! `/api/favorites`. One favorites document per user holding book ids.

use actix_web::{delete, get, patch, web, HttpRequest, HttpResponse};
use validator::Validate;

use crate::domain::dto::favorites::UpdateFavoriteRequest;
use crate::domain::models::auth::AuthenticatedUser;
use crate::domain::models::pagination::{Pagination, PaginationQuery};
use crate::errors::AppError;
use crate::handlers::{deleted_response, page_links};
use crate::services::favorites::FavoriteService;

/// Paged favorites; `page` and `limit` must be valid when given.
#[get("/{user_id}")]
pub async fn list_favorites(
    req: HttpRequest,
    user_id: web::Path<String>,
    query: web::Query<PaginationQuery>,
) -> Result<HttpResponse, AppError> {
    let pagination = Pagination::require(&query)?;

    let service = FavoriteService::instance();
    let response = service.list(&user_id, pagination, &page_links(&req)).await?;

    Ok(HttpResponse::Ok().json(response))
}

#[patch("")]
pub async fn update_favorite(
    caller: AuthenticatedUser,
    payload: web::Json<UpdateFavoriteRequest>,
) -> Result<HttpResponse, AppError> {
    payload.validate()
        .map_err(|e| AppError::ValidationError(e.to_string()))?;

    let service = FavoriteService::instance();
    let favorite = service.update(&caller, payload.into_inner()).await?;

    Ok(HttpResponse::Ok().json(favorite))
}

#[delete("/{user_id}")]
pub async fn delete_favorites(caller: AuthenticatedUser, user_id: web::Path<String>) -> Result<HttpResponse, AppError> {
    let service = FavoriteService::instance();
    let removed = service.delete_all(&caller, &user_id).await?;

    Ok(deleted_response("Favorites deleted", removed))
}

//! # User handlers
//!
//! `/api/users`. Profiles are public; a user's own book listing and
//! account deletion require the caller to be that user.

use actix_web::{delete, get, web, HttpRequest, HttpResponse};

use crate::domain::dto::common::SuccessResponse;
use crate::domain::models::auth::AuthenticatedUser;
use crate::domain::models::pagination::{Pagination, PaginationQuery};
use crate::errors::AppError;
use crate::handlers::page_links;
use crate::services::users::UserService;

#[get("")]
pub async fn list_users() -> Result<HttpResponse, AppError> {
    let service = UserService::instance();
    let users = service.list_users().await?;

    Ok(HttpResponse::Ok().json(users))
}

#[get("/check-user/{uid}")]
pub async fn check_user(uid: web::Path<String>) -> Result<HttpResponse, AppError> {
    let service = UserService::instance();
    let user = service.get_profile(&uid).await?;

    Ok(HttpResponse::Ok().json(user))
}

/// `{info, user, results}` for the caller's own books
#[get("/{uid}/{username}/my-books")]
pub async fn user_books(
    req: HttpRequest,
    caller: AuthenticatedUser,
    path: web::Path<(String, String)>,
    query: web::Query<PaginationQuery>,
) -> Result<HttpResponse, AppError> {
    let (uid, username) = path.into_inner();
    let pagination = Pagination::resolve(&query);

    let service = UserService::instance();
    let response = service
        .user_books(&caller, &uid, &username, pagination, &page_links(&req))
        .await?;

    Ok(HttpResponse::Ok().json(response))
}

/// Removes the account with its books, collections and favorites.
#[delete("/{uid}")]
pub async fn delete_user(caller: AuthenticatedUser, uid: web::Path<String>) -> Result<HttpResponse, AppError> {
    let service = UserService::instance();
    service.delete_account(&caller, &uid).await?;

    Ok(HttpResponse::Ok().json(SuccessResponse::ok("User deleted")))
}

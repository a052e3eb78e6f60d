//! # Book handlers
//!
//! `/api/books`. Reads are public; the scope runs the optional auth
//! middleware so writes can require a caller and `/path/{pathUrl}` can
//! report `isFavorite`.
//!
//! | Method | Path | Status |
//! |--------|------|--------|
//! | `GET` | `` | 200, 404 when empty |
//! | `GET` | `/filter` | 200, 400 without filters |
//! | `GET` | `/search?q=` | 200, 400, 404 |
//! | `GET` | `/options` | 200 |
//! | `GET` | `/more-books` | 200 |
//! | `GET` | `/related-books/{id}` | 200, 404 |
//! | `GET` | `/more-books-authors/{id}` | 200, 404 |
//! | `GET` | `/most-viewed?detail=` | 200, 400 |
//! | `GET` | `/path/{pathUrl}` | 200, 404 |
//! | `GET` | `/{id}` | 200, 404 |
//! | `POST` | `` | 201, 400, 401, 403, 409 |
//! | `PATCH` | `/{id}` | 200, 400, 401, 403, 404 |
//! | `DELETE` | `/{id}` | 200, 401, 403, 404 |

use actix_web::{delete, get, patch, post, web, HttpRequest, HttpResponse};
use validator::Validate;

use crate::domain::dto::books::{BookFilterQuery, CreateBookRequest, MostViewedQuery, SearchQuery, UpdateBookRequest};
use crate::domain::dto::common::SuccessResponse;
use crate::domain::models::auth::{AuthenticatedUser, OptionalUser};
use crate::domain::models::pagination::{Pagination, PaginationQuery};
use crate::errors::AppError;
use crate::handlers::page_links;
use crate::services::books::BookService;

#[get("")]
pub async fn list_books(req: HttpRequest, query: web::Query<PaginationQuery>) -> Result<HttpResponse, AppError> {
    let pagination = Pagination::resolve(&query);

    let service = BookService::instance();
    let response = service.list(pagination, &page_links(&req)).await?;

    Ok(HttpResponse::Ok().json(response))
}

/// Faceted listing; the response adds year and language counts.
#[get("/filter")]
pub async fn filter_books(
    req: HttpRequest,
    filter: web::Query<BookFilterQuery>,
    query: web::Query<PaginationQuery>,
) -> Result<HttpResponse, AppError> {
    let pagination = Pagination::resolve(&query);

    let service = BookService::instance();
    let response = service.filter(&filter, pagination, &page_links(&req)).await?;

    Ok(HttpResponse::Ok().json(response))
}

#[get("/search")]
pub async fn search_books(query: web::Query<SearchQuery>) -> Result<HttpResponse, AppError> {
    let service = BookService::instance();
    let results = service.search(query.q.as_deref()).await?;

    Ok(HttpResponse::Ok().json(results))
}

#[get("/options")]
pub async fn book_options() -> Result<HttpResponse, AppError> {
    let service = BookService::instance();
    let options = service.options().await?;

    Ok(HttpResponse::Ok().json(options))
}

#[get("/more-books")]
pub async fn more_books() -> Result<HttpResponse, AppError> {
    let service = BookService::instance();
    let books = service.random().await?;

    Ok(HttpResponse::Ok().json(books))
}

#[get("/related-books/{id}")]
pub async fn related_books(id: web::Path<String>) -> Result<HttpResponse, AppError> {
    let service = BookService::instance();
    let books = service.related(&id).await?;

    Ok(HttpResponse::Ok().json(books))
}

#[get("/more-books-authors/{id}")]
pub async fn more_books_by_author(id: web::Path<String>) -> Result<HttpResponse, AppError> {
    let service = BookService::instance();
    let books = service.more_by_author(&id).await?;

    Ok(HttpResponse::Ok().json(books))
}

#[get("/most-viewed")]
pub async fn most_viewed_books(query: web::Query<MostViewedQuery>) -> Result<HttpResponse, AppError> {
    let service = BookService::instance();
    let books = service.most_viewed(&query).await?;

    Ok(HttpResponse::Ok().json(books))
}

#[get("/path/{path_url}")]
pub async fn get_book_by_path(path_url: web::Path<String>, viewer: OptionalUser) -> Result<HttpResponse, AppError> {
    let service = BookService::instance();
    let book = service.get_by_path_url(&path_url, viewer.0.as_ref()).await?;

    Ok(HttpResponse::Ok().json(book))
}

#[get("/{id}")]
pub async fn get_book(id: web::Path<String>) -> Result<HttpResponse, AppError> {
    let service = BookService::instance();
    let book = service.get_by_id(&id).await?;

    Ok(HttpResponse::Ok().json(book))
}

#[post("")]
pub async fn create_book(
    caller: AuthenticatedUser,
    payload: web::Json<CreateBookRequest>,
) -> Result<HttpResponse, AppError> {
    payload.validate()
        .map_err(|e| AppError::ValidationError(e.to_string()))?;

    let service = BookService::instance();
    let book = service.create(&caller, payload.into_inner()).await?;

    Ok(HttpResponse::Created().json(book))
}

#[patch("/{id}")]
pub async fn update_book(
    caller: AuthenticatedUser,
    id: web::Path<String>,
    payload: web::Json<UpdateBookRequest>,
) -> Result<HttpResponse, AppError> {
    payload.validate()
        .map_err(|e| AppError::ValidationError(e.to_string()))?;

    let service = BookService::instance();
    let book = service.update(&caller, &id, &payload).await?;

    Ok(HttpResponse::Ok().json(book))
}

#[delete("/{id}")]
pub async fn delete_book(caller: AuthenticatedUser, id: web::Path<String>) -> Result<HttpResponse, AppError> {
    let service = BookService::instance();
    service.delete(&caller, &id).await?;

    Ok(HttpResponse::Ok().json(SuccessResponse::ok("Book deleted")))
}

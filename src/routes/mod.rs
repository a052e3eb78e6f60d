//! API route table
//!
//! | Scope | Auth | Handlers |
//! |-------|------|----------|
//! | `/api/books` | optional | [`handlers::books`] |
//! | `/api/users` | optional | [`handlers::users`] |
//! | `/api/auth` | required | [`handlers::auth`] |
//! | `/api/favorites` | optional | [`handlers::favorites`] |
//! | `/api/collections` | optional | [`handlers::collections`] |
//! | `/api/comments` | optional | [`handlers::comments`] |
//!
//! With optional auth, a handler asking for an `AuthenticatedUser` still
//! answers 401 to anonymous callers, while public reads go through.
//!
//! Static segments are registered before parameterized ones in each scope
//! (`/api/books/options` must not be captured by `/api/books/{id}`).
//!
//! ```rust,ignore
//! let app = App::new()
//!     .configure(configure_all_routes)
//!     .default_service(web::route().to(not_found));
//! ```

use actix_web::http::{header, StatusCode};
use actix_web::{get, web, HttpResponse};
use serde_json::json;

use crate::errors::{AppError, ErrorBody};
use crate::handlers;
use crate::middlewares::AuthMiddleware;

pub fn configure_all_routes(cfg: &mut web::ServiceConfig) {
    cfg.app_data(json_config())
        .app_data(query_config())
        .app_data(path_config());

    cfg.service(health_check);
    cfg.service(api_root);

    configure_book_routes(cfg);
    configure_user_routes(cfg);
    configure_favorite_routes(cfg);
    configure_collection_routes(cfg);
    configure_comment_routes(cfg);
}

fn configure_book_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/api/books")
            .wrap(AuthMiddleware::optional())
            .service(handlers::books::list_books)
            .service(handlers::books::create_book)
            .service(handlers::books::filter_books)
            .service(handlers::books::search_books)
            .service(handlers::books::book_options)
            .service(handlers::books::more_books)
            .service(handlers::books::related_books)
            .service(handlers::books::more_books_by_author)
            .service(handlers::books::most_viewed_books)
            .service(handlers::books::get_book_by_path)
            .service(handlers::books::get_book)
            .service(handlers::books::update_book)
            .service(handlers::books::delete_book),
    );
}

fn configure_user_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/api/users")
            .wrap(AuthMiddleware::optional())
            .service(handlers::users::list_users)
            .service(handlers::users::check_user)
            .service(handlers::users::user_books)
            .service(handlers::users::delete_user),
    );

    cfg.service(
        web::scope("/api/auth")
            .wrap(AuthMiddleware::required())
            .service(handlers::auth::register),
    );
}

fn configure_favorite_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/api/favorites")
            .wrap(AuthMiddleware::optional())
            .service(handlers::favorites::update_favorite)
            .service(handlers::favorites::list_favorites)
            .service(handlers::favorites::delete_favorites),
    );
}

fn configure_collection_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/api/collections")
            .wrap(AuthMiddleware::optional())
            .service(handlers::collections::get_collection)
            .service(handlers::collections::rename_collection)
            .service(handlers::collections::toggle_books)
            .service(handlers::collections::remove_book)
            .service(handlers::collections::list_collections)
            .service(handlers::collections::create_collection)
            .service(handlers::collections::delete_collections)
            .service(handlers::collections::delete_collection)
            .service(handlers::collections::collection_summary),
    );
}

fn configure_comment_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/api/comments")
            .wrap(AuthMiddleware::optional())
            .service(handlers::comments::book_comments)
            .service(handlers::comments::user_comments)
            .service(handlers::comments::comment_stats)
            .service(handlers::comments::create_comment)
            .service(handlers::comments::update_comment)
            .service(handlers::comments::delete_comment)
            .service(handlers::comments::react_to_comment),
    );
}

/// Malformed bodies, query strings and paths answer 400 in the error envelope.
pub(crate) fn json_config() -> web::JsonConfig {
    web::JsonConfig::default().error_handler(|err, _req| AppError::ValidationError(err.to_string()).into())
}

pub(crate) fn query_config() -> web::QueryConfig {
    web::QueryConfig::default().error_handler(|err, _req| AppError::ValidationError(err.to_string()).into())
}

pub(crate) fn path_config() -> web::PathConfig {
    web::PathConfig::default().error_handler(|err, _req| AppError::ValidationError(err.to_string()).into())
}

#[get("/health")]
async fn health_check() -> HttpResponse {
    HttpResponse::Ok().json(json!({
        "status": "ok",
        "service": env!("CARGO_PKG_NAME"),
        "version": env!("CARGO_PKG_VERSION"),
        "timestamp": chrono::Utc::now().to_rfc3339(),
    }))
}

#[get("/api")]
async fn api_root() -> HttpResponse {
    HttpResponse::PermanentRedirect()
        .insert_header((header::LOCATION, "/api/books"))
        .finish()
}

/// Fallback for unmatched paths, installed with `App::default_service`.
pub async fn not_found() -> HttpResponse {
    HttpResponse::NotFound().json(ErrorBody::new(StatusCode::NOT_FOUND, "Route not found"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::{test, App};

    #[actix_web::test]
    async fn test_health() {
        let app = test::init_service(App::new().configure(configure_all_routes)).await;
        let resp = test::call_service(&app, test::TestRequest::get().uri("/health").to_request()).await;
        assert_eq!(resp.status(), StatusCode::OK);

        let body: serde_json::Value = test::read_body_json(resp).await;
        assert_eq!(body["status"], "ok");
        assert!(body["timestamp"].is_string());
    }

    #[actix_web::test]
    async fn test_api_root_redirects_to_books() {
        let app = test::init_service(App::new().configure(configure_all_routes)).await;
        let resp = test::call_service(&app, test::TestRequest::get().uri("/api").to_request()).await;

        assert_eq!(resp.status(), StatusCode::PERMANENT_REDIRECT);
        assert_eq!(resp.headers().get(header::LOCATION).unwrap(), "/api/books");
    }

    #[actix_web::test]
    async fn test_unknown_route_is_json_404() {
        let app = test::init_service(
            App::new()
                .configure(configure_all_routes)
                .default_service(web::route().to(not_found)),
        )
        .await;
        let resp = test::call_service(&app, test::TestRequest::get().uri("/nope").to_request()).await;
        assert_eq!(resp.status(), StatusCode::NOT_FOUND);

        let body: serde_json::Value = test::read_body_json(resp).await;
        assert_eq!(body["error"]["status"], 404);
    }

    #[actix_web::test]
    async fn test_register_requires_token() {
        let app = test::init_service(App::new().configure(configure_all_routes)).await;
        let req = test::TestRequest::post()
            .uri("/api/auth/register")
            .set_json(json!({ "username": "ada_l" }))
            .to_request();
        let resp = test::call_service(&app, req).await;

        assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
    }

    #[actix_web::test]
    async fn test_malformed_json_is_bad_request() {
        let app = test::init_service(
            App::new().app_data(json_config()).route(
                "/echo",
                web::post().to(|body: web::Json<serde_json::Value>| async move { HttpResponse::Ok().json(body.into_inner()) }),
            ),
        )
        .await;

        let req = test::TestRequest::post()
            .uri("/echo")
            .insert_header((header::CONTENT_TYPE, "application/json"))
            .set_payload("{not json")
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

        let body: serde_json::Value = test::read_body_json(resp).await;
        assert_eq!(body["error"]["status"], 400);
    }

    #[actix_web::test]
    async fn test_bad_query_is_bad_request() {
        #[derive(serde::Deserialize)]
        struct Page {
            #[allow(dead_code)]
            page: u32,
        }

        let app = test::init_service(
            App::new()
                .app_data(query_config())
                .route("/q", web::get().to(|_: web::Query<Page>| async { HttpResponse::Ok().finish() })),
        )
        .await;

        let resp = test::call_service(&app, test::TestRequest::get().uri("/q?page=abc").to_request()).await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    }
}

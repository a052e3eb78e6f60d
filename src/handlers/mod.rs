//! HTTP handlers
//!
//! Thin adapters between actix-web and the services: extract, validate,
//! call the service singleton and pick the status code.
//!
//! ```rust,ignore
//! #[get("/{id}")]
//! pub async fn get_book(id: web::Path<String>) -> Result<HttpResponse, AppError> {
//!     let service = BookService::instance();
//!     let book = service.get_by_id(&id).await?;
//!     Ok(HttpResponse::Ok().json(book))
//! }
//! ```

use actix_web::{HttpRequest, HttpResponse};
use log::debug;

use crate::domain::dto::common::SuccessResponse;
use crate::domain::models::pagination::PageLinks;

pub mod auth;
pub mod books;
pub mod collections;
pub mod comments;
pub mod favorites;
pub mod users;

/// Absolute link base for the current request.
///
/// Keeps every query parameter except `page` and `limit`, so filters
/// survive into the next/prev links.
pub fn page_links(req: &HttpRequest) -> PageLinks {
    let connection = req.connection_info();
    let mut base = format!("{}://{}{}", connection.scheme(), connection.host(), req.path());

    let kept: Vec<&str> = req
        .query_string()
        .split('&')
        .filter(|pair| !pair.is_empty())
        .filter(|pair| {
            let key = pair.split('=').next().unwrap_or_default();
            key != "page" && key != "limit"
        })
        .collect();

    if !kept.is_empty() {
        base.push('?');
        base.push_str(&kept.join("&"));
    }

    PageLinks::new(base)
}

/// 200 for bulk deletes, whether or not anything was stored.
pub fn deleted_response(message: &'static str, removed: bool) -> HttpResponse {
    if !removed {
        debug!("{}: nothing to delete", message);
    }
    HttpResponse::Ok().json(SuccessResponse::ok(message))
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::body::to_bytes;
    use actix_web::http::StatusCode;
    use actix_web::test::TestRequest;

    #[actix_web::test]
    async fn test_deleted_response_when_nothing_existed() {
        let response = deleted_response("Favorites deleted", false);
        assert_eq!(response.status(), StatusCode::OK);

        let body = to_bytes(response.into_body()).await.unwrap();
        let json: serde_json::Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(json["success"]["status"], 200);
        assert_eq!(json["success"]["message"], "Favorites deleted");
    }

    #[actix_web::test]
    async fn test_deleted_response_is_the_same_either_way() {
        let first = to_bytes(deleted_response("Collections deleted", true).into_body()).await.unwrap();
        let again = to_bytes(deleted_response("Collections deleted", false).into_body()).await.unwrap();
        assert_eq!(first, again);
    }

    #[test]
    fn test_page_links_drop_paging_params() {
        let req = TestRequest::get()
            .uri("/api/books/filter?year=1999&page=2&limit=5&language=es")
            .insert_header(("Host", "catalog.test"))
            .to_http_request();

        let links = page_links(&req);
        assert_eq!(
            links.link(3, 5),
            "http://catalog.test/api/books/filter?year=1999&language=es&page=3&limit=5"
        );
    }

    #[test]
    fn test_page_links_without_filters() {
        let req = TestRequest::get()
            .uri("/api/books?page=1")
            .insert_header(("Host", "catalog.test"))
            .to_http_request();

        assert_eq!(page_links(&req).link(2, 10), "http://catalog.test/api/books?page=2&limit=10");
    }
}

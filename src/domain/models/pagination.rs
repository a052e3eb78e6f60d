//! # Pagination
//!
//! `page` and `limit` arrive as raw query strings and are resolved leniently:
//!
//! | Input | Result |
//! |-------|--------|
//! | `page` missing, invalid or < 1 | 1 |
//! | `limit` missing, invalid or < 1 | 10 |
//! | `limit` > 100 | 100 |
//! | `page` > [`MAX_PAGE`] | [`MAX_PAGE`] |
//!
//! [`Pagination::require`] is the strict form used where both parameters are
//! mandatory.
//!
//! ```rust,ignore
//! let pagination = Pagination::resolve(&query);
//! let info = PaginationInfo::new(total, pagination, &PageLinks::new(base_url));
//! ```

use serde::{Deserialize, Serialize};

use crate::errors::AppError;

pub const DEFAULT_PAGE: u64 = 1;
pub const DEFAULT_LIMIT: u64 = 10;
pub const MAX_LIMIT: u64 = 100;
/// Highest page whose offset still fits a BSON `$skip`
pub const MAX_PAGE: u64 = i64::MAX as u64 / MAX_LIMIT;

#[derive(Debug, Default, Clone, Deserialize)]
pub struct PaginationQuery {
    pub page: Option<String>,
    pub limit: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pagination {
    pub page: u64,
    pub limit: u64,
}

fn parse_positive(raw: Option<&str>) -> Option<u64> {
    raw.and_then(|value| value.trim().parse::<i64>().ok())
        .filter(|value| *value >= 1)
        .map(|value| value as u64)
}

fn is_blank(raw: &Option<String>) -> bool {
    raw.as_deref().map(str::trim).unwrap_or_default().is_empty()
}

impl Default for Pagination {
    fn default() -> Self {
        Self { page: DEFAULT_PAGE, limit: DEFAULT_LIMIT }
    }
}

impl Pagination {
    pub fn resolve(query: &PaginationQuery) -> Self {
        let page = parse_positive(query.page.as_deref())
            .unwrap_or(DEFAULT_PAGE)
            .min(MAX_PAGE);
        let limit = parse_positive(query.limit.as_deref())
            .unwrap_or(DEFAULT_LIMIT)
            .min(MAX_LIMIT);

        Self { page, limit }
    }

    /// Like [`Pagination::resolve`] but both parameters must be present.
    pub fn require(query: &PaginationQuery) -> Result<Self, AppError> {
        if is_blank(&query.page) || is_blank(&query.limit) {
            return Err(AppError::ValidationError(
                "The page and limit query parameters are required".to_string(),
            ));
        }
        Ok(Self::resolve(query))
    }

    pub fn offset(&self) -> u64 {
        self.page.saturating_sub(1).saturating_mul(self.limit)
    }

    /// [`Pagination::offset`] as a `$skip` value
    pub fn skip(&self) -> i64 {
        i64::try_from(self.offset()).unwrap_or(i64::MAX)
    }

    pub fn limit_i64(&self) -> i64 {
        i64::try_from(self.limit).unwrap_or(MAX_LIMIT as i64)
    }

    /// Stable fragment for cache keys
    pub fn cache_suffix(&self) -> String {
        format!("page:{}:limit:{}", self.page, self.limit)
    }
}

/// Builds absolute page links, keeping any non-pagination query parameters.
#[derive(Debug, Clone)]
pub struct PageLinks {
    base: String,
}

impl PageLinks {
    /// `base` is `scheme://host/path`, optionally followed by `?filters`.
    pub fn new(base: impl Into<String>) -> Self {
        Self { base: base.into() }
    }

    pub fn link(&self, page: u64, limit: u64) -> String {
        let separator = if self.base.contains('?') { '&' } else { '?' };
        format!("{}{}page={}&limit={}", self.base, separator, page, limit)
    }
}

/// Page metadata returned next to every paginated `results` array
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaginationInfo {
    pub total_books: u64,
    pub total_pages: u64,
    pub current_page: u64,
    pub next_page: Option<u64>,
    pub prev_page: Option<u64>,
    pub next_page_link: Option<String>,
    pub prev_page_link: Option<String>,
}

impl PaginationInfo {
    pub fn new(total: u64, pagination: Pagination, links: &PageLinks) -> Self {
        let total_pages = total.div_ceil(pagination.limit);
        let current_page = pagination.page;

        let next_page = (current_page < total_pages).then_some(current_page + 1);
        let prev_page = (current_page > 1).then_some(current_page - 1);

        Self {
            total_books: total,
            total_pages,
            current_page,
            next_page,
            prev_page,
            next_page_link: next_page.map(|page| links.link(page, pagination.limit)),
            prev_page_link: prev_page.map(|page| links.link(page, pagination.limit)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn query(page: Option<&str>, limit: Option<&str>) -> PaginationQuery {
        PaginationQuery {
            page: page.map(str::to_string),
            limit: limit.map(str::to_string),
        }
    }

    #[test]
    fn test_defaults_when_missing() {
        assert_eq!(Pagination::resolve(&query(None, None)), Pagination { page: 1, limit: 10 });
    }

    #[test]
    fn test_invalid_and_non_positive_values() {
        assert_eq!(
            Pagination::resolve(&query(Some("abc"), Some("-5"))),
            Pagination { page: 1, limit: 10 }
        );
        assert_eq!(
            Pagination::resolve(&query(Some("0"), Some("0"))),
            Pagination { page: 1, limit: 10 }
        );
    }

    #[test]
    fn test_limit_is_capped() {
        assert_eq!(Pagination::resolve(&query(Some("3"), Some("500"))).limit, MAX_LIMIT);
    }

    #[test]
    fn test_offset() {
        assert_eq!(Pagination { page: 1, limit: 10 }.offset(), 0);
        assert_eq!(Pagination { page: 4, limit: 25 }.offset(), 75);
    }

    #[test]
    fn test_huge_page_is_clamped() {
        let pagination = Pagination::resolve(&query(Some("9223372036854775807"), Some("100")));

        assert_eq!(pagination.page, MAX_PAGE);
        assert!(pagination.skip() >= 0);
        assert_eq!(pagination.offset(), (MAX_PAGE - 1) * 100);
    }

    #[test]
    fn test_offset_saturates() {
        let pagination = Pagination { page: u64::MAX, limit: MAX_LIMIT };

        assert_eq!(pagination.offset(), u64::MAX);
        assert_eq!(pagination.skip(), i64::MAX);
    }

    #[test]
    fn test_info_for_page_past_the_end() {
        let links = PageLinks::new("http://h/api/books");
        let pagination = Pagination::resolve(&query(Some("9223372036854775807"), Some("10")));
        let info = PaginationInfo::new(30, pagination, &links);

        assert_eq!(info.next_page, None);
        assert_eq!(info.prev_page, Some(MAX_PAGE - 1));
    }

    #[test]
    fn test_require_rejects_missing_parameters() {
        assert!(Pagination::require(&query(Some("1"), None)).is_err());
        assert!(Pagination::require(&query(None, Some("10"))).is_err());
        assert!(Pagination::require(&query(Some(" "), Some("10"))).is_err());
        assert_eq!(
            Pagination::require(&query(Some("2"), Some("5"))).unwrap(),
            Pagination { page: 2, limit: 5 }
        );
    }

    #[test]
    fn test_info_middle_page() {
        let links = PageLinks::new("http://localhost:8080/api/books");
        let info = PaginationInfo::new(45, Pagination { page: 2, limit: 10 }, &links);

        assert_eq!(info.total_pages, 5);
        assert_eq!(info.next_page, Some(3));
        assert_eq!(info.prev_page, Some(1));
        assert_eq!(
            info.next_page_link.as_deref(),
            Some("http://localhost:8080/api/books?page=3&limit=10")
        );
        assert_eq!(
            info.prev_page_link.as_deref(),
            Some("http://localhost:8080/api/books?page=1&limit=10")
        );
    }

    #[test]
    fn test_info_edges() {
        let links = PageLinks::new("http://h/api/books");

        let first = PaginationInfo::new(10, Pagination { page: 1, limit: 10 }, &links);
        assert_eq!(first.total_pages, 1);
        assert_eq!(first.next_page, None);
        assert_eq!(first.prev_page, None);

        let empty = PaginationInfo::new(0, Pagination { page: 1, limit: 10 }, &links);
        assert_eq!(empty.total_pages, 0);
        assert_eq!(empty.next_page_link, None);
    }

    #[test]
    fn test_links_keep_existing_query() {
        let links = PageLinks::new("http://h/api/books/filter?category=Novel");
        assert_eq!(links.link(2, 5), "http://h/api/books/filter?category=Novel&page=2&limit=5");
    }

    #[test]
    fn test_info_serializes_camel_case() {
        let links = PageLinks::new("http://h/x");
        let json = serde_json::to_value(PaginationInfo::new(11, Pagination { page: 1, limit: 10 }, &links)).unwrap();

        assert_eq!(json["totalBooks"], 11);
        assert_eq!(json["totalPages"], 2);
        assert_eq!(json["currentPage"], 1);
        assert_eq!(json["nextPageLink"], "http://h/x?page=2&limit=10");
        assert!(json["prevPage"].is_null());
    }
}

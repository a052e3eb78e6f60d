use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::entities::books::{Book, BookImage};
use crate::domain::models::pagination::PaginationInfo;
use crate::utils::mongo_utils::to_chrono;
use crate::utils::string_utils::{deserialize_lenient_i32, deserialize_string_or_vec};

/// Full book as returned by the detail endpoints
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BookResponse {
    pub id: String,
    pub title: String,
    pub authors: Vec<String>,
    pub synopsis: String,
    pub category: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source_link: Option<String>,
    pub language: String,
    pub year: i32,
    pub number_pages: i32,
    pub format: String,
    pub path_url: String,
    pub image: BookImage,
    pub user_id: String,
    pub views: i64,
    pub rating: f64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<Book> for BookResponse {
    fn from(book: Book) -> Self {
        Self {
            id: book.id.map(|id| id.to_hex()).unwrap_or_default(),
            title: book.title,
            authors: book.authors,
            synopsis: book.synopsis,
            category: book.category,
            source_link: book.source_link,
            language: book.language,
            year: book.year,
            number_pages: book.number_pages,
            format: book.format,
            path_url: book.path_url,
            image: book.image,
            user_id: book.user_id,
            views: book.views,
            rating: book.rating,
            created_at: to_chrono(book.created_at),
            updated_at: to_chrono(book.updated_at),
        }
    }
}

/// `GET /api/books/path/{pathUrl}` adds whether the viewer saved the book.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BookDetailResponse {
    #[serde(flatten)]
    pub book: BookResponse,
    pub is_favorite: bool,
}

/// Card shown in listings, produced by the summary projection
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BookSummary {
    pub id: String,
    pub title: String,
    #[serde(deserialize_with = "deserialize_string_or_vec")]
    pub authors: Vec<String>,
    #[serde(deserialize_with = "deserialize_string_or_vec")]
    pub category: Vec<String>,
    #[serde(default)]
    pub language: String,
    pub path_url: String,
    #[serde(default)]
    pub image: BookImage,
}

impl From<Book> for BookSummary {
    fn from(book: Book) -> Self {
        Self {
            id: book.id.map(|id| id.to_hex()).unwrap_or_default(),
            title: book.title,
            authors: book.authors,
            category: book.category,
            language: book.language,
            path_url: book.path_url,
            image: book.image,
        }
    }
}

/// Minimal reference used by search and the recommendation samples
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BookTeaser {
    pub id: String,
    pub title: String,
    #[serde(deserialize_with = "deserialize_string_or_vec")]
    pub authors: Vec<String>,
    pub path_url: String,
}

/// Ranking entry of `GET /api/books/most-viewed?detail=summary`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ViewedBook {
    pub id: String,
    pub title: String,
    pub path_url: String,
    #[serde(default)]
    pub views: i64,
}

/// `detail=summary` ranks by views only; `detail=full` returns listing cards.
#[derive(Debug, Clone, Serialize)]
#[serde(untagged)]
pub enum MostViewedBooks {
    Summary(Vec<ViewedBook>),
    Full(Vec<BookSummary>),
}

impl MostViewedBooks {
    pub fn is_empty(&self) -> bool {
        match self {
            MostViewedBooks::Summary(books) => books.is_empty(),
            MostViewedBooks::Full(books) => books.is_empty(),
        }
    }
}

/// One bucket of a facet: a distinct value and how many books carry it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FacetCount<T> {
    pub value: T,
    pub count: i64,
}

/// Year bucket; older documents may store the year as a string.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct YearCount {
    #[serde(deserialize_with = "deserialize_lenient_i32")]
    pub value: i32,
    pub count: i64,
}

/// `GET /api/books/options`
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BookOptions {
    #[serde(default)]
    pub categories: Vec<FacetCount<String>>,
    #[serde(default)]
    pub languages: Vec<FacetCount<String>>,
    #[serde(default)]
    pub years: Vec<YearCount>,
}

/// `{info, results}` page; cached as-is in Redis.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BookListResponse<T = BookSummary> {
    pub info: PaginationInfo,
    pub results: Vec<T>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FilteredBookInfo {
    #[serde(flatten)]
    pub pagination: PaginationInfo,
    pub year_counts: Vec<YearCount>,
    pub language_counts: Vec<FacetCount<String>>,
}

/// `GET /api/books/filter`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FilteredBookResponse {
    pub info: FilteredBookInfo,
    pub results: Vec<BookSummary>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::models::pagination::{PageLinks, Pagination};
    use mongodb::bson::{oid::ObjectId, DateTime as BsonDateTime};

    fn book() -> Book {
        let now = BsonDateTime::now();
        Book {
            id: Some(ObjectId::new()),
            title: "Pedro Páramo".to_string(),
            authors: vec!["Juan Rulfo".to_string()],
            synopsis: "Comala".to_string(),
            category: vec!["Novela".to_string()],
            source_link: None,
            language: "es".to_string(),
            year: 1955,
            number_pages: 124,
            format: "PDF".to_string(),
            path_url: "pedro-paramo".to_string(),
            image: BookImage::default(),
            user_id: "uid-1".to_string(),
            views: 3,
            rating: 4.0,
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn test_detail_response_flattens_book() {
        let source = book();
        let id = source.id.unwrap().to_hex();
        let detail = BookDetailResponse { book: source.into(), is_favorite: true };
        let json = serde_json::to_value(&detail).unwrap();

        assert_eq!(json["id"], id);
        assert_eq!(json["pathUrl"], "pedro-paramo");
        assert_eq!(json["isFavorite"], true);
        assert!(json.get("sourceLink").is_none());
    }

    #[test]
    fn test_filtered_info_flattens_pagination() {
        let pagination = Pagination { page: 1, limit: 10 };
        let info = FilteredBookInfo {
            pagination: PaginationInfo::new(12, pagination, &PageLinks::new("http://h/api/books/filter?year=1955")),
            year_counts: vec![YearCount { value: 1955, count: 12 }],
            language_counts: vec![FacetCount { value: "es".to_string(), count: 12 }],
        };
        let json = serde_json::to_value(&info).unwrap();

        assert_eq!(json["totalBooks"], 12);
        assert_eq!(json["totalPages"], 2);
        assert_eq!(json["yearCounts"][0]["value"], 1955);
        assert_eq!(json["languageCounts"][0]["count"], 12);
    }

    #[test]
    fn test_most_viewed_serializes_as_plain_array() {
        let books = MostViewedBooks::Full(vec![book().into()]);
        let json = serde_json::to_value(&books).unwrap();

        assert!(json.is_array());
        assert_eq!(json[0]["title"], "Pedro Páramo");
        assert!(json[0].get("views").is_none());
    }

    #[test]
    fn test_year_count_accepts_string_years() {
        let count: YearCount = serde_json::from_value(serde_json::json!({ "value": "1999", "count": 2 })).unwrap();
        assert_eq!(count.value, 1999);
    }
}

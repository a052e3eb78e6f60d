//! # Book query builders
//!
//! Filters, projections and aggregation pipelines for the `books`
//! collection. Everything here is a pure function returning BSON, so the
//! shapes can be checked without a database.
//!
//! | Builder | Used by |
//! |---------|---------|
//! | [`list_pipeline`] | `GET /api/books`, my-books |
//! | [`filtering_pipeline`] | `GET /api/books/filter` |
//! | [`options_pipeline`] | `GET /api/books/options` |
//! | [`sample_pipeline`] | more-books, related-books, more-books-authors |
//! | [`search_filter`] | `GET /api/books/search` |
//!
//! `authors` and `category` may be stored as a plain string by older
//! clients; [`as_array`] normalizes both shapes in projections.

use mongodb::bson::{doc, oid::ObjectId, Bson, Document};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use crate::domain::dto::books::{BookFilterQuery, BookSummary, FacetCount, YearCount};
use crate::domain::models::pagination::Pagination;
use crate::errors::AppError;
use crate::utils::string_utils::{clean_optional_string, escape_regex};

pub const SAMPLE_SIZE: i64 = 3;
pub const MOST_VIEWED_LIMIT: i64 = 10;

/// `$cond` expression that wraps a scalar field into a one-element array.
pub fn as_array(field: &str) -> Bson {
    Bson::Document(doc! {
        "$cond": {
            "if": { "$isArray": field },
            "then": field,
            "else": [field],
        }
    })
}

fn case_insensitive(value: &str) -> Document {
    doc! { "$regex": escape_regex(value), "$options": "i" }
}

/// Projection producing [`BookSummary`]
pub fn summary_projection() -> Document {
    doc! {
        "_id": 0,
        "id": { "$toString": "$_id" },
        "title": 1,
        "authors": as_array("$authors"),
        "category": as_array("$category"),
        "language": 1,
        "pathUrl": 1,
        "image": 1,
    }
}

/// Projection producing `BookTeaser`
pub fn teaser_projection() -> Document {
    doc! {
        "_id": 0,
        "id": { "$toString": "$_id" },
        "title": 1,
        "authors": as_array("$authors"),
        "pathUrl": 1,
    }
}

/// Projection producing `ViewedBook`
pub fn viewed_projection() -> Document {
    doc! {
        "_id": 0,
        "id": { "$toString": "$_id" },
        "title": 1,
        "pathUrl": 1,
        "views": 1,
    }
}

/// Newest-first page of summaries matching `filter`.
pub fn list_pipeline(filter: Document, pagination: Pagination) -> Vec<Document> {
    vec![
        doc! { "$match": filter },
        doc! { "$sort": { "_id": -1 } },
        doc! { "$skip": pagination.skip() },
        doc! { "$limit": pagination.limit_i64() },
        doc! { "$project": summary_projection() },
    ]
}

/// Top books by views using `projection`.
pub fn most_viewed_pipeline(projection: Document) -> Vec<Document> {
    vec![
        doc! { "$sort": { "views": -1, "_id": -1 } },
        doc! { "$limit": MOST_VIEWED_LIMIT },
        doc! { "$project": projection },
    ]
}

/// Groups by `field` into `{value, count}` buckets, skipping missing values.
fn count_by(field: &str, sort_direction: i32) -> Vec<Document> {
    vec![
        doc! { "$group": { "_id": field, "count": { "$sum": 1 } } },
        doc! { "$match": { "_id": { "$ne": Bson::Null } } },
        doc! { "$sort": { "_id": sort_direction } },
        doc! { "$project": { "_id": 0, "value": "$_id", "count": 1 } },
    ]
}

/// Validated listing filter
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BookFilter {
    pub authors: Option<String>,
    pub category: Option<String>,
    pub year: Option<i32>,
    pub language: Option<String>,
}

impl BookFilter {
    /// Rejects a non-numeric year and a filter with no criteria.
    pub fn from_query(query: &BookFilterQuery) -> Result<Self, AppError> {
        let year = clean_optional_string(query.year.clone())
            .map(|year| {
                year.parse::<i32>()
                    .map_err(|_| AppError::ValidationError(format!("Year must be numeric, got '{}'", year)))
            })
            .transpose()?;

        let filter = Self {
            authors: clean_optional_string(query.authors.clone()),
            category: clean_optional_string(query.category.clone()),
            year,
            language: clean_optional_string(query.language.clone()),
        };

        if filter.is_empty() {
            return Err(AppError::ValidationError(
                "At least one filter (authors, category, year, language) is required".to_string(),
            ));
        }

        Ok(filter)
    }

    pub fn is_empty(&self) -> bool {
        self.authors.is_none() && self.category.is_none() && self.year.is_none() && self.language.is_none()
    }

    pub fn to_match(&self) -> Document {
        let mut filter = Document::new();

        if let Some(authors) = &self.authors {
            filter.insert("authors", case_insensitive(authors));
        }
        if let Some(category) = &self.category {
            filter.insert("category", category);
        }
        if let Some(year) = self.year {
            filter.insert("year", year);
        }
        if let Some(language) = &self.language {
            filter.insert("language", case_insensitive(language));
        }

        filter
    }

    /// SHA-256 hex digest of the filter and page, used in cache keys.
    pub fn cache_fingerprint(&self, pagination: Pagination) -> String {
        let canonical = format!(
            "authors={}|category={}|year={}|language={}|page={}|limit={}",
            self.authors.as_deref().unwrap_or_default(),
            self.category.as_deref().unwrap_or_default(),
            self.year.map(|year| year.to_string()).unwrap_or_default(),
            self.language.as_deref().unwrap_or_default(),
            pagination.page,
            pagination.limit,
        );

        let mut hasher = Sha256::new();
        hasher.update(canonical.as_bytes());
        format!("{:x}", hasher.finalize())
    }
}

/// Single document produced by [`filtering_pipeline`]
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FilteredPage {
    #[serde(default)]
    pub results: Vec<BookSummary>,
    #[serde(default)]
    pub total_books: i64,
    #[serde(default)]
    pub language_counts: Vec<FacetCount<String>>,
    #[serde(default)]
    pub year_counts: Vec<YearCount>,
}

/// Faceted listing: the page, the total and language/year counts over the whole match.
pub fn filtering_pipeline(filter: &BookFilter, pagination: Pagination) -> Vec<Document> {
    vec![
        doc! { "$match": filter.to_match() },
        doc! {
            "$facet": {
                "results": [
                    { "$sort": { "_id": -1 } },
                    { "$skip": pagination.skip() },
                    { "$limit": pagination.limit_i64() },
                    { "$project": summary_projection() },
                ],
                "totalBooks": [{ "$count": "count" }],
                "languageCounts": count_by("$language", 1),
                "yearCounts": count_by("$year", -1),
            }
        },
        doc! {
            "$addFields": {
                "totalBooks": { "$ifNull": [{ "$arrayElemAt": ["$totalBooks.count", 0] }, 0] }
            }
        },
    ]
}

/// Distinct categories, languages and years with their counts.
pub fn options_pipeline() -> Vec<Document> {
    let mut categories = vec![doc! { "$unwind": "$category" }];
    categories.extend(count_by("$category", 1));

    vec![doc! {
        "$facet": {
            "categories": categories,
            "languages": count_by("$language", 1),
            "years": count_by("$year", 1),
        }
    }]
}

/// Random teasers among books matching `filter`.
pub fn sample_pipeline(filter: Document) -> Vec<Document> {
    vec![
        doc! { "$match": filter },
        doc! { "$sample": { "size": SAMPLE_SIZE } },
        doc! { "$project": teaser_projection() },
    ]
}

/// Other books sharing `category`
pub fn related_filter(book_id: ObjectId, category: &str) -> Document {
    doc! { "_id": { "$ne": book_id }, "category": category }
}

/// Other books whose authors match `author`
pub fn same_author_filter(book_id: ObjectId, author: &str) -> Document {
    doc! { "_id": { "$ne": book_id }, "authors": case_insensitive(author) }
}

/// Title or author contains `term`, case-insensitively.
pub fn search_filter(term: &str) -> Document {
    doc! {
        "$or": [
            { "title": case_insensitive(term) },
            { "authors": case_insensitive(term) },
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn query(authors: Option<&str>, category: Option<&str>, year: Option<&str>, language: Option<&str>) -> BookFilterQuery {
        BookFilterQuery {
            authors: authors.map(str::to_string),
            category: category.map(str::to_string),
            year: year.map(str::to_string),
            language: language.map(str::to_string),
        }
    }

    #[test]
    fn test_empty_filter_is_rejected() {
        let result = BookFilter::from_query(&query(None, Some("  "), None, None));
        assert!(matches!(result, Err(AppError::ValidationError(_))));
    }

    #[test]
    fn test_non_numeric_year_is_rejected() {
        let result = BookFilter::from_query(&query(None, None, Some("19x5"), None));
        assert!(matches!(result, Err(AppError::ValidationError(_))));
    }

    #[test]
    fn test_match_document() {
        let filter = BookFilter::from_query(&query(Some("J. R. R."), Some("Fantasía"), Some(" 1954 "), Some("en"))).unwrap();
        let filter_match = filter.to_match();

        let authors = filter_match.get_document("authors").unwrap();
        assert_eq!(authors.get_str("$regex").unwrap(), r"J\. R\. R\.");
        assert_eq!(authors.get_str("$options").unwrap(), "i");
        assert_eq!(filter_match.get_str("category").unwrap(), "Fantasía");
        assert_eq!(filter_match.get_i32("year").unwrap(), 1954);
        assert!(filter_match.get_document("language").is_ok());
    }

    #[test]
    fn test_fingerprint_is_stable_and_page_sensitive() {
        let filter = BookFilter::from_query(&query(None, Some("Novela"), None, None)).unwrap();
        let first = Pagination { page: 1, limit: 10 };
        let second = Pagination { page: 2, limit: 10 };

        assert_eq!(filter.cache_fingerprint(first), filter.cache_fingerprint(first));
        assert_ne!(filter.cache_fingerprint(first), filter.cache_fingerprint(second));
        assert_eq!(filter.cache_fingerprint(first).len(), 64);

        let by_language = BookFilter { language: Some("Novela".to_string()), ..Default::default() };
        assert_ne!(filter.cache_fingerprint(first), by_language.cache_fingerprint(first));
    }

    #[test]
    fn test_list_pipeline_pages_newest_first() {
        let pipeline = list_pipeline(doc! {}, Pagination { page: 3, limit: 20 });

        assert_eq!(pipeline[1], doc! { "$sort": { "_id": -1 } });
        assert_eq!(pipeline[2], doc! { "$skip": 40_i64 });
        assert_eq!(pipeline[3], doc! { "$limit": 20_i64 });
    }

    #[test]
    fn test_list_pipeline_skip_stays_positive_for_huge_pages() {
        use crate::domain::models::pagination::PaginationQuery;

        let query = PaginationQuery {
            page: Some(i64::MAX.to_string()),
            limit: Some("100".to_string()),
        };
        let pipeline = list_pipeline(doc! {}, Pagination::resolve(&query));

        let skip = pipeline[2].get_i64("$skip").unwrap();
        assert!(skip > 0);
    }

    #[test]
    fn test_filtering_pipeline_sorts_before_paging() {
        let filter = BookFilter { year: Some(2001), ..Default::default() };
        let pipeline = filtering_pipeline(&filter, Pagination { page: 2, limit: 5 });

        let facet = pipeline[1].get_document("$facet").unwrap();
        let results = facet.get_array("results").unwrap();
        let first_stage = results[0].as_document().unwrap();
        let second_stage = results[1].as_document().unwrap();

        assert!(first_stage.contains_key("$sort"));
        assert_eq!(second_stage.get_i64("$skip").unwrap(), 5);
        assert!(facet.contains_key("languageCounts"));
        assert!(facet.contains_key("yearCounts"));
    }

    #[test]
    fn test_options_unwinds_categories() {
        let pipeline = options_pipeline();
        let facet = pipeline[0].get_document("$facet").unwrap();
        let categories = facet.get_array("categories").unwrap();

        assert_eq!(categories[0].as_document().unwrap().get_str("$unwind").unwrap(), "$category");
    }

    #[test]
    fn test_search_filter_escapes_term() {
        let filter = search_filter("C++");
        let branches = filter.get_array("$or").unwrap();
        let title = branches[0].as_document().unwrap().get_document("title").unwrap();

        assert_eq!(title.get_str("$regex").unwrap(), r"C\+\+");
    }

    #[test]
    fn test_related_filter_excludes_book() {
        let id = ObjectId::new();
        let filter = related_filter(id, "Novela");

        assert_eq!(filter.get_document("_id").unwrap().get_object_id("$ne").unwrap(), id);
        assert_eq!(filter.get_str("category").unwrap(), "Novela");
    }

    #[test]
    fn test_filtered_page_reads_facet_output() {
        let document = doc! {
            "results": [],
            "totalBooks": 7,
            "languageCounts": [{ "value": "es", "count": 7 }],
            "yearCounts": [{ "value": 1999, "count": 4 }, { "value": "2001", "count": 3 }],
        };
        let page: FilteredPage = mongodb::bson::from_document(document).unwrap();

        assert_eq!(page.total_books, 7);
        assert_eq!(page.year_counts[1].value, 2001);
    }
}

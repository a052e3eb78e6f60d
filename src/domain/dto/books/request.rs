use mongodb::bson::{self, doc, DateTime, Document};
use serde::Deserialize;
use validator::Validate;

use crate::domain::dto::common::{validate_http_url, validate_non_blank_items};
use crate::domain::entities::books::{Book, BookImage};
use crate::errors::{AppError, ErrorContext};
use crate::utils::string_utils::{
    deserialize_lenient_i32, deserialize_optional_lenient_i32, deserialize_optional_string,
    deserialize_optional_string_or_vec, deserialize_string_or_vec, deserialize_trimmed_string, slugify,
};

pub const MIN_YEAR: i32 = 1800;
pub const MAX_YEAR: i32 = 2050;
pub const MIN_PAGES: i32 = 49;

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct ImageInput {
    #[serde(deserialize_with = "deserialize_trimmed_string")]
    #[validate(length(min = 1, message = "Image url is required"), custom(function = "validate_http_url"))]
    pub url: String,
    #[serde(default, deserialize_with = "deserialize_optional_string")]
    pub public_id: Option<String>,
}

impl From<ImageInput> for BookImage {
    fn from(input: ImageInput) -> Self {
        Self {
            url: input.url,
            public_id: input.public_id.unwrap_or_default(),
        }
    }
}

/// Body of `POST /api/books`
#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateBookRequest {
    #[serde(deserialize_with = "deserialize_trimmed_string")]
    #[validate(length(min = 1, max = 200, message = "Title is required (max 200 characters)"))]
    pub title: String,

    #[serde(deserialize_with = "deserialize_string_or_vec")]
    #[validate(
        length(min = 1, message = "At least one author is required"),
        custom(function = "validate_non_blank_items")
    )]
    pub authors: Vec<String>,

    #[serde(deserialize_with = "deserialize_trimmed_string")]
    #[validate(length(min = 1, message = "Synopsis is required"))]
    pub synopsis: String,

    #[serde(deserialize_with = "deserialize_string_or_vec")]
    #[validate(
        length(min = 1, message = "At least one category is required"),
        custom(function = "validate_non_blank_items")
    )]
    pub category: Vec<String>,

    #[serde(default, deserialize_with = "deserialize_optional_string")]
    #[validate(custom(function = "validate_http_url"))]
    pub source_link: Option<String>,

    #[serde(deserialize_with = "deserialize_trimmed_string")]
    #[validate(length(min = 1, message = "Language is required"))]
    pub language: String,

    #[serde(deserialize_with = "deserialize_lenient_i32")]
    #[validate(range(min = MIN_YEAR, max = MAX_YEAR, message = "Year must be between 1800 and 2050"))]
    pub year: i32,

    #[serde(deserialize_with = "deserialize_lenient_i32")]
    #[validate(range(min = MIN_PAGES, message = "A book must have at least 49 pages"))]
    pub number_pages: i32,

    #[serde(default, deserialize_with = "deserialize_optional_string")]
    pub format: Option<String>,

    /// Derived from the title when absent
    #[serde(default, deserialize_with = "deserialize_optional_string")]
    pub path_url: Option<String>,

    #[validate(nested)]
    pub image: ImageInput,

    #[serde(deserialize_with = "deserialize_trimmed_string")]
    #[validate(length(min = 1, message = "userId is required"))]
    pub user_id: String,

    #[serde(default)]
    #[validate(range(min = 0.0, max = 5.0, message = "Rating must be between 0 and 5"))]
    pub rating: Option<f64>,
}

impl CreateBookRequest {
    /// Slug stored as `pathUrl`
    pub fn resolved_path_url(&self) -> Result<String, AppError> {
        let source = self.path_url.as_deref().unwrap_or(&self.title);
        let slug = slugify(source);
        if slug.is_empty() {
            return Err(AppError::ValidationError(
                "pathUrl must contain at least one letter or digit".to_string(),
            ));
        }
        Ok(slug)
    }

    pub fn into_entity(self) -> Result<Book, AppError> {
        let path_url = self.resolved_path_url()?;
        let now = DateTime::now();

        Ok(Book {
            id: None,
            title: self.title,
            authors: self.authors,
            synopsis: self.synopsis,
            category: self.category,
            source_link: self.source_link,
            language: self.language,
            year: self.year,
            number_pages: self.number_pages,
            format: self.format.unwrap_or_else(|| "PDF".to_string()),
            path_url,
            image: self.image.into(),
            user_id: self.user_id,
            views: 0,
            rating: self.rating.unwrap_or(0.0),
            created_at: now,
            updated_at: now,
        })
    }
}

/// Body of `PATCH /api/books/{id}`; only present fields change.
#[derive(Debug, Clone, Default, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct UpdateBookRequest {
    #[serde(default, deserialize_with = "deserialize_optional_string")]
    #[validate(length(min = 1, max = 200, message = "Title must be 1-200 characters"))]
    pub title: Option<String>,

    #[serde(default, deserialize_with = "deserialize_optional_string_or_vec")]
    #[validate(length(min = 1, message = "At least one author is required"))]
    pub authors: Option<Vec<String>>,

    #[serde(default, deserialize_with = "deserialize_optional_string")]
    pub synopsis: Option<String>,

    #[serde(default, deserialize_with = "deserialize_optional_string_or_vec")]
    #[validate(length(min = 1, message = "At least one category is required"))]
    pub category: Option<Vec<String>>,

    #[serde(default, deserialize_with = "deserialize_optional_string")]
    #[validate(custom(function = "validate_http_url"))]
    pub source_link: Option<String>,

    #[serde(default, deserialize_with = "deserialize_optional_string")]
    pub language: Option<String>,

    #[serde(default, deserialize_with = "deserialize_optional_lenient_i32")]
    #[validate(range(min = MIN_YEAR, max = MAX_YEAR, message = "Year must be between 1800 and 2050"))]
    pub year: Option<i32>,

    #[serde(default, deserialize_with = "deserialize_optional_lenient_i32")]
    #[validate(range(min = MIN_PAGES, message = "A book must have at least 49 pages"))]
    pub number_pages: Option<i32>,

    #[serde(default, deserialize_with = "deserialize_optional_string")]
    pub format: Option<String>,

    #[serde(default, deserialize_with = "deserialize_optional_string")]
    pub path_url: Option<String>,

    #[serde(default)]
    #[validate(nested)]
    pub image: Option<ImageInput>,

    #[serde(default)]
    #[validate(range(min = 0.0, max = 5.0, message = "Rating must be between 0 and 5"))]
    pub rating: Option<f64>,
}

impl UpdateBookRequest {
    /// Builds the `$set` document, or `None` when the body carries no field.
    pub fn to_set_document(&self) -> Result<Option<Document>, AppError> {
        let mut set = Document::new();

        if let Some(title) = &self.title {
            set.insert("title", title);
        }
        if let Some(authors) = &self.authors {
            set.insert("authors", authors.clone());
        }
        if let Some(synopsis) = &self.synopsis {
            set.insert("synopsis", synopsis);
        }
        if let Some(category) = &self.category {
            set.insert("category", category.clone());
        }
        if let Some(source_link) = &self.source_link {
            set.insert("sourceLink", source_link);
        }
        if let Some(language) = &self.language {
            set.insert("language", language);
        }
        if let Some(year) = self.year {
            set.insert("year", year);
        }
        if let Some(number_pages) = self.number_pages {
            set.insert("numberPages", number_pages);
        }
        if let Some(format) = &self.format {
            set.insert("format", format);
        }
        if let Some(path_url) = &self.path_url {
            let slug = slugify(path_url);
            if slug.is_empty() {
                return Err(AppError::ValidationError(
                    "pathUrl must contain at least one letter or digit".to_string(),
                ));
            }
            set.insert("pathUrl", slug);
        }
        if let Some(image) = &self.image {
            let image: BookImage = image.clone().into();
            let image = bson::to_bson(&image).context("Failed to encode book image")?;
            set.insert("image", image);
        }
        if let Some(rating) = self.rating {
            set.insert("rating", rating);
        }

        if set.is_empty() {
            return Ok(None);
        }

        set.insert("updatedAt", DateTime::now());
        Ok(Some(doc! { "$set": set }))
    }
}

/// Query of `GET /api/books/filter`
#[derive(Debug, Clone, Default, Deserialize)]
pub struct BookFilterQuery {
    pub authors: Option<String>,
    pub category: Option<String>,
    pub year: Option<String>,
    pub language: Option<String>,
}

/// Query of `GET /api/books/search`
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SearchQuery {
    pub q: Option<String>,
}

/// Projection requested by `GET /api/books/most-viewed`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ViewDetail {
    Summary,
    Full,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct MostViewedQuery {
    pub detail: Option<String>,
}

impl MostViewedQuery {
    /// Missing means `summary`; anything other than `summary`/`full` is a 400.
    pub fn detail(&self) -> Result<ViewDetail, AppError> {
        match self.detail.as_deref().map(str::trim) {
            None | Some("") | Some("summary") => Ok(ViewDetail::Summary),
            Some("full") => Ok(ViewDetail::Full),
            Some(other) => Err(AppError::ValidationError(format!(
                "Invalid detail '{}', expected 'summary' or 'full'",
                other
            ))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn valid_body() -> serde_json::Value {
        json!({
            "title": "  Rayuela ",
            "authors": ["Julio Cortázar"],
            "synopsis": "Hopscotch",
            "category": "Novela",
            "language": "es",
            "year": "1963",
            "numberPages": 600,
            "image": { "url": "https://img.test/rayuela.png", "public_id": "rayuela" },
            "userId": "uid-1",
            "rating": 4.5
        })
    }

    fn parse(value: serde_json::Value) -> CreateBookRequest {
        serde_json::from_value(value).unwrap()
    }

    #[test]
    fn test_valid_create_request() {
        let request = parse(valid_body());
        assert!(request.validate().is_ok());
        assert_eq!(request.title, "Rayuela");
        assert_eq!(request.category, vec!["Novela".to_string()]);
        assert_eq!(request.year, 1963);
    }

    #[test]
    fn test_create_rejects_out_of_range_values() {
        let mut body = valid_body();
        body["year"] = json!(1700);
        assert!(parse(body).validate().is_err());

        let mut body = valid_body();
        body["numberPages"] = json!(48);
        assert!(parse(body).validate().is_err());

        let mut body = valid_body();
        body["rating"] = json!(7);
        assert!(parse(body).validate().is_err());
    }

    #[test]
    fn test_create_rejects_blank_title_and_authors() {
        let mut body = valid_body();
        body["title"] = json!("   ");
        assert!(parse(body).validate().is_err());

        let mut body = valid_body();
        body["authors"] = json!([]);
        assert!(parse(body).validate().is_err());
    }

    #[test]
    fn test_create_rejects_bad_image_url() {
        let mut body = valid_body();
        body["image"] = json!({ "url": "not a url" });
        assert!(parse(body).validate().is_err());
    }

    #[test]
    fn test_into_entity_derives_slug_and_defaults() {
        let book = parse(valid_body()).into_entity().unwrap();

        assert_eq!(book.path_url, "rayuela");
        assert_eq!(book.views, 0);
        assert_eq!(book.format, "PDF");
        assert_eq!(book.image.public_id, "rayuela");
    }

    #[test]
    fn test_explicit_path_url_is_slugified() {
        let mut body = valid_body();
        body["pathUrl"] = json!("Rayuela Edición 2");
        assert_eq!(parse(body).resolved_path_url().unwrap(), "rayuela-edicion-2");
    }

    #[test]
    fn test_empty_update_has_no_document() {
        let request: UpdateBookRequest = serde_json::from_value(json!({ "title": "  " })).unwrap();
        assert!(request.to_set_document().unwrap().is_none());
    }

    #[test]
    fn test_update_document_contains_only_given_fields() {
        let request: UpdateBookRequest =
            serde_json::from_value(json!({ "title": "New", "year": "2001", "authors": "Solo" })).unwrap();
        assert!(request.validate().is_ok());

        let update = request.to_set_document().unwrap().unwrap();
        let set = update.get_document("$set").unwrap();

        assert_eq!(set.get_str("title").unwrap(), "New");
        assert_eq!(set.get_i32("year").unwrap(), 2001);
        assert_eq!(set.get_array("authors").unwrap().len(), 1);
        assert!(set.contains_key("updatedAt"));
        assert!(!set.contains_key("synopsis"));
    }

    #[test]
    fn test_most_viewed_detail() {
        let query = |detail: Option<&str>| MostViewedQuery { detail: detail.map(str::to_string) };

        assert_eq!(query(None).detail().unwrap(), ViewDetail::Summary);
        assert_eq!(query(Some("full")).detail().unwrap(), ViewDetail::Full);
        assert!(query(Some("everything")).detail().is_err());
    }
}

use mongodb::bson::{oid::ObjectId, DateTime};
use serde::{Deserialize, Serialize};

use crate::utils::string_utils::{deserialize_lenient_i32, deserialize_string_or_vec};

/// Cover image stored by the external image host
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BookImage {
    pub url: String,
    #[serde(default)]
    pub public_id: String,
}

/// Book document (`books` collection)
///
/// `authors` and `category` are arrays, but documents written by older
/// clients may hold a plain string; both shapes are accepted on read.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Book {
    #[serde(rename = "_id", skip_serializing_if = "Option::is_none")]
    pub id: Option<ObjectId>,
    pub title: String,
    #[serde(deserialize_with = "deserialize_string_or_vec")]
    pub authors: Vec<String>,
    #[serde(default)]
    pub synopsis: String,
    #[serde(deserialize_with = "deserialize_string_or_vec")]
    pub category: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source_link: Option<String>,
    #[serde(default)]
    pub language: String,
    #[serde(deserialize_with = "deserialize_lenient_i32")]
    pub year: i32,
    #[serde(deserialize_with = "deserialize_lenient_i32")]
    pub number_pages: i32,
    #[serde(default)]
    pub format: String,
    pub path_url: String,
    #[serde(default)]
    pub image: BookImage,
    pub user_id: String,
    #[serde(default)]
    pub views: i64,
    #[serde(default)]
    pub rating: f64,
    pub created_at: DateTime,
    pub updated_at: DateTime,
}

impl Book {
    pub fn is_owned_by(&self, user_id: &str) -> bool {
        self.user_id == user_id
    }

    pub fn first_category(&self) -> Option<&str> {
        self.category.first().map(String::as_str)
    }

    pub fn first_author(&self) -> Option<&str> {
        self.authors.first().map(String::as_str)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mongodb::bson::{self, doc};

    #[test]
    fn test_reads_legacy_string_fields() {
        let document = doc! {
            "_id": ObjectId::new(),
            "title": "Ficciones",
            "authors": "Jorge Luis Borges",
            "category": "Cuentos",
            "language": "es",
            "year": "1944",
            "numberPages": 203,
            "pathUrl": "ficciones",
            "image": { "url": "https://img.test/f.png", "public_id": "f" },
            "userId": "uid-1",
            "views": 7,
            "createdAt": DateTime::now(),
            "updatedAt": DateTime::now(),
        };

        let book: Book = bson::from_document(document).unwrap();

        assert_eq!(book.authors, vec!["Jorge Luis Borges".to_string()]);
        assert_eq!(book.first_category(), Some("Cuentos"));
        assert_eq!(book.year, 1944);
        assert_eq!(book.views, 7);
        assert_eq!(book.rating, 0.0);
        assert!(book.is_owned_by("uid-1"));
    }
}

//! # String utilities
//!
//! Trimming, slug generation, regex escaping and lenient serde helpers used
//! by the request DTOs and query builders.

use serde::{Deserialize, Deserializer};

/// Trims and turns blank strings into `None`.
pub fn clean_optional_string(value: Option<String>) -> Option<String> {
    value.and_then(|s| {
        let trimmed = s.trim();
        if trimmed.is_empty() {
            None
        } else {
            Some(trimmed.to_string())
        }
    })
}

/// Serde adapter for [`clean_optional_string`]
pub fn deserialize_optional_string<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let opt = Option::<String>::deserialize(deserializer)?;
    Ok(clean_optional_string(opt))
}

/// Serde adapter that trims a required string
pub fn deserialize_trimmed_string<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(String::deserialize(deserializer)?.trim().to_string())
}

#[derive(Deserialize)]
#[serde(untagged)]
enum StringOrVec {
    One(String),
    Many(Vec<String>),
}

impl StringOrVec {
    fn into_clean_vec(self) -> Vec<String> {
        let items = match self {
            StringOrVec::One(s) => vec![s],
            StringOrVec::Many(v) => v,
        };
        items
            .into_iter()
            .filter_map(|s| clean_optional_string(Some(s)))
            .collect()
    }
}

/// Accepts `"a"` or `["a", "b"]`, trimming entries and dropping blanks.
///
/// Older book documents store `authors`/`category` as a single string.
pub fn deserialize_string_or_vec<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(StringOrVec::deserialize(deserializer)?.into_clean_vec())
}

/// Optional variant of [`deserialize_string_or_vec`]; use with `#[serde(default)]`.
pub fn deserialize_optional_string_or_vec<'de, D>(deserializer: D) -> Result<Option<Vec<String>>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<StringOrVec>::deserialize(deserializer)?.map(StringOrVec::into_clean_vec))
}

#[derive(Deserialize)]
#[serde(untagged)]
enum NumberOrString {
    Int(i64),
    Float(f64),
    Text(String),
}

impl NumberOrString {
    fn into_i32<E: serde::de::Error>(self) -> Result<i32, E> {
        match self {
            NumberOrString::Int(n) => i32::try_from(n).map_err(|_| E::custom("number out of range")),
            NumberOrString::Float(f) if f.fract() == 0.0 && f.abs() <= i32::MAX as f64 => Ok(f as i32),
            NumberOrString::Float(_) => Err(E::custom("expected a whole number")),
            NumberOrString::Text(s) => s
                .trim()
                .parse::<i32>()
                .map_err(|_| E::custom(format!("'{}' is not a number", s))),
        }
    }
}

/// Accepts `1999` or `"1999"`.
pub fn deserialize_lenient_i32<'de, D>(deserializer: D) -> Result<i32, D::Error>
where
    D: Deserializer<'de>,
{
    NumberOrString::deserialize(deserializer)?.into_i32()
}

/// Optional variant of [`deserialize_lenient_i32`]; use with `#[serde(default)]`.
pub fn deserialize_optional_lenient_i32<'de, D>(deserializer: D) -> Result<Option<i32>, D::Error>
where
    D: Deserializer<'de>,
{
    Option::<NumberOrString>::deserialize(deserializer)?
        .map(NumberOrString::into_i32)
        .transpose()
}

/// Escapes regex metacharacters so user input matches literally inside `$regex`.
pub fn escape_regex(input: &str) -> String {
    let mut escaped = String::with_capacity(input.len());
    for c in input.chars() {
        if matches!(
            c,
            '.' | '*' | '+' | '?' | '^' | '$' | '{' | '}' | '(' | ')' | '|' | '[' | ']' | '\\' | '/' | '-'
        ) {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped
}

fn fold_accent(c: char) -> char {
    match c {
        'á' | 'à' | 'ä' | 'â' | 'ã' => 'a',
        'é' | 'è' | 'ë' | 'ê' => 'e',
        'í' | 'ì' | 'ï' | 'î' => 'i',
        'ó' | 'ò' | 'ö' | 'ô' | 'õ' => 'o',
        'ú' | 'ù' | 'ü' | 'û' => 'u',
        'ñ' => 'n',
        'ç' => 'c',
        other => other,
    }
}

/// URL slug: lowercase ASCII words joined by `-`.
///
/// ```rust,ignore
/// assert_eq!(slugify("El Túnel (1948)"), "el-tunel-1948");
/// ```
pub fn slugify(input: &str) -> String {
    let mut slug = String::with_capacity(input.len());
    let mut pending_dash = false;

    for c in input.trim().chars().flat_map(char::to_lowercase).map(fold_accent) {
        if c.is_ascii_alphanumeric() {
            if pending_dash && !slug.is_empty() {
                slug.push('-');
            }
            pending_dash = false;
            slug.push(c);
        } else {
            pending_dash = true;
        }
    }

    slug
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;

    #[test]
    fn test_clean_optional_string() {
        assert_eq!(clean_optional_string(Some("  World  ".to_string())), Some("World".to_string()));
        assert_eq!(clean_optional_string(Some("   ".to_string())), None);
        assert_eq!(clean_optional_string(None), None);
    }

    #[derive(Deserialize)]
    struct Listing {
        #[serde(deserialize_with = "deserialize_string_or_vec")]
        authors: Vec<String>,
        #[serde(default, deserialize_with = "deserialize_optional_lenient_i32")]
        year: Option<i32>,
    }

    #[test]
    fn test_string_or_vec_accepts_both_shapes() {
        let single: Listing = serde_json::from_str(r#"{"authors": " Borges "}"#).unwrap();
        assert_eq!(single.authors, vec!["Borges".to_string()]);

        let many: Listing = serde_json::from_str(r#"{"authors": ["Bioy", " ", "Ocampo"]}"#).unwrap();
        assert_eq!(many.authors, vec!["Bioy".to_string(), "Ocampo".to_string()]);
    }

    #[test]
    fn test_lenient_year() {
        let from_number: Listing = serde_json::from_str(r#"{"authors": "a", "year": 1999}"#).unwrap();
        assert_eq!(from_number.year, Some(1999));

        let from_text: Listing = serde_json::from_str(r#"{"authors": "a", "year": " 1984 "}"#).unwrap();
        assert_eq!(from_text.year, Some(1984));

        let missing: Listing = serde_json::from_str(r#"{"authors": "a"}"#).unwrap();
        assert_eq!(missing.year, None);

        assert!(serde_json::from_str::<Listing>(r#"{"authors": "a", "year": "soon"}"#).is_err());
        assert!(serde_json::from_str::<Listing>(r#"{"authors": "a", "year": 19.5}"#).is_err());
    }

    #[test]
    fn test_escape_regex() {
        assert_eq!(escape_regex("García"), "García");
        assert_eq!(escape_regex("C++ (3rd ed.)"), r"C\+\+ \(3rd ed\.\)");
        assert_eq!(escape_regex(".*"), r"\.\*");
    }

    #[test]
    fn test_slugify() {
        assert_eq!(slugify("El Túnel (1948)"), "el-tunel-1948");
        assert_eq!(slugify("  Cien años de soledad  "), "cien-anos-de-soledad");
        assert_eq!(slugify("Rust -- in Action!"), "rust-in-action");
        assert_eq!(slugify("!!!"), "");
    }
}

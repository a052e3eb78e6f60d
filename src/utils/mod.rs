//! Shared helpers
//!
//! - [`string_utils`]: trimming, slugs, regex escaping, lenient serde adapters
//! - [`mongo_utils`]: ObjectId parsing, BSON date conversion, driver error mapping
//!
//! ```rust,ignore
//! use crate::utils::{mongo_utils::parse_object_id, string_utils::slugify};
//!
//! let oid = parse_object_id(&path_id, "book id")?;
//! let slug = slugify(&payload.title);
//! ```

pub mod mongo_utils;
pub mod string_utils;

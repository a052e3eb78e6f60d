pub mod collection;

pub use collection::{CollectionEntry, UserCollections};

//! # Catalog Crate
//!
//! This crate handles loading the goodbooks-10k dataset into memory.
//!
//! ## Main Components
//!
//! - **types**: Core domain types (Book, Tag, BookTagLink, Rating, CatalogStore)
//! - **parser**: Parse the four CSV files into Rust structs
//! - **store**: Load and index the full catalog
//! - **error**: Error types for data loading
//!
//! ## Example Usage
//!
//! ```ignore
//! use catalog::CatalogStore;
//! use std::path::Path;
//!
//! // Load the entire dataset
//! let store = CatalogStore::load_from_dir(Path::new("data/goodbooks-10k"))?;
//!
//! // Query data
//! let book = store.get_book(1).unwrap();
//! println!("{} by {}", book.title, book.authors);
//! ```
//!
//! The store is read-only once loaded: every derived view and every
//! recommendation request works over shared references to it, and a data
//! reload means constructing a fresh store.

// Public modules
pub mod error;
pub mod parser;
pub mod store;
pub mod types;

// Re-export commonly used types for convenience
pub use error::{LoadError, Result};
pub use types::{
    // Type aliases
    BookId,
    GoodreadsId,
    TagId,
    UserId,
    // Core types
    Book,
    BookTagLink,
    CatalogOverview,
    CatalogStore,
    Rating,
    Tag,
};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_catalog_store_creation() {
        // Test that we can create an empty CatalogStore
        let store = CatalogStore::new();
        let (books, tags, links, ratings) = store.counts();

        assert_eq!(books, 0);
        assert_eq!(tags, 0);
        assert_eq!(links, 0);
        assert_eq!(ratings, 0);
    }

    #[test]
    fn test_insert_rating() {
        let mut store = CatalogStore::new();

        store.insert_rating(Rating {
            user_id: 1,
            book_id: 1193,
            rating: 5,
        });

        assert_eq!(store.ratings().len(), 1);
        assert_eq!(store.ratings()[0].rating, 5);
    }

    #[test]
    fn test_insert_tag_and_link() {
        let mut store = CatalogStore::new();

        store.insert_tag(Tag {
            id: 30574,
            name: "to-read".to_string(),
        });
        store.insert_link(BookTagLink {
            goodreads_id: 1,
            tag_id: 30574,
        });

        assert_eq!(store.tag_name(30574), Some("to-read"));
        assert_eq!(store.book_tag_links().len(), 1);
        assert!(store.tag_name(9999).is_none());
    }
}

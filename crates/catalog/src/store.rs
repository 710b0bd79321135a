//! CatalogStore loading logic.
//!
//! This module builds the CatalogStore from the four parsed relations:
//! - Parse all four CSV files in parallel with Rayon
//! - Insert rows, building the id indices as we go
//!
//! The store holds raw relations; the joined views (tag-bags, the filtered
//! rating set) are derived downstream so that each derivation states its
//! own join semantics.

use crate::error::Result;
use crate::parser;
use crate::types::CatalogStore;
use std::path::Path;
use tracing::info;

impl CatalogStore {
    /// Load the entire goodbooks-10k catalog from a directory.
    ///
    /// This is the main entry point for loading data. Expects books.csv,
    /// ratings.csv, tags.csv and book_tags.csv under `data_dir`; any
    /// missing or malformed source is a fatal `LoadError`.
    pub fn load_from_dir(data_dir: &Path) -> Result<Self> {
        info!("Loading catalog from {:?}", data_dir);

        let books_path = data_dir.join("books.csv");
        let ratings_path = data_dir.join("ratings.csv");
        let tags_path = data_dir.join("tags.csv");
        let book_tags_path = data_dir.join("book_tags.csv");

        // Parse all four files IN PARALLEL using Rayon.
        // Rayon's `join` runs two closures in parallel; we nest joins to
        // get four-way parallelism.
        let ((books, ratings), (tags, links)) = rayon::join(
            || {
                rayon::join(
                    || parser::parse_books(&books_path),
                    || parser::parse_ratings(&ratings_path),
                )
            },
            || {
                rayon::join(
                    || parser::parse_tags(&tags_path),
                    || parser::parse_book_tags(&book_tags_path),
                )
            },
        );

        // The ? operator works because all four return Result<Vec<T>>
        let books = books?;
        let ratings = ratings?;
        let tags = tags?;
        let links = links?;

        info!(
            "Loaded {} books, {} ratings, {} tags, {} book-tag links",
            books.len(),
            ratings.len(),
            tags.len(),
            links.len()
        );

        let mut store = CatalogStore::new();
        for book in books {
            store.insert_book(book);
        }
        for tag in tags {
            store.insert_tag(tag);
        }
        for link in links {
            store.insert_link(link);
        }
        for rating in ratings {
            store.insert_rating(rating);
        }

        Ok(store)
    }
}

//! Core domain types for the goodbooks-10k catalog.
//!
//! This module defines the fundamental data structures used throughout the
//! system. Key Rust concepts demonstrated here:
//! - Type aliases for domain clarity (BookId, UserId, TagId)
//! - Structs with public fields
//! - Derive macros for common traits
//! - HashMap indices over a positionally ordered store

use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};

// =============================================================================
// Type Aliases
// =============================================================================
// These make the domain clearer and prevent mixing up the three id spaces

/// Internal catalog identifier for a book (1..=10000 in goodbooks-10k)
pub type BookId = u32;

/// External Goodreads identifier for a book (used in book_tags and links)
pub type GoodreadsId = u32;

/// Unique identifier for a rating user
pub type UserId = u32;

/// Unique identifier for a tag
pub type TagId = u32;

// =============================================================================
// Book
// =============================================================================

/// A single book row from books.csv.
///
/// Only the columns the engine needs are kept; `original_title` and
/// `language_code` are dropped at parse time. Immutable after load.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Book {
    pub id: BookId,
    pub goodreads_id: GoodreadsId,
    pub title: String,
    pub authors: String,
    /// Publication year; the raw data has gaps, so this may be absent.
    /// A book without a year never qualifies for the recency filter.
    pub original_publication_year: Option<i32>,
    pub average_rating: f64,
    pub ratings_count: u64,
    pub work_text_reviews_count: u64,
    pub image_url: String,
}

// =============================================================================
// Tag and book-tag association
// =============================================================================

/// A tag definition from tags.csv
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Tag {
    pub id: TagId,
    pub name: String,
}

/// A book-tag association from book_tags.csv.
///
/// The file also carries a usage count per pair; the engine ignores it
/// (tag-bags are sets), so it is not loaded.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct BookTagLink {
    pub goodreads_id: GoodreadsId,
    pub tag_id: TagId,
}

// =============================================================================
// Rating
// =============================================================================

/// A single rating from ratings.csv.
///
/// The value is on the fixed 1..=5 scale, validated at parse time.
/// An immutable historical fact; small and Copy.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct Rating {
    pub user_id: UserId,
    pub book_id: BookId,
    pub rating: u8,
}

// =============================================================================
// Overview statistics
// =============================================================================

/// Dataset-level counts, for presentation layers and the `stats` command
#[derive(Debug, Clone, Copy, Serialize)]
pub struct CatalogOverview {
    pub books: usize,
    pub tags: usize,
    pub ratings: usize,
    pub rating_users: usize,
    pub rated_books: usize,
}

// =============================================================================
// CatalogStore - The Core In-Memory Database
// =============================================================================

/// Holds the four loaded relations and their lookup indices.
///
/// Books keep their catalog file order in a `Vec` because downstream
/// consumers depend on position: the similarity matrix is indexed by
/// catalog position, title lookup returns the *first* match, and the
/// popularity sort must break ties by original order.
///
/// Read-only after load. Reloading data means constructing a new store.
#[derive(Debug)]
pub struct CatalogStore {
    // Primary data stores (catalog order preserved)
    pub(crate) books: Vec<Book>,
    pub(crate) ratings: Vec<Rating>,
    pub(crate) links: Vec<BookTagLink>,
    pub(crate) tags: HashMap<TagId, Tag>,

    // Lookup indices for O(1) access
    pub(crate) by_id: HashMap<BookId, usize>,
    pub(crate) by_goodreads_id: HashMap<GoodreadsId, usize>,
}

impl CatalogStore {
    /// Creates a new, empty CatalogStore
    pub fn new() -> Self {
        Self {
            books: Vec::new(),
            ratings: Vec::new(),
            links: Vec::new(),
            tags: HashMap::new(),
            by_id: HashMap::new(),
            by_goodreads_id: HashMap::new(),
        }
    }

    // Getters - Note: These return references (&T) not owned values (T)

    /// All books in catalog order
    pub fn books(&self) -> &[Book] {
        &self.books
    }

    /// All ratings in file order
    pub fn ratings(&self) -> &[Rating] {
        &self.ratings
    }

    /// All book-tag associations in file order
    pub fn book_tag_links(&self) -> &[BookTagLink] {
        &self.links
    }

    /// Tag definitions, keyed by tag id
    pub fn tags(&self) -> &HashMap<TagId, Tag> {
        &self.tags
    }

    /// Get a book by its internal catalog id
    pub fn get_book(&self, id: BookId) -> Option<&Book> {
        self.by_id.get(&id).map(|&pos| &self.books[pos])
    }

    /// Get a book by its external Goodreads id
    pub fn book_by_goodreads(&self, id: GoodreadsId) -> Option<&Book> {
        self.by_goodreads_id.get(&id).map(|&pos| &self.books[pos])
    }

    /// Catalog position of a book, if present
    pub fn book_position(&self, id: BookId) -> Option<usize> {
        self.by_id.get(&id).copied()
    }

    /// Resolve a tag name by id
    pub fn tag_name(&self, id: TagId) -> Option<&str> {
        self.tags.get(&id).map(|t| t.name.as_str())
    }

    /// Catalog position of the *first* book whose title matches exactly.
    ///
    /// Duplicate titles resolve to the earliest catalog row; callers that
    /// care about the ambiguity must disambiguate upstream.
    pub fn find_by_title(&self, title: &str) -> Option<usize> {
        self.books.iter().position(|b| b.title == title)
    }

    /// All titles in catalog order
    pub fn titles(&self) -> Vec<&str> {
        self.books.iter().map(|b| b.title.as_str()).collect()
    }

    /// Get counts for debugging/validation: (books, tags, links, ratings)
    pub fn counts(&self) -> (usize, usize, usize, usize) {
        (
            self.books.len(),
            self.tags.len(),
            self.links.len(),
            self.ratings.len(),
        )
    }

    /// Dataset-level overview: distinct users and books are counted over
    /// the ratings relation, matching what an exploration of the raw data
    /// would report.
    pub fn overview(&self) -> CatalogOverview {
        let mut users: HashSet<UserId> = HashSet::new();
        let mut rated: HashSet<BookId> = HashSet::new();
        for r in &self.ratings {
            users.insert(r.user_id);
            rated.insert(r.book_id);
        }
        CatalogOverview {
            books: self.books.len(),
            tags: self.tags.len(),
            ratings: self.ratings.len(),
            rating_users: users.len(),
            rated_books: rated.len(),
        }
    }

    // Mutators - These are used during data loading and by test fixtures.
    // The store is never mutated once serving begins.

    /// Insert a book, maintaining both id indices
    pub fn insert_book(&mut self, book: Book) {
        let pos = self.books.len();
        self.by_id.insert(book.id, pos);
        self.by_goodreads_id.insert(book.goodreads_id, pos);
        self.books.push(book);
    }

    /// Insert a tag definition
    pub fn insert_tag(&mut self, tag: Tag) {
        self.tags.insert(tag.id, tag);
    }

    /// Insert a book-tag association
    pub fn insert_link(&mut self, link: BookTagLink) {
        self.links.push(link);
    }

    /// Insert a rating
    pub fn insert_rating(&mut self, rating: Rating) {
        self.ratings.push(rating);
    }
}

impl Default for CatalogStore {
    fn default() -> Self {
        Self::new()
    }
}

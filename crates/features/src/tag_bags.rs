//! Per-book tag-bag text features.
//!
//! The joined view book_tag_links → tags → books, grouped per book, with
//! tag names collapsed into a set and joined into one string. This is the
//! text feature the similarity engine vectorizes.

use catalog::CatalogStore;
use std::collections::BTreeSet;
use std::hash::{DefaultHasher, Hash, Hasher};
use tracing::debug;

/// Tag-bag strings indexed by catalog book position.
///
/// Positions line up with `CatalogStore::books()`, which is what lets the
/// similarity matrix address books by row index.
#[derive(Debug, Clone)]
pub struct TagBags {
    bags: Vec<String>,
}

impl TagBags {
    /// All bags in catalog order
    pub fn bags(&self) -> &[String] {
        &self.bags
    }

    /// Bag for the book at a catalog position
    pub fn get(&self, position: usize) -> Option<&str> {
        self.bags.get(position).map(|s| s.as_str())
    }

    pub fn len(&self) -> usize {
        self.bags.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bags.is_empty()
    }

    /// Stable content hash, used to key the cached similarity index.
    /// Process-lifetime only; never persisted.
    pub fn fingerprint(&self) -> u64 {
        let mut hasher = DefaultHasher::new();
        self.bags.hash(&mut hasher);
        hasher.finish()
    }
}

/// Build tag-bags for every book in the store.
///
/// Join semantics: links with a tag id missing from tags.csv are dropped
/// (inner join), as are links whose goodreads id matches no book. Tag
/// names are collected into a set, so repeated associations of the same
/// tag contribute one token. Books with no surviving links get an empty
/// bag — a valid, maximally-dissimilar document downstream.
pub fn build(store: &CatalogStore) -> TagBags {
    // One name-set per catalog position; BTreeSet keeps the generated
    // string deterministic across runs.
    let mut sets: Vec<BTreeSet<&str>> = vec![BTreeSet::new(); store.books().len()];

    let mut dropped = 0usize;
    for link in store.book_tag_links() {
        let Some(name) = store.tag_name(link.tag_id) else {
            dropped += 1;
            continue;
        };
        let Some(book) = store.book_by_goodreads(link.goodreads_id) else {
            dropped += 1;
            continue;
        };
        // book_position is Some for every book returned by the store
        if let Some(pos) = store.book_position(book.id) {
            sets[pos].insert(name);
        }
    }

    if dropped > 0 {
        debug!("Dropped {} book-tag links with no matching tag or book", dropped);
    }

    let bags = sets
        .into_iter()
        .map(|set| set.into_iter().collect::<Vec<_>>().join(" "))
        .collect();

    TagBags { bags }
}

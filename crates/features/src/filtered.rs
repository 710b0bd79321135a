//! The filtered rating set.
//!
//! Two-stage filter over the raw ratings, in a fixed order:
//!
//! 1. keep ratings whose book was published after the cutoff year
//! 2. keep users with enough ratings *within the stage-1 subset*
//!
//! The order matters: user activity is counted on the restricted book set,
//! not globally, so a prolific reader of older books can fall out entirely.
//! This is the training and query universe for the preference model.

use catalog::{BookId, CatalogStore, Rating, UserId};
use std::collections::{HashMap, HashSet};
use std::hash::{DefaultHasher, Hash, Hasher};
use tracing::debug;

/// Ratings restricted to recent books and active users.
///
/// Invariant: every user id present has at least `min_user_ratings`
/// ratings within this set.
#[derive(Debug, Clone)]
pub struct FilteredRatingSet {
    ratings: Vec<Rating>,
    /// Books that passed the publication filter (the candidate universe
    /// for personalized recommendations), in catalog order
    candidate_books: Vec<BookId>,
    by_user: HashMap<UserId, Vec<(BookId, u8)>>,
}

impl FilteredRatingSet {
    /// Surviving rating triples, in source order
    pub fn ratings(&self) -> &[Rating] {
        &self.ratings
    }

    pub fn len(&self) -> usize {
        self.ratings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ratings.is_empty()
    }

    /// Books that passed the publication filter, in catalog order.
    ///
    /// This is the candidate pool for per-user recommendations; it can
    /// include books nobody in the filtered set has rated yet.
    pub fn candidate_books(&self) -> &[BookId] {
        &self.candidate_books
    }

    /// All user ids present, ascending
    pub fn user_ids(&self) -> Vec<UserId> {
        let mut ids: Vec<UserId> = self.by_user.keys().copied().collect();
        ids.sort_unstable();
        ids
    }

    pub fn contains_user(&self, user_id: UserId) -> bool {
        self.by_user.contains_key(&user_id)
    }

    /// (book, rating) pairs for one user, in source order.
    /// Empty for users outside the set.
    pub fn ratings_for(&self, user_id: UserId) -> &[(BookId, u8)] {
        self.by_user
            .get(&user_id)
            .map(|v| v.as_slice())
            .unwrap_or(&[])
    }

    /// Stable content hash over the surviving triples, used to key the
    /// cached trained model. Process-lifetime only; never persisted.
    pub fn fingerprint(&self) -> u64 {
        let mut hasher = DefaultHasher::new();
        self.ratings.len().hash(&mut hasher);
        for r in &self.ratings {
            (r.user_id, r.book_id, r.rating).hash(&mut hasher);
        }
        hasher.finish()
    }
}

/// Apply the two-stage filter to the store's ratings.
pub fn build(store: &CatalogStore, publication_cutoff: i32, min_user_ratings: usize) -> FilteredRatingSet {
    // Stage 1: restrict to books published after the cutoff.
    // A missing year never qualifies.
    let candidate_books: Vec<BookId> = store
        .books()
        .iter()
        .filter(|b| b.original_publication_year.is_some_and(|y| y > publication_cutoff))
        .map(|b| b.id)
        .collect();
    let candidate_set: HashSet<BookId> = candidate_books.iter().copied().collect();

    let restricted: Vec<Rating> = store
        .ratings()
        .iter()
        .filter(|r| candidate_set.contains(&r.book_id))
        .copied()
        .collect();

    // Stage 2: count activity within the restricted subset only
    let mut counts: HashMap<UserId, usize> = HashMap::new();
    for r in &restricted {
        *counts.entry(r.user_id).or_insert(0) += 1;
    }

    let ratings: Vec<Rating> = restricted
        .into_iter()
        .filter(|r| counts[&r.user_id] >= min_user_ratings)
        .collect();

    let mut by_user: HashMap<UserId, Vec<(BookId, u8)>> = HashMap::new();
    for r in &ratings {
        by_user
            .entry(r.user_id)
            .or_default()
            .push((r.book_id, r.rating));
    }

    debug!(
        "Filtered rating set: {} books past year {}, {} ratings from {} users (min activity {})",
        candidate_books.len(),
        publication_cutoff,
        ratings.len(),
        by_user.len(),
        min_user_ratings
    );

    FilteredRatingSet {
        ratings,
        candidate_books,
        by_user,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use catalog::Book;

    fn book(id: u32, year: Option<i32>) -> Book {
        Book {
            id,
            goodreads_id: id * 100,
            title: format!("Book {}", id),
            authors: "Author".to_string(),
            original_publication_year: year,
            average_rating: 4.0,
            ratings_count: 50,
            work_text_reviews_count: 5,
            image_url: String::new(),
        }
    }

    fn rate(store: &mut CatalogStore, user_id: u32, book_id: u32, rating: u8) {
        store.insert_rating(Rating { user_id, book_id, rating });
    }

    fn test_store() -> CatalogStore {
        let mut store = CatalogStore::new();
        store.insert_book(book(1, Some(2010))); // qualifies
        store.insert_book(book(2, Some(2005))); // qualifies
        store.insert_book(book(3, Some(1995))); // too old
        store.insert_book(book(4, None)); //        unknown year never qualifies
        store
    }

    #[test]
    fn test_activity_counted_after_book_filter() {
        let mut store = test_store();

        // User 1: three ratings, but only one on a recent book.
        rate(&mut store, 1, 1, 5);
        rate(&mut store, 1, 3, 4);
        rate(&mut store, 1, 4, 4);

        // User 2: two ratings, both on recent books.
        rate(&mut store, 2, 1, 4);
        rate(&mut store, 2, 2, 3);

        let set = build(&store, 2000, 2);

        // User 1 is globally active enough but not within the restricted
        // subset; the fixed filter order excludes them.
        assert!(!set.contains_user(1));
        assert!(set.contains_user(2));
        assert_eq!(set.len(), 2);
    }

    #[test]
    fn test_every_user_meets_min_activity() {
        let mut store = test_store();
        for u in 1..=4u32 {
            for (i, b) in [1u32, 2].iter().cycle().take(u as usize).enumerate() {
                rate(&mut store, u, *b, ((i % 5) + 1) as u8);
            }
        }

        let set = build(&store, 2000, 3);
        for user in set.user_ids() {
            assert!(
                set.ratings_for(user).len() >= 3,
                "user {} below min activity",
                user
            );
        }
    }

    #[test]
    fn test_candidate_books_ignore_rating_presence() {
        let mut store = test_store();
        rate(&mut store, 1, 1, 5);
        rate(&mut store, 1, 1, 4);

        let set = build(&store, 2000, 2);

        // Book 2 is unrated but recent: candidacy is decided by
        // publication year alone
        assert_eq!(set.candidate_books(), &[1, 2]);
    }

    #[test]
    fn test_ratings_for_unknown_user_is_empty() {
        let store = test_store();
        let set = build(&store, 2000, 1);
        assert!(set.ratings_for(42).is_empty());
    }

    #[test]
    fn test_fingerprint_changes_with_content() {
        let mut store = test_store();
        rate(&mut store, 1, 1, 5);
        rate(&mut store, 1, 2, 4);

        let a = build(&store, 2000, 2).fingerprint();
        let b = build(&store, 2000, 2).fingerprint();
        assert_eq!(a, b);

        rate(&mut store, 1, 1, 3);
        let c = build(&store, 2000, 2).fingerprint();
        assert_ne!(a, c);
    }
}

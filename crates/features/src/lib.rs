//! # Features Crate
//!
//! Derives the two feature views the scoring strategies are built on:
//!
//! - **tag_bags**: one text feature per book — the space-joined set of
//!   distinct tag names attached to it (input to the similarity engine)
//! - **filtered**: the FilteredRatingSet — ratings restricted to recent
//!   books and sufficiently active users (the training/query universe for
//!   the preference model)
//!
//! Both are pure derivations over a shared `CatalogStore`: the builder
//! holds no state of its own, and rebuilding over the same store yields
//! the same views. Each view exposes a content `fingerprint()` so callers
//! can cache expensive downstream artifacts (the similarity matrix, the
//! trained model) and invalidate them when the data actually changed.

pub mod filtered;
pub mod tag_bags;

use catalog::CatalogStore;
use std::sync::Arc;

pub use filtered::FilteredRatingSet;
pub use tag_bags::TagBags;

/// Default publication-year cutoff for the filtered rating set
pub const DEFAULT_PUBLICATION_CUTOFF: i32 = 2000;

/// Default minimum per-user rating count within the filtered set
pub const DEFAULT_MIN_USER_RATINGS: usize = 100;

/// Builds derived feature views over a shared catalog.
///
/// Stateless given the store; the tunables exist so tests and experiments
/// can shrink the filter thresholds without touching the defaults.
#[derive(Clone)]
pub struct FeatureBuilder {
    store: Arc<CatalogStore>,
    publication_cutoff: i32,
    min_user_ratings: usize,
}

impl FeatureBuilder {
    pub fn new(store: Arc<CatalogStore>) -> Self {
        Self {
            store,
            publication_cutoff: DEFAULT_PUBLICATION_CUTOFF,
            min_user_ratings: DEFAULT_MIN_USER_RATINGS,
        }
    }

    /// Configure the publication-year cutoff (default: 2000)
    pub fn with_publication_cutoff(mut self, year: i32) -> Self {
        self.publication_cutoff = year;
        self
    }

    /// Configure the minimum within-set rating count per user (default: 100)
    pub fn with_min_user_ratings(mut self, count: usize) -> Self {
        self.min_user_ratings = count;
        self
    }

    pub fn store(&self) -> &Arc<CatalogStore> {
        &self.store
    }

    /// Build the per-book tag-bag view (see [`tag_bags`])
    pub fn tag_bags(&self) -> TagBags {
        tag_bags::build(&self.store)
    }

    /// Build the filtered rating set (see [`filtered`])
    pub fn filtered_ratings(&self) -> FilteredRatingSet {
        filtered::build(&self.store, self.publication_cutoff, self.min_user_ratings)
    }
}

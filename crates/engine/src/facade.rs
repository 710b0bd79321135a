//! # Recommendation Facade
//!
//! One entry point per strategy, all over a shared read-only catalog:
//! 1. `recommend_popular` — weighted-rating top list
//! 2. `recommend_similar` — tag-bag nearest neighbors for a title
//! 3. `recommend_for_user` — personalized estimates from the trained model
//!
//! The facade owns no mutable state beyond two fingerprint-keyed caches;
//! every call re-derives its inputs from the store and the caches decide
//! whether the expensive artifacts (similarity matrix, trained model) can
//! be reused. Errors from lower layers pass through untouched.

use std::collections::HashSet;
use std::path::Path;
use std::sync::Arc;
use std::time::Instant;

use catalog::{BookId, CatalogOverview, CatalogStore, UserId};
use features::{FeatureBuilder, FilteredRatingSet};
use rankers::{
    FoldMetrics, PopularityRanker, SimilarityIndex, SvdTrainer, TrainedPreferenceModel,
};
use tracing::info;

use crate::cache::FingerprintCache;
use crate::error::{RecommendError, Result};
use crate::records::{
    BookSummary, EstimatedBook, RatedBook, SimilarBookSummary, UserRecommendationReport,
};

/// Base URL for external book detail links; the external catalog id is
/// appended verbatim
pub const BOOK_URL_BASE: &str = "https://www.goodreads.com/book/show/";

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

fn round3(value: f64) -> f64 {
    (value * 1000.0).round() / 1000.0
}

/// The recommendation engine's public face.
///
/// Construct once at startup and share; reloading data means building a
/// new `Recommender` over a fresh store.
pub struct Recommender {
    store: Arc<CatalogStore>,
    builder: FeatureBuilder,
    trainer: SvdTrainer,
    similarity_cache: FingerprintCache<SimilarityIndex>,
    model_cache: FingerprintCache<TrainedPreferenceModel>,
}

impl Recommender {
    pub fn new(store: Arc<CatalogStore>) -> Self {
        let builder = FeatureBuilder::new(Arc::clone(&store));
        Self {
            store,
            builder,
            trainer: SvdTrainer::new(),
            similarity_cache: FingerprintCache::new("similarity-index"),
            model_cache: FingerprintCache::new("preference-model"),
        }
    }

    /// Load the catalog from disk and build a recommender over it
    pub fn load_from_dir(data_dir: &Path) -> Result<Self> {
        let store = CatalogStore::load_from_dir(data_dir)?;
        Ok(Self::new(Arc::new(store)))
    }

    /// Replace the feature builder (tests shrink the filter thresholds)
    pub fn with_feature_builder(mut self, builder: FeatureBuilder) -> Self {
        self.builder = builder;
        self.similarity_cache.invalidate();
        self.model_cache.invalidate();
        self
    }

    /// Replace the model trainer configuration
    pub fn with_trainer(mut self, trainer: SvdTrainer) -> Self {
        self.trainer = trainer;
        self.model_cache.invalidate();
        self
    }

    pub fn store(&self) -> &Arc<CatalogStore> {
        &self.store
    }

    /// Top `n` books by bias-corrected weighted rating
    pub fn recommend_popular(&self, n: usize) -> Result<Vec<BookSummary>> {
        let ranked = PopularityRanker::new(Arc::clone(&self.store)).top_n(n)?;

        let books = self.store.books();
        let summaries = ranked
            .into_iter()
            .map(|r| {
                let book = &books[r.position];
                BookSummary {
                    external_link: format!("{BOOK_URL_BASE}{}", book.goodreads_id),
                    title: book.title.clone(),
                    author: book.authors.clone(),
                    rating: round2(r.weighted_rating),
                    image_url: book.image_url.clone(),
                    year: book.original_publication_year,
                }
            })
            .collect();
        Ok(summaries)
    }

    /// The `n` books most similar to an exactly matching title.
    ///
    /// Duplicate titles resolve to the first catalog match; the query book
    /// itself is never part of the result.
    pub fn recommend_similar(&self, title: &str, n: usize) -> Result<Vec<SimilarBookSummary>> {
        let query = self
            .store
            .find_by_title(title)
            .ok_or_else(|| RecommendError::NotFound {
                title: title.to_string(),
            })?;

        let index = self.similarity_index()?;
        let books = self.store.books();

        let summaries = index
            .most_similar(query, n)
            .into_iter()
            .map(|(position, score)| {
                let book = &books[position];
                SimilarBookSummary {
                    external_link: format!("{BOOK_URL_BASE}{}", book.goodreads_id),
                    title: book.title.clone(),
                    author: book.authors.clone(),
                    image_url: book.image_url.clone(),
                    year: book.original_publication_year,
                    similarity: round3(score),
                }
            })
            .collect();
        Ok(summaries)
    }

    /// Personalized top-`n` estimates for a user, plus the rating history
    /// (within the filtered universe) they are based on.
    ///
    /// A user with no ratings in the filtered set is not an error: the
    /// model degrades to bias-only estimates and the history is empty.
    pub fn recommend_for_user(&self, user_id: UserId, n: usize) -> Result<UserRecommendationReport> {
        let filtered = self.builder.filtered_ratings();
        let model = self.preference_model(&filtered)?;

        let rated: Vec<RatedBook> = filtered
            .ratings_for(user_id)
            .iter()
            .filter_map(|&(book_id, rating)| {
                let book = self.store.get_book(book_id)?;
                Some(RatedBook {
                    title: book.title.clone(),
                    rating,
                })
            })
            .collect();

        let already_rated: HashSet<BookId> = filtered
            .ratings_for(user_id)
            .iter()
            .map(|&(book_id, _)| book_id)
            .collect();

        let mut estimates: Vec<(BookId, f64)> = filtered
            .candidate_books()
            .iter()
            .filter(|id| !already_rated.contains(id))
            .map(|&id| (id, model.predict(user_id, id)))
            .collect();
        estimates.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap_or(std::cmp::Ordering::Equal));
        estimates.truncate(n);

        let recommended: Vec<EstimatedBook> = estimates
            .into_iter()
            .filter_map(|(book_id, score)| {
                let book = self.store.get_book(book_id)?;
                Some(EstimatedBook {
                    title: book.title.clone(),
                    score,
                })
            })
            .collect();

        info!(
            "User {}: {} rated books in the filtered set, {} recommendations",
            user_id,
            rated.len(),
            recommended.len()
        );

        Ok(UserRecommendationReport {
            user_id,
            rated,
            recommended,
        })
    }

    /// Run the diagnostic k-fold validation of the preference model.
    /// Does not touch the cached final model.
    pub fn validate_model(&self, k: usize) -> Result<Vec<FoldMetrics>> {
        let filtered = self.builder.filtered_ratings();
        Ok(self.trainer.cross_validate(&filtered, k)?)
    }

    /// All catalog titles, for presentation-layer selection lists
    pub fn titles(&self) -> Vec<String> {
        self.store.titles().into_iter().map(String::from).collect()
    }

    /// User ids present in the filtered rating universe, ascending
    pub fn user_ids(&self) -> Vec<UserId> {
        self.builder.filtered_ratings().user_ids()
    }

    /// Dataset-level counts
    pub fn overview(&self) -> CatalogOverview {
        self.store.overview()
    }

    /// The similarity index for the current tag-bag corpus, cached under
    /// its content fingerprint
    fn similarity_index(&self) -> Result<Arc<SimilarityIndex>> {
        let bags = self.builder.tag_bags();
        let fingerprint = bags.fingerprint();
        let index = self.similarity_cache.get_or_build(fingerprint, || {
            let start = Instant::now();
            let index = SimilarityIndex::build(&bags)?;
            info!(
                "Built similarity index over {} books in {:.2?}",
                index.len(),
                start.elapsed()
            );
            Ok::<_, RecommendError>(index)
        })?;
        Ok(index)
    }

    /// The trained preference model for the current filtered rating set,
    /// cached under its content fingerprint
    fn preference_model(&self, filtered: &FilteredRatingSet) -> Result<Arc<TrainedPreferenceModel>> {
        let fingerprint = filtered.fingerprint();
        let model = self.model_cache.get_or_build(fingerprint, || {
            let start = Instant::now();
            let model = self.trainer.fit(filtered)?;
            info!(
                "Trained preference model on {} ratings in {:.2?}",
                filtered.len(),
                start.elapsed()
            );
            Ok::<_, RecommendError>(model)
        })?;
        Ok(model)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rounding_for_display() {
        assert_eq!(round2(4.00952), 4.01);
        assert_eq!(round2(4.0), 4.0);
        assert_eq!(round3(0.70710678), 0.707);
        assert_eq!(round3(0.9995), 1.0);
    }

    #[test]
    fn test_external_link_shape() {
        assert_eq!(
            format!("{BOOK_URL_BASE}{}", 2767052u32),
            "https://www.goodreads.com/book/show/2767052"
        );
    }
}

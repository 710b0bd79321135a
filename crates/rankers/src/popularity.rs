//! Popularity ranking via IMDB-style Bayesian weighted rating.
//!
//! ## Algorithm
//! 1. m = data-driven minimum-votes threshold (0.55 quantile of ratings_count)
//! 2. C = global mean of average_rating (the prior)
//! 3. weighted = (R * v + C * m) / (v + m) for each book
//! 4. Only books with v >= m are eligible for output; everything still
//!    contributes to m and C
//! 5. Stable sort descending, top N
//!
//! The shrinkage keeps a 5.0-with-3-votes book from outranking a
//! 4.3-with-100k-votes book.

use crate::error::RankerError;
use catalog::CatalogStore;
use std::sync::Arc;
use tracing::{debug, instrument};

/// A book position in the catalog together with its weighted rating
#[derive(Debug, Clone, Copy)]
pub struct RankedBook {
    /// Catalog position (index into `CatalogStore::books()`)
    pub position: usize,
    pub weighted_rating: f64,
}

/// Ranks the catalog by bias-corrected weighted rating
pub struct PopularityRanker {
    store: Arc<CatalogStore>,

    /// Quantile of ratings_count used as the minimum-votes threshold
    quantile: f64,
}

impl PopularityRanker {
    pub fn new(store: Arc<CatalogStore>) -> Self {
        Self {
            store,
            quantile: 0.55,
        }
    }

    /// Configure the minimum-votes quantile (default: 0.55)
    pub fn with_quantile(mut self, quantile: f64) -> Self {
        self.quantile = quantile.clamp(0.0, 1.0);
        self
    }

    /// Top `n` books by weighted rating.
    ///
    /// An empty catalog returns an empty list. A non-empty catalog where
    /// no book reaches the vote threshold is degenerate input (it cannot
    /// happen with a quantile-derived threshold, but explicit parameters
    /// can produce it).
    #[instrument(skip(self))]
    pub fn top_n(&self, n: usize) -> Result<Vec<RankedBook>, RankerError> {
        let books = self.store.books();
        if books.is_empty() {
            return Ok(Vec::new());
        }

        let counts: Vec<f64> = books.iter().map(|b| b.ratings_count as f64).collect();
        let m = quantile(&counts, self.quantile);
        let c = books.iter().map(|b| b.average_rating).sum::<f64>() / books.len() as f64;

        debug!("Popularity parameters: m = {:.1}, C = {:.3}", m, c);
        self.rank_with(m, c, n)
    }

    /// Rank with explicit threshold and prior.
    ///
    /// Every book is scored, then books below the vote threshold are
    /// dropped from the output. `sort_by` is stable, so equal weighted
    /// ratings keep their catalog order.
    fn rank_with(&self, m: f64, c: f64, n: usize) -> Result<Vec<RankedBook>, RankerError> {
        let books = self.store.books();

        let mut qualified: Vec<RankedBook> = books
            .iter()
            .enumerate()
            .filter(|(_, b)| b.ratings_count as f64 >= m)
            .map(|(position, b)| RankedBook {
                position,
                weighted_rating: weighted_rating(b.average_rating, b.ratings_count as f64, c, m),
            })
            .collect();

        if qualified.is_empty() {
            return Err(RankerError::degenerate(format!(
                "no book reaches the minimum vote threshold {m:.1}"
            )));
        }

        qualified.sort_by(|a, b| {
            b.weighted_rating
                .partial_cmp(&a.weighted_rating)
                .unwrap_or(std::cmp::Ordering::Equal)
        });
        qualified.truncate(n);
        Ok(qualified)
    }
}

/// Bayesian shrinkage of a book's average toward the global prior
fn weighted_rating(average: f64, votes: f64, prior: f64, min_votes: f64) -> f64 {
    (average * votes + prior * min_votes) / (votes + min_votes)
}

/// Linear-interpolation quantile over unsorted values (the convention the
/// original parameters were derived under)
fn quantile(values: &[f64], q: f64) -> f64 {
    let mut sorted = values.to_vec();
    sorted.sort_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));

    let h = (sorted.len() - 1) as f64 * q;
    let lo = h.floor() as usize;
    let hi = h.ceil() as usize;
    sorted[lo] + (h - lo as f64) * (sorted[hi] - sorted[lo])
}

#[cfg(test)]
mod tests {
    use super::*;
    use catalog::Book;

    fn book(id: u32, title: &str, average_rating: f64, ratings_count: u64) -> Book {
        Book {
            id,
            goodreads_id: id * 100,
            title: title.to_string(),
            authors: "Author".to_string(),
            original_publication_year: Some(2010),
            average_rating,
            ratings_count,
            work_text_reviews_count: 0,
            image_url: String::new(),
        }
    }

    #[test]
    fn test_quantile_linear_interpolation() {
        let values = vec![10.0, 500.0, 1000.0];
        // h = 2 * 0.5 = 1.0, exactly the middle element
        assert_eq!(quantile(&values, 0.5), 500.0);
        // h = 2 * 0.55 = 1.1, a tenth of the way from 500 to 1000
        assert!((quantile(&values, 0.55) - 550.0).abs() < 1e-9);
        assert_eq!(quantile(&values, 0.0), 10.0);
        assert_eq!(quantile(&values, 1.0), 1000.0);
    }

    #[test]
    fn test_weighted_rating_monotonic_in_average() {
        let votes = 200.0;
        let mut last = f64::MIN;
        for avg in [1.0, 2.0, 3.0, 4.0, 5.0] {
            let w = weighted_rating(avg, votes, 4.0, 50.0);
            assert!(w >= last, "weighted rating must not decrease with average");
            last = w;
        }
    }

    #[test]
    fn test_weighted_rating_converges_to_average() {
        // As vote count grows the prior's influence vanishes
        let near = weighted_rating(4.8, 1e9, 3.0, 50.0);
        assert!((near - 4.8).abs() < 1e-5);

        // With few votes the score is pulled toward the prior
        let shrunk = weighted_rating(4.8, 3.0, 3.0, 50.0);
        assert!(shrunk < 3.2);
    }

    #[test]
    fn test_scenario_low_vote_book_excluded() {
        let mut store = CatalogStore::new();
        store.insert_book(book(1, "A", 4.0, 1000));
        store.insert_book(book(2, "B", 5.0, 10));
        store.insert_book(book(3, "C", 4.5, 500));
        let ranker = PopularityRanker::new(Arc::new(store));

        // Explicit m = 50, C = 4.2: B is below the vote threshold
        let ranked = ranker.rank_with(50.0, 4.2, 10).unwrap();
        assert_eq!(ranked.len(), 2);

        // wC = (4.5*500 + 4.2*50) / 550 ≈ 4.473 beats
        // wA = (4.0*1000 + 4.2*50) / 1050 ≈ 4.010
        assert_eq!(ranked[0].position, 2);
        assert_eq!(ranked[1].position, 0);
        assert!((ranked[0].weighted_rating - 4.4727).abs() < 1e-3);
        assert!((ranked[1].weighted_rating - 4.0095).abs() < 1e-3);
    }

    #[test]
    fn test_ties_keep_catalog_order() {
        let mut store = CatalogStore::new();
        // Identical signals -> identical weighted rating
        store.insert_book(book(1, "First", 4.0, 100));
        store.insert_book(book(2, "Second", 4.0, 100));
        store.insert_book(book(3, "Third", 4.0, 100));
        let ranker = PopularityRanker::new(Arc::new(store));

        let ranked = ranker.top_n(3).unwrap();
        let order: Vec<usize> = ranked.iter().map(|r| r.position).collect();
        assert_eq!(order, vec![0, 1, 2]);
    }

    #[test]
    fn test_empty_catalog_returns_empty_list() {
        let ranker = PopularityRanker::new(Arc::new(CatalogStore::new()));
        assert!(ranker.top_n(10).unwrap().is_empty());
    }

    #[test]
    fn test_unreachable_threshold_is_degenerate() {
        let mut store = CatalogStore::new();
        store.insert_book(book(1, "A", 4.0, 10));
        let ranker = PopularityRanker::new(Arc::new(store));

        let err = ranker.rank_with(1000.0, 4.0, 10).unwrap_err();
        assert!(matches!(err, RankerError::DegenerateInput { .. }));
    }

    #[test]
    fn test_top_n_truncates() {
        let mut store = CatalogStore::new();
        for i in 1..=20 {
            store.insert_book(book(i, &format!("Book {i}"), 3.0 + (i as f64) * 0.05, 100));
        }
        let ranker = PopularityRanker::new(Arc::new(store));

        let ranked = ranker.top_n(10).unwrap();
        assert_eq!(ranked.len(), 10);
        // Highest average first (equal vote counts)
        assert_eq!(ranked[0].position, 19);
    }
}

//! Content similarity over tag-bag vectors.
//!
//! Builds the full pairwise cosine matrix across the catalog and answers
//! nearest-neighbor queries by row. With ~10K books the matrix is
//! book_count² doubles and fits comfortably in memory; rebuild cost is
//! what the engine's fingerprint cache exists to amortize.

use crate::error::RankerError;
use crate::tfidf::TfIdfVectorizer;
use features::TagBags;
use rayon::prelude::*;
use tracing::{debug, instrument};

/// Precomputed pairwise cosine similarity over all books.
///
/// Rows and columns are catalog positions. The matrix is symmetric with
/// 1.0 on the diagonal for books with a non-empty tag-bag; an empty bag
/// yields an all-zero row (its diagonal included), so it can never
/// outrank a genuinely similar book.
#[derive(Debug)]
pub struct SimilarityIndex {
    scores: Vec<Vec<f64>>,
}

impl SimilarityIndex {
    /// Build the index from the tag-bag corpus.
    ///
    /// Degenerate when there are no books at all, or when no document
    /// contributes a single usable token (the vocabulary is empty and
    /// every similarity would be 0.0).
    #[instrument(skip(bags), fields(books = bags.len()))]
    pub fn build(bags: &TagBags) -> Result<Self, RankerError> {
        if bags.is_empty() {
            return Err(RankerError::degenerate("tag-bag corpus has no books"));
        }

        let matrix = TfIdfVectorizer::english().fit_transform(bags.bags());
        if matrix.vocabulary_len() == 0 {
            return Err(RankerError::degenerate(
                "tag-bag corpus has no usable tokens",
            ));
        }

        let rows = matrix.rows();
        let scores: Vec<Vec<f64>> = (0..rows.len())
            .into_par_iter()
            .map(|i| rows.iter().map(|other| rows[i].dot(other)).collect())
            .collect();

        debug!(
            "Built {}x{} similarity matrix over {} terms",
            scores.len(),
            scores.len(),
            matrix.vocabulary_len()
        );
        Ok(Self { scores })
    }

    /// Number of books covered
    pub fn len(&self) -> usize {
        self.scores.len()
    }

    pub fn is_empty(&self) -> bool {
        self.scores.is_empty()
    }

    /// Cosine similarity between two catalog positions
    pub fn score(&self, a: usize, b: usize) -> f64 {
        self.scores[a][b]
    }

    /// The `n` most similar books to `query`, best first.
    ///
    /// The query row itself is excluded (it is trivially its own nearest
    /// neighbor). The sort is stable, so equal scores keep catalog order.
    pub fn most_similar(&self, query: usize, n: usize) -> Vec<(usize, f64)> {
        let mut ranked: Vec<(usize, f64)> = self.scores[query]
            .iter()
            .enumerate()
            .filter(|&(position, _)| position != query)
            .map(|(position, &score)| (position, score))
            .collect();

        ranked.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap_or(std::cmp::Ordering::Equal));
        ranked.truncate(n);
        ranked
    }
}

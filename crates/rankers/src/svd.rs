//! Latent-factor preference model.
//!
//! Biased matrix factorization trained by stochastic gradient descent on
//! the filtered rating triples:
//!
//! ```text
//! est(u, i) = mu + b_u + b_i + q_i . p_u
//! ```
//!
//! Unknown users or items simply drop their terms, which is the cold-start
//! fallback: a user outside the training set still gets a global/item-bias
//! estimate rather than an error. Training is deterministic for a given
//! seed and input, so refitting over unchanged data reproduces the model.

use crate::error::RankerError;
use catalog::{BookId, UserId};
use features::FilteredRatingSet;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::collections::HashMap;
use tracing::{debug, info, instrument};

/// Bounds of the rating scale; estimates are clipped into this range
pub const RATING_MIN: f64 = 1.0;
pub const RATING_MAX: f64 = 5.0;

/// Held-out error metrics for one validation fold
#[derive(Debug, Clone, Copy)]
pub struct FoldMetrics {
    pub rmse: f64,
    pub mae: f64,
}

/// Trains the biased latent-factor model.
///
/// Defaults follow the common SVD recommender parameterization: 100
/// factors, 20 epochs, learning rate 0.005, regularization 0.02.
#[derive(Debug, Clone)]
pub struct SvdTrainer {
    n_factors: usize,
    n_epochs: usize,
    learning_rate: f64,
    regularization: f64,
    seed: u64,
}

impl Default for SvdTrainer {
    fn default() -> Self {
        Self::new()
    }
}

impl SvdTrainer {
    pub fn new() -> Self {
        Self {
            n_factors: 100,
            n_epochs: 20,
            learning_rate: 0.005,
            regularization: 0.02,
            seed: 42,
        }
    }

    /// Configure the number of latent factors (default: 100)
    pub fn with_n_factors(mut self, n: usize) -> Self {
        self.n_factors = n;
        self
    }

    /// Configure the number of SGD epochs (default: 20)
    pub fn with_n_epochs(mut self, n: usize) -> Self {
        self.n_epochs = n;
        self
    }

    /// Configure the SGD learning rate (default: 0.005)
    pub fn with_learning_rate(mut self, lr: f64) -> Self {
        self.learning_rate = lr;
        self
    }

    /// Configure the L2 regularization strength (default: 0.02)
    pub fn with_regularization(mut self, reg: f64) -> Self {
        self.regularization = reg;
        self
    }

    /// Configure the factor-initialization seed (default: 42)
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    /// Train on the entire filtered rating set.
    #[instrument(skip(self, data), fields(ratings = data.len()))]
    pub fn fit(&self, data: &FilteredRatingSet) -> Result<TrainedPreferenceModel, RankerError> {
        if data.is_empty() {
            return Err(RankerError::degenerate("filtered rating set is empty"));
        }
        let triples: Vec<(UserId, BookId, f64)> = data
            .ratings()
            .iter()
            .map(|r| (r.user_id, r.book_id, r.rating as f64))
            .collect();
        Ok(self.fit_triples(&triples))
    }

    /// Shuffled k-fold validation, returning per-fold RMSE and MAE.
    ///
    /// Diagnostic only: the held-out fits are discarded and callers still
    /// train the final model on the whole set.
    pub fn cross_validate(
        &self,
        data: &FilteredRatingSet,
        k: usize,
    ) -> Result<Vec<FoldMetrics>, RankerError> {
        if k < 2 {
            return Err(RankerError::degenerate("cross-validation needs k >= 2"));
        }
        if data.len() < k {
            return Err(RankerError::degenerate(format!(
                "{} ratings cannot fill {} folds",
                data.len(),
                k
            )));
        }

        let triples: Vec<(UserId, BookId, f64)> = data
            .ratings()
            .iter()
            .map(|r| (r.user_id, r.book_id, r.rating as f64))
            .collect();

        let mut order: Vec<usize> = (0..triples.len()).collect();
        let mut rng = StdRng::seed_from_u64(self.seed);
        use rand::seq::SliceRandom;
        order.shuffle(&mut rng);

        let n = triples.len();
        let mut metrics = Vec::with_capacity(k);
        for fold in 0..k {
            let start = fold * n / k;
            let end = (fold + 1) * n / k;
            let holdout = &order[start..end];

            let train: Vec<(UserId, BookId, f64)> = order[..start]
                .iter()
                .chain(&order[end..])
                .map(|&idx| triples[idx])
                .collect();
            let model = self.fit_triples(&train);

            let mut sq_sum = 0.0;
            let mut abs_sum = 0.0;
            for &idx in holdout {
                let (user, book, rating) = triples[idx];
                let err = rating - model.predict(user, book);
                sq_sum += err * err;
                abs_sum += err.abs();
            }
            let count = holdout.len() as f64;
            let fold_metrics = FoldMetrics {
                rmse: (sq_sum / count).sqrt(),
                mae: abs_sum / count,
            };
            info!(
                "Fold {}/{}: RMSE {:.4}, MAE {:.4} over {} held-out ratings",
                fold + 1,
                k,
                fold_metrics.rmse,
                fold_metrics.mae,
                holdout.len()
            );
            metrics.push(fold_metrics);
        }
        Ok(metrics)
    }

    /// SGD over explicit rating triples.
    fn fit_triples(&self, triples: &[(UserId, BookId, f64)]) -> TrainedPreferenceModel {
        let k = self.n_factors;
        let lr = self.learning_rate;
        let reg = self.regularization;

        // Dense indices for the ids seen in training
        let mut users: HashMap<UserId, usize> = HashMap::new();
        let mut items: HashMap<BookId, usize> = HashMap::new();
        for &(user, book, _) in triples {
            let next = users.len();
            users.entry(user).or_insert(next);
            let next = items.len();
            items.entry(book).or_insert(next);
        }

        let global_mean =
            triples.iter().map(|&(_, _, r)| r).sum::<f64>() / triples.len().max(1) as f64;

        let mut rng = StdRng::seed_from_u64(self.seed);
        let mut user_factors: Vec<f64> = (0..users.len() * k)
            .map(|_| rng.random_range(-0.1..0.1))
            .collect();
        let mut item_factors: Vec<f64> = (0..items.len() * k)
            .map(|_| rng.random_range(-0.1..0.1))
            .collect();
        let mut user_bias = vec![0.0; users.len()];
        let mut item_bias = vec![0.0; items.len()];

        for epoch in 0..self.n_epochs {
            let mut sq_err = 0.0;
            for &(user, book, rating) in triples {
                let u = users[&user];
                let i = items[&book];
                let pu = u * k;
                let qi = i * k;

                let mut dot = 0.0;
                for f in 0..k {
                    dot += user_factors[pu + f] * item_factors[qi + f];
                }
                let err = rating - (global_mean + user_bias[u] + item_bias[i] + dot);
                sq_err += err * err;

                user_bias[u] += lr * (err - reg * user_bias[u]);
                item_bias[i] += lr * (err - reg * item_bias[i]);
                for f in 0..k {
                    let puf = user_factors[pu + f];
                    let qif = item_factors[qi + f];
                    user_factors[pu + f] += lr * (err * qif - reg * puf);
                    item_factors[qi + f] += lr * (err * puf - reg * qif);
                }
            }

            if epoch % 5 == 0 {
                debug!(
                    "SGD epoch {}: train RMSE {:.4}",
                    epoch,
                    (sq_err / triples.len() as f64).sqrt()
                );
            }
        }

        TrainedPreferenceModel {
            global_mean,
            users,
            items,
            user_bias,
            item_bias,
            user_factors,
            item_factors,
            n_factors: k,
        }
    }
}

/// The fitted factorization; a pure scoring function over (user, book).
#[derive(Debug, Clone)]
pub struct TrainedPreferenceModel {
    global_mean: f64,
    users: HashMap<UserId, usize>,
    items: HashMap<BookId, usize>,
    user_bias: Vec<f64>,
    item_bias: Vec<f64>,
    /// Row-major [n_users x n_factors]
    user_factors: Vec<f64>,
    /// Row-major [n_items x n_factors]
    item_factors: Vec<f64>,
    n_factors: usize,
}

impl TrainedPreferenceModel {
    /// Estimated rating for any (user, book) pair, clipped to the 1-5
    /// scale. Terms for ids unseen in training are dropped, degrading to
    /// a bias-only or global-mean estimate.
    pub fn predict(&self, user_id: UserId, book_id: BookId) -> f64 {
        let user = self.users.get(&user_id).copied();
        let item = self.items.get(&book_id).copied();

        let mut est = self.global_mean;
        if let Some(u) = user {
            est += self.user_bias[u];
        }
        if let Some(i) = item {
            est += self.item_bias[i];
        }
        if let (Some(u), Some(i)) = (user, item) {
            let pu = u * self.n_factors;
            let qi = i * self.n_factors;
            for f in 0..self.n_factors {
                est += self.user_factors[pu + f] * self.item_factors[qi + f];
            }
        }
        est.clamp(RATING_MIN, RATING_MAX)
    }

    /// Mean rating of the training set (the cold-start floor)
    pub fn global_mean(&self) -> f64 {
        self.global_mean
    }

    pub fn knows_user(&self, user_id: UserId) -> bool {
        self.users.contains_key(&user_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use catalog::{Book, CatalogStore, Rating};
    use features::FeatureBuilder;
    use std::sync::Arc;

    fn book(id: u32) -> Book {
        Book {
            id,
            goodreads_id: id * 100,
            title: format!("Book {id}"),
            authors: "Author".to_string(),
            original_publication_year: Some(2010),
            average_rating: 4.0,
            ratings_count: 50,
            work_text_reviews_count: 5,
            image_url: String::new(),
        }
    }

    /// Six users with a sharp preference pattern: everyone loves book 1,
    /// everyone pans book 2, book 3 is middling.
    fn training_set() -> FilteredRatingSet {
        let mut store = CatalogStore::new();
        for id in 1..=3 {
            store.insert_book(book(id));
        }
        for user in 1..=6u32 {
            store.insert_rating(Rating { user_id: user, book_id: 1, rating: 5 });
            store.insert_rating(Rating { user_id: user, book_id: 2, rating: 1 });
            store.insert_rating(Rating { user_id: user, book_id: 3, rating: 3 });
        }
        FeatureBuilder::new(Arc::new(store))
            .with_min_user_ratings(1)
            .filtered_ratings()
    }

    fn small_trainer() -> SvdTrainer {
        SvdTrainer::new().with_n_factors(8).with_n_epochs(40)
    }

    #[test]
    fn test_predictions_stay_on_scale() {
        let model = small_trainer().fit(&training_set()).unwrap();
        for user in 0..=7u32 {
            for book in 0..=4u32 {
                let est = model.predict(user, book);
                assert!((RATING_MIN..=RATING_MAX).contains(&est));
            }
        }
    }

    #[test]
    fn test_model_learns_item_preferences() {
        let model = small_trainer().fit(&training_set()).unwrap();

        // Every training user should rank the loved book above the panned one
        for user in 1..=6u32 {
            assert!(model.predict(user, 1) > model.predict(user, 2));
        }
    }

    #[test]
    fn test_unknown_user_degrades_to_bias_estimate() {
        let model = small_trainer().fit(&training_set()).unwrap();
        assert!(!model.knows_user(999));

        // Item bias alone still separates the loved book from the panned one
        assert!(model.predict(999, 1) > model.predict(999, 2));

        // Fully unknown pair: the estimate is exactly the global mean
        let est = model.predict(999, 999);
        assert!((est - model.global_mean()).abs() < 1e-12);
    }

    #[test]
    fn test_training_is_deterministic() {
        let data = training_set();
        let a = small_trainer().fit(&data).unwrap();
        let b = small_trainer().fit(&data).unwrap();

        for user in 1..=6u32 {
            for book in 1..=3u32 {
                assert_eq!(a.predict(user, book), b.predict(user, book));
            }
        }
    }

    #[test]
    fn test_empty_set_is_degenerate() {
        let store = CatalogStore::new();
        let data = FeatureBuilder::new(Arc::new(store)).filtered_ratings();
        let err = SvdTrainer::new().fit(&data).unwrap_err();
        assert!(matches!(err, RankerError::DegenerateInput { .. }));
    }

    #[test]
    fn test_cross_validate_returns_k_folds() {
        let metrics = small_trainer().cross_validate(&training_set(), 3).unwrap();
        assert_eq!(metrics.len(), 3);
        for fold in &metrics {
            assert!(fold.rmse.is_finite() && fold.rmse >= 0.0);
            assert!(fold.mae.is_finite() && fold.mae >= 0.0);
            assert!(fold.mae <= fold.rmse + 1e-12, "MAE cannot exceed RMSE");
        }
    }

    #[test]
    fn test_cross_validate_guards() {
        let data = training_set();
        assert!(matches!(
            small_trainer().cross_validate(&data, 1),
            Err(RankerError::DegenerateInput { .. })
        ));
        assert!(matches!(
            small_trainer().cross_validate(&data, 100),
            Err(RankerError::DegenerateInput { .. })
        ));
    }
}

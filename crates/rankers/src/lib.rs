//! # Rankers Crate
//!
//! This crate implements the three scoring strategies of the book
//! recommendation engine.
//!
//! ## Components
//!
//! ### Popularity Ranker
//! Bias-corrected weighted rating:
//! - Shrinks low-vote averages toward the global mean
//! - Data-driven vote threshold (0.55 quantile of ratings_count)
//!
//! ### Similarity Engine
//! Content similarity over tag-bag text features:
//! - TF-IDF vectors with English stop-word filtering
//! - Full pairwise cosine matrix, nearest-neighbor queries by row
//!
//! ### Preference Model
//! Personalized rating prediction:
//! - Biased latent-factor factorization trained by SGD
//! - Optional k-fold validation (RMSE/MAE), diagnostic only
//! - Cold-start fallback to bias/global-mean estimates
//!
//! ## Example Usage
//!
//! ```ignore
//! use rankers::{PopularityRanker, SimilarityIndex, SvdTrainer};
//! use features::FeatureBuilder;
//! use std::sync::Arc;
//!
//! let builder = FeatureBuilder::new(Arc::clone(&store));
//!
//! let top = PopularityRanker::new(Arc::clone(&store)).top_n(10)?;
//! let index = SimilarityIndex::build(&builder.tag_bags())?;
//! let model = SvdTrainer::new().fit(&builder.filtered_ratings())?;
//! ```

// Public modules
pub mod error;
pub mod popularity;
pub mod similarity;
pub mod stop_words;
pub mod svd;
pub mod tfidf;

// Re-export commonly used types
pub use error::RankerError;
pub use popularity::{PopularityRanker, RankedBook};
pub use similarity::SimilarityIndex;
pub use svd::{FoldMetrics, SvdTrainer, TrainedPreferenceModel, RATING_MAX, RATING_MIN};
pub use tfidf::{TfIdfMatrix, TfIdfVectorizer};

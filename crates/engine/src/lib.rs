//! # Engine Crate
//!
//! The recommendation facade: three query operations (popularity, content
//! similarity, personalized estimates) over a shared read-only catalog,
//! with typed output records and a fingerprint-keyed cache for the two
//! expensive artifacts (similarity matrix, trained preference model).
//!
//! ## Example Usage
//!
//! ```ignore
//! use engine::Recommender;
//! use std::path::Path;
//!
//! let recommender = Recommender::load_from_dir(Path::new("data/goodbooks-10k"))?;
//!
//! let popular = recommender.recommend_popular(10)?;
//! let similar = recommender.recommend_similar("The Hunger Games", 10)?;
//! let personal = recommender.recommend_for_user(314, 10)?;
//! ```

pub mod cache;
pub mod error;
pub mod facade;
pub mod records;

// Re-export commonly used types
pub use error::{RecommendError, Result};
pub use facade::{Recommender, BOOK_URL_BASE};
pub use records::{
    BookSummary, EstimatedBook, RatedBook, SimilarBookSummary, UserRecommendationReport,
};

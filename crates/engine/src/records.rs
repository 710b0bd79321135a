//! Typed output records for the presentation layer.
//!
//! Field names and presence are part of the contract: callers address
//! fields by name and derive list counts from the vector lengths. These
//! replace the loosely-typed field-by-field maps the recommendation
//! endpoints used to assemble.

use catalog::UserId;
use serde::Serialize;

/// One row of the popularity listing
#[derive(Debug, Clone, Serialize)]
pub struct BookSummary {
    /// Book detail page: base URL + external catalog id
    pub external_link: String,
    pub title: String,
    pub author: String,
    /// Weighted rating, rounded to 2 decimal places for display
    pub rating: f64,
    pub image_url: String,
    pub year: Option<i32>,
}

/// One row of a content-similarity listing
#[derive(Debug, Clone, Serialize)]
pub struct SimilarBookSummary {
    pub external_link: String,
    pub title: String,
    pub author: String,
    pub image_url: String,
    pub year: Option<i32>,
    /// Cosine similarity, rounded to 3 decimal places for display
    pub similarity: f64,
}

/// A book the user has already rated (display context)
#[derive(Debug, Clone, Serialize)]
pub struct RatedBook {
    pub title: String,
    pub rating: u8,
}

/// A candidate book with its estimated rating
#[derive(Debug, Clone, Serialize)]
pub struct EstimatedBook {
    pub title: String,
    pub score: f64,
}

/// Personalized recommendations plus the rating history they are based on.
///
/// The history covers the filtered rating universe only; ratings the user
/// gave to books outside it are omitted.
#[derive(Debug, Clone, Serialize)]
pub struct UserRecommendationReport {
    pub user_id: UserId,
    pub rated: Vec<RatedBook>,
    pub recommended: Vec<EstimatedBook>,
}

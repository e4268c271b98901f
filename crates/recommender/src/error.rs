//! Error types for the recommender crate.

use ranking::ConfigError;
use thiserror::Error;

/// Configuration problems detected before any ranking work starts.
///
/// "No matches found" is never an error: the service always returns a
/// list, possibly empty.
#[derive(Error, Debug)]
pub enum RecommendationError {
    #[error("limit must be at least 1, got {limit}")]
    InvalidLimit { limit: usize },

    #[error("invalid ranking configuration: {0}")]
    InvalidConfig(#[from] ConfigError),
}

pub type Result<T> = std::result::Result<T, RecommendationError>;

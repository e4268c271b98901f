//! # Ranking Crate
//!
//! Multi-signal relevance scoring for catalog events.
//!
//! ## Components
//!
//! ### ScoredEvent
//! A borrowed `CatalogEvent` plus a running score. The baseline is the
//! event's popularity divided by a normalization constant, never below 1.
//!
//! ### SignalRepository
//! The per-request working set (visible events in recency order) with one
//! query per signal dimension: interests, field of study, countries,
//! industries, company sizes, languages. Matches are resolved through an
//! inverted `SignalIndex` and award `matches × weight` points.
//!
//! ### Builders
//! `RecommendationsBuilder` merges result lists (dedupe, stable sort,
//! truncate). `UserBasedRecommendationsBuilder` decides which queries to
//! run from the attributes a `UserProfile` carries.
//!
//! ## Example Usage
//!
//! ```ignore
//! use ranking::{RankingConfig, SignalRepository, StartDateOrder, UserBasedRecommendationsBuilder};
//!
//! let config = RankingConfig::default();
//! let repo = SignalRepository::new(catalog.events(), &StartDateOrder::default(), &config);
//!
//! let ranked = UserBasedRecommendationsBuilder::new(10, &profile, &repo, &config)
//!     .with_interests()
//!     .with_field_of_study()
//!     .with_countries_of_interest()
//!     .get();
//! ```

pub mod config;
pub mod traits;
pub mod ordering;
pub mod scored_event;
pub mod signal_index;
pub mod repository;
pub mod builder;
pub mod user_based;

// Re-export commonly used types
pub use builder::{RecommendationsBuilder, dedupe};
pub use config::{ConfigError, DuplicatePolicy, RankingConfig, Signal, SignalWeights};
pub use ordering::{PopularityOrder, StartDateOrder};
pub use repository::SignalRepository;
pub use scored_event::{ScoredEvent, SignalMatch, sort_by_points};
pub use signal_index::SignalIndex;
pub use traits::EventComparator;
pub use user_based::UserBasedRecommendationsBuilder;

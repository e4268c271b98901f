//! # Recommender Crate
//!
//! The public entry point for event recommendations.
//!
//! ## Flow
//!
//! 1. **Signals**: rank visible events against the profile's interests,
//!    field of study, countries, languages, and the companies behind
//!    events the user already interacted with
//! 2. **Fallback**: top up with the most popular visible events when the
//!    signals alone do not fill the limit
//! 3. **Telemetry**: in debug mode, report candidates and final ids to a
//!    pluggable `TelemetrySink` without ever affecting the result
//!
//! ## Example Usage
//!
//! ```ignore
//! use std::sync::Arc;
//! use recommender::{RecommendationService, TracingSink};
//!
//! let service = RecommendationService::new(Arc::new(TracingSink), Some(&profile), catalog.events(), false);
//! let ids = service.get_recommendations(10)?;
//! ```

pub mod error;
pub mod service;
pub mod telemetry;

pub use error::{RecommendationError, Result};
pub use service::{Recommendation, RecommendationService, RecommendationSource};
pub use telemetry::{NoopSink, TelemetryError, TelemetrySink, TracingSink};

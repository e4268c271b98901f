//! Ranking policy: signal dimensions, their weights, and the baseline
//! normalization.
//!
//! Defaults reproduce the production policy. Every value can be overridden
//! from a JSON file, e.g.
//!
//! ```json
//! { "normalization": 200, "weights": { "fieldOfStudy": 8 }, "duplicatePolicy": "keepFirst" }
//! ```

use catalog::CatalogEvent;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::fs;
use std::path::Path;
use thiserror::Error;

/// Approximate catalog-wide median popularity. An event at the median
/// starts with a baseline score of 1.
pub const DEFAULT_NORMALIZATION: f64 = 120.0;

pub const POINTS_PER_INTEREST_MATCH: f64 = 1.0;
pub const POINTS_PER_COUNTRY_MATCH: f64 = 3.0;
pub const POINTS_PER_FIELD_OF_STUDY_MATCH: f64 = 5.0;
pub const POINTS_PER_INDUSTRY_MATCH: f64 = 2.0;
pub const POINTS_PER_COMPANY_SIZE_MATCH: f64 = 1.0;
pub const POINTS_PER_LANGUAGE_MATCH: f64 = 1.0;

/// One profile dimension used to compute relevance
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Signal {
    Interests,
    FieldOfStudy,
    Countries,
    Industries,
    CompanySize,
    Languages,
}

impl Signal {
    pub const ALL: [Signal; 6] = [
        Signal::Interests,
        Signal::FieldOfStudy,
        Signal::Countries,
        Signal::Industries,
        Signal::CompanySize,
        Signal::Languages,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Signal::Interests => "interests",
            Signal::FieldOfStudy => "fieldOfStudy",
            Signal::Countries => "countries",
            Signal::Industries => "industries",
            Signal::CompanySize => "companySize",
            Signal::Languages => "languages",
        }
    }

    /// The event-side values this signal matches against
    pub fn event_values(self, event: &CatalogEvent) -> Vec<&str> {
        match self {
            Signal::Interests => event.interests().iter().map(String::as_str).collect(),
            Signal::FieldOfStudy => event
                .fields_of_study()
                .iter()
                .map(|field| field.id.as_str())
                .collect(),
            Signal::Countries => event.company_countries().iter().map(String::as_str).collect(),
            Signal::Industries => event.company_industries().iter().map(String::as_str).collect(),
            Signal::CompanySize => event.company_sizes().iter().map(String::as_str).collect(),
            Signal::Languages => event.language().into_iter().collect(),
        }
    }
}

impl fmt::Display for Signal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Points awarded per matched value, by signal
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct SignalWeights {
    pub interests: f64,
    pub countries: f64,
    pub field_of_study: f64,
    pub industries: f64,
    pub company_size: f64,
    pub languages: f64,
}

impl SignalWeights {
    pub fn weight(&self, signal: Signal) -> f64 {
        match signal {
            Signal::Interests => self.interests,
            Signal::FieldOfStudy => self.field_of_study,
            Signal::Countries => self.countries,
            Signal::Industries => self.industries,
            Signal::CompanySize => self.company_size,
            Signal::Languages => self.languages,
        }
    }
}

impl Default for SignalWeights {
    fn default() -> Self {
        Self {
            interests: POINTS_PER_INTEREST_MATCH,
            countries: POINTS_PER_COUNTRY_MATCH,
            field_of_study: POINTS_PER_FIELD_OF_STUDY_MATCH,
            industries: POINTS_PER_INDUSTRY_MATCH,
            company_size: POINTS_PER_COMPANY_SIZE_MATCH,
            languages: POINTS_PER_LANGUAGE_MATCH,
        }
    }
}

/// What to do when the same event comes back from more than one signal query
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum DuplicatePolicy {
    /// Keep the first instance and add the signal points of later ones to it
    #[default]
    MergePoints,
    /// Keep the first instance only; later partial scores are dropped
    KeepFirst,
}

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("normalization must be a positive number, got {0}")]
    InvalidNormalization(f64),

    #[error("weight for {signal} must be a non-negative number, got {weight}")]
    InvalidWeight { signal: Signal, weight: f64 },

    #[error("per-signal limit must be at least 1")]
    ZeroSignalLimit,

    #[error("failed to read config file {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("malformed config file {path}: {source}")]
    Json {
        path: String,
        #[source]
        source: serde_json::Error,
    },
}

/// Policy values for one recommendation engine instance
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct RankingConfig {
    /// Divisor turning raw popularity into a baseline score
    pub normalization: f64,
    pub weights: SignalWeights,
    /// Cap on events taken per signal query; the request limit when unset
    pub per_signal_limit: Option<usize>,
    pub duplicate_policy: DuplicatePolicy,
}

impl Default for RankingConfig {
    fn default() -> Self {
        Self {
            normalization: DEFAULT_NORMALIZATION,
            weights: SignalWeights::default(),
            per_signal_limit: None,
            duplicate_policy: DuplicatePolicy::default(),
        }
    }
}

impl RankingConfig {
    /// Load overrides from a JSON file; absent keys keep their defaults.
    pub fn from_json_file(path: &Path) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.display().to_string(),
            source,
        })?;
        let config: Self = serde_json::from_str(&content).map_err(|source| ConfigError::Json {
            path: path.display().to_string(),
            source,
        })?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(self.normalization.is_finite() && self.normalization > 0.0) {
            return Err(ConfigError::InvalidNormalization(self.normalization));
        }
        for signal in Signal::ALL {
            let weight = self.weights.weight(signal);
            if !(weight.is_finite() && weight >= 0.0) {
                return Err(ConfigError::InvalidWeight { signal, weight });
            }
        }
        if self.per_signal_limit == Some(0) {
            return Err(ConfigError::ZeroSignalLimit);
        }
        Ok(())
    }

    /// Events taken per signal query for a request of `limit` results
    pub fn signal_limit(&self, limit: usize) -> usize {
        self.per_signal_limit.unwrap_or(limit)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_weights() {
        let weights = SignalWeights::default();
        assert_eq!(weights.weight(Signal::Interests), 1.0);
        assert_eq!(weights.weight(Signal::Countries), 3.0);
        assert_eq!(weights.weight(Signal::FieldOfStudy), 5.0);
        assert_eq!(weights.weight(Signal::Industries), 2.0);
        assert_eq!(weights.weight(Signal::CompanySize), 1.0);
    }

    #[test]
    fn test_partial_override_keeps_defaults() {
        let config: RankingConfig = serde_json::from_str(
            r#"{ "normalization": 200, "weights": { "fieldOfStudy": 8 }, "duplicatePolicy": "keepFirst" }"#,
        )
        .unwrap();

        assert_eq!(config.normalization, 200.0);
        assert_eq!(config.weights.field_of_study, 8.0);
        assert_eq!(config.weights.countries, POINTS_PER_COUNTRY_MATCH);
        assert_eq!(config.duplicate_policy, DuplicatePolicy::KeepFirst);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_bad_values() {
        let mut config = RankingConfig::default();
        config.normalization = 0.0;
        assert!(matches!(config.validate(), Err(ConfigError::InvalidNormalization(_))));

        let mut config = RankingConfig::default();
        config.weights.industries = -2.0;
        assert!(matches!(
            config.validate(),
            Err(ConfigError::InvalidWeight { signal: Signal::Industries, .. })
        ));

        let mut config = RankingConfig::default();
        config.per_signal_limit = Some(0);
        assert!(matches!(config.validate(), Err(ConfigError::ZeroSignalLimit)));
    }

    #[test]
    fn test_signal_limit_falls_back_to_request_limit() {
        let mut config = RankingConfig::default();
        assert_eq!(config.signal_limit(7), 7);
        config.per_signal_limit = Some(50);
        assert_eq!(config.signal_limit(7), 50);
    }
}

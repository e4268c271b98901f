//! # Recommendation Service
//!
//! Coordinates one recommendation request:
//! 1. Validate the limit and the ranking configuration
//! 2. Build the signal repository over the catalog snapshot
//! 3. Rank by profile signals (when a profile is supplied)
//! 4. Deduplicate, optionally report candidates to the telemetry sink
//! 5. Backfill with the most popular visible events when short
//! 6. Truncate and return ids in rank order
//!
//! The service borrows the catalog and profile and keeps no state between
//! calls, so any number of requests can run in parallel over one shared
//! snapshot.

use std::collections::HashSet;
use std::sync::Arc;
use std::time::Instant;

use catalog::{CatalogEvent, EventId, UserProfile};
use ranking::{
    DuplicatePolicy, EventComparator, PopularityOrder, RankingConfig, ScoredEvent, SignalMatch,
    SignalRepository, StartDateOrder, UserBasedRecommendationsBuilder, dedupe,
};
use serde::Serialize;
use serde_json::{Value, json};
use tracing::{debug, info, instrument};

use crate::error::{RecommendationError, Result};
use crate::telemetry::{self, TelemetrySink};

/// Why an event made it into the result
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum RecommendationSource {
    /// Matched at least one profile signal
    Signals,
    /// Backfilled from the popularity ranking
    Popularity,
}

/// Final recommendation returned to the caller
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Recommendation {
    pub event_id: EventId,
    pub title: Option<String>,
    pub score: f64,
    pub source: RecommendationSource,
    pub matches: Vec<SignalMatch>,
    pub explanation: String,
}

impl Recommendation {
    fn new(scored: ScoredEvent<'_>, source: RecommendationSource) -> Self {
        let explanation = explain(&scored, source);
        let event = scored.event();
        Self {
            event_id: event.id.clone(),
            title: event.title.clone(),
            score: scored.points(),
            source,
            matches: scored.matches().to_vec(),
            explanation,
        }
    }
}

fn explain(scored: &ScoredEvent<'_>, source: RecommendationSource) -> String {
    match source {
        RecommendationSource::Popularity => format!(
            "Score: {:.2}, popular event (baseline {:.2})",
            scored.points(),
            scored.baseline()
        ),
        RecommendationSource::Signals => {
            let parts: Vec<String> = scored
                .matches()
                .iter()
                .filter(|m| m.matches > 0)
                .map(|m| format!("{} x{} (+{:.2})", m.signal, m.matches, m.points))
                .collect();
            format!(
                "Score: {:.2} (baseline {:.2}), matched {}",
                scored.points(),
                scored.baseline(),
                parts.join(", ")
            )
        }
    }
}

/// Recommends events from one catalog snapshot for one (optional) profile
#[derive(Clone)]
pub struct RecommendationService<'a> {
    sink: Arc<dyn TelemetrySink>,
    profile: Option<&'a UserProfile>,
    catalog: &'a [CatalogEvent],
    debug: bool,
    config: RankingConfig,
    popularity_order: Arc<dyn EventComparator>,
    recency_order: Arc<dyn EventComparator>,
}

impl<'a> RecommendationService<'a> {
    /// Create a service with the default ranking policy.
    ///
    /// # Arguments
    /// * `sink` - Receives debug telemetry; failures are ignored
    /// * `profile` - `None` gives anonymous, popularity-only ("trending") results
    /// * `catalog` - Read-only event snapshot
    /// * `debug` - Report candidates and final ids to `sink`
    pub fn new(
        sink: Arc<dyn TelemetrySink>,
        profile: Option<&'a UserProfile>,
        catalog: &'a [CatalogEvent],
        debug: bool,
    ) -> Self {
        Self {
            sink,
            profile,
            catalog,
            debug,
            config: RankingConfig::default(),
            popularity_order: Arc::new(PopularityOrder),
            recency_order: Arc::new(StartDateOrder::default()),
        }
    }

    pub fn with_config(mut self, config: RankingConfig) -> Self {
        self.config = config;
        self
    }

    /// Ordering used for the fallback fill (default: most popular first)
    pub fn with_popularity_order(mut self, order: Arc<dyn EventComparator>) -> Self {
        self.popularity_order = order;
        self
    }

    /// Ordering that seeds the repository's working set
    /// (default: soonest start first)
    pub fn with_recency_order(mut self, order: Arc<dyn EventComparator>) -> Self {
        self.recency_order = order;
        self
    }

    pub fn config(&self) -> &RankingConfig {
        &self.config
    }

    /// Up to `limit` recommended event ids, best first
    pub fn get_recommendations(&self, limit: usize) -> Result<Vec<EventId>> {
        Ok(self
            .recommend(limit)?
            .into_iter()
            .map(|recommendation| recommendation.event_id)
            .collect())
    }

    /// Up to `limit` recommendations with scores and explanations
    #[instrument(skip(self), fields(user = self.profile_label()))]
    pub fn recommend(&self, limit: usize) -> Result<Vec<Recommendation>> {
        if limit == 0 {
            return Err(RecommendationError::InvalidLimit { limit });
        }
        self.config.validate()?;

        let start_time = Instant::now();

        let repository =
            SignalRepository::new(self.catalog, self.recency_order.as_ref(), &self.config);

        let candidates = match self.profile {
            Some(profile) => self.rank_by_profile(&repository, profile, limit),
            None => Vec::new(),
        };
        let mut candidates = dedupe(candidates, DuplicatePolicy::KeepFirst);
        let signal_count = candidates.len();

        if self.debug {
            self.report_candidates(&candidates);
        }

        if candidates.len() < limit {
            let fallback = self.popularity_fallback();
            debug!(
                "Backfilling {} signal candidates with {} popular events",
                signal_count,
                fallback.len()
            );
            candidates.extend(fallback);
            candidates = dedupe(candidates, DuplicatePolicy::KeepFirst);
        }

        candidates.truncate(limit);

        let recommendations: Vec<Recommendation> = candidates
            .into_iter()
            .enumerate()
            .map(|(rank, scored)| {
                let source = if rank < signal_count {
                    RecommendationSource::Signals
                } else {
                    RecommendationSource::Popularity
                };
                Recommendation::new(scored, source)
            })
            .collect();

        if self.debug {
            let ids: Vec<&str> = recommendations.iter().map(|r| r.event_id.as_str()).collect();
            telemetry::emit(
                self.sink.as_ref(),
                "Final recommended event ids",
                &json!({ "userId": self.profile_label(), "eventIds": ids }),
            );
        }

        info!(
            "Recommended {} events ({} from signals) for {} in {:.2?}",
            recommendations.len(),
            signal_count.min(recommendations.len()),
            self.profile_label(),
            start_time.elapsed()
        );
        Ok(recommendations)
    }

    fn rank_by_profile(
        &self,
        repository: &SignalRepository<'a>,
        profile: &UserProfile,
        limit: usize,
    ) -> Vec<ScoredEvent<'a>> {
        UserBasedRecommendationsBuilder::new(limit, profile, repository, &self.config)
            .with_interests()
            .with_field_of_study()
            .with_countries_of_interest()
            .with_spoken_languages()
            .with_interacted_countries()
            .with_interacted_industries()
            .with_interacted_company_sizes()
            .with_interacted_interests()
            .with_interacted_languages()
            .get()
    }

    /// Every visible event, most popular first, as baseline-only scored
    /// events. A repeated id keeps its first catalog entry.
    fn popularity_fallback(&self) -> Vec<ScoredEvent<'a>> {
        let mut seen: HashSet<&'a str> = HashSet::with_capacity(self.catalog.len());
        let mut visible: Vec<&'a CatalogEvent> = self
            .catalog
            .iter()
            .filter(|event| event.is_visible() && seen.insert(event.id.as_str()))
            .collect();
        visible.sort_by(|a, b| self.popularity_order.compare(a, b));

        visible
            .into_iter()
            .map(|event| ScoredEvent::new(event, self.config.normalization))
            .collect()
    }

    fn report_candidates(&self, candidates: &[ScoredEvent<'_>]) {
        if let Some(profile) = self.profile {
            telemetry::emit(
                self.sink.as_ref(),
                "Recommendation user signals",
                &json!({
                    "userId": profile.label(),
                    "interestsIds": profile.interests(),
                    "fieldOfStudy": profile.field_of_study().map(|f| f.id.as_str()),
                    "countriesOfInterest": profile.countries_of_interest(),
                    "spokenLanguages": profile.spoken_languages(),
                    "interactedEventIds": profile.interacted_event_ids(),
                }),
            );
        }

        let entries: Vec<Value> = candidates.iter().map(candidate_metadata).collect();
        telemetry::emit(
            self.sink.as_ref(),
            "Recommendation candidates",
            &json!({ "userId": self.profile_label(), "candidates": entries }),
        );
    }

    fn profile_label(&self) -> &str {
        self.profile.map_or("anonymous", UserProfile::label)
    }
}

fn candidate_metadata(scored: &ScoredEvent<'_>) -> Value {
    let fields_of_study: Vec<&str> = scored
        .fields_of_study()
        .iter()
        .map(|f| f.id.as_str())
        .collect();
    json!({
        "id": scored.id(),
        "points": scored.points(),
        "baseline": scored.baseline(),
        "matches": scored.matches(),
        "interestsIds": scored.interest_ids(),
        "fieldsOfStudy": fields_of_study,
        "companyCountries": scored.company_countries(),
        "companyIndustries": scored.company_industries(),
        "companySizes": scored.company_sizes(),
        "language": scored.language(),
    })
}

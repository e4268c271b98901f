//! Signal Repository - per-request working set and signal queries
//!
//! Builds the working set once per request:
//! 1. Drop hidden and test events, and repeated ids
//! 2. Order the rest with the injected recency comparator
//! 3. Wrap each as a baseline-scored `ScoredEvent`
//! 4. Index attribute values for every signal dimension
//!
//! Each `by_*` query then selects matching events, awards
//! `matches × weight` points, and returns them best first. Queries hand out
//! fresh copies of the working-set entries, so one query never sees points
//! awarded by another.

use crate::config::{RankingConfig, Signal, SignalWeights};
use crate::scored_event::{ScoredEvent, sort_by_points};
use crate::signal_index::SignalIndex;
use crate::traits::EventComparator;
use catalog::{CatalogEvent, FieldOfStudy};
use std::collections::{HashMap, HashSet};
use tracing::{debug, instrument};

pub struct SignalRepository<'a> {
    events: Vec<ScoredEvent<'a>>,
    positions: HashMap<&'a str, usize>,
    index: SignalIndex<'a>,
    weights: SignalWeights,
}

impl<'a> SignalRepository<'a> {
    pub fn new(
        catalog: &'a [CatalogEvent],
        recency: &dyn EventComparator,
        config: &RankingConfig,
    ) -> Self {
        // a repeated id keeps its first catalog entry
        let mut seen: HashSet<&'a str> = HashSet::with_capacity(catalog.len());
        let mut visible: Vec<&'a CatalogEvent> = catalog
            .iter()
            .filter(|event| event.is_visible() && seen.insert(event.id.as_str()))
            .collect();
        visible.sort_by(|a, b| recency.compare(a, b));

        let events: Vec<ScoredEvent<'a>> = visible
            .into_iter()
            .map(|event| ScoredEvent::new(event, config.normalization))
            .collect();

        let positions: HashMap<&'a str, usize> = events
            .iter()
            .enumerate()
            .map(|(position, scored)| (scored.id(), position))
            .collect();

        let index = SignalIndex::build(&events);

        debug!(
            "Built working set of {} events ({} filtered out), ordered by {}",
            events.len(),
            catalog.len() - events.len(),
            recency.name()
        );

        Self {
            events,
            positions,
            index,
            weights: config.weights,
        }
    }

    pub fn by_interests(&self, interest_ids: &[String], limit: usize) -> Vec<ScoredEvent<'a>> {
        self.by_signal(Signal::Interests, &as_strs(interest_ids), limit)
    }

    pub fn by_field_of_study(
        &self,
        fields_of_study: &[FieldOfStudy],
        limit: usize,
    ) -> Vec<ScoredEvent<'a>> {
        let ids: Vec<&str> = fields_of_study.iter().map(|f| f.id.as_str()).collect();
        self.by_signal(Signal::FieldOfStudy, &ids, limit)
    }

    /// Country codes (PT, CH, DE, ...) against the events' company countries
    pub fn by_countries(&self, countries: &[String], limit: usize) -> Vec<ScoredEvent<'a>> {
        self.by_signal(Signal::Countries, &as_strs(countries), limit)
    }

    pub fn by_industries(&self, industries: &[String], limit: usize) -> Vec<ScoredEvent<'a>> {
        self.by_signal(Signal::Industries, &as_strs(industries), limit)
    }

    pub fn by_company_sizes(&self, sizes: &[String], limit: usize) -> Vec<ScoredEvent<'a>> {
        self.by_signal(Signal::CompanySize, &as_strs(sizes), limit)
    }

    pub fn by_languages(&self, languages: &[String], limit: usize) -> Vec<ScoredEvent<'a>> {
        self.by_signal(Signal::Languages, &as_strs(languages), limit)
    }

    /// Generic query behind every `by_*` method.
    ///
    /// Takes at most `limit` matching events in working-set order, then
    /// sorts them by their updated score.
    #[instrument(skip(self, values), fields(values = values.len()))]
    pub fn by_signal(&self, signal: Signal, values: &[&str], limit: usize) -> Vec<ScoredEvent<'a>> {
        if values.is_empty() || limit == 0 {
            return Vec::new();
        }

        let wanted: HashSet<&str> = values.iter().copied().collect();
        let weight = self.weights.weight(signal);

        let mut ranked: Vec<ScoredEvent<'a>> = self
            .index
            .lookup(signal, values)
            .into_iter()
            .take(limit)
            .map(|position| {
                let mut scored = self.events[position].clone();
                let matches = count_matches(signal.event_values(scored.event()), &wanted);
                scored.add_signal_points(signal, matches, matches as f64 * weight);
                scored
            })
            .collect();

        sort_by_points(&mut ranked);

        debug!("Signal {} matched {} events", signal, ranked.len());
        ranked
    }

    /// Working-set entry for `id`; `None` for hidden, test, or unknown events
    pub fn get(&self, id: &str) -> Option<&ScoredEvent<'a>> {
        self.positions.get(id).map(|&position| &self.events[position])
    }

    /// The working set, in recency order
    pub fn events(&self) -> &[ScoredEvent<'a>] {
        &self.events
    }

    pub fn index(&self) -> &SignalIndex<'a> {
        &self.index
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }
}

fn as_strs(values: &[String]) -> Vec<&str> {
    values.iter().map(String::as_str).collect()
}

/// Distinct event values present in `wanted`
fn count_matches(event_values: Vec<&str>, wanted: &HashSet<&str>) -> usize {
    event_values
        .into_iter()
        .filter(|value| wanted.contains(*value))
        .collect::<HashSet<_>>()
        .len()
}

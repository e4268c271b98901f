//! Accumulates ranked result lists from several signal queries and merges
//! them into one bounded ranking.

use crate::config::DuplicatePolicy;
use crate::scored_event::{ScoredEvent, sort_by_points};
use std::collections::HashMap;

/// Collects per-signal result lists; `get` merges them.
///
/// ## Usage
/// ```ignore
/// let mut builder = RecommendationsBuilder::new(10, DuplicatePolicy::MergePoints);
/// builder.add_results(repo.by_interests(&interests, 10));
/// builder.add_results(repo.by_countries(&countries, 10));
/// let ranked = builder.get();
/// ```
#[derive(Debug)]
pub struct RecommendationsBuilder<'a> {
    limit: usize,
    duplicate_policy: DuplicatePolicy,
    results: Vec<Vec<ScoredEvent<'a>>>,
}

impl<'a> RecommendationsBuilder<'a> {
    pub fn new(limit: usize, duplicate_policy: DuplicatePolicy) -> Self {
        Self {
            limit,
            duplicate_policy,
            results: Vec::new(),
        }
    }

    pub fn limit(&self) -> usize {
        self.limit
    }

    pub fn add_results(&mut self, results: Vec<ScoredEvent<'a>>) -> &mut Self {
        self.results.push(results);
        self
    }

    /// Total number of accumulated entries, duplicates included
    pub fn accumulated(&self) -> usize {
        self.results.iter().map(Vec::len).sum()
    }

    /// Flatten in insertion order, deduplicate by id, sort best first
    /// (stable), and truncate to the limit.
    pub fn get(self) -> Vec<ScoredEvent<'a>> {
        let mut merged = dedupe(self.results.into_iter().flatten(), self.duplicate_policy);
        sort_by_points(&mut merged);
        merged.truncate(self.limit);
        merged
    }
}

/// Remove repeated ids, keeping each id at the position of its first
/// occurrence.
///
/// With `MergePoints`, later instances add their signal points to the kept
/// one; with `KeepFirst` they are dropped.
pub fn dedupe<'a>(
    events: impl IntoIterator<Item = ScoredEvent<'a>>,
    policy: DuplicatePolicy,
) -> Vec<ScoredEvent<'a>> {
    let mut seen: HashMap<&'a str, usize> = HashMap::new();
    let mut unique: Vec<ScoredEvent<'a>> = Vec::new();

    for event in events {
        match seen.get(event.id()).copied() {
            Some(kept) => {
                if policy == DuplicatePolicy::MergePoints {
                    unique[kept].absorb(&event);
                }
            }
            None => {
                seen.insert(event.id(), unique.len());
                unique.push(event);
            }
        }
    }
    unique
}

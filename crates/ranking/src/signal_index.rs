//! Inverted index over a repository's working set.
//!
//! Maps each signal's attribute values to the working-set positions of the
//! events carrying them, so a query touches only matching events instead of
//! scanning the whole catalog. Posting lists are kept in working-set order,
//! which makes lookups return exactly what a linear scan would.

use crate::config::Signal;
use crate::scored_event::ScoredEvent;
use rayon::prelude::*;
use std::collections::HashMap;

type Postings<'a> = HashMap<&'a str, Vec<usize>>;

#[derive(Debug, Default)]
pub struct SignalIndex<'a> {
    postings: HashMap<Signal, Postings<'a>>,
}

impl<'a> SignalIndex<'a> {
    /// Build postings for every signal, one signal per Rayon task
    pub fn build(events: &[ScoredEvent<'a>]) -> Self {
        let postings = Signal::ALL
            .par_iter()
            .map(|&signal| (signal, Self::build_postings(signal, events)))
            .collect();
        Self { postings }
    }

    fn build_postings(signal: Signal, events: &[ScoredEvent<'a>]) -> Postings<'a> {
        let mut postings: Postings<'a> = HashMap::new();
        for (position, scored) in events.iter().enumerate() {
            for value in signal.event_values(scored.event()) {
                let list = postings.entry(value).or_default();
                // an event listing the same value twice is still one posting
                if list.last() != Some(&position) {
                    list.push(position);
                }
            }
        }
        postings
    }

    /// Working-set positions of events carrying any of `values`, ascending
    pub fn lookup(&self, signal: Signal, values: &[&str]) -> Vec<usize> {
        let Some(postings) = self.postings.get(&signal) else {
            return Vec::new();
        };

        let mut positions: Vec<usize> = values
            .iter()
            .filter_map(|value| postings.get(*value))
            .flatten()
            .copied()
            .collect();
        positions.sort_unstable();
        positions.dedup();
        positions
    }

    /// Number of distinct values indexed for `signal`
    pub fn vocabulary_size(&self, signal: Signal) -> usize {
        self.postings.get(&signal).map_or(0, HashMap::len)
    }
}

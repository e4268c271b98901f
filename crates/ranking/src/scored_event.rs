//! A catalog event paired with its running relevance score.

use crate::config::Signal;
use catalog::{CatalogEvent, FieldOfStudy};
use serde::Serialize;

/// Points one signal contributed to one event
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SignalMatch {
    pub signal: Signal,
    /// Distinct event values that matched the profile
    pub matches: usize,
    pub points: f64,
}

/// Wraps one borrowed `CatalogEvent` with a mutable score.
///
/// Instances live for a single recommendation request. Identity is the id
/// of the wrapped event.
#[derive(Debug, Clone)]
pub struct ScoredEvent<'a> {
    event: &'a CatalogEvent,
    baseline: f64,
    points: f64,
    matches: Vec<SignalMatch>,
}

impl<'a> ScoredEvent<'a> {
    /// Baseline score is `max(1, popularity / normalization)`.
    pub fn new(event: &'a CatalogEvent, normalization: f64) -> Self {
        let baseline = (event.popularity / normalization).max(1.0);
        Self {
            event,
            baseline,
            points: baseline,
            matches: Vec::new(),
        }
    }

    pub fn id(&self) -> &'a str {
        &self.event.id
    }

    pub fn event(&self) -> &'a CatalogEvent {
        self.event
    }

    pub fn points(&self) -> f64 {
        self.points
    }

    pub fn baseline(&self) -> f64 {
        self.baseline
    }

    /// Points earned from signals on top of the baseline
    pub fn signal_points(&self) -> f64 {
        self.points - self.baseline
    }

    pub fn matches(&self) -> &[SignalMatch] {
        &self.matches
    }

    /// Increase the score. Negative and non-finite deltas are ignored, so the
    /// score never drops below its baseline.
    pub fn add_points(&mut self, delta: f64) {
        if delta.is_finite() && delta > 0.0 {
            self.points += delta;
        }
    }

    /// Record that `signal` matched `matches` values, worth `points` in total
    pub fn add_signal_points(&mut self, signal: Signal, matches: usize, points: f64) {
        self.add_points(points);
        self.matches.push(SignalMatch {
            signal,
            matches,
            points,
        });
    }

    /// Fold another instance of the same event into this one.
    ///
    /// Only the other instance's signal points are added; the baseline is
    /// counted once.
    pub fn absorb(&mut self, other: &ScoredEvent<'_>) {
        debug_assert_eq!(self.id(), other.id());
        self.add_points(other.signal_points());
        self.matches.extend_from_slice(&other.matches);
    }

    pub fn interest_ids(&self) -> &'a [String] {
        self.event.interests()
    }

    pub fn fields_of_study(&self) -> &'a [FieldOfStudy] {
        self.event.fields_of_study()
    }

    pub fn company_countries(&self) -> &'a [String] {
        self.event.company_countries()
    }

    pub fn company_industries(&self) -> &'a [String] {
        self.event.company_industries()
    }

    pub fn company_sizes(&self) -> &'a [String] {
        self.event.company_sizes()
    }

    pub fn language(&self) -> Option<&'a str> {
        self.event.language()
    }
}

/// Stable sort, highest score first; ties keep their relative order.
pub fn sort_by_points(events: &mut [ScoredEvent<'_>]) {
    events.sort_by(|a, b| b.points.total_cmp(&a.points));
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::DEFAULT_NORMALIZATION;

    fn event(id: &str, popularity: f64) -> CatalogEvent {
        CatalogEvent {
            id: id.to_string(),
            popularity,
            ..Default::default()
        }
    }

    #[test]
    fn test_baseline_is_normalized_popularity() {
        let e1 = event("e1", 240.0);
        let e3 = event("e3", 600.0);
        assert_eq!(ScoredEvent::new(&e1, DEFAULT_NORMALIZATION).points(), 2.0);
        assert_eq!(ScoredEvent::new(&e3, DEFAULT_NORMALIZATION).points(), 5.0);
    }

    #[test]
    fn test_baseline_has_a_floor_of_one() {
        let quiet = event("quiet", 30.0);
        let unknown = event("unknown", 0.0);
        assert_eq!(ScoredEvent::new(&quiet, DEFAULT_NORMALIZATION).points(), 1.0);
        assert_eq!(ScoredEvent::new(&unknown, DEFAULT_NORMALIZATION).points(), 1.0);
    }

    #[test]
    fn test_add_points_ignores_negative_deltas() {
        let e = event("e", 120.0);
        let mut scored = ScoredEvent::new(&e, DEFAULT_NORMALIZATION);

        scored.add_points(0.0);
        scored.add_points(-4.0);
        scored.add_points(f64::NAN);
        assert_eq!(scored.points(), 1.0);

        scored.add_points(2.5);
        assert_eq!(scored.points(), 3.5);
        assert_eq!(scored.signal_points(), 2.5);
    }

    #[test]
    fn test_absorb_counts_baseline_once() {
        let e = event("e", 240.0);
        let mut from_interests = ScoredEvent::new(&e, DEFAULT_NORMALIZATION);
        from_interests.add_signal_points(Signal::Interests, 2, 2.0);
        let mut from_field = ScoredEvent::new(&e, DEFAULT_NORMALIZATION);
        from_field.add_signal_points(Signal::FieldOfStudy, 1, 5.0);

        from_interests.absorb(&from_field);

        assert_eq!(from_interests.points(), 2.0 + 2.0 + 5.0);
        assert_eq!(from_interests.matches().len(), 2);
    }

    #[test]
    fn test_sort_is_descending_and_stable() {
        let a = event("a", 120.0);
        let b = event("b", 360.0);
        let c = event("c", 120.0);
        let mut events = vec![
            ScoredEvent::new(&a, DEFAULT_NORMALIZATION),
            ScoredEvent::new(&b, DEFAULT_NORMALIZATION),
            ScoredEvent::new(&c, DEFAULT_NORMALIZATION),
        ];

        sort_by_points(&mut events);

        let ids: Vec<&str> = events.iter().map(|e| e.id()).collect();
        assert_eq!(ids, vec!["b", "a", "c"]);
    }

    #[test]
    fn test_accessors_default_to_empty() {
        let e = event("e", 0.0);
        let scored = ScoredEvent::new(&e, DEFAULT_NORMALIZATION);
        assert!(scored.interest_ids().is_empty());
        assert!(scored.fields_of_study().is_empty());
        assert!(scored.company_countries().is_empty());
        assert!(scored.company_industries().is_empty());
        assert!(scored.company_sizes().is_empty());
        assert!(scored.language().is_none());
    }
}

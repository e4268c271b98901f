//! Built-in event orderings.

use crate::traits::EventComparator;
use catalog::CatalogEvent;
use std::cmp::Ordering;

/// Most popular first
#[derive(Debug, Clone, Copy, Default)]
pub struct PopularityOrder;

impl EventComparator for PopularityOrder {
    fn name(&self) -> &str {
        "PopularityOrder"
    }

    fn compare(&self, a: &CatalogEvent, b: &CatalogEvent) -> Ordering {
        b.popularity.total_cmp(&a.popularity)
    }
}

/// Orders by start timestamp. Events without a start always sort last.
#[derive(Debug, Clone, Copy)]
pub struct StartDateOrder {
    latest_first: bool,
}

impl StartDateOrder {
    /// Earliest start first: the next upcoming event leads the working set
    pub fn soonest_first() -> Self {
        Self {
            latest_first: false,
        }
    }

    pub fn latest_first() -> Self {
        Self { latest_first: true }
    }
}

impl Default for StartDateOrder {
    fn default() -> Self {
        Self::soonest_first()
    }
}

impl EventComparator for StartDateOrder {
    fn name(&self) -> &str {
        if self.latest_first {
            "StartDateOrder(latest first)"
        } else {
            "StartDateOrder(soonest first)"
        }
    }

    fn compare(&self, a: &CatalogEvent, b: &CatalogEvent) -> Ordering {
        match (a.start, b.start) {
            (Some(x), Some(y)) if self.latest_first => y.cmp(&x),
            (Some(x), Some(y)) => x.cmp(&y),
            (Some(_), None) => Ordering::Less,
            (None, Some(_)) => Ordering::Greater,
            (None, None) => Ordering::Equal,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn event(id: &str, popularity: f64, start: Option<i64>) -> CatalogEvent {
        CatalogEvent {
            id: id.to_string(),
            popularity,
            start,
            ..Default::default()
        }
    }

    fn sorted_ids(mut events: Vec<CatalogEvent>, order: &dyn EventComparator) -> Vec<String> {
        events.sort_by(|a, b| order.compare(a, b));
        events.into_iter().map(|e| e.id).collect()
    }

    #[test]
    fn test_popularity_order() {
        let events = vec![
            event("low", 10.0, None),
            event("high", 900.0, None),
            event("mid", 120.0, None),
        ];
        assert_eq!(sorted_ids(events, &PopularityOrder), vec!["high", "mid", "low"]);
    }

    #[test]
    fn test_start_date_orders_missing_last() {
        let events = vec![
            event("none", 0.0, None),
            event("later", 0.0, Some(2_000)),
            event("sooner", 0.0, Some(1_000)),
        ];
        assert_eq!(
            sorted_ids(events.clone(), &StartDateOrder::soonest_first()),
            vec!["sooner", "later", "none"]
        );
        assert_eq!(
            sorted_ids(events, &StartDateOrder::latest_first()),
            vec!["later", "sooner", "none"]
        );
    }

    #[test]
    fn test_closure_comparator() {
        let by_id = |a: &CatalogEvent, b: &CatalogEvent| a.id.cmp(&b.id);
        let events = vec![event("b", 0.0, None), event("a", 0.0, None)];
        assert_eq!(sorted_ids(events, &by_id), vec!["a", "b"]);
        assert_eq!(by_id.name(), "custom");
    }
}

//! Core traits for injecting orderings into the ranking engine.

use catalog::CatalogEvent;
use std::cmp::Ordering;

/// A total order over catalog events.
///
/// Used twice by the engine: a recency order seeds the repository's working
/// set, and a popularity order drives the fallback fill.
///
/// `Send + Sync` lets one comparator be shared by concurrent requests.
pub trait EventComparator: Send + Sync {
    /// Returns the name of this ordering (for logging/debugging)
    fn name(&self) -> &str;

    /// `Ordering::Less` means `a` comes first
    fn compare(&self, a: &CatalogEvent, b: &CatalogEvent) -> Ordering;
}

/// Plain closures can be injected directly
impl<F> EventComparator for F
where
    F: Fn(&CatalogEvent, &CatalogEvent) -> Ordering + Send + Sync,
{
    fn name(&self) -> &str {
        "custom"
    }

    fn compare(&self, a: &CatalogEvent, b: &CatalogEvent) -> Ordering {
        self(a, b)
    }
}

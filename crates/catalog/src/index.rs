//! Catalog snapshot with id lookup.
//!
//! A `Catalog` is an immutable, validated point-in-time copy of the event
//! set. It is built once and then shared read-only (typically behind an
//! `Arc`) between any number of concurrent recommendation requests.

use crate::error::{CatalogError, Result};
use crate::parser;
use crate::types::{CatalogEvent, EventId};
use std::collections::HashMap;
use std::path::Path;
use tracing::info;

/// Visibility breakdown of a snapshot
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CatalogCounts {
    pub total: usize,
    pub visible: usize,
    pub hidden: usize,
    pub test: usize,
}

#[derive(Debug, Default)]
pub struct Catalog {
    events: Vec<CatalogEvent>,
    positions: HashMap<EventId, usize>,
}

impl Catalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a snapshot from already-parsed events, keeping their order.
    ///
    /// Rejects empty and duplicate ids.
    pub fn from_events(events: Vec<CatalogEvent>) -> Result<Self> {
        let mut positions = HashMap::with_capacity(events.len());
        for (position, event) in events.iter().enumerate() {
            if event.id.is_empty() {
                return Err(CatalogError::ValidationError(format!(
                    "event at position {position} has an empty id"
                )));
            }
            if positions.insert(event.id.clone(), position).is_some() {
                return Err(CatalogError::DuplicateId {
                    id: event.id.clone(),
                });
            }
        }
        Ok(Self { events, positions })
    }

    /// Load and validate a JSON snapshot from disk
    pub fn load_from_file(path: &Path) -> Result<Self> {
        let events = parser::parse_catalog(path)?;
        let catalog = Self::from_events(events)?;

        let counts = catalog.counts();
        info!(
            "Loaded catalog from {}: {} events ({} visible, {} hidden, {} test)",
            path.display(),
            counts.total,
            counts.visible,
            counts.hidden,
            counts.test
        );
        Ok(catalog)
    }

    pub fn events(&self) -> &[CatalogEvent] {
        &self.events
    }

    pub fn get_event(&self, id: &str) -> Option<&CatalogEvent> {
        self.positions.get(id).map(|&position| &self.events[position])
    }

    pub fn visible_events(&self) -> impl Iterator<Item = &CatalogEvent> {
        self.events.iter().filter(|event| event.is_visible())
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    pub fn counts(&self) -> CatalogCounts {
        self.events
            .iter()
            .fold(CatalogCounts::default(), |mut counts, event| {
                counts.total += 1;
                if event.is_visible() {
                    counts.visible += 1;
                }
                if event.hidden {
                    counts.hidden += 1;
                }
                if event.test {
                    counts.test += 1;
                }
                counts
            })
    }
}

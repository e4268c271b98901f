//! # Catalog Crate
//!
//! Read-only inputs of the recommendation engine.
//!
//! ## Main Components
//!
//! - **types**: `CatalogEvent`, `FieldOfStudy`, `UserProfile`
//! - **parser**: JSON snapshot parsing (catalog and profiles)
//! - **index**: `Catalog`, a validated snapshot with id lookup
//! - **error**: `CatalogError`
//!
//! ## Example Usage
//!
//! ```ignore
//! use catalog::Catalog;
//! use std::path::Path;
//!
//! let catalog = Catalog::load_from_file(Path::new("data/events.json"))?;
//! let event = catalog.get_event("abc123").unwrap();
//! println!("{} has popularity {}", event.id, event.popularity);
//! ```

pub mod error;
pub mod types;
pub mod parser;
pub mod index;

pub use error::{CatalogError, Result};
pub use index::{Catalog, CatalogCounts};
pub use types::{CatalogEvent, EventId, FieldOfStudy, UserProfile};

//! Parser for catalog and profile snapshots.
//!
//! Snapshots are JSON documents exported by the catalog provider:
//! - catalog: either a bare array of events or `{ "events": [...] }`
//! - profiles: either an array of profiles or a single profile object
//!
//! Catalog records are converted in parallel with Rayon; the first record
//! (in document order) that fails to convert is reported with its position.

use crate::error::{CatalogError, Result};
use crate::types::{CatalogEvent, UserProfile};
use rayon::prelude::*;
use serde::Deserialize;
use serde_json::Value;
use std::fs;
use std::path::Path;

#[derive(Deserialize)]
#[serde(untagged)]
enum CatalogDocument {
    Bare(Vec<Value>),
    Wrapped { events: Vec<Value> },
}

#[derive(Deserialize)]
#[serde(untagged)]
enum ProfilesDocument {
    Many(Vec<UserProfile>),
    One(UserProfile),
}

fn read_file(path: &Path) -> Result<String> {
    if !path.exists() {
        return Err(CatalogError::FileNotFound {
            path: path.display().to_string(),
        });
    }
    Ok(fs::read_to_string(path)?)
}

fn file_label(path: &Path) -> String {
    path.file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}

/// Parse a catalog snapshot from a JSON string.
///
/// `file` only labels error messages.
pub fn parse_catalog_str(content: &str, file: &str) -> Result<Vec<CatalogEvent>> {
    let document: CatalogDocument =
        serde_json::from_str(content).map_err(|source| CatalogError::JsonError {
            file: file.to_string(),
            source,
        })?;

    let records = match document {
        CatalogDocument::Bare(records) => records,
        CatalogDocument::Wrapped { events } => events,
    };

    // Decode in parallel, then collect in document order so the error
    // reported is the earliest bad record.
    let decoded: Vec<Result<CatalogEvent>> = records
        .into_par_iter()
        .enumerate()
        .map(|(index, record)| {
            serde_json::from_value::<CatalogEvent>(record).map_err(|e| CatalogError::ParseError {
                file: file.to_string(),
                index,
                reason: e.to_string(),
            })
        })
        .collect();

    decoded.into_iter().collect()
}

/// Parse a catalog snapshot file
pub fn parse_catalog(path: &Path) -> Result<Vec<CatalogEvent>> {
    let content = read_file(path)?;
    parse_catalog_str(&content, &file_label(path))
}

/// Parse one or many user profiles from a JSON string
pub fn parse_profiles_str(content: &str, file: &str) -> Result<Vec<UserProfile>> {
    let document: ProfilesDocument =
        serde_json::from_str(content).map_err(|source| CatalogError::JsonError {
            file: file.to_string(),
            source,
        })?;

    Ok(match document {
        ProfilesDocument::Many(profiles) => profiles,
        ProfilesDocument::One(profile) => vec![profile],
    })
}

/// Parse a profiles file
pub fn parse_profiles(path: &Path) -> Result<Vec<UserProfile>> {
    let content = read_file(path)?;
    parse_profiles_str(&content, &file_label(path))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_bare_array() {
        let events = parse_catalog_str(
            r#"[{ "id": "a", "popularity": 240 }, { "id": "b" }]"#,
            "catalog.json",
        )
        .unwrap();

        assert_eq!(events.len(), 2);
        assert_eq!(events[0].id, "a");
        assert_eq!(events[0].popularity, 240.0);
        assert_eq!(events[1].id, "b");
    }

    #[test]
    fn test_parse_wrapped_document_preserves_order() {
        let events = parse_catalog_str(
            r#"{ "events": [{ "id": "z" }, { "id": "y" }, { "id": "x" }] }"#,
            "catalog.json",
        )
        .unwrap();

        let ids: Vec<&str> = events.iter().map(|e| e.id.as_str()).collect();
        assert_eq!(ids, vec!["z", "y", "x"]);
    }

    #[test]
    fn test_record_without_id_reports_position() {
        let err = parse_catalog_str(r#"[{ "id": "a" }, { "title": "no id" }]"#, "catalog.json")
            .unwrap_err();

        match err {
            CatalogError::ParseError { index, file, .. } => {
                assert_eq!(index, 1);
                assert_eq!(file, "catalog.json");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_earliest_bad_record_is_reported() {
        let mut records: Vec<String> = (0..500).map(|i| format!(r#"{{ "id": "e{i}" }}"#)).collect();
        records[17] = r#"{ "title": "no id" }"#.to_string();
        records[250] = r#"{ "title": "no id either" }"#.to_string();
        records[499] = r#"{ "id": 42 }"#.to_string();
        let content = format!("[{}]", records.join(","));

        for _ in 0..10 {
            match parse_catalog_str(&content, "catalog.json").unwrap_err() {
                CatalogError::ParseError { index, .. } => assert_eq!(index, 17),
                other => panic!("unexpected error: {other}"),
            }
        }
    }

    #[test]
    fn test_malformed_json() {
        let err = parse_catalog_str("[{", "catalog.json").unwrap_err();
        assert!(matches!(err, CatalogError::JsonError { .. }));
    }

    #[test]
    fn test_parse_single_and_many_profiles() {
        let one = parse_profiles_str(r#"{ "userId": "u1", "interestsIds": ["ai"] }"#, "p.json")
            .unwrap();
        assert_eq!(one.len(), 1);
        assert_eq!(one[0].label(), "u1");

        let many = parse_profiles_str(r#"[{ "userId": "u1" }, { "userId": "u2" }]"#, "p.json")
            .unwrap();
        assert_eq!(many.len(), 2);
    }

    #[test]
    fn test_missing_file() {
        let err = parse_catalog(Path::new("/definitely/not/here.json")).unwrap_err();
        assert!(matches!(err, CatalogError::FileNotFound { .. }));
    }
}

//! Core domain types for event catalogs and user profiles.
//!
//! Catalog snapshots come from an upstream store that does not enforce a
//! schema, so every multi-valued attribute is read leniently: a missing
//! field, `null`, or a value that is not an array all end up as "absent"
//! and the typed accessors hand back an empty slice.

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

// =============================================================================
// Type Aliases
// =============================================================================

/// Unique identifier of a catalog event
pub type EventId = String;

// =============================================================================
// Shared references
// =============================================================================

/// Reference to a field of study.
///
/// Events and profiles carry the full reference, but matching only ever
/// looks at `id`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct FieldOfStudy {
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
}

impl FieldOfStudy {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: None,
        }
    }

    /// Accepts either a bare id string or an object with an `id` member.
    fn from_value(value: Value) -> Option<Self> {
        match value {
            Value::String(id) => Some(Self::new(id)),
            Value::Object(_) => serde_json::from_value(value).ok(),
            _ => None,
        }
    }
}

// =============================================================================
// Catalog events
// =============================================================================

/// One event eligible for recommendation.
///
/// Never mutated by the ranking code; scoring happens on wrappers that
/// borrow it.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CatalogEvent {
    pub id: EventId,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,

    #[serde(default, deserialize_with = "lenient_flag")]
    pub hidden: bool,

    /// Internal test events are never shown to users
    #[serde(default, deserialize_with = "lenient_flag")]
    pub test: bool,

    /// Engagement metric (registrations, views) used for the baseline score
    #[serde(default, deserialize_with = "lenient_number")]
    pub popularity: f64,

    #[serde(default, deserialize_with = "lenient_strings")]
    pub interests_ids: Option<Vec<String>>,

    #[serde(default, deserialize_with = "lenient_fields_of_study")]
    pub target_fields_of_study: Option<Vec<FieldOfStudy>>,

    #[serde(default, deserialize_with = "lenient_strings")]
    pub company_countries: Option<Vec<String>>,

    #[serde(default, deserialize_with = "lenient_strings")]
    pub company_industries: Option<Vec<String>>,

    #[serde(default, deserialize_with = "lenient_strings")]
    pub company_sizes: Option<Vec<String>>,

    /// Language code the event is held in (e.g. "en")
    #[serde(default, deserialize_with = "lenient_language")]
    pub language: Option<String>,

    /// Start timestamp in unix millis
    #[serde(default, deserialize_with = "lenient_timestamp")]
    pub start: Option<i64>,
}

impl CatalogEvent {
    pub fn new(id: impl Into<EventId>) -> Self {
        Self {
            id: id.into(),
            ..Default::default()
        }
    }

    /// Neither hidden nor a test event
    pub fn is_visible(&self) -> bool {
        !self.hidden && !self.test
    }

    pub fn interests(&self) -> &[String] {
        self.interests_ids.as_deref().unwrap_or(&[])
    }

    pub fn fields_of_study(&self) -> &[FieldOfStudy] {
        self.target_fields_of_study.as_deref().unwrap_or(&[])
    }

    pub fn company_countries(&self) -> &[String] {
        self.company_countries.as_deref().unwrap_or(&[])
    }

    pub fn company_industries(&self) -> &[String] {
        self.company_industries.as_deref().unwrap_or(&[])
    }

    pub fn company_sizes(&self) -> &[String] {
        self.company_sizes.as_deref().unwrap_or(&[])
    }

    pub fn language(&self) -> Option<&str> {
        self.language.as_deref()
    }

    /// Title for display, falling back to the id
    pub fn display_name(&self) -> &str {
        self.title.as_deref().unwrap_or(&self.id)
    }
}

// =============================================================================
// User profiles
// =============================================================================

/// What we know about the person asking for recommendations.
///
/// Every attribute is optional and contributes nothing when absent.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserProfile {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_id: Option<String>,

    #[serde(default, deserialize_with = "lenient_strings")]
    pub interests_ids: Option<Vec<String>>,

    #[serde(default, deserialize_with = "lenient_field_of_study")]
    pub field_of_study: Option<FieldOfStudy>,

    /// Country codes (PT, CH, DE, ...)
    #[serde(default, deserialize_with = "lenient_strings")]
    pub countries_of_interest: Option<Vec<String>>,

    #[serde(default, deserialize_with = "lenient_strings")]
    pub spoken_languages: Option<Vec<String>>,

    /// Events the user registered for or otherwise interacted with
    #[serde(default, deserialize_with = "lenient_strings")]
    pub interacted_event_ids: Option<Vec<EventId>>,
}

impl UserProfile {
    pub fn interests(&self) -> &[String] {
        self.interests_ids.as_deref().unwrap_or(&[])
    }

    /// The field of study, if it carries a non-empty id
    pub fn field_of_study(&self) -> Option<&FieldOfStudy> {
        self.field_of_study.as_ref().filter(|f| !f.id.is_empty())
    }

    pub fn countries_of_interest(&self) -> &[String] {
        self.countries_of_interest.as_deref().unwrap_or(&[])
    }

    pub fn spoken_languages(&self) -> &[String] {
        self.spoken_languages.as_deref().unwrap_or(&[])
    }

    pub fn interacted_event_ids(&self) -> &[EventId] {
        self.interacted_event_ids.as_deref().unwrap_or(&[])
    }

    /// Label used in logs
    pub fn label(&self) -> &str {
        self.user_id.as_deref().unwrap_or("anonymous")
    }
}

// =============================================================================
// Lenient field readers
// =============================================================================

fn lenient_strings<'de, D>(deserializer: D) -> Result<Option<Vec<String>>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    Ok(match value {
        Value::Array(items) => Some(
            items
                .into_iter()
                .filter_map(|item| match item {
                    Value::String(s) => Some(s),
                    _ => None,
                })
                .collect(),
        ),
        _ => None,
    })
}

fn lenient_fields_of_study<'de, D>(deserializer: D) -> Result<Option<Vec<FieldOfStudy>>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    Ok(match value {
        Value::Array(items) => Some(
            items
                .into_iter()
                .filter_map(FieldOfStudy::from_value)
                .collect(),
        ),
        _ => None,
    })
}

fn lenient_field_of_study<'de, D>(deserializer: D) -> Result<Option<FieldOfStudy>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    Ok(FieldOfStudy::from_value(value))
}

/// Only a literal `true` sets the flag
fn lenient_flag<'de, D>(deserializer: D) -> Result<bool, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    Ok(value.as_bool().unwrap_or(false))
}

fn lenient_number<'de, D>(deserializer: D) -> Result<f64, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    Ok(value.as_f64().unwrap_or(0.0))
}

fn lenient_timestamp<'de, D>(deserializer: D) -> Result<Option<i64>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    Ok(value.as_i64().or_else(|| value.as_f64().map(|f| f as i64)))
}

/// Accepts `"en"` or `{ "code": "en", ... }`
fn lenient_language<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    Ok(match value {
        Value::String(code) if !code.is_empty() => Some(code),
        Value::Object(map) => map
            .get("code")
            .and_then(Value::as_str)
            .filter(|code| !code.is_empty())
            .map(str::to_string),
        _ => None,
    })
}

//! Core domain types for the events catalog.

use chrono::NaiveDate;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};

/// Venue marker for events with no physical location.
pub const VIRTUAL_VENUE: &str = "Virtual";

// ---------------------------------------------------------------------------
// EventFormat / EventType
// ---------------------------------------------------------------------------

/// How attendees take part in an event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EventFormat {
    #[serde(rename = "In-person")]
    InPerson,
    Online,
    Hybrid,
}

impl EventFormat {
    /// Every variant, in display order.
    pub const ALL: [EventFormat; 3] = [Self::InPerson, Self::Online, Self::Hybrid];

    /// Display label, identical to the persisted form.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::InPerson => "In-person",
            Self::Online => "Online",
            Self::Hybrid => "Hybrid",
        }
    }
}

impl std::fmt::Display for EventFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Kind of gathering.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EventType {
    Conference,
    Summit,
    Workshop,
    Expo,
}

impl EventType {
    /// Every variant, in display order.
    pub const ALL: [EventType; 4] = [Self::Conference, Self::Summit, Self::Workshop, Self::Expo];

    /// Display label, identical to the persisted form.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Conference => "Conference",
            Self::Summit => "Summit",
            Self::Workshop => "Workshop",
            Self::Expo => "Expo",
        }
    }
}

impl std::fmt::Display for EventType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// Event
// ---------------------------------------------------------------------------

/// A canonical catalog entry, as persisted in the catalog document.
///
/// Optional fields are written as `null` rather than omitted so every record
/// in the published document carries the same set of keys.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Event {
    /// 1-based rank in chronological order. Reassigned on every save.
    #[serde(rename = "#", alias = "sequence_number", default)]
    pub sequence_number: u32,
    /// Official title, usually including the year.
    pub name: String,
    /// In-person, online or hybrid.
    pub format: EventFormat,
    /// "City, Country" or [`VIRTUAL_VENUE`].
    #[serde(default)]
    pub venue: String,
    /// Start date; the catalog's sort key.
    pub date: NaiveDate,
    /// Free-text tagline.
    #[serde(default)]
    pub theme: Option<String>,
    /// Conference, summit, workshop or expo.
    #[serde(rename = "type")]
    pub event_type: EventType,
    #[serde(default, deserialize_with = "optional_date")]
    pub submission_deadline: Option<NaiveDate>,
    #[serde(default, deserialize_with = "optional_date")]
    pub ticket_start_date: Option<NaiveDate>,
    #[serde(default, deserialize_with = "optional_date")]
    pub ticket_end_date: Option<NaiveDate>,
    /// Canonical homepage (scheme + host + path, no trailing slash).
    #[serde(default)]
    pub url: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub estimated_attendees: Option<u64>,
}

/// Placeholders that older catalog documents used for "no date".
const DATE_PLACEHOLDERS: [&str; 4] = ["n/a", "tba", "tbd", ""];

/// Read an optional ISO date, treating `null` and legacy placeholders as absent.
fn optional_date<'de, D>(deserializer: D) -> std::result::Result<Option<NaiveDate>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw: Option<String> = Option::deserialize(deserializer)?;
    match raw {
        None => Ok(None),
        Some(s) if DATE_PLACEHOLDERS.contains(&s.trim().to_lowercase().as_str()) => Ok(None),
        Some(s) => NaiveDate::parse_from_str(s.trim(), "%Y-%m-%d")
            .map(Some)
            .map_err(serde::de::Error::custom),
    }
}

// ---------------------------------------------------------------------------
// Fingerprint
// ---------------------------------------------------------------------------

/// Fixed-length hex identity of an event, derived from its name and date.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Fingerprint(String);

impl Fingerprint {
    /// Wrap an already-computed hex digest.
    pub fn from_hex(hex: impl Into<String>) -> Self {
        Self(hex.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for Fingerprint {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

// ---------------------------------------------------------------------------
// RawCandidate
// ---------------------------------------------------------------------------

/// An unvalidated event record as delivered by a source.
///
/// Keys are matched loosely: `"Ticket Start Date"`, `ticket-start-date` and
/// `ticket_start_date` all address the same field.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RawCandidate(Map<String, Value>);

impl RawCandidate {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a candidate from string pairs (handy for tests and CLI input).
    pub fn from_pairs<'a>(pairs: impl IntoIterator<Item = (&'a str, &'a str)>) -> Self {
        let map = pairs
            .into_iter()
            .map(|(k, v)| (k.to_string(), Value::String(v.to_string())))
            .collect();
        Self(map)
    }

    /// Set a raw field value, replacing any existing value.
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<Value>) {
        self.0.insert(key.into(), value.into());
    }

    /// Look up a field by its canonical name.
    pub fn get(&self, field: &str) -> Option<&Value> {
        self.0
            .iter()
            .find(|(k, _)| normalize_key(k) == field)
            .map(|(_, v)| v)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl From<Map<String, Value>> for RawCandidate {
    fn from(map: Map<String, Value>) -> Self {
        Self(map)
    }
}

/// Canonical form of a field key: trimmed, lowercase, `_`-separated.
pub fn normalize_key(key: &str) -> String {
    key.trim()
        .to_lowercase()
        .chars()
        .map(|c| if c == ' ' || c == '-' { '_' } else { c })
        .collect()
}

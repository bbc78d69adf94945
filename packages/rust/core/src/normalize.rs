//! Raw candidate → canonical [`Event`].
//!
//! Pure transformation. Anything the catalog cannot represent faithfully is
//! rejected with a candidate-level error instead of being guessed at:
//! unknown `format`/`type` values, unparsable dates, dates out of order.

use std::sync::LazyLock;

use chrono::{DateTime, NaiveDate, NaiveDateTime};
use regex::Regex;
use serde_json::Value;
use url::Url;

use aievents_shared::{
    CatalogError, Event, EventFormat, EventType, RawCandidate, Result, VIRTUAL_VENUE,
};

/// Values that mean "not provided" in optional fields.
const PLACEHOLDERS: [&str; 7] = ["n/a", "na", "tba", "tbd", "-", "none", "null"];

/// Date layouts accepted besides RFC 3339 timestamps.
const DATE_FORMATS: [&str; 6] = [
    "%Y-%m-%d",
    "%Y/%m/%d",
    "%B %d, %Y",
    "%b %d, %Y",
    "%d %B %Y",
    "%d %b %Y",
];

const FORMAT_VOCABULARY: [&str; 3] = ["in-person", "online", "hybrid"];
const TYPE_VOCABULARY: [&str; 4] = ["conference", "summit", "workshop", "expo"];

static WHITESPACE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\s+").expect("valid regex"));

/// Normalize one raw candidate into a catalog event.
///
/// The returned event has `sequence_number == 0`; numbering is assigned by
/// the store on save.
pub fn normalize(raw: &RawCandidate) -> Result<Event> {
    let name = text(raw, "name")?
        .ok_or_else(|| CatalogError::invalid_field("name", "missing or empty"))?;

    let date = match text(raw, "date")? {
        Some(s) => parse_date("date", &s)?,
        None => return Err(CatalogError::invalid_date("date", "missing")),
    };

    let venue = optional_text(raw, "venue")?.map(|v| normalize_venue(&v));

    let format = match optional_text(raw, "format")? {
        Some(s) => parse_format(&s)?,
        None if venue.as_deref() == Some(VIRTUAL_VENUE) => EventFormat::Online,
        None => EventFormat::InPerson,
    };

    let venue = match venue {
        Some(v) => v,
        None if format == EventFormat::Online => VIRTUAL_VENUE.to_string(),
        None => String::new(),
    };

    let event_type = match optional_text(raw, "type")? {
        Some(s) => parse_type(&s)?,
        None => EventType::Conference,
    };

    let url = match optional_text(raw, "url")? {
        Some(s) => normalize_url(&s)?,
        None => String::new(),
    };

    let event = Event {
        sequence_number: 0,
        name,
        format,
        venue,
        date,
        theme: optional_text(raw, "theme")?,
        event_type,
        submission_deadline: optional_date(raw, "submission_deadline")?,
        ticket_start_date: optional_date(raw, "ticket_start_date")?,
        ticket_end_date: optional_date(raw, "ticket_end_date")?,
        url,
        description: optional_text(raw, "description")?,
        estimated_attendees: attendees(raw)?,
    };

    check_chronology(&event)?;
    Ok(event)
}

// ---------------------------------------------------------------------------
// Field readers
// ---------------------------------------------------------------------------

/// Trimmed, whitespace-collapsed text. Empty strings and `null` are `None`.
fn text(raw: &RawCandidate, field: &str) -> Result<Option<String>> {
    let s = match raw.get(field) {
        None | Some(Value::Null) => return Ok(None),
        Some(Value::String(s)) => s.clone(),
        Some(Value::Number(n)) => n.to_string(),
        Some(Value::Bool(b)) => b.to_string(),
        Some(_) => {
            return Err(CatalogError::invalid_field(
                field,
                "expected a string or number",
            ));
        }
    };

    let collapsed = WHITESPACE_RE.replace_all(s.trim(), " ");
    if collapsed.is_empty() {
        Ok(None)
    } else {
        Ok(Some(collapsed.into_owned()))
    }
}

/// Like [`text`], but placeholder values (`N/A`, `TBD`, ...) also mean absent.
fn optional_text(raw: &RawCandidate, field: &str) -> Result<Option<String>> {
    Ok(text(raw, field)?.filter(|s| !PLACEHOLDERS.contains(&s.to_lowercase().as_str())))
}

fn optional_date(raw: &RawCandidate, field: &str) -> Result<Option<NaiveDate>> {
    optional_text(raw, field)?
        .map(|s| parse_date(field, &s))
        .transpose()
}

fn attendees(raw: &RawCandidate) -> Result<Option<u64>> {
    const FIELD: &str = "estimated_attendees";
    let invalid = || CatalogError::invalid_field(FIELD, "must be a non-negative integer");

    match raw.get(FIELD) {
        Some(Value::Number(n)) => {
            if let Some(v) = n.as_u64() {
                return Ok(Some(v));
            }
            match n.as_f64() {
                Some(f) if f >= 0.0 && f.fract() == 0.0 && f <= u64::MAX as f64 => {
                    Ok(Some(f as u64))
                }
                _ => Err(invalid()),
            }
        }
        _ => match optional_text(raw, FIELD)? {
            None => Ok(None),
            Some(s) => {
                let digits: String = s
                    .trim_end_matches('+')
                    .chars()
                    .filter(|c| !matches!(c, ',' | '_' | ' '))
                    .collect();
                digits.parse::<u64>().map(Some).map_err(|_| invalid())
            }
        },
    }
}

// ---------------------------------------------------------------------------
// Value parsers
// ---------------------------------------------------------------------------

/// Parse any accepted date form into a calendar date.
pub fn parse_date(field: &str, s: &str) -> Result<NaiveDate> {
    let s = s.trim();

    for layout in DATE_FORMATS {
        if let Ok(date) = NaiveDate::parse_from_str(s, layout) {
            return Ok(date);
        }
    }
    if let Ok(ts) = DateTime::parse_from_rfc3339(s) {
        return Ok(ts.date_naive());
    }
    if let Ok(ts) = NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M:%S") {
        return Ok(ts.date());
    }

    Err(CatalogError::invalid_date(
        field,
        format!("cannot parse {s:?} as a calendar date"),
    ))
}

/// Case-insensitive match against the format vocabulary.
pub fn parse_format(s: &str) -> Result<EventFormat> {
    match squash(s).as_str() {
        "inperson" | "onsite" | "offline" | "physical" => Ok(EventFormat::InPerson),
        "online" | "virtual" | "remote" => Ok(EventFormat::Online),
        "hybrid" => Ok(EventFormat::Hybrid),
        _ => Err(CatalogError::invalid_enum("format", s, &FORMAT_VOCABULARY)),
    }
}

/// Case-insensitive match against the event type vocabulary.
pub fn parse_type(s: &str) -> Result<EventType> {
    match squash(s).as_str() {
        "conference" | "conf" => Ok(EventType::Conference),
        "summit" => Ok(EventType::Summit),
        "workshop" => Ok(EventType::Workshop),
        "expo" | "exhibition" | "exposition" => Ok(EventType::Expo),
        _ => Err(CatalogError::invalid_enum("type", s, &TYPE_VOCABULARY)),
    }
}

/// Lowercase and drop separators: `"In Person"`, `"in-person"` → `"inperson"`.
fn squash(s: &str) -> String {
    s.chars()
        .filter(|c| !matches!(c, ' ' | '-' | '_'))
        .flat_map(char::to_lowercase)
        .collect()
}

fn normalize_venue(venue: &str) -> String {
    match venue.to_lowercase().as_str() {
        "virtual" | "online" => VIRTUAL_VENUE.to_string(),
        _ => venue.to_string(),
    }
}

/// Reduce a URL to `scheme://host[:port]/path` with a lowercase host and no
/// trailing slash. Query strings and fragments are dropped.
pub fn normalize_url(s: &str) -> Result<String> {
    let with_scheme = if s.contains("://") {
        s.to_string()
    } else {
        format!("https://{s}")
    };

    let url = Url::parse(&with_scheme)
        .map_err(|e| CatalogError::invalid_field("url", format!("{s:?}: {e}")))?;

    if !matches!(url.scheme(), "http" | "https") {
        return Err(CatalogError::invalid_field(
            "url",
            format!("unsupported scheme {:?}", url.scheme()),
        ));
    }

    let host = url
        .host_str()
        .ok_or_else(|| CatalogError::invalid_field("url", format!("{s:?} has no host")))?
        .to_lowercase();

    let port = url.port().map(|p| format!(":{p}")).unwrap_or_default();
    let path = url.path().trim_end_matches('/');

    Ok(format!("{}://{host}{port}{path}", url.scheme()))
}

/// `submission_deadline <= date`, `ticket_start <= ticket_end <= date`.
fn check_chronology(event: &Event) -> Result<()> {
    let after_event = |field: &str, d: NaiveDate| {
        CatalogError::invalid_date(field, format!("{d} is after the event date {}", event.date))
    };

    if let Some(d) = event.submission_deadline.filter(|d| *d > event.date) {
        return Err(after_event("submission_deadline", d));
    }
    if let Some(d) = event.ticket_start_date.filter(|d| *d > event.date) {
        return Err(after_event("ticket_start_date", d));
    }
    if let Some(d) = event.ticket_end_date.filter(|d| *d > event.date) {
        return Err(after_event("ticket_end_date", d));
    }
    if let (Some(start), Some(end)) = (event.ticket_start_date, event.ticket_end_date) {
        if start > end {
            return Err(CatalogError::invalid_date(
                "ticket_start_date",
                format!("{start} is after ticket_end_date {end}"),
            ));
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn raw(value: Value) -> RawCandidate {
        match value {
            Value::Object(map) => RawCandidate::from(map),
            _ => panic!("test candidate must be an object"),
        }
    }

    fn ymd(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn normalizes_full_record() {
        let event = normalize(&raw(json!({
            "name": "  NeurIPS   2025 ",
            "format": "HYBRID",
            "venue": " Vancouver, Canada ",
            "date": "2025-12-08",
            "theme": "Neural Information Processing Systems",
            "type": "conference",
            "submission_deadline": "2025-05-15",
            "ticket_start_date": "2025-08-01",
            "ticket_end_date": "2025-12-07",
            "url": "https://NeurIPS.cc/",
            "description": "",
            "estimated_attendees": 15000
        })))
        .expect("normalize");

        assert_eq!(event.name, "NeurIPS 2025");
        assert_eq!(event.format, EventFormat::Hybrid);
        assert_eq!(event.venue, "Vancouver, Canada");
        assert_eq!(event.date, ymd(2025, 12, 8));
        assert_eq!(event.event_type, EventType::Conference);
        assert_eq!(event.url, "https://neurips.cc");
        assert_eq!(event.description, None);
        assert_eq!(event.estimated_attendees, Some(15000));
        assert_eq!(event.sequence_number, 0);
    }

    #[test]
    fn placeholders_collapse_to_missing() {
        let event = normalize(&raw(json!({
            "name": "AI Summit New York 2025",
            "date": "2025-12-10",
            "format": "In-person",
            "type": "Summit",
            "submission_deadline": "N/A",
            "theme": "tbd"
        })))
        .unwrap();
        assert_eq!(event.submission_deadline, None);
        assert_eq!(event.theme, None);
    }

    #[test]
    fn missing_date_is_invalid_date() {
        let err = normalize(&raw(json!({"name": "ICML 2025"}))).unwrap_err();
        assert!(matches!(err, CatalogError::InvalidDate { .. }));
    }

    #[test]
    fn unparsable_date_is_invalid_date() {
        let err = normalize(&raw(json!({"name": "ICML 2025", "date": "mid July"}))).unwrap_err();
        assert!(matches!(err, CatalogError::InvalidDate { ref field, .. } if field == "date"));

        let err = normalize(&raw(json!({
            "name": "ICML 2025", "date": "2025-07-15", "ticket_end_date": "soon"
        })))
        .unwrap_err();
        assert!(matches!(err, CatalogError::InvalidDate { ref field, .. } if field == "ticket_end_date"));
    }

    #[test]
    fn missing_name_is_rejected() {
        let err = normalize(&raw(json!({"name": "   ", "date": "2026-01-01"}))).unwrap_err();
        assert!(matches!(err, CatalogError::InvalidField { ref field, .. } if field == "name"));
    }

    #[test]
    fn unknown_enum_values_are_hard_failures() {
        let err = normalize(&raw(json!({
            "name": "X", "date": "2026-01-01", "format": "metaverse"
        })))
        .unwrap_err();
        assert!(matches!(err, CatalogError::InvalidEnum { ref field, .. } if field == "format"));

        let err = normalize(&raw(json!({
            "name": "X", "date": "2026-01-01", "type": "meetup"
        })))
        .unwrap_err();
        assert!(matches!(err, CatalogError::InvalidEnum { ref field, .. } if field == "type"));
    }

    #[test]
    fn enum_matching_is_case_and_separator_insensitive() {
        assert_eq!(parse_format("In Person").unwrap(), EventFormat::InPerson);
        assert_eq!(parse_format("in_person").unwrap(), EventFormat::InPerson);
        assert_eq!(parse_format("Virtual").unwrap(), EventFormat::Online);
        assert_eq!(parse_type("WORKSHOP").unwrap(), EventType::Workshop);
        assert_eq!(parse_type("Exhibition").unwrap(), EventType::Expo);
    }

    #[test]
    fn accepts_common_date_layouts() {
        let expected = ymd(2026, 3, 25);
        for s in [
            "2026-03-25",
            "2026/03/25",
            "March 25, 2026",
            "Mar 25, 2026",
            "25 March 2026",
            "2026-03-25T09:00:00Z",
            "2026-03-25T09:00:00+05:30",
            "2026-03-25T09:00:00",
        ] {
            assert_eq!(parse_date("date", s).unwrap(), expected, "layout {s}");
        }
        assert!(parse_date("date", "2026-02-30").is_err());
    }

    #[test]
    fn url_variants_normalize_identically() {
        let canonical = "https://neurips.cc";
        for s in ["https://neurips.cc", "https://NEURIPS.cc/", "neurips.cc", "https://neurips.cc/#top"] {
            assert_eq!(normalize_url(s).unwrap(), canonical, "variant {s}");
        }
        assert_eq!(
            normalize_url("https://www.TensorFlow.org/dev-summit/?utm=x").unwrap(),
            "https://www.tensorflow.org/dev-summit"
        );
        assert_eq!(
            normalize_url("http://localhost:8080/events/").unwrap(),
            "http://localhost:8080/events"
        );
        assert!(normalize_url("ftp://example.com").is_err());
    }

    #[test]
    fn virtual_venue_and_format_inference() {
        let online = normalize(&raw(json!({
            "name": "TensorFlow Dev Summit 2026", "date": "2026-03-25", "format": "Online"
        })))
        .unwrap();
        assert_eq!(online.venue, VIRTUAL_VENUE);

        let inferred = normalize(&raw(json!({
            "name": "Webinar Week", "date": "2026-03-25", "venue": "online"
        })))
        .unwrap();
        assert_eq!(inferred.format, EventFormat::Online);
        assert_eq!(inferred.venue, VIRTUAL_VENUE);

        let physical = normalize(&raw(json!({"name": "Meetup", "date": "2026-03-25"}))).unwrap();
        assert_eq!(physical.format, EventFormat::InPerson);
        assert_eq!(physical.venue, "");
        assert_eq!(physical.event_type, EventType::Conference);
    }

    #[test]
    fn attendee_counts() {
        let parse = |v: Value| {
            normalize(&raw(json!({"name": "X", "date": "2026-01-01", "estimated_attendees": v})))
        };
        assert_eq!(parse(json!("15,000")).unwrap().estimated_attendees, Some(15000));
        assert_eq!(parse(json!("2000+")).unwrap().estimated_attendees, Some(2000));
        assert_eq!(parse(json!(3500.0)).unwrap().estimated_attendees, Some(3500));
        assert_eq!(parse(json!("N/A")).unwrap().estimated_attendees, None);
        assert!(parse(json!(-5)).is_err());
        assert!(parse(json!("lots")).is_err());
    }

    #[test]
    fn chronology_is_enforced() {
        let err = normalize(&raw(json!({
            "name": "X", "date": "2026-01-01", "submission_deadline": "2026-02-01"
        })))
        .unwrap_err();
        assert!(matches!(err, CatalogError::InvalidDate { .. }));

        let err = normalize(&raw(json!({
            "name": "X", "date": "2026-06-01",
            "ticket_start_date": "2026-05-01", "ticket_end_date": "2026-04-01"
        })))
        .unwrap_err();
        assert!(err.to_string().contains("ticket_end_date"));

        // Deadline on the event day is fine.
        assert!(normalize(&raw(json!({
            "name": "X", "date": "2026-01-01", "submission_deadline": "2026-01-01"
        })))
        .is_ok());
    }

    #[test]
    fn string_keys_with_loose_casing() {
        let event = normalize(&RawCandidate::from_pairs([
            ("Name", "ACL 2026"),
            ("Date", "2026-08-03"),
            ("Ticket Start Date", "2026-05-01"),
            ("FORMAT", "hybrid"),
        ]))
        .unwrap();
        assert_eq!(event.ticket_start_date, Some(ymd(2026, 5, 1)));
        assert_eq!(event.format, EventFormat::Hybrid);
    }
}

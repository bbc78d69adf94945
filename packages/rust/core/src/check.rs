//! Invariant checks for a persisted catalog.
//!
//! The merge engine maintains these on every save; hand edits to the
//! published document are what usually break them.

use std::collections::HashMap;

use aievents_shared::{Event, Fingerprint, fingerprint};

/// A broken catalog invariant.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Violation {
    /// `events[index]` starts before `events[index - 1]`.
    OutOfOrder { index: usize },
    /// `events[index]` does not carry its 1-based rank.
    BadSequence {
        index: usize,
        expected: u32,
        found: u32,
    },
    /// Two entries describe the same event.
    Duplicate {
        first: usize,
        second: usize,
        fingerprint: Fingerprint,
    },
    /// Entry with a blank name.
    EmptyName { index: usize },
    /// An optional date falls after the event, or the ticket window is inverted.
    Chronology { index: usize, field: &'static str },
}

impl std::fmt::Display for Violation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::OutOfOrder { index } => {
                write!(f, "event #{} is dated before the event preceding it", index + 1)
            }
            Self::BadSequence {
                index,
                expected,
                found,
            } => write!(
                f,
                "event at position {} has sequence number {found}, expected {expected}",
                index + 1
            ),
            Self::Duplicate {
                first,
                second,
                fingerprint,
            } => write!(
                f,
                "events at positions {} and {} share fingerprint {fingerprint}",
                first + 1,
                second + 1
            ),
            Self::EmptyName { index } => write!(f, "event at position {} has no name", index + 1),
            Self::Chronology { index, field } => write!(
                f,
                "event at position {} has `{field}` out of chronological order",
                index + 1
            ),
        }
    }
}

/// Check every catalog invariant. An empty result means the catalog is sound.
pub fn check_catalog(events: &[Event]) -> Vec<Violation> {
    let mut violations = Vec::new();
    let mut seen: HashMap<Fingerprint, usize> = HashMap::with_capacity(events.len());

    for (index, event) in events.iter().enumerate() {
        if index > 0 && events[index - 1].date > event.date {
            violations.push(Violation::OutOfOrder { index });
        }

        let expected = (index + 1) as u32;
        if event.sequence_number != expected {
            violations.push(Violation::BadSequence {
                index,
                expected,
                found: event.sequence_number,
            });
        }

        if event.name.trim().is_empty() {
            violations.push(Violation::EmptyName { index });
        }

        let fp = fingerprint(event);
        if let Some(&first) = seen.get(&fp) {
            violations.push(Violation::Duplicate {
                first,
                second: index,
                fingerprint: fp,
            });
        } else {
            seen.insert(fp, index);
        }

        for field in chronology_faults(event) {
            violations.push(Violation::Chronology { index, field });
        }
    }

    violations
}

fn chronology_faults(event: &Event) -> Vec<&'static str> {
    let mut faults = Vec::new();
    if event.submission_deadline.is_some_and(|d| d > event.date) {
        faults.push("submission_deadline");
    }
    if event.ticket_start_date.is_some_and(|d| d > event.date) {
        faults.push("ticket_start_date");
    }
    if event.ticket_end_date.is_some_and(|d| d > event.date) {
        faults.push("ticket_end_date");
    }
    if let (Some(start), Some(end)) = (event.ticket_start_date, event.ticket_end_date) {
        if start > end {
            faults.push("ticket_start_date");
        }
    }
    faults
}

#[cfg(test)]
mod tests {
    use super::*;
    use aievents_shared::{EventFormat, EventType};
    use chrono::NaiveDate;

    fn event(seq: u32, name: &str, date: &str) -> Event {
        Event {
            sequence_number: seq,
            name: name.into(),
            format: EventFormat::Online,
            venue: "Virtual".into(),
            date: NaiveDate::parse_from_str(date, "%Y-%m-%d").unwrap(),
            theme: None,
            event_type: EventType::Workshop,
            submission_deadline: None,
            ticket_start_date: None,
            ticket_end_date: None,
            url: String::new(),
            description: None,
            estimated_attendees: None,
        }
    }

    #[test]
    fn sound_catalog_has_no_violations() {
        let events = vec![
            event(1, "A", "2026-01-01"),
            event(2, "B", "2026-01-01"),
            event(3, "C", "2026-02-01"),
        ];
        assert!(check_catalog(&events).is_empty());
        assert!(check_catalog(&[]).is_empty());
    }

    #[test]
    fn detects_order_and_numbering_problems() {
        let events = vec![event(1, "B", "2026-02-01"), event(3, "A", "2026-01-01")];
        let violations = check_catalog(&events);
        assert!(violations.contains(&Violation::OutOfOrder { index: 1 }));
        assert!(violations.contains(&Violation::BadSequence {
            index: 1,
            expected: 2,
            found: 3
        }));
    }

    #[test]
    fn detects_duplicates_and_blank_names() {
        let events = vec![
            event(1, "AI Expo 2026", "2026-04-01"),
            event(2, "ai expo 2026", "2026-04-01"),
            event(3, " ", "2026-04-02"),
        ];
        let violations = check_catalog(&events);
        assert!(violations.iter().any(|v| matches!(
            v,
            Violation::Duplicate { first: 0, second: 1, .. }
        )));
        assert!(violations.contains(&Violation::EmptyName { index: 2 }));
    }

    #[test]
    fn detects_chronology_faults() {
        let mut e = event(1, "A", "2026-01-10");
        e.submission_deadline = NaiveDate::from_ymd_opt(2026, 2, 1);
        let violations = check_catalog(&[e]);
        assert_eq!(
            violations,
            vec![Violation::Chronology {
                index: 0,
                field: "submission_deadline"
            }]
        );
        assert!(violations[0].to_string().contains("submission_deadline"));
    }
}

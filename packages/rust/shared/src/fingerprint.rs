//! Event identity: a short, stable digest of an event's name and date.
//!
//! Two events are the same event iff their normalized name and start date
//! match. Other fields are left out of the key so that the
//! same event announced by two sources with drifting metadata still collides.

use chrono::NaiveDate;
use sha2::{Digest, Sha256};

use crate::types::{Event, Fingerprint};

/// Hex characters kept from the SHA-256 digest (128 bits).
pub const FINGERPRINT_HEX_LEN: usize = 32;

/// Joins name and date in the hashed key. Never survives name canonicalization
/// and never appears in an ISO date.
const KEY_SEPARATOR: char = '\u{1f}';

/// Fingerprint of a normalized event.
pub fn fingerprint(event: &Event) -> Fingerprint {
    fingerprint_parts(&event.name, event.date)
}

/// Fingerprint from a raw name and a date, for probing identity directly.
pub fn fingerprint_parts(name: &str, date: NaiveDate) -> Fingerprint {
    let key = identity_key(name, date);

    let mut hasher = Sha256::new();
    hasher.update(key.as_bytes());
    let digest = format!("{:x}", hasher.finalize());

    Fingerprint::from_hex(&digest[..FINGERPRINT_HEX_LEN])
}

/// The hashed key: canonical name, separator, ISO date.
fn identity_key(name: &str, date: NaiveDate) -> String {
    format!(
        "{}{KEY_SEPARATOR}{}",
        canonical_name(name),
        date.format("%Y-%m-%d")
    )
}

/// Lowercase the name and keep only alphanumeric characters.
pub fn canonical_name(name: &str) -> String {
    name.chars()
        .filter(|c| c.is_alphanumeric())
        .flat_map(char::to_lowercase)
        .collect()
}

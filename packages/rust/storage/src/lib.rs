//! Catalog store: the ordered, persisted collection of events.
//!
//! The [`CatalogStore`] wraps a [`CatalogBackend`] and keeps an in-memory copy
//! of the catalog plus a fingerprint index built at load time. That index is
//! the only duplicate gate.
//!
//! **Durability rules:**
//! - [`CatalogStore::load`] is the only read and [`CatalogStore::save`] the only write
//! - `append` never sorts; ordering and numbering happen once per `save`
//! - a corrupt document aborts the load, it is never replaced by an empty catalog
//! - a failed `save` rolls the in-memory catalog back to what is persisted

mod backend;

use std::collections::HashSet;

use aievents_shared::{Event, Fingerprint, Result, fingerprint};
use tracing::{debug, info, warn};

pub use backend::{CatalogBackend, JsonFileBackend, MemoryBackend, parse_document, render_document};

/// In-memory catalog bound to its durable backend.
pub struct CatalogStore<B: CatalogBackend> {
    backend: B,
    events: Vec<Event>,
    index: HashSet<Fingerprint>,
    /// `events[..persisted]` mirrors the backend; the rest are unsaved appends.
    persisted: usize,
}

impl<B: CatalogBackend> CatalogStore<B> {
    /// Read the catalog from `backend` and build the fingerprint index.
    ///
    /// A missing catalog loads as empty. An unparsable one fails with
    /// [`aievents_shared::CatalogError::CorruptStore`].
    ///
    /// Later entries that repeat an earlier fingerprint are dropped, so the
    /// next `save` writes a duplicate-free catalog.
    pub fn load(backend: B) -> Result<Self> {
        let stored = backend.read()?.unwrap_or_default();

        let mut index = HashSet::with_capacity(stored.len());
        let mut events = Vec::with_capacity(stored.len());
        for event in stored {
            if index.insert(fingerprint(&event)) {
                events.push(event);
            } else {
                warn!(
                    name = %event.name,
                    date = %event.date,
                    sequence_number = event.sequence_number,
                    "dropping duplicate catalog entry"
                );
            }
        }

        info!(
            location = %backend.location().display(),
            events = events.len(),
            "catalog loaded"
        );

        let persisted = events.len();
        Ok(Self {
            backend,
            events,
            index,
            persisted,
        })
    }

    /// O(1) membership check against the fingerprint index.
    pub fn contains(&self, fp: &Fingerprint) -> bool {
        self.index.contains(fp)
    }

    /// Add `event` to the catalog and the index, without sorting.
    ///
    /// Returns `false`, leaving the catalog untouched, when an event with the
    /// same fingerprint is already present.
    pub fn append(&mut self, event: Event) -> bool {
        let fp = fingerprint(&event);
        if !self.index.insert(fp) {
            return false;
        }
        debug!(name = %event.name, date = %event.date, "appended event");
        self.events.push(event);
        true
    }

    /// Sort, renumber and atomically persist the whole catalog.
    ///
    /// On failure the unsaved appends are discarded, leaving the store equal
    /// to the persisted catalog, so a retry sees those events as new again.
    pub fn save(&mut self) -> Result<()> {
        let mut ordered = self.events.clone();
        order_events(&mut ordered);

        if let Err(e) = self.backend.write(&ordered) {
            self.rollback();
            return Err(e);
        }

        self.events = ordered;
        self.persisted = self.events.len();
        info!(
            location = %self.backend.location().display(),
            events = self.events.len(),
            "catalog saved"
        );
        Ok(())
    }

    fn rollback(&mut self) {
        let unsaved = self.events.split_off(self.persisted);
        for event in &unsaved {
            self.index.remove(&fingerprint(event));
        }
        warn!(discarded = unsaved.len(), "save failed, unsaved events discarded");
    }

    /// Events in their current in-memory order.
    pub fn events(&self) -> &[Event] {
        &self.events
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }
}

/// Stable sort by start date, then number 1..N in that order.
pub fn order_events(events: &mut [Event]) {
    events.sort_by_key(|e| e.date);
    for (i, event) in events.iter_mut().enumerate() {
        event.sequence_number = (i + 1) as u32;
    }
}

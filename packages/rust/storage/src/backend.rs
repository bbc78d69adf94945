//! Durable backends for the catalog document.
//!
//! A backend only moves whole documents: [`CatalogBackend::read`] returns the
//! full event list (or `None` when nothing has been persisted yet) and
//! [`CatalogBackend::write`] replaces it. Ordering and identity live in
//! [`crate::CatalogStore`].

use std::fs::File;
use std::io::Write;
use std::path::{Path, PathBuf};

use aievents_shared::{CatalogError, Event, Result};
use tracing::{debug, warn};
use uuid::Uuid;

/// Storage medium for the catalog document.
pub trait CatalogBackend {
    /// Human-readable location, used in logs and error messages.
    fn location(&self) -> PathBuf;

    /// Read the persisted events. `Ok(None)` means no catalog exists yet.
    fn read(&self) -> Result<Option<Vec<Event>>>;

    /// Replace the persisted catalog with `events`, all or nothing.
    fn write(&mut self, events: &[Event]) -> Result<()>;
}

// ---------------------------------------------------------------------------
// Document codec
// ---------------------------------------------------------------------------

/// Parse a catalog document (a JSON array of events).
pub fn parse_document(location: &Path, bytes: &[u8]) -> Result<Vec<Event>> {
    let events: Vec<Event> = serde_json::from_slice(bytes)
        .map_err(|e| CatalogError::corrupt_store(location, e.to_string()))?;

    if let Some(pos) = events.iter().position(|e| e.name.trim().is_empty()) {
        return Err(CatalogError::corrupt_store(
            location,
            format!("event at index {pos} has an empty name"),
        ));
    }

    Ok(events)
}

/// Render a catalog document, pretty-printed with a trailing newline.
pub fn render_document(location: &Path, events: &[Event]) -> Result<String> {
    let mut json = serde_json::to_string_pretty(events)
        .map_err(|e| CatalogError::write_failure(location, format!("serialization failed: {e}")))?;
    json.push('\n');
    Ok(json)
}

// ---------------------------------------------------------------------------
// JsonFileBackend
// ---------------------------------------------------------------------------

/// The published catalog: one JSON file on local disk.
///
/// Writes go to a uniquely named temp file in the same directory, are synced,
/// then renamed over the target, so readers only ever see the old or the new
/// document.
#[derive(Debug, Clone)]
pub struct JsonFileBackend {
    path: PathBuf,
}

impl JsonFileBackend {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn temp_path(&self) -> PathBuf {
        let file_name = self
            .path
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_else(|| "catalog".into());
        self.path
            .with_file_name(format!(".{file_name}.{}.tmp", Uuid::now_v7()))
    }

    fn write_temp(&self, temp: &Path, contents: &str) -> std::io::Result<()> {
        let mut file = File::create(temp)?;
        file.write_all(contents.as_bytes())?;
        file.sync_all()
    }
}

impl CatalogBackend for JsonFileBackend {
    fn location(&self) -> PathBuf {
        self.path.clone()
    }

    fn read(&self) -> Result<Option<Vec<Event>>> {
        if !self.path.exists() {
            debug!(path = %self.path.display(), "no catalog on disk");
            return Ok(None);
        }

        let bytes = std::fs::read(&self.path)
            .map_err(|e| CatalogError::corrupt_store(&self.path, format!("unreadable: {e}")))?;
        parse_document(&self.path, &bytes).map(Some)
    }

    fn write(&mut self, events: &[Event]) -> Result<()> {
        let json = render_document(&self.path, events)?;

        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)
                .map_err(|e| CatalogError::write_failure(&self.path, e.to_string()))?;
        }

        let temp = self.temp_path();

        if let Err(e) = self.write_temp(&temp, &json) {
            let _ = std::fs::remove_file(&temp);
            return Err(CatalogError::write_failure(&self.path, e.to_string()));
        }

        if let Err(e) = std::fs::rename(&temp, &self.path) {
            warn!(temp = %temp.display(), error = %e, "rename failed, removing temp file");
            let _ = std::fs::remove_file(&temp);
            return Err(CatalogError::write_failure(&self.path, e.to_string()));
        }

        debug!(path = %self.path.display(), bytes = json.len(), "wrote catalog");
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// MemoryBackend
// ---------------------------------------------------------------------------

/// In-memory stand-in for the catalog file.
///
/// Holds the raw document text so corrupt input goes through the same codec
/// as the file backend. Counts writes so callers can assert no-op runs.
#[derive(Debug, Clone, Default)]
pub struct MemoryBackend {
    document: Option<String>,
    writes: usize,
    failures_left: usize,
}

impl MemoryBackend {
    /// A backend with no catalog persisted yet.
    pub fn new() -> Self {
        Self::default()
    }

    /// A backend whose persisted document is `document`, verbatim.
    pub fn with_document(document: impl Into<String>) -> Self {
        Self {
            document: Some(document.into()),
            ..Self::default()
        }
    }

    /// A backend pre-populated with `events`.
    pub fn with_events(events: &[Event]) -> Result<Self> {
        let document = render_document(Path::new("memory"), events)?;
        Ok(Self::with_document(document))
    }

    /// Make every subsequent write fail with [`CatalogError::WriteFailure`].
    pub fn failing_writes(self) -> Self {
        self.failing_next_writes(usize::MAX)
    }

    /// Make the next `count` writes fail; later writes succeed.
    pub fn failing_next_writes(mut self, count: usize) -> Self {
        self.failures_left = count;
        self
    }

    /// The current persisted document, if any.
    pub fn document(&self) -> Option<&str> {
        self.document.as_deref()
    }

    /// Number of successful writes.
    pub fn writes(&self) -> usize {
        self.writes
    }
}

impl CatalogBackend for MemoryBackend {
    fn location(&self) -> PathBuf {
        PathBuf::from("memory")
    }

    fn read(&self) -> Result<Option<Vec<Event>>> {
        match &self.document {
            None => Ok(None),
            Some(doc) => parse_document(&self.location(), doc.as_bytes()).map(Some),
        }
    }

    fn write(&mut self, events: &[Event]) -> Result<()> {
        if self.failures_left > 0 {
            self.failures_left -= 1;
            return Err(CatalogError::write_failure(
                self.location(),
                "simulated write failure",
            ));
        }
        self.document = Some(render_document(&self.location(), events)?);
        self.writes += 1;
        Ok(())
    }
}

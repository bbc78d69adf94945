//! Error types for the AI events catalog.
//!
//! Library crates use [`CatalogError`] via `thiserror`.
//! The CLI wraps this with `color-eyre` for rich diagnostics.
//!
//! Errors fall into two tiers:
//! - **candidate-level** ([`CatalogError::InvalidDate`], [`CatalogError::InvalidEnum`],
//!   [`CatalogError::InvalidField`]): one record is rejected, the batch continues
//! - **store-level** ([`CatalogError::CorruptStore`], [`CatalogError::WriteFailure`]):
//!   the run aborts and nothing is written

use std::path::PathBuf;

/// Top-level error type for all catalog operations.
#[derive(Debug, thiserror::Error)]
pub enum CatalogError {
    /// A required date is missing, or a date field cannot be parsed,
    /// or the dates of one event are out of chronological order.
    #[error("invalid date in `{field}`: {message}")]
    InvalidDate { field: String, message: String },

    /// `format` or `type` holds a value outside the fixed vocabulary.
    #[error("invalid value for `{field}`: {value:?} (expected one of: {expected})")]
    InvalidEnum {
        field: String,
        value: String,
        expected: String,
    },

    /// Any other malformed candidate field (empty name, unusable URL, ...).
    #[error("invalid `{field}`: {message}")]
    InvalidField { field: String, message: String },

    /// The persisted catalog exists but cannot be parsed.
    #[error("catalog at {path:?} is corrupt: {message}")]
    CorruptStore { path: PathBuf, message: String },

    /// The durable write did not complete; the previous catalog is intact.
    #[error("failed to write catalog to {path:?}: {message}")]
    WriteFailure { path: PathBuf, message: String },

    /// Configuration loading or validation error.
    #[error("config error: {message}")]
    Config { message: String },

    /// Network/HTTP error while fetching candidates.
    #[error("network error: {0}")]
    Network(String),

    /// A candidate source returned data that is not a list of records.
    #[error("source `{source_name}` error: {message}")]
    Source {
        source_name: String,
        message: String,
    },

    /// Filesystem I/O error.
    #[error("I/O error at {path:?}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
}

/// Convenience alias used throughout the codebase.
pub type Result<T> = std::result::Result<T, CatalogError>;

impl CatalogError {
    /// Create an invalid-date error for `field`.
    pub fn invalid_date(field: impl Into<String>, msg: impl Into<String>) -> Self {
        Self::InvalidDate {
            field: field.into(),
            message: msg.into(),
        }
    }

    /// Create an invalid-enum error listing the accepted vocabulary.
    pub fn invalid_enum(
        field: impl Into<String>,
        value: impl Into<String>,
        expected: &[&str],
    ) -> Self {
        Self::InvalidEnum {
            field: field.into(),
            value: value.into(),
            expected: expected.join(", "),
        }
    }

    /// Create an invalid-field error.
    pub fn invalid_field(field: impl Into<String>, msg: impl Into<String>) -> Self {
        Self::InvalidField {
            field: field.into(),
            message: msg.into(),
        }
    }

    /// Create a corrupt-store error for the catalog at `path`.
    pub fn corrupt_store(path: impl Into<PathBuf>, msg: impl Into<String>) -> Self {
        Self::CorruptStore {
            path: path.into(),
            message: msg.into(),
        }
    }

    /// Create a write-failure error for the catalog at `path`.
    pub fn write_failure(path: impl Into<PathBuf>, msg: impl Into<String>) -> Self {
        Self::WriteFailure {
            path: path.into(),
            message: msg.into(),
        }
    }

    /// Create a config error from any displayable message.
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config {
            message: msg.into(),
        }
    }

    /// Create a source error attributed to `source_name`.
    pub fn source(source_name: impl Into<String>, msg: impl Into<String>) -> Self {
        Self::Source {
            source_name: source_name.into(),
            message: msg.into(),
        }
    }

    /// Wrap a `std::io::Error` with a path for context.
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    /// True for errors that reject a single candidate record.
    pub fn is_candidate_level(&self) -> bool {
        matches!(
            self,
            Self::InvalidDate { .. } | Self::InvalidEnum { .. } | Self::InvalidField { .. }
        )
    }

    /// True for errors that must abort the whole run.
    pub fn is_store_level(&self) -> bool {
        matches!(self, Self::CorruptStore { .. } | Self::WriteFailure { .. })
    }
}

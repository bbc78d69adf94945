//! Shared types, error model, and configuration for the AI events catalog.
//!
//! This crate is the foundation depended on by all other `aievents` crates.
//! It provides:
//! - [`CatalogError`]: the unified error type
//! - Domain types ([`Event`], [`EventFormat`], [`EventType`], [`RawCandidate`], [`Fingerprint`])
//! - Event identity ([`fingerprint`], [`fingerprint_parts`])
//! - Configuration ([`AppConfig`], [`SourcesConfig`], config loading)

pub mod config;
pub mod error;
pub mod fingerprint;
pub mod types;

// Re-export public API at crate root for ergonomic imports.
pub use config::{
    AppConfig, CatalogConfig, SourcesConfig, config_dir, config_file_path, init_config,
    init_config_at, load_config, load_config_from,
};
pub use error::{CatalogError, Result};
pub use fingerprint::{FINGERPRINT_HEX_LEN, canonical_name, fingerprint, fingerprint_parts};
pub use types::{
    Event, EventFormat, EventType, Fingerprint, RawCandidate, VIRTUAL_VENUE, normalize_key,
};

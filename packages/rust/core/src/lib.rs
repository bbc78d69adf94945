//! Core domain logic for the AI events catalog.
//!
//! This crate ties candidate sources, normalization, and the catalog store
//! together into the end-to-end `update_catalog` workflow.

pub mod check;
pub mod merge;
pub mod normalize;
pub mod pipeline;
pub mod update;

pub use check::{Violation, check_catalog};
pub use merge::{CandidateWarning, MergeOutcome, merge};
pub use normalize::normalize;
pub use pipeline::{ProgressReporter, SilentProgress, build_sources};
pub use update::{UpdateCatalogConfig, UpdateCatalogResult, update_catalog, update_store};

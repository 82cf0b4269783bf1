//! Progressive YAML repair, schema defaulting, cross-source composition
//! resolution, quality tagging, and the curation-update pipeline
//! (spec §4.7, §4.8, §4.9, §4.11).

pub mod composition_resolver;
pub mod curation_updater;
pub mod defaulting;
pub mod error;
pub mod quality;
pub mod yaml_repair;

pub use error::RepairError;
pub use yaml_repair::{repair, RepairOutcome, RepairStage};

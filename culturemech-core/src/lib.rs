//! Recipe data model and four-layer filesystem store.
//!
//! This crate has no knowledge of ontologies, mapping, or merging; it only
//! defines the shapes every other crate in the workspace reads and writes,
//! and the directory contract (`raw/ → raw_yaml/ → normalized_yaml/ →
//! merge_yaml/`) those shapes live under.

pub mod config;
pub mod error;
pub mod model;
pub mod report;
pub mod sanitize;
pub mod store;
pub mod telemetry;

pub use config::{OntologyConfig, PipelineConfig, SourcePriority, ValidationConfig};
pub use error::CoreError;
pub use model::{
    is_placeholder_term, Concentration, ConcentrationUnit, CurationEvent, EvidenceItem, Ingredient,
    MediumType, NumericOrRange, Organism, OrganismTerm, PhysicalState, Provenance, QualityFlag,
    Recipe, RecipeCategory, Role, Solution, Synonym, Term, PLACEHOLDER_PHRASES,
};
pub use report::{RunOutcome, RunReport};
pub use sanitize::{record_filename, record_id, sanitize_filename};
pub use store::{Layer, LayerStore};

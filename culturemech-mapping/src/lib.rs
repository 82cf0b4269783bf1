//! Ingredient-to-ontology mapping cascade and SSSOM mapping-set storage
//! (spec §4.5, §4.6).

pub mod cascade;
pub mod error;
pub mod sssom;

pub use cascade::{dedup_by_confidence, map_ingredient, map_many, reverify_manual_mapping, CascadeConfig, MappingStats};
pub use error::MappingError;
pub use sssom::{MappingSet, SssomMapping};

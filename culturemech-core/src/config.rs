//! Single configuration record, loaded once and passed explicitly to every
//! component constructor (spec §9 design notes: "no globals").

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OntologyConfig {
    pub ols_base_url: String,
    pub requests_per_second: f64,
    pub max_retries: u32,
    pub request_timeout_secs: u64,
    pub fuzzy_threshold: f64,
    pub cache_dir: Option<PathBuf>,
}

impl Default for OntologyConfig {
    fn default() -> Self {
        Self {
            ols_base_url: "https://www.ebi.ac.uk/ols4/api".to_string(),
            requests_per_second: 5.0,
            max_retries: 3,
            request_timeout_secs: 30,
            fuzzy_threshold: 0.5,
            cache_dir: None,
        }
    }
}

/// Priority order used when the merger breaks canonical-name ties (spec
/// §4.10 step 3).
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SourcePriority {
    pub order: Vec<String>,
}

impl Default for SourcePriority {
    fn default() -> Self {
        Self {
            order: vec![
                "DSMZ".to_string(),
                "MediaDive".to_string(),
                "TOGO".to_string(),
                "KOMODO".to_string(),
            ],
        }
    }
}

impl SourcePriority {
    /// Lower is higher priority; unknown sources sort after all named ones.
    pub fn rank(&self, source: &str) -> usize {
        self.order
            .iter()
            .position(|s| s.eq_ignore_ascii_case(source))
            .unwrap_or(self.order.len())
    }
}

#[derive(Clone, Copy, Debug, Eq, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ValidationConfig {
    /// Whether a reference whose snippet cannot be resolved is fatal
    /// (spec §7, §9 open question on strict vs lenient reference validation).
    pub strict_references: bool,
}

impl Default for ValidationConfig {
    fn default() -> Self {
        Self {
            strict_references: true,
        }
    }
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    pub layer_root: PathBuf,
    pub ontology: OntologyConfig,
    pub source_priority: SourcePriority,
    pub validation: ValidationConfig,
    pub dry_run: bool,
}

impl PipelineConfig {
    pub fn from_toml_str(s: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(s)
    }
}

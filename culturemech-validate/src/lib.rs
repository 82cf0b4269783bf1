//! Structural, ontology-term, and reference validation of curated recipes
//! (spec §4.12).

pub mod error;
pub mod references;
pub mod report;
pub mod structural;
pub mod terms;

pub use error::ValidationError;
pub use references::{InMemoryReferenceCache, ReferenceCache};
pub use report::{CorpusReport, Issue, Severity, ValidationReport};

use culturemech_core::{PipelineConfig, Recipe};
use culturemech_cv::OntologyClient;

/// Run every validation pass over one recipe.
pub fn validate_recipe(
    recipe: &Recipe,
    client: &OntologyClient,
    reference_cache: &dyn ReferenceCache,
    config: &PipelineConfig,
) -> ValidationReport {
    let mut report = structural::check(recipe);
    terms::check(recipe, client, &mut report);
    references::check(recipe, &config.validation, reference_cache, &mut report);
    if report.has_fatal() {
        tracing::warn!(recipe_id = recipe.id.as_str(), issues = report.issues.len(), "recipe failed validation");
    }
    report
}

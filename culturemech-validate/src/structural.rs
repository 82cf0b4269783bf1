//! Structural invariant checks (spec §8): the ones that can be verified
//! without any network access, purely from the record's own shape.

use culturemech_core::{record_id, Recipe};

use crate::report::ValidationReport;

pub fn check(recipe: &Recipe) -> ValidationReport {
    let mut report = ValidationReport::new(recipe.id.clone());

    if recipe.provenance.source_db.is_empty() || recipe.provenance.source_id.is_empty() {
        report.fatal("missing_provenance", "provenance.source_db or source_id is empty");
    }

    let expected_id = record_id(&recipe.provenance.source_db, &recipe.provenance.source_id, &recipe.original_name);
    if !recipe.provenance.source_db.is_empty() && recipe.id != expected_id && recipe.merged_from.is_empty() {
        report.warn(
            "id_does_not_match_provenance",
            format!("id {} does not match sanitized SOURCE_SOURCE_ID_NAME form {expected_id}", recipe.id),
        );
    }

    if let Some(culturemech_core::NumericOrRange::Value(v)) = &recipe.ph {
        if !(0.0..=14.0).contains(v) {
            report.fatal("ph_out_of_range", format!("pH value {v} is outside [0, 14]"));
        }
    }
    if let Some(culturemech_core::NumericOrRange::Range { min, max }) = &recipe.ph {
        if min > max {
            report.fatal("ph_range_inverted", format!("pH range [{min}, {max}] has min > max"));
        }
    }

    if !recipe.merged_from.is_empty() && recipe.merge_fingerprint.is_none() {
        report.fatal("merged_without_fingerprint", "merged_from is non-empty but merge_fingerprint is absent");
    }

    if recipe.all_ingredients().count() == 0 && recipe.solutions.is_empty() {
        report.warn("no_composition", "recipe has no ingredients and no solutions");
    }

    report
}

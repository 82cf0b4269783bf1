//! Ontology-client-backed verification of resolved terms (spec §4.12 step
//! 2): every `term.id` on a curated recipe should still resolve, and its
//! stored label should still match the ontology's current label.

use culturemech_cv::OntologyClient;

use crate::report::ValidationReport;

pub fn check(recipe: &culturemech_core::Recipe, client: &OntologyClient, report: &mut ValidationReport) {
    for ingredient in recipe.all_ingredients() {
        let Some(term) = &ingredient.term else { continue };
        match client.verify(&term.id) {
            Ok(Some(result)) => {
                if result.deprecated {
                    report.warn("deprecated_term", format!("{} is marked deprecated", term.id));
                }
                if let Some(label) = &result.label {
                    if !label.eq_ignore_ascii_case(&term.label) {
                        report.warn(
                            "label_mismatch",
                            format!("{} stored label '{}' != ontology label '{label}'", term.id, term.label),
                        );
                    }
                }
            }
            Ok(None) => {
                report.fatal("id_not_found", format!("{} no longer resolves in its ontology", term.id));
            }
            Err(e) => {
                report.warn("term_verification_unavailable", format!("{}: {e}", term.id));
            }
        }
    }

    for organism in &recipe.target_organisms {
        let Some(term) = &organism.term else { continue };
        if let Err(e) = client.verify(&term.id) {
            report.warn("organism_term_verification_unavailable", format!("{}: {e}", term.id));
        }
    }
}

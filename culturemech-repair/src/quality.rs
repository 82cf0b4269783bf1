//! Idempotent data-quality tagging (spec §4.9): recomputes the full
//! `data_quality_flags` set from scratch each call, so repeated runs over an
//! already-tagged recipe never accumulate stale flags.

use culturemech_core::{QualityFlag, Recipe, SourcePriority};

/// Fraction of an ingredient list's entries carrying a resolved ontology
/// term below which a recipe is flagged `LOW_CONFIDENCE`.
const LOW_CONFIDENCE_TERM_RATIO: f64 = 0.5;

pub(crate) fn is_placeholder(ingredient: &culturemech_core::Ingredient) -> bool {
    ingredient.is_placeholder()
}

/// A "secondary scraper" (spec §4.9) is any source below the top priority
/// rank — DSMZ's own curated records are never `pending_curation` no matter
/// how sparse their term coverage, but anything scraped from a downstream
/// aggregator is (see `DESIGN.md` open question 2 for the full rationale).
fn is_secondary_scraper(source_db: &str, priority: &SourcePriority) -> bool {
    priority.rank(source_db) > 0
}

pub fn compute_flags(recipe: &Recipe, priority: &SourcePriority) -> std::collections::BTreeSet<QualityFlag> {
    let mut flags = std::collections::BTreeSet::new();

    let ingredients: Vec<_> = recipe.all_ingredients().collect();
    let incomplete = ingredients.is_empty() || ingredients.iter().any(|i| is_placeholder(i));
    if incomplete {
        flags.insert(QualityFlag::IncompleteComposition);
    }

    let no_term = !recipe.has_ontology_term();
    if recipe.target_organisms.is_empty()
        && no_term
        && is_secondary_scraper(&recipe.provenance.source_db, priority)
    {
        flags.insert(QualityFlag::PendingCuration);
    }

    if !incomplete && !ingredients.is_empty() {
        let with_term = ingredients.iter().filter(|i| i.term.is_some()).count();
        let ratio = with_term as f64 / ingredients.len() as f64;
        if ratio < LOW_CONFIDENCE_TERM_RATIO {
            flags.insert(QualityFlag::LowConfidence);
        }
    }

    flags
}

/// Recompute and overwrite `recipe.data_quality_flags` in place.
pub fn retag(recipe: &mut Recipe, priority: &SourcePriority) {
    recipe.data_quality_flags = compute_flags(recipe, priority);
}

#[cfg(test)]
mod tests {
    use super::*;
    use culturemech_core::{Concentration, Ingredient, MediumType, PhysicalState, Provenance};
    use std::collections::BTreeSet;

    fn base_recipe() -> Recipe {
        Recipe {
            id: "X_1_y".into(),
            name: "y".into(),
            original_name: "y".into(),
            categories: BTreeSet::new(),
            medium_type: MediumType::Unknown,
            physical_state: PhysicalState::Unknown,
            ph: None,
            ingredients: vec![],
            solutions: vec![],
            target_organisms: vec![],
            preparation_steps: vec![],
            evidence: vec![],
            provenance: Provenance::default(),
            curation_history: vec![],
            data_quality_flags: BTreeSet::new(),
            synonyms: vec![],
            merged_from: vec![],
            merge_fingerprint: None,
        }
    }

    #[test]
    fn empty_ingredients_flagged_incomplete() {
        let recipe = base_recipe();
        let flags = compute_flags(&recipe, &SourcePriority::default());
        assert!(flags.contains(&QualityFlag::IncompleteComposition));
    }

    #[test]
    fn placeholder_ingredient_flagged_incomplete() {
        let mut recipe = base_recipe();
        recipe.ingredients.push(Ingredient::placeholder());
        let flags = compute_flags(&recipe, &SourcePriority::default());
        assert!(flags.contains(&QualityFlag::IncompleteComposition));
    }

    #[test]
    fn real_upstream_placeholder_phrasing_flagged_incomplete() {
        let mut recipe = base_recipe();
        recipe.ingredients.push(Ingredient {
            preferred_term: "Proprietary formula".into(),
            term: None,
            concentration: None,
            role: BTreeSet::new(),
            notes: String::new(),
        });
        let flags = compute_flags(&recipe, &SourcePriority::default());
        assert!(flags.contains(&QualityFlag::IncompleteComposition));
    }

    #[test]
    fn fully_mapped_recipe_has_no_low_confidence_flag() {
        let mut recipe = base_recipe();
        recipe.ingredients.push(Ingredient {
            preferred_term: "sodium chloride".into(),
            term: Some(culturemech_core::Term {
                id: "CHEBI:26710".into(),
                label: "sodium chloride".into(),
            }),
            concentration: Some(Concentration { value: Some(5.0), unit: culturemech_core::ConcentrationUnit::GPerL }),
            role: BTreeSet::new(),
            notes: String::new(),
        });
        recipe.curation_history.push(culturemech_core::CurationEvent {
            timestamp_utc: "2024-01-01T00:00:00Z".parse().unwrap(),
            curator_id: "system".into(),
            action: "curated".into(),
            notes: String::new(),
        });
        let flags = compute_flags(&recipe, &SourcePriority::default());
        assert!(!flags.contains(&QualityFlag::LowConfidence));
        assert!(!flags.contains(&QualityFlag::IncompleteComposition));
        assert!(!flags.contains(&QualityFlag::PendingCuration));
    }

    #[test]
    fn dsmz_source_is_never_pending_curation_despite_no_terms() {
        let mut recipe = base_recipe();
        recipe.provenance.source_db = "DSMZ".to_string();
        let flags = compute_flags(&recipe, &SourcePriority::default());
        assert!(!flags.contains(&QualityFlag::PendingCuration));
    }

    #[test]
    fn secondary_scraper_with_no_organisms_or_terms_is_pending_curation() {
        let mut recipe = base_recipe();
        recipe.provenance.source_db = "KOMODO".to_string();
        let flags = compute_flags(&recipe, &SourcePriority::default());
        assert!(flags.contains(&QualityFlag::PendingCuration));
    }

    #[test]
    fn retag_is_idempotent() {
        let mut recipe = base_recipe();
        let priority = SourcePriority::default();
        retag(&mut recipe, &priority);
        let first = recipe.data_quality_flags.clone();
        retag(&mut recipe, &priority);
        assert_eq!(first, recipe.data_quality_flags);
    }
}

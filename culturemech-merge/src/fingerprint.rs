//! Recipe fingerprinting (spec §4.10 steps 1-6): reduces a recipe to a
//! stable, order-independent identity over its ingredient set so that two
//! recipes describing the same medium — possibly from different sources,
//! in a different ingredient order, with different hydration notation —
//! fingerprint identically and become merge candidates.

use std::sync::LazyLock;

use regex::Regex;
use sha2::{Digest, Sha256};

use culturemech_core::Recipe;
use culturemech_normalize::canonicalize;

static HYDRATE_SUFFIX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)[· .]*x?\d*h2o$").expect("static regex is valid"));

/// Strip a trailing hydrate notation (`·7H2O`, `.7H2O`, `x7H2O`) *before*
/// canonicalization, so that anhydrous and hydrated forms of the same salt
/// reduce to the same canonical name rather than diverging depending on
/// whether the anhydrous spelling happens to hit the formula dictionary
/// (spec §4.10 step 4).
fn strip_hydration_suffix(name: &str) -> String {
    HYDRATE_SUFFIX.replace(name, "").trim().to_string()
}

/// One ingredient's identity for fingerprinting purposes: its ontology id
/// if resolved, else its canonicalized name (spec §4.10 step 2).
fn ingredient_identity(ingredient: &culturemech_core::Ingredient) -> Option<String> {
    let raw = match &ingredient.term {
        Some(term) => term.id.clone(),
        None => canonicalize(&strip_hydration_suffix(&ingredient.preferred_term)),
    };
    if raw.is_empty() {
        return None;
    }
    Some(raw.to_ascii_lowercase())
}

/// Compute a recipe's merge fingerprint, or `None` if any ingredient lacks a
/// stable identity (a placeholder ingredient, or an unmapped name that
/// normalizes to nothing) — such a recipe is unmergeable (spec §4.10
/// step 3).
pub fn compute(recipe: &Recipe) -> Option<String> {
    let mut ids = Vec::new();
    for ingredient in recipe.all_ingredients() {
        if ingredient.is_placeholder() {
            return None;
        }
        ids.push(ingredient_identity(ingredient)?);
    }
    if ids.is_empty() {
        return None;
    }

    ids.sort();
    ids.dedup();

    let mut hasher = Sha256::new();
    hasher.update(ids.join("\n").as_bytes());
    let digest = hasher.finalize();
    Some(digest.iter().map(|b| format!("{b:02x}")).collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use culturemech_core::{Ingredient, MediumType, PhysicalState, Provenance, Term};
    use std::collections::BTreeSet;

    fn recipe_with_ingredients(ingredients: Vec<Ingredient>) -> Recipe {
        Recipe {
            id: "X_1_y".into(),
            name: "y".into(),
            original_name: "y".into(),
            categories: BTreeSet::new(),
            medium_type: MediumType::Unknown,
            physical_state: PhysicalState::Unknown,
            ph: None,
            ingredients,
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

    fn named(name: &str) -> Ingredient {
        Ingredient {
            preferred_term: name.to_string(),
            term: None,
            concentration: None,
            role: BTreeSet::new(),
            notes: String::new(),
        }
    }

    fn termed(id: &str, label: &str) -> Ingredient {
        Ingredient {
            preferred_term: label.to_string(),
            term: Some(Term { id: id.to_string(), label: label.to_string() }),
            concentration: None,
            role: BTreeSet::new(),
            notes: String::new(),
        }
    }

    #[test]
    fn identical_ingredient_sets_fingerprint_the_same_regardless_of_order() {
        let a = recipe_with_ingredients(vec![termed("CHEBI:1", "a"), termed("CHEBI:2", "b")]);
        let b = recipe_with_ingredients(vec![termed("CHEBI:2", "b"), termed("CHEBI:1", "a")]);
        assert_eq!(compute(&a), compute(&b));
    }

    #[test]
    fn placeholder_ingredient_makes_recipe_unmergeable() {
        let recipe = recipe_with_ingredients(vec![Ingredient::placeholder()]);
        assert_eq!(compute(&recipe), None);
    }

    #[test]
    fn real_upstream_placeholder_phrasing_makes_recipe_unmergeable() {
        let recipe = recipe_with_ingredients(vec![named("Contact source for formula")]);
        assert_eq!(compute(&recipe), None);
    }

    #[test]
    fn empty_ingredient_list_is_unmergeable() {
        let recipe = recipe_with_ingredients(vec![]);
        assert_eq!(compute(&recipe), None);
    }

    #[test]
    fn hydrate_and_anhydrous_forms_fingerprint_identically() {
        let hydrated_named = recipe_with_ingredients(vec![named("MgSO4.7H2O")]);
        let anhydrous_named = recipe_with_ingredients(vec![named("MgSO4")]);
        assert_eq!(compute(&hydrated_named), compute(&anhydrous_named));
    }

    #[test]
    fn ontology_term_ids_are_compared_directly() {
        let a = recipe_with_ingredients(vec![termed("CHEBI:1", "a")]);
        let b = recipe_with_ingredients(vec![termed("CHEBI:1", "a label varies")]);
        assert_eq!(compute(&a), compute(&b));
    }

    #[test]
    fn falls_back_to_canonicalized_name_without_a_term() {
        let a = recipe_with_ingredients(vec![named("Sodium Chloride")]);
        let b = recipe_with_ingredients(vec![named("sodium chloride")]);
        assert_eq!(compute(&a), compute(&b));
    }
}

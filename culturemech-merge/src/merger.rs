//! Group-and-merge (spec §4.10 steps 3-6): recipes sharing a fingerprint
//! are folded into one Layer-4 record. Canonical name, ingredient
//! composition, and provenance are drawn from the group's highest-priority
//! member; every other member contributes a synonym entry, its id to
//! `merged_from`, and (when its concentrations disagree by more than 10%)
//! a curation note flagging the disagreement rather than silently
//! discarding it.

use std::collections::BTreeSet;

use chrono::Utc;
use itertools::Itertools;

use culturemech_core::{
    Concentration, CurationEvent, QualityFlag, Recipe, SourcePriority, Synonym,
};

use crate::fingerprint;

/// Pick the group's canonical member: most common name wins; ties broken by
/// source priority, then lexicographically by id for full determinism
/// (spec §4.10 step 3).
fn pick_canonical<'a>(group: &'a [Recipe], priority: &SourcePriority) -> &'a Recipe {
    let name_counts: std::collections::HashMap<&str, usize> =
        group.iter().map(|r| r.name.as_str()).counts();

    group
        .iter()
        .min_by(|a, b| {
            let count_a = name_counts[a.name.as_str()];
            let count_b = name_counts[b.name.as_str()];
            count_b
                .cmp(&count_a)
                .then_with(|| priority.rank(&a.provenance.source_db).cmp(&priority.rank(&b.provenance.source_db)))
                .then_with(|| a.id.cmp(&b.id))
        })
        .expect("group is non-empty")
}

/// Compare a merged ingredient's concentration against the same ingredient
/// in another group member and return a note if they disagree by more than
/// 10% (spec §4.10 step 4).
fn concentration_variance_notes(canonical: &Recipe, others: &[&Recipe]) -> Vec<String> {
    let mut notes = Vec::new();
    for other in others {
        for (c_ing, o_ing) in canonical.all_ingredients().zip(other.all_ingredients()) {
            let (Some(c_conc), Some(o_conc)) = (&c_ing.concentration, &o_ing.concentration) else {
                continue;
            };
            if let Some(diff) = concentration_diff(c_conc, o_conc) {
                if diff > 0.10 {
                    notes.push(format!(
                        "{}: concentration for '{}' differs by {:.0}% between {} and {}",
                        other.id,
                        c_ing.preferred_term,
                        diff * 100.0,
                        canonical.provenance.source_db,
                        other.provenance.source_db
                    ));
                }
            }
        }
    }
    notes
}

fn concentration_diff(a: &Concentration, b: &Concentration) -> Option<f64> {
    if a.unit != b.unit {
        return None;
    }
    a.relative_difference(b)
}

/// Merge one fingerprint-group into a single Layer-4 `Recipe`.
pub fn merge_group(group: Vec<Recipe>, priority: &SourcePriority) -> Recipe {
    let fp = fingerprint::compute(&group[0]).expect("caller only groups mergeable recipes");
    let canonical_idx = {
        let canonical = pick_canonical(&group, priority);
        group.iter().position(|r| r.id == canonical.id).expect("canonical is a group member")
    };

    let mut merged = group[canonical_idx].clone();
    let others: Vec<&Recipe> = group.iter().enumerate().filter(|(i, _)| *i != canonical_idx).map(|(_, r)| r).collect();

    for other in &others {
        merged.merged_from.push(other.id.clone());
        merged.synonyms.push(Synonym {
            name: other.name.clone(),
            source: other.provenance.source_db.clone(),
            source_id: other.provenance.source_id.clone(),
            original_category: other.categories.iter().next().copied(),
        });
        merged.categories.extend(other.categories.iter().copied());
        for synonym in &other.synonyms {
            if !merged.synonyms.iter().any(|s| s.source_id == synonym.source_id && s.source == synonym.source) {
                merged.synonyms.push(synonym.clone());
            }
        }
    }
    merged.merged_from.sort();

    let variance_notes = concentration_variance_notes(&merged, &others);
    if !variance_notes.is_empty() {
        tracing::debug!(recipe_id = %merged.id, count = variance_notes.len(), "concentration variance flagged during merge");
        merged.curation_history.push(CurationEvent {
            timestamp_utc: Utc::now(),
            curator_id: "culturemech-merge".to_string(),
            action: "flag_concentration_variance".to_string(),
            notes: variance_notes.join("; "),
        });
        merged.data_quality_flags.insert(QualityFlag::LowConfidence);
    }

    merged.merge_fingerprint = Some(fp);
    merged
}

/// Group recipes by merge fingerprint and fold each group. Recipes with no
/// fingerprint pass through unmerged (spec §4.10 step 3).
pub fn merge_all(recipes: Vec<Recipe>, priority: &SourcePriority) -> Vec<Recipe> {
    let mut groups: std::collections::HashMap<String, Vec<Recipe>> = std::collections::HashMap::new();
    let mut unmergeable = Vec::new();

    for recipe in recipes {
        match fingerprint::compute(&recipe) {
            Some(fp) => groups.entry(fp).or_default().push(recipe),
            None => unmergeable.push(recipe),
        }
    }

    let mut merged: Vec<Recipe> = groups.into_values().map(|group| merge_group(group, priority)).collect();
    merged.extend(unmergeable);
    merged.sort_by(|a, b| a.id.cmp(&b.id));
    merged
}

#[cfg(test)]
mod tests {
    use super::*;
    use culturemech_core::{ConcentrationUnit, Ingredient, MediumType, PhysicalState, Provenance, RecipeCategory, Term};

    fn recipe(id: &str, source: &str, value: f64) -> Recipe {
        let mut categories = BTreeSet::new();
        categories.insert(RecipeCategory::Bacterial);
        Recipe {
            id: id.to_string(),
            name: "Marine broth".to_string(),
            original_name: "Marine broth".to_string(),
            categories,
            medium_type: MediumType::Complex,
            physical_state: PhysicalState::Liquid,
            ph: None,
            ingredients: vec![Ingredient {
                preferred_term: "sodium chloride".to_string(),
                term: Some(Term { id: "CHEBI:26710".to_string(), label: "sodium chloride".to_string() }),
                concentration: Some(Concentration { value: Some(value), unit: ConcentrationUnit::GPerL }),
                role: BTreeSet::new(),
                notes: String::new(),
            }],
            solutions: vec![],
            target_organisms: vec![],
            preparation_steps: vec![],
            evidence: vec![],
            provenance: Provenance { source_db: source.to_string(), source_id: id.to_string(), ..Provenance::default() },
            curation_history: vec![],
            data_quality_flags: BTreeSet::new(),
            synonyms: vec![],
            merged_from: vec![],
            merge_fingerprint: None,
        }
    }

    #[test]
    fn prefers_higher_priority_source_as_canonical() {
        let group = vec![recipe("KOMODO_1_a", "KOMODO", 20.0), recipe("DSMZ_1_b", "DSMZ", 20.0)];
        let merged = merge_group(group, &SourcePriority::default());
        assert_eq!(merged.provenance.source_db, "DSMZ");
        assert_eq!(merged.merged_from, vec!["KOMODO_1_a".to_string()]);
    }

    #[test]
    fn flags_concentration_disagreement_over_ten_percent() {
        let group = vec![recipe("DSMZ_1_a", "DSMZ", 20.0), recipe("TOGO_1_b", "TOGO", 30.0)];
        let merged = merge_group(group, &SourcePriority::default());
        assert!(merged.data_quality_flags.contains(&QualityFlag::LowConfidence));
        assert_eq!(merged.curation_history.len(), 1);
    }

    #[test]
    fn no_note_when_concentrations_agree() {
        let group = vec![recipe("DSMZ_1_a", "DSMZ", 20.0), recipe("TOGO_1_b", "TOGO", 20.5)];
        let merged = merge_group(group, &SourcePriority::default());
        assert!(merged.curation_history.is_empty());
    }

    #[test]
    fn unmergeable_recipes_pass_through_unmerged() {
        let mut placeholder_recipe = recipe("KOMODO_2_c", "KOMODO", 20.0);
        placeholder_recipe.ingredients = vec![Ingredient::placeholder()];
        let merged = merge_all(vec![placeholder_recipe], &SourcePriority::default());
        assert_eq!(merged.len(), 1);
        assert!(merged[0].merge_fingerprint.is_none());
    }
}

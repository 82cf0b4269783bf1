//! The core typed recipe model (spec §3).
//!
//! Enum-typed fields serialize as SCREAMING_SNAKE_CASE strings (spec §6,
//! "Layer-3 recipe file") so a Layer-3 YAML file round-trips through
//! `serde_yaml` without a custom visitor per enum.

use std::collections::BTreeSet;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One of the six category tags a recipe may carry. Multivalued after
/// merging (spec §3 Recipe.categories).
#[derive(Clone, Copy, Debug, Eq, PartialEq, Ord, PartialOrd, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RecipeCategory {
    Bacterial,
    Fungal,
    Archaea,
    Algae,
    Specialized,
    Imported,
}

#[derive(Clone, Copy, Debug, Default, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum MediumType {
    Complex,
    Defined,
    #[default]
    Unknown,
}

#[derive(Clone, Copy, Debug, Default, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PhysicalState {
    Liquid,
    Solid,
    SemiSolid,
    #[default]
    Unknown,
}

/// A numeric value or range of pH / temperature.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum NumericOrRange {
    Value(f64),
    Range { min: f64, max: f64 },
}

#[derive(Clone, Copy, Debug, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ConcentrationUnit {
    GPerL,
    MgPerL,
    Mm,
    M,
    Percent,
    Variable,
}

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Concentration {
    pub value: Option<f64>,
    pub unit: ConcentrationUnit,
}

impl Concentration {
    pub const fn variable() -> Self {
        Self {
            value: None,
            unit: ConcentrationUnit::Variable,
        }
    }

    /// Relative difference against another concentration's numeric value, if
    /// both carry a value. Used by the merger to flag >10% disagreement
    /// (spec §4.10 step 4).
    pub fn relative_difference(&self, other: &Self) -> Option<f64> {
        let (a, b) = (self.value?, other.value?);
        if a == 0.0 && b == 0.0 {
            return Some(0.0);
        }
        let denom = a.abs().max(b.abs());
        if denom == 0.0 {
            return Some(0.0);
        }
        Some((a - b).abs() / denom)
    }
}

#[derive(Clone, Copy, Debug, Eq, PartialEq, Ord, PartialOrd, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Role {
    CarbonSource,
    NitrogenSource,
    Buffer,
    Mineral,
    TraceElement,
    Vitamin,
    Other,
}

/// An ontology term reference: a CURIE plus its authoritative label.
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct Term {
    pub id: String,
    pub label: String,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Ingredient {
    pub preferred_term: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub term: Option<Term>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub concentration: Option<Concentration>,
    #[serde(default, skip_serializing_if = "BTreeSet::is_empty")]
    pub role: BTreeSet<Role>,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub notes: String,
}

/// Curated placeholder-phrase list (spec §4.9): upstream sources that omit a
/// recipe's real composition tend to say so in one of these stock phrases
/// rather than leaving `preferred_term` empty. Matched case-insensitively as
/// a substring, not an exact match, since sources wrap them in their own
/// surrounding text (e.g. "Proprietary formula, contact vendor").
pub const PLACEHOLDER_PHRASES: &[&str] = &[
    "see source",
    "refer to",
    "composition not available",
    "medium no.",
    "unknown",
    "proprietary",
    "not specified",
    "available at",
    "contact source",
];

/// True if `term` matches the synthetic placeholder this pipeline inserts,
/// or one of the curated placeholder phrases a real upstream source used
/// instead (spec §4.9).
pub fn is_placeholder_term(term: &str) -> bool {
    let lower = term.to_ascii_lowercase();
    PLACEHOLDER_PHRASES.iter().any(|phrase| lower.contains(phrase))
}

impl Ingredient {
    pub fn placeholder() -> Self {
        Self {
            preferred_term: "See source for composition".to_string(),
            term: None,
            concentration: Some(Concentration::variable()),
            role: BTreeSet::new(),
            notes: String::new(),
        }
    }

    /// Whether this ingredient is a placeholder: either the synthetic one
    /// this pipeline inserts, or real upstream text using one of the
    /// curated placeholder phrases (spec §4.9).
    pub fn is_placeholder(&self) -> bool {
        is_placeholder_term(&self.preferred_term)
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Solution {
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub volume: Option<Concentration>,
    #[serde(default)]
    pub ingredients: Vec<Ingredient>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct OrganismTerm {
    pub id: String,
    pub label: String,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Organism {
    pub preferred_term: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub term: Option<OrganismTerm>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub strain: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub community_role: Option<String>,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Provenance {
    pub source_db: String,
    pub source_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fetch_date: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub import_date: Option<DateTime<Utc>>,
    /// Structured DSMZ cross-reference, when the source records one directly
    /// instead of embedding it in free text (SPEC_FULL.md §3 supplement).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dsmz_medium_number: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cross_reference: Option<String>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct CurationEvent {
    pub timestamp_utc: DateTime<Utc>,
    pub curator_id: String,
    pub action: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub notes: String,
}

#[derive(Clone, Copy, Debug, Eq, PartialEq, Ord, PartialOrd, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum QualityFlag {
    IncompleteComposition,
    PendingCuration,
    LowConfidence,
}

/// A cited reference with a snippet that must be checked against the cited
/// paper's text by the validation driver's Reference pass (SPEC_FULL.md §3
/// supplement, spec §4.12 step 3).
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct EvidenceItem {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reference: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub snippet: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Synonym {
    pub name: String,
    pub source: String,
    pub source_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub original_category: Option<RecipeCategory>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Recipe {
    pub id: String,
    pub name: String,
    pub original_name: String,
    pub categories: BTreeSet<RecipeCategory>,
    #[serde(default)]
    pub medium_type: MediumType,
    #[serde(default)]
    pub physical_state: PhysicalState,
    #[serde(default, skip_serializing_if = "Option::is_none", rename = "pH")]
    pub ph: Option<NumericOrRange>,
    #[serde(default)]
    pub ingredients: Vec<Ingredient>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub solutions: Vec<Solution>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub target_organisms: Vec<Organism>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub preparation_steps: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub evidence: Vec<EvidenceItem>,
    pub provenance: Provenance,
    #[serde(default)]
    pub curation_history: Vec<CurationEvent>,
    #[serde(default, skip_serializing_if = "BTreeSet::is_empty")]
    pub data_quality_flags: BTreeSet<QualityFlag>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub synonyms: Vec<Synonym>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub merged_from: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub merge_fingerprint: Option<String>,
}

impl Recipe {
    /// All ingredients reachable from this recipe: its own list plus every
    /// solution's ingredient list, in declaration order (spec §4.10 step 1).
    pub fn all_ingredients(&self) -> impl Iterator<Item = &Ingredient> {
        self.ingredients
            .iter()
            .chain(self.solutions.iter().flat_map(|s| s.ingredients.iter()))
    }

    pub fn has_ontology_term(&self) -> bool {
        self.all_ingredients().any(|i| i.term.is_some())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn synthetic_placeholder_is_recognized() {
        assert!(Ingredient::placeholder().is_placeholder());
    }

    #[test]
    fn real_upstream_placeholder_phrasing_is_recognized() {
        assert!(is_placeholder_term("Proprietary formula"));
        assert!(is_placeholder_term("Contact source for details"));
        assert!(is_placeholder_term("DSM Medium no. 92"));
    }

    #[test]
    fn a_real_ingredient_name_is_not_a_placeholder() {
        assert!(!is_placeholder_term("sodium chloride"));
    }

    #[test]
    fn enum_serializes_screaming_snake_case() {
        let json = serde_json::to_string(&RecipeCategory::Bacterial).unwrap();
        assert_eq!(json, "\"BACTERIAL\"");
        let json = serde_json::to_string(&MediumType::Complex).unwrap();
        assert_eq!(json, "\"COMPLEX\"");
    }

    #[test]
    fn all_ingredients_includes_solutions() {
        let mut recipe = Recipe {
            id: "X_1_y".into(),
            name: "y".into(),
            original_name: "y".into(),
            categories: BTreeSet::new(),
            medium_type: MediumType::Unknown,
            physical_state: PhysicalState::Unknown,
            ph: None,
            ingredients: vec![Ingredient::placeholder()],
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
        };
        recipe.solutions.push(Solution {
            name: "Stock A".into(),
            volume: None,
            ingredients: vec![Ingredient {
                preferred_term: "NaCl".into(),
                term: None,
                concentration: None,
                role: BTreeSet::new(),
                notes: String::new(),
            }],
        });
        assert_eq!(recipe.all_ingredients().count(), 2);
    }
}

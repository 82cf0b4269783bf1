//! Cross-source DSMZ composition resolver (spec §4.8): many KOMODO and
//! community-submitted recipes cite a DSMZ medium number in free text
//! (preparation steps, evidence snippets) rather than a structured field.
//! This stage extracts that number, then fills in the placeholder recipe's
//! composition from the matching DSMZ recipe's, the way the teacher's
//! `mzcore::ontology::custom` module resolves a custom modification against
//! its defining database entry.

use std::collections::HashMap;
use std::sync::LazyLock;

use regex::Regex;

use culturemech_core::Recipe;

use crate::quality::is_placeholder;

static DSMZ_PDF_REFERENCE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"DSMZ_Medium(\d+)\.pdf").expect("static regex is valid"));
static DSM_INLINE_REFERENCE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)\bDSM\s*0*([1-9][0-9]*)\b").expect("static regex is valid"));

fn extract_from(text: &str) -> Option<u32> {
    if let Some(caps) = DSMZ_PDF_REFERENCE.captures(text) {
        if let Ok(n) = caps[1].parse() {
            return Some(n);
        }
    }
    if let Some(caps) = DSM_INLINE_REFERENCE.captures(text) {
        if let Ok(n) = caps[1].parse() {
            return Some(n);
        }
    }
    None
}

/// Scan a recipe's free-text fields for a DSMZ medium-number reference and,
/// if `provenance.dsmz_medium_number` is not already set, record it.
/// Returns `true` if the recipe was changed.
pub fn resolve(recipe: &mut Recipe) -> bool {
    if recipe.provenance.dsmz_medium_number.is_some() {
        return false;
    }

    let candidates = recipe
        .preparation_steps
        .iter()
        .map(String::as_str)
        .chain(recipe.evidence.iter().filter_map(|e| e.snippet.as_deref()))
        .chain(recipe.evidence.iter().filter_map(|e| e.reference.as_deref()))
        .chain(recipe.provenance.cross_reference.as_deref());

    for text in candidates {
        if let Some(number) = extract_from(text) {
            recipe.provenance.dsmz_medium_number = Some(number);
            return true;
        }
    }
    false
}

/// A recipe whose `ingredients` is absent or entirely placeholder is a
/// candidate for cross-source resolution (spec §4.8 step 2).
pub fn is_placeholder_only(recipe: &Recipe) -> bool {
    recipe.ingredients.is_empty() || recipe.ingredients.iter().all(is_placeholder)
}

/// Outcome of one resolution attempt (spec §4.8 step 2.c/2.d).
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ResolutionOutcome {
    /// Composition was copied in from the matching `source_source` recipe.
    Resolved,
    /// Recipe had full composition already, or carried no cross-reference id.
    NotApplicable,
    /// A cross-reference id was present but nothing in the index matched it.
    Unresolved { missing_id: String },
}

/// An in-memory index of a sibling source's Layer-3 recipes, keyed by
/// whatever cross-reference id links a placeholder recipe back to one of
/// them (spec §4.8 step 1).
pub struct CompositionIndex {
    by_key: HashMap<String, Recipe>,
}

impl CompositionIndex {
    /// Build the index from `recipes`, keying each one by `key_of`. Recipes
    /// `key_of` returns `None` for are simply not indexed.
    pub fn build<'a>(
        recipes: impl IntoIterator<Item = &'a Recipe>,
        key_of: impl Fn(&Recipe) -> Option<String>,
    ) -> Self {
        let by_key = recipes
            .into_iter()
            .filter_map(|r| key_of(r).map(|k| (k, r.clone())))
            .collect();
        Self { by_key }
    }

    pub fn len(&self) -> usize {
        self.by_key.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_key.is_empty()
    }
}

/// Cross-source resolution, generalized over the `(target_source,
/// source_source, id_extractor, id_lookup)` tuple named in spec §4.8: `index`
/// is the `id_lookup` half (built with a `source_source`-specific `key_of`),
/// `extract_id` is the `id_extractor` half, pulling the same cross-reference
/// key off `recipe` itself (e.g. `dsmz_key`, after [`resolve`] has populated
/// `provenance.dsmz_medium_number` from free text).
///
/// On a match, `recipe.ingredients`/`solutions` are replaced with the
/// indexed recipe's (placeholder ingredients filtered out), and a single
/// curation event is appended recording the donor recipe's id.
pub fn resolve_from_index(
    recipe: &mut Recipe,
    index: &CompositionIndex,
    extract_id: impl Fn(&Recipe) -> Option<String>,
) -> ResolutionOutcome {
    if !is_placeholder_only(recipe) {
        return ResolutionOutcome::NotApplicable;
    }
    let Some(id) = extract_id(recipe) else {
        return ResolutionOutcome::NotApplicable;
    };
    let Some(donor) = index.by_key.get(&id) else {
        return ResolutionOutcome::Unresolved { missing_id: id };
    };

    let ingredients: Vec<_> = donor.ingredients.iter().filter(|i| !is_placeholder(i)).cloned().collect();
    let solutions = donor.solutions.clone();
    let donor_id = donor.id.clone();
    crate::curation_updater::update(
        recipe,
        "composition_resolver",
        "resolve_composition",
        &format!("composition copied from {donor_id}"),
        move |r| {
            r.ingredients = ingredients;
            r.solutions = solutions;
        },
    );
    ResolutionOutcome::Resolved
}

/// The KOMODO→DSMZ cross-reference key (spec §4.8): the DSMZ medium number
/// [`resolve`] has already extracted onto `provenance.dsmz_medium_number`,
/// stringified to match [`dsmz_index_key`]'s string keys.
pub fn dsmz_key(recipe: &Recipe) -> Option<String> {
    recipe.provenance.dsmz_medium_number.map(|n| n.to_string())
}

/// Index key for a DSMZ donor recipe: its own `source_id`, which for DSMZ is
/// the medium number (the `{SOURCE}_{SOURCE_ID}_{NAME}` id format, spec §3).
pub fn dsmz_index_key(recipe: &Recipe) -> Option<String> {
    (recipe.provenance.source_db == "DSMZ").then(|| recipe.provenance.source_id.clone())
}

//! Shared Layer-3 importer scaffold (spec §4.1, §6 "Layer-3 importer
//! scaffold"): duplicate detection by `(source, source_id)` and category
//! routing, factored out so every concrete importer calls the same logic
//! instead of reimplementing it.

use std::collections::HashSet;

use culturemech_core::RecipeCategory;

/// Tracks `(SOURCE, SOURCE_ID)` pairs seen so far in an import run so a
/// re-fetched or re-submitted record can be rejected as a true duplicate
/// rather than silently overwriting an existing Layer-3 record (spec §4.1).
#[derive(Debug, Default)]
pub struct DuplicateTracker {
    seen: HashSet<(String, String)>,
}

impl DuplicateTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record `(source, source_id)`. Returns `true` if this is the first
    /// time the pair has been seen, `false` if it is a duplicate.
    pub fn observe(&mut self, source: &str, source_id: &str) -> bool {
        let first_seen = self.seen.insert((source.to_string(), source_id.to_string()));
        if !first_seen {
            tracing::warn!(source, source_id, "duplicate raw record rejected");
        }
        first_seen
    }
}

/// Upstream collections whose recipes default to a non-bacterial category
/// unless the raw record overrides it explicitly.
const ALGAE_SOURCES: &[&str] = &["UTEX", "CCAP", "SAG"];
const FUNGAL_SOURCES: &[&str] = &["MICROMEDIAPARAM"];

/// Route a raw record to a `RecipeCategory`. `hint`, when present, is the
/// source's own category label (case-insensitive) and always wins; absent
/// a hint, routing falls back to known per-source defaults, then to
/// `Imported` for anything this pipeline doesn't have a stronger opinion
/// about (spec §4.1, §3 `Recipe.categories`).
pub fn route_category(source: &str, hint: Option<&str>) -> RecipeCategory {
    if let Some(hint) = hint {
        if let Some(category) = parse_category_hint(hint) {
            return category;
        }
    }

    let upper = source.to_ascii_uppercase();
    if ALGAE_SOURCES.contains(&upper.as_str()) {
        return RecipeCategory::Algae;
    }
    if FUNGAL_SOURCES.contains(&upper.as_str()) {
        return RecipeCategory::Fungal;
    }
    RecipeCategory::Imported
}

fn parse_category_hint(hint: &str) -> Option<RecipeCategory> {
    match hint.to_ascii_lowercase().as_str() {
        "bacterial" | "bacteria" => Some(RecipeCategory::Bacterial),
        "fungal" | "fungi" | "yeast" => Some(RecipeCategory::Fungal),
        "archaea" | "archaeal" => Some(RecipeCategory::Archaea),
        "algae" | "algal" => Some(RecipeCategory::Algae),
        "specialized" => Some(RecipeCategory::Specialized),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn second_observation_of_same_pair_is_a_duplicate() {
        let mut tracker = DuplicateTracker::new();
        assert!(tracker.observe("DSMZ", "1"));
        assert!(!tracker.observe("DSMZ", "1"));
    }

    #[test]
    fn different_source_ids_are_not_duplicates() {
        let mut tracker = DuplicateTracker::new();
        assert!(tracker.observe("DSMZ", "1"));
        assert!(tracker.observe("DSMZ", "2"));
    }

    #[test]
    fn algae_collections_route_to_algae_category_by_default() {
        assert_eq!(route_category("UTEX", None), RecipeCategory::Algae);
        assert_eq!(route_category("CCAP", None), RecipeCategory::Algae);
    }

    #[test]
    fn explicit_hint_overrides_source_default() {
        assert_eq!(route_category("UTEX", Some("bacterial")), RecipeCategory::Bacterial);
    }

    #[test]
    fn unknown_source_without_hint_routes_to_imported() {
        assert_eq!(route_category("SOME_NEW_DB", None), RecipeCategory::Imported);
    }
}

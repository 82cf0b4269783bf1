//! The sole legitimate way to mutate a Layer-3 record after initial
//! normalization (spec §4.11, §8 invariant 6): every successful mutation
//! appends exactly one `CurationEvent`; a no-op mutation appends none.

use chrono::Utc;

use culturemech_core::{CurationEvent, Recipe};

/// Apply `mutator` to `recipe`. If the recipe is unchanged afterward, no
/// event is recorded and `false` is returned. Otherwise exactly one
/// `CurationEvent` is appended and `true` is returned.
pub fn update(
    recipe: &mut Recipe,
    curator_id: &str,
    action: &str,
    notes: &str,
    mutator: impl FnOnce(&mut Recipe),
) -> bool {
    let before = recipe.clone();
    mutator(recipe);
    if *recipe == before {
        return false;
    }
    recipe.curation_history.push(CurationEvent {
        timestamp_utc: Utc::now(),
        curator_id: curator_id.to_string(),
        action: action.to_string(),
        notes: notes.to_string(),
    });
    true
}

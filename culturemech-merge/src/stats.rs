//! Merge-run statistics (spec §4.10 "Reporting"): input/output counts,
//! the largest fingerprint group, and a breakdown of why recipes were
//! skipped before they ever reached fingerprinting.

use culturemech_core::Recipe;

#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct SkipCounters {
    pub no_ingredients_field: usize,
    pub no_valid_ingredients: usize,
    pub parse_error: usize,
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct MergeStats {
    pub input_recipes: usize,
    pub output_recipes: usize,
    pub cross_category_merges: usize,
    pub largest_group_size: usize,
    pub top_groups: Vec<(String, usize)>,
    pub skipped: SkipCounters,
}

impl MergeStats {
    pub fn reduction_percentage(&self) -> f64 {
        if self.input_recipes == 0 {
            return 0.0;
        }
        100.0 * (1.0 - self.output_recipes as f64 / self.input_recipes as f64)
    }
}

/// Summarize a completed merge run. `merged` is the merger's output;
/// `input_count` is the number of recipes it was given (before any were
/// dropped for parse or extraction failures, tracked separately via
/// `skipped`).
pub fn summarize(input_count: usize, merged: &[Recipe], skipped: SkipCounters) -> MergeStats {
    let cross_category_merges = merged.iter().filter(|r| r.categories.len() > 1).count();
    let largest_group_size = merged
        .iter()
        .map(|r| r.merged_from.len() + 1)
        .max()
        .unwrap_or(0);

    let mut top_groups: Vec<(String, usize)> = merged
        .iter()
        .filter(|r| !r.merged_from.is_empty())
        .map(|r| (r.name.clone(), r.merged_from.len() + 1))
        .collect();
    top_groups.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
    top_groups.truncate(10);

    MergeStats {
        input_recipes: input_count,
        output_recipes: merged.len(),
        cross_category_merges,
        largest_group_size,
        top_groups,
        skipped,
    }
}

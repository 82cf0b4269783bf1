//! Filename sanitizer for Layer 3/4 records (spec §4.1).

use std::sync::LazyLock;

use regex::Regex;

static FORBIDDEN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[^A-Za-z0-9.\-]+").expect("static regex is valid"));
static RUNS_OF_UNDERSCORE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"_{2,}").expect("static regex is valid"));

/// Replace every character outside `[A-Za-z0-9.-]` with `_`, collapse runs of
/// `_`, and strip leading/trailing `_`.
///
/// Idempotent: `sanitize_filename(sanitize_filename(x)) == sanitize_filename(x)`.
pub fn sanitize_filename(name: &str) -> String {
    let replaced = FORBIDDEN.replace_all(name, "_");
    let collapsed = RUNS_OF_UNDERSCORE.replace_all(&replaced, "_");
    collapsed.trim_matches('_').to_string()
}

/// Build the Layer-3/4 record id: `{SOURCE}_{SOURCE_ID}_{SANITIZED_NAME}`.
pub fn record_id(source: &str, source_id: &str, name: &str) -> String {
    format!(
        "{}_{}_{}",
        sanitize_filename(source),
        sanitize_filename(source_id),
        sanitize_filename(name)
    )
}

/// Build the on-disk filename for a Layer-3/4 record.
pub fn record_filename(source: &str, source_id: &str, name: &str) -> String {
    format!("{}.yaml", record_id(source, source_id, name))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn idempotent() {
        let cases = [
            "LB Medium (modified)!!",
            "α-D-Glucose / Fe2(SO4)3",
            "___leading_and_trailing___",
            "plain-name.v2",
        ];
        for case in cases {
            let once = sanitize_filename(case);
            let twice = sanitize_filename(&once);
            assert_eq!(once, twice, "not idempotent for {case:?}");
        }
    }

    #[test]
    fn collapses_runs_and_trims() {
        assert_eq!(sanitize_filename("  Hello,, World!!  "), "Hello_World");
        assert_eq!(sanitize_filename("--name"), "name");
    }

    #[test]
    fn differing_only_in_forbidden_chars_collide() {
        let a = sanitize_filename("LB Medium (1)");
        let b = sanitize_filename("LB Medium_[1]");
        assert_eq!(a, b);
    }

    #[test]
    fn record_filename_shape() {
        let f = record_filename("DSMZ", "1", "LB Medium");
        assert_eq!(f, "DSMZ_1_LB_Medium.yaml");
    }
}

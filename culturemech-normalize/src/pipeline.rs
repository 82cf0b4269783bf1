//! The 16-step deterministic normalization pipeline (spec §4.2).
//!
//! Each step is its own function so it can be unit-tested in isolation, the
//! way the teacher splits formula parsing into one module per concern
//! (`chemistry::element`, `chemistry::formula`) rather than one function
//! that does everything.

use std::sync::LazyLock;

use regex::Regex;

use crate::dictionaries::{lookup_buffer, lookup_formula};

/// Run the full 16-step pipeline and return the ordered list of search
/// variants, best-first. The first variant is the canonical normalized
/// form (spec §4.2 "Output").
pub fn normalize_for_mapping(input: &str) -> Vec<String> {
    let canonical = canonicalize(input);
    generate_variants(&canonical)
}

/// Steps 1-16, applied in order, each operating on the previous step's
/// output.
pub fn canonicalize(input: &str) -> String {
    let s = input.to_string();
    let s = step1_strip_leading_prefix(&s);
    let s = step2_remove_elemental(&s);
    let s = step3_fix_malformed_formula(&s);
    let s = step4_remove_formula_spaces(&s);
    let s = step5_greek_to_ascii(&s);
    let s = step6_stereochemistry(&s);
    let s = step7_iron_oxidation(&s);
    let s = step8_hcl_salt(&s);
    let s = step9_atom_salt(&s);
    let s = step10_buffer_expansion(&s);
    let s = step11_strip_hydrate_words(&s);
    let s = step12_strip_hydration_notation(&s);
    let s = step13_common_typos(&s);
    let s = step14_collapse_whitespace(&s);
    let s = step15_unicode_hydration_dot(&s);
    step16_formula_to_name(&s)
}

// --- Step 1: strip leading prefix symbols ("--name" -> "name") ---

fn step1_strip_leading_prefix(s: &str) -> String {
    s.trim_start_matches(|c: char| matches!(c, '-' | '*' | '>' | '<' | '#' | '•'))
        .to_string()
}

// --- Step 2: remove "Elemental" prefix ---

static ELEMENTAL_PREFIX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)^elemental\s+").expect("static regex is valid"));

fn step2_remove_elemental(s: &str) -> String {
    ELEMENTAL_PREFIX.replace(s, "").into_owned()
}

// --- Step 3: fix malformed formula notation (digits after a group that
// should be parenthesised): "NH42SO4" -> "(NH4)2SO4", "CaNO32" -> "Ca(NO3)2" ---

/// Polyatomic ions whose trailing multiplier digit is commonly left
/// unparenthesized by upstream sources.
const POLYATOMIC_IONS: &[&str] = &["NH4", "NO3", "SO4", "PO4", "HCO3", "CO3", "OH"];

fn step3_fix_malformed_formula(s: &str) -> String {
    // The `regex` crate has no lookaround, so "not already parenthesized" is
    // expressed by capturing the preceding character (or start-of-string)
    // and requiring it isn't `(`.
    let mut out = s.to_string();
    for ion in POLYATOMIC_IONS {
        let pattern = format!(r"(^|[^(])({ion})(\d)");
        if let Ok(re) = Regex::new(&pattern) {
            out = re
                .replace_all(&out, |caps: &regex::Captures| {
                    format!("{}({}){}", &caps[1], &caps[2], &caps[3])
                })
                .into_owned();
        }
    }
    out
}

// --- Step 4: remove spaces inside chemical formulas ("Fe SO4" -> "FeSO4") ---

static FORMULA_TOKEN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Za-z0-9()·]+$").expect("static regex is valid"));
static FORMULA_SHAPE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Za-z0-9()· ]+$").expect("static regex is valid"));
static HAS_DIGIT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\d").expect("static regex is valid"));

fn step4_remove_formula_spaces(s: &str) -> String {
    if !FORMULA_SHAPE.is_match(s) || !HAS_DIGIT.is_match(s) {
        return s.to_string();
    }
    let tokens: Vec<&str> = s.split(' ').collect();
    if tokens.len() < 2 || !tokens.iter().all(|t| FORMULA_TOKEN.is_match(t)) {
        return s.to_string();
    }
    tokens.concat()
}

// --- Step 5: Greek letters to ASCII ---

fn step5_greek_to_ascii(s: &str) -> String {
    s.chars()
        .map(|c| match c {
            'α' => "alpha".to_string(),
            'β' => "beta".to_string(),
            'γ' => "gamma".to_string(),
            'δ' => "delta".to_string(),
            'ε' => "epsilon".to_string(),
            'μ' => "mu".to_string(),
            other => other.to_string(),
        })
        .collect()
}

// --- Step 6: stereochemistry prefixes ---

static D_PLUS_MINUS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"D\+-").expect("static regex is valid"));
static L_PLUS_MINUS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"L\+-").expect("static regex is valid"));
static PLUS_PAREN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\(\+\)-").expect("static regex is valid"));
static MINUS_PAREN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\(-\)-").expect("static regex is valid"));
static PLUS_MINUS_PAREN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\(±\)-").expect("static regex is valid"));

fn step6_stereochemistry(s: &str) -> String {
    let s = D_PLUS_MINUS.replace_all(s, "D-");
    let s = L_PLUS_MINUS.replace_all(&s, "L-");
    // (+)- and (-)- are dropped entirely; (±)- becomes DL-. Order matters:
    // check (±)- before the bare (-)- pattern would otherwise partially match.
    let s = PLUS_MINUS_PAREN.replace_all(&s, "DL-");
    let s = PLUS_PAREN.replace_all(&s, "");
    MINUS_PAREN.replace_all(&s, "").into_owned()
}

// --- Step 7: iron oxidation notation ---

static FE_ROMAN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\bFe(I{1,3}|IV)\b").expect("static regex is valid"));
static IRON_ROMAN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\b[Ii]ron(I{1,3}|IV)\b").expect("static regex is valid"));

fn step7_iron_oxidation(s: &str) -> String {
    let s = FE_ROMAN.replace_all(s, "Fe($1)");
    IRON_ROMAN
        .replace_all(&s, |caps: &regex::Captures| format!("iron({})", &caps[1]))
        .into_owned()
}

// --- Step 8: HCl salt suffix ---

static TRAILING_HCL: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)-HCl$").expect("static regex is valid"));

fn step8_hcl_salt(s: &str) -> String {
    TRAILING_HCL.replace(s, " hydrochloride").into_owned()
}

// --- Step 9: atom-salt word expansion ("Na-benzoate" -> "sodium benzoate",
// "Na3 citrate" -> "trisodium citrate") ---

const ELEMENT_WORDS: &[(&str, &str)] = &[
    ("Na", "sodium"),
    ("K", "potassium"),
    ("Ca", "calcium"),
    ("Mg", "magnesium"),
    ("Fe", "iron"),
    ("Zn", "zinc"),
    ("Li", "lithium"),
];

const MULTIPLIER_PREFIXES: &[&str] = &["", "", "di", "tri", "tetra"];

static ATOM_SALT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^([A-Z][a-z]?)(\d?)[\s-](\w+)$").expect("static regex is valid"));

fn step9_atom_salt(s: &str) -> String {
    let Some(caps) = ATOM_SALT.captures(s) else {
        return s.to_string();
    };
    let symbol = &caps[1];
    let multiplier: usize = caps[2].parse().unwrap_or(1);
    let anion = &caps[3];

    let Some((_, word)) = ELEMENT_WORDS.iter().find(|(sym, _)| *sym == symbol) else {
        return s.to_string();
    };
    let prefix = MULTIPLIER_PREFIXES.get(multiplier).copied().unwrap_or("");
    format!("{prefix}{word} {}", anion.to_ascii_lowercase())
}

// --- Step 10: buffer expansion via curated dictionary ---

fn step10_buffer_expansion(s: &str) -> String {
    lookup_buffer(s).map(str::to_string).unwrap_or_else(|| s.to_string())
}

// --- Step 11: strip hydrate suffix words ---

const HYDRATE_WORDS: &[&str] = &[
    "monohydrate",
    "dihydrate",
    "trihydrate",
    "tetrahydrate",
    "pentahydrate",
    "hexahydrate",
    "heptahydrate",
    "octahydrate",
    "nonahydrate",
    "decahydrate",
];

fn step11_strip_hydrate_words(s: &str) -> String {
    let lower = s.to_ascii_lowercase();
    for word in HYDRATE_WORDS {
        if lower.ends_with(word) {
            let cut = s.len() - word.len();
            let trimmed = s[..cut].trim_end_matches([' ', '-']);
            return trimmed.to_string();
        }
    }
    s.to_string()
}

// --- Step 12: strip "x N H2O" / "·NH2O" hydration notation ---

static HYDRATION_NOTATION: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)[\s]*[·x][\s]*\d*[\s]*H2O\s*$").expect("static regex is valid")
});

fn step12_strip_hydration_notation(s: &str) -> String {
    HYDRATION_NOTATION.replace(s, "").trim_end().to_string()
}

// --- Step 13: common-typo fixes ---

static DOUBLE_DASH: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"--").expect("static regex is valid"));

fn step13_common_typos(s: &str) -> String {
    let s = s.replace("HC1", "HCl");
    DOUBLE_DASH.replace_all(&s, "-").into_owned()
}

// --- Step 14: collapse whitespace ---

static WHITESPACE_RUN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\s+").expect("static regex is valid"));

fn step14_collapse_whitespace(s: &str) -> String {
    WHITESPACE_RUN.replace_all(s.trim(), " ").into_owned()
}

// --- Step 15: unicode hydration-dot normalization ("・" -> "·" -> "x") ---

fn step15_unicode_hydration_dot(s: &str) -> String {
    s.replace('・', "·").replace('·', "x")
}

// --- Step 16: formula -> common name via dictionary ---

fn step16_formula_to_name(s: &str) -> String {
    lookup_formula(s).map(str::to_string).unwrap_or_else(|| s.to_string())
}

// --- Variant generation ---

/// Emit additional search variants after canonicalization: hydrate removed
/// (already the canonical form), alternative hydration spellings, HCl/
/// hydrochloride salt expansion, and a lowercased form (FOODON requires
/// lowercase, spec §4.2). Variants are deduplicated while preserving order.
fn generate_variants(canonical: &str) -> Vec<String> {
    let mut variants = vec![canonical.to_string()];

    if let Some(stripped) = canonical.strip_suffix(" hydrochloride") {
        variants.push(format!("{stripped}-HCl"));
    }
    if let Some(stripped) = canonical.strip_suffix("-HCl") {
        variants.push(format!("{stripped} hydrochloride"));
    }

    for word in HYDRATE_WORDS {
        variants.push(format!("{canonical} {word}"));
    }

    let lower = canonical.to_ascii_lowercase();
    if lower != canonical {
        variants.push(lower);
    }

    let mut seen = std::collections::HashSet::new();
    variants.retain(|v| seen.insert(v.clone()));
    variants
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strips_leading_dashes() {
        assert_eq!(step1_strip_leading_prefix("--name"), "name");
    }

    #[test]
    fn fixes_malformed_ammonium_sulfate() {
        assert_eq!(step3_fix_malformed_formula("NH42SO4"), "(NH4)2SO4");
    }

    #[test]
    fn fixes_malformed_calcium_nitrate() {
        assert_eq!(step3_fix_malformed_formula("CaNO32"), "Ca(NO3)2");
    }

    #[test]
    fn removes_formula_internal_spaces() {
        assert_eq!(step4_remove_formula_spaces("Fe SO4"), "FeSO4");
        assert_eq!(step4_remove_formula_spaces("a plain name"), "a plain name");
    }

    #[test]
    fn greek_letters_become_ascii() {
        assert_eq!(step5_greek_to_ascii("α-D-Glucose"), "alpha-D-Glucose");
    }

    #[test]
    fn iron_oxidation_gets_parens() {
        assert_eq!(step7_iron_oxidation("FeIII chloride"), "Fe(III) chloride");
        assert_eq!(step7_iron_oxidation("IronII sulfate"), "iron(II) sulfate");
    }

    #[test]
    fn hcl_suffix_expands() {
        assert_eq!(step8_hcl_salt("Thiamine-HCl"), "Thiamine hydrochloride");
    }

    #[test]
    fn atom_salt_expands_to_words() {
        assert_eq!(step9_atom_salt("Na-benzoate"), "sodium benzoate");
        assert_eq!(step9_atom_salt("Na3 citrate"), "trisodium citrate");
    }

    #[test]
    fn strips_hydrate_words() {
        assert_eq!(
            step11_strip_hydrate_words("Magnesium sulfate heptahydrate"),
            "Magnesium sulfate"
        );
    }

    #[test]
    fn scenario_alpha_d_glucose_canonical_form() {
        let canonical = canonicalize("α-D-Glucose");
        assert_eq!(canonical, "alpha-D-Glucose");
    }

    #[test]
    fn scenario_casein_has_lowercase_variant() {
        let variants = normalize_for_mapping("Casein");
        assert!(variants.contains(&"casein".to_string()));
    }

    #[test]
    fn scenario_yeast_extract_is_unchanged() {
        let canonical = canonicalize("Yeast extract");
        assert_eq!(canonical, "Yeast extract");
    }

    #[test]
    fn idempotent_on_canonical_form() {
        for input in [
            "NH42SO4",
            "Fe SO4",
            "α-D-Glucose",
            "Thiamine-HCl",
            "MgSO4·7H2O",
            "Yeast extract",
        ] {
            let once = canonicalize(input);
            let twice = canonicalize(&once);
            assert_eq!(once, twice, "not idempotent for {input:?}");
        }
    }
}

//! Static curated dictionaries (spec §4.3).
//!
//! Three maps, each a plain `&[(&str, &str)]` table checked with a linear
//! scan: the corpus these serve is in the low hundreds of entries, so the
//! table stays readable and diffable in review rather than optimized into a
//! generated `phf` map.

/// Complex biologicals with a pre-assigned FOODON/CHEBI id. Lookup is
/// case-insensitive.
pub const BIOLOGICAL_PRODUCTS: &[(&str, &str, &str)] = &[
    ("yeast extract", "FOODON:03315426", "yeast extract"),
    ("beef extract", "FOODON:03420110", "beef extract"),
    ("peptone", "FOODON:03430286", "peptone"),
    ("tryptone", "FOODON:03430354", "tryptone"),
    ("malt extract", "FOODON:03317427", "malt extract"),
    ("soytone", "FOODON:03430334", "soytone"),
    ("casamino acids", "FOODON:03430210", "casamino acids"),
    ("agar", "FOODON:03306647", "agar"),
    ("skim milk", "FOODON:03301403", "skim milk"),
    ("fish meal", "FOODON:03411091", "fish meal"),
];

/// Exact (case-sensitive) formula string to common chemical name.
pub const FORMULA_TO_NAME: &[(&str, &str)] = &[
    ("Fe2(SO4)3", "iron(III) sulfate"),
    ("FeSO4", "iron(II) sulfate"),
    ("MgSO4", "magnesium sulfate"),
    ("CaCl2", "calcium chloride"),
    ("NaCl", "sodium chloride"),
    ("KCl", "potassium chloride"),
    ("K2HPO4", "dipotassium phosphate"),
    ("KH2PO4", "potassium dihydrogen phosphate"),
    ("NH4Cl", "ammonium chloride"),
    ("(NH4)2SO4", "ammonium sulfate"),
    ("CaCO3", "calcium carbonate"),
    ("Na2CO3", "sodium carbonate"),
    ("ZnSO4", "zinc sulfate"),
    ("MnCl2", "manganese(II) chloride"),
    ("CuSO4", "copper(II) sulfate"),
    ("CoCl2", "cobalt(II) chloride"),
    ("Ca(NO3)2", "calcium nitrate"),
    ("NaNO3", "sodium nitrate"),
    ("NaHCO3", "sodium bicarbonate"),
    ("Na2HPO4", "disodium phosphate"),
];

/// Buffer abbreviation to IUPAC name.
pub const BUFFER_COMPOUNDS: &[(&str, &str)] = &[
    (
        "HEPES",
        "4-(2-hydroxyethyl)-1-piperazineethanesulfonic acid",
    ),
    ("MES", "2-(N-morpholino)ethanesulfonic acid"),
    ("MOPS", "3-(N-morpholino)propanesulfonic acid"),
    ("TRIS", "tris(hydroxymethyl)aminomethane"),
    ("PIPES", "piperazine-N,N'-bis(2-ethanesulfonic acid)"),
    ("CHES", "2-(cyclohexylamino)ethanesulfonic acid"),
    ("CAPS", "3-(cyclohexylamino)-1-propanesulfonic acid"),
    ("BIS-TRIS", "bis(2-hydroxyethyl)iminotris(hydroxymethyl)methane"),
];

/// Case-insensitive lookup into [`BIOLOGICAL_PRODUCTS`]. Returns
/// `(chebi_or_foodon_id, canonical_label)`.
pub fn lookup_biological_product(name: &str) -> Option<(&'static str, &'static str)> {
    let lower = name.to_ascii_lowercase();
    BIOLOGICAL_PRODUCTS
        .iter()
        .find(|(key, _, _)| *key == lower)
        .map(|(_, id, label)| (*id, *label))
}

/// Exact, case-sensitive lookup into [`FORMULA_TO_NAME`].
pub fn lookup_formula(formula: &str) -> Option<&'static str> {
    FORMULA_TO_NAME
        .iter()
        .find(|(key, _)| *key == formula)
        .map(|(_, name)| *name)
}

/// Case-insensitive lookup into [`BUFFER_COMPOUNDS`].
pub fn lookup_buffer(abbrev: &str) -> Option<&'static str> {
    let upper = abbrev.to_ascii_uppercase();
    BUFFER_COMPOUNDS
        .iter()
        .find(|(key, _)| *key == upper)
        .map(|(_, name)| *name)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn yeast_extract_is_curated() {
        let (id, label) = lookup_biological_product("Yeast extract").unwrap();
        assert_eq!(id, "FOODON:03315426");
        assert_eq!(label, "yeast extract");
    }

    #[test]
    fn formula_lookup_is_case_sensitive() {
        assert!(lookup_formula("Fe2(SO4)3").is_some());
        assert!(lookup_formula("fe2(so4)3").is_none());
    }

    #[test]
    fn buffer_lookup_case_insensitive() {
        assert!(lookup_buffer("hepes").is_some());
        assert!(lookup_buffer("HEPES").is_some());
    }
}

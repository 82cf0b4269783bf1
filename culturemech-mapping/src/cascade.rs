//! The five-stage ingredient-to-ontology mapping cascade (spec §4.5):
//! curated dictionary, OLS exact, OAK synonym, cross-ontology CHEBI/FOODON,
//! OLS fuzzy. Each stage only runs if the previous one produced no match.

use culturemech_cv::OntologyClient;
use culturemech_normalize::dictionaries::{lookup_biological_product, lookup_buffer, lookup_formula};
use culturemech_normalize::canonicalize;
use rayon::prelude::*;

use crate::sssom::SssomMapping;

pub const PREDICATE_EXACT: &str = "skos:exactMatch";
pub const PREDICATE_CLOSE: &str = "skos:closeMatch";
pub const PREDICATE_UNMAPPED: &str = "semapv:Unmapped";

/// `mapping_justification` values — closed enum (spec §4.6/§6): a mapping
/// carried over from curated YAML, a genuine lexical match (stages 1-2), or
/// anything weaker that still needs human review (stages 3-4, and unmapped).
const JUSTIFICATION_CURATED: &str = "semapv:ManualMappingCuration";
const JUSTIFICATION_LEXICAL: &str = "semapv:LexicalMatching";
const JUSTIFICATION_UNREVIEWED: &str = "semapv:Unreviewed";

/// `mapping_method` values — closed enum (spec §4.6/§6).
const METHOD_CURATED: &str = "curated_dictionary";
const METHOD_ONTOLOGY_EXACT: &str = "ontology_exact";
const METHOD_ONTOLOGY_FUZZY: &str = "ontology_fuzzy";

const CONFIDENCE_CURATED: f64 = 0.98;
const CONFIDENCE_OLS_EXACT: f64 = 0.95;
const CONFIDENCE_OAK_SYNONYM: f64 = 0.92;
const CONFIDENCE_CROSS_ONTOLOGY_EXACT: f64 = 0.85;
const CONFIDENCE_CROSS_ONTOLOGY_SYNONYM: f64 = 0.80;

const FUZZY_BASE_CONFIDENCE: f64 = 0.5;
const FUZZY_SCORE_WEIGHT: f64 = 0.4;
const FUZZY_CONFIDENCE_CAP: f64 = 0.89;

/// One mapping cascade's tunables: the ontology an ingredient is expected to
/// belong to, and the score floor below which a fuzzy hit is discarded
/// rather than emitted as a low-confidence mapping.
pub struct CascadeConfig<'a> {
    pub primary_ontology: &'a str,
    pub fuzzy_threshold: f64,
    pub fuzzy_limit: usize,
}

fn other_ontology(primary: &str) -> &'static str {
    if primary.eq_ignore_ascii_case("chebi") {
        "foodon"
    } else {
        "chebi"
    }
}

/// Run the cascade for a single ingredient name, returning the first
/// matching stage's mapping, or an unmapped placeholder if none matched.
pub fn map_ingredient(
    client: &OntologyClient,
    subject_id: &str,
    name: &str,
    config: &CascadeConfig,
) -> Result<SssomMapping, context_error::BoxedError<'static, crate::error::MappingError>> {
    let normalized = canonicalize(name);

    if let Some((id, label)) = lookup_biological_product(&normalized) {
        tracing::debug!(subject_id, id, "curated dictionary hit");
        return Ok(curated(subject_id, name, id, label));
    }
    if let Some(name_match) = lookup_formula(&normalized) {
        if let Some((id, label)) = lookup_biological_product(name_match) {
            return Ok(curated(subject_id, name, id, label));
        }
    }
    if let Some(expanded) = lookup_buffer(&normalized) {
        if let Some((id, label)) = lookup_biological_product(expanded) {
            return Ok(curated(subject_id, name, id, label));
        }
    }

    if let Ok(Some(term)) = client.exact(&normalized, config.primary_ontology) {
        return Ok(lexical(subject_id, name, &term.id, &term.label, CONFIDENCE_OLS_EXACT));
    }

    if let Ok(Some(term)) = client.synonym(&normalized, config.primary_ontology) {
        return Ok(lexical(subject_id, name, &term.id, &term.label, CONFIDENCE_OAK_SYNONYM));
    }

    // Stage 3: cross-ontology fallback over {CHEBI, FOODON}. FOODON's index
    // is keyed on lowercased labels, so only the FOODON query is lowercased.
    let alternate = other_ontology(config.primary_ontology);
    let cross_query = if alternate.eq_ignore_ascii_case("foodon") {
        normalized.to_lowercase()
    } else {
        normalized.clone()
    };
    if let Ok(Some(term)) = client.exact(&cross_query, alternate) {
        return Ok(cross_ontology(subject_id, name, &term.id, &term.label, CONFIDENCE_CROSS_ONTOLOGY_EXACT));
    }
    if let Ok(Some(term)) = client.synonym(&cross_query, alternate) {
        return Ok(cross_ontology(subject_id, name, &term.id, &term.label, CONFIDENCE_CROSS_ONTOLOGY_SYNONYM));
    }

    if let Ok(candidates) = client.fuzzy(&normalized, config.primary_ontology, config.fuzzy_limit) {
        if let Some(best) = candidates.into_iter().max_by(|a, b| {
            a.score.partial_cmp(&b.score).unwrap_or(std::cmp::Ordering::Equal)
        }) {
            let normalized_score = (best.score / 100.0).clamp(0.0, 1.0);
            if normalized_score >= config.fuzzy_threshold {
                let confidence =
                    (FUZZY_BASE_CONFIDENCE + FUZZY_SCORE_WEIGHT * normalized_score).min(FUZZY_CONFIDENCE_CAP);
                return Ok(SssomMapping {
                    subject_id: subject_id.to_string(),
                    subject_label: name.to_string(),
                    predicate_id: PREDICATE_CLOSE.to_string(),
                    object_id: best.id,
                    object_label: best.label,
                    mapping_justification: JUSTIFICATION_UNREVIEWED.to_string(),
                    confidence,
                    mapping_tool: "culturemech-mapping".to_string(),
                    mapping_method: Some(METHOD_ONTOLOGY_FUZZY.to_string()),
                    comment: None,
                    mapping_date: None,
                });
            }
        }
    }

    Ok(unmapped(subject_id, name))
}

fn curated(subject_id: &str, name: &str, id: &str, label: &str) -> SssomMapping {
    SssomMapping {
        subject_id: subject_id.to_string(),
        subject_label: name.to_string(),
        predicate_id: PREDICATE_EXACT.to_string(),
        object_id: id.to_string(),
        object_label: label.to_string(),
        mapping_justification: JUSTIFICATION_CURATED.to_string(),
        confidence: CONFIDENCE_CURATED,
        mapping_tool: "culturemech-mapping".to_string(),
        mapping_method: Some(METHOD_CURATED.to_string()),
        comment: None,
        mapping_date: None,
    }
}

/// Stages 1-2: an OLS exact label match or an OAK synonym match on the
/// primary ontology. Both are genuine lexical matches and both carry the
/// `skos:exactMatch` predicate (spec §4.5); only their confidence differs.
fn lexical(subject_id: &str, name: &str, id: &str, label: &str, confidence: f64) -> SssomMapping {
    SssomMapping {
        subject_id: subject_id.to_string(),
        subject_label: name.to_string(),
        predicate_id: PREDICATE_EXACT.to_string(),
        object_id: id.to_string(),
        object_label: label.to_string(),
        mapping_justification: JUSTIFICATION_LEXICAL.to_string(),
        confidence,
        mapping_tool: "culturemech-mapping".to_string(),
        mapping_method: Some(METHOD_ONTOLOGY_EXACT.to_string()),
        comment: None,
        mapping_date: None,
    }
}

/// Stage 3: a hit in the non-primary ontology. Always a `skos:closeMatch`
/// in the 0.80-0.85 band (spec §4.5), never promoted to `exactMatch`.
fn cross_ontology(subject_id: &str, name: &str, id: &str, label: &str, confidence: f64) -> SssomMapping {
    SssomMapping {
        subject_id: subject_id.to_string(),
        subject_label: name.to_string(),
        predicate_id: PREDICATE_CLOSE.to_string(),
        object_id: id.to_string(),
        object_label: label.to_string(),
        mapping_justification: JUSTIFICATION_UNREVIEWED.to_string(),
        confidence,
        mapping_tool: "culturemech-mapping".to_string(),
        mapping_method: Some(METHOD_ONTOLOGY_FUZZY.to_string()),
        comment: None,
        mapping_date: None,
    }
}

fn unmapped(subject_id: &str, name: &str) -> SssomMapping {
    SssomMapping {
        subject_id: subject_id.to_string(),
        subject_label: name.to_string(),
        predicate_id: PREDICATE_UNMAPPED.to_string(),
        object_id: String::new(),
        object_label: String::new(),
        mapping_justification: JUSTIFICATION_UNREVIEWED.to_string(),
        confidence: 0.0,
        mapping_tool: "culturemech-mapping".to_string(),
        mapping_method: None,
        comment: None,
        mapping_date: None,
    }
}

/// Re-verify a pre-existing manual mapping carried over from a prior run or
/// curated YAML (spec §4.5): a live hit on `object_id` boosts confidence to
/// 1.0; a `not_found` leaves the mapping in place but drops confidence to
/// 0.1 and records a comment; an `invalid_id` does the same, since an id
/// that no longer even parses can't be trusted either way. Mappings whose
/// method isn't `manual_curation` pass through untouched.
pub fn reverify_manual_mapping(client: &OntologyClient, mut mapping: SssomMapping) -> SssomMapping {
    if mapping.mapping_method.as_deref() != Some("manual_curation") {
        return mapping;
    }
    match client.verify(&mapping.object_id) {
        Ok(Some(_)) => mapping.confidence = 1.0,
        Ok(None) => {
            mapping.confidence = 0.1;
            mapping.comment = Some(format!("{} no longer resolves", mapping.object_id));
        }
        Err(e) if *e.kind() == culturemech_cv::CvError::InvalidId => {
            mapping.confidence = 0.1;
            mapping.comment = Some(format!("{} failed CURIE validation", mapping.object_id));
        }
        Err(_) => {}
    }
    mapping
}

/// Run the cascade across a batch of ingredients concurrently (spec §5:
/// stage boundaries are data-parallel over bounded worker pools). Safe to
/// call with a shared `client` because its cache and rate limiter are each
/// guarded by their own mutex, so concurrent callers serialize only on the
/// single OLS-facing token bucket, not on each other's work.
pub fn map_many(
    client: &OntologyClient,
    subjects: &[(String, String)],
    config: &CascadeConfig,
) -> Vec<Result<SssomMapping, context_error::BoxedError<'static, crate::error::MappingError>>> {
    subjects
        .par_iter()
        .map(|(subject_id, name)| map_ingredient(client, subject_id, name, config))
        .collect()
}

/// Deduplicate a batch of cascade results by `(subject_id, object_id)`,
/// keeping the highest-confidence mapping when the cascade is re-run across
/// overlapping recipe sets (spec §4.5).
pub fn dedup_by_confidence(mappings: Vec<SssomMapping>) -> Vec<SssomMapping> {
    use std::collections::HashMap;
    let mut best: HashMap<(String, String), SssomMapping> = HashMap::new();
    for mapping in mappings {
        let key = (mapping.subject_id.clone(), mapping.object_id.clone());
        match best.get(&key) {
            Some(existing) if existing.confidence >= mapping.confidence => {}
            _ => {
                best.insert(key, mapping);
            }
        }
    }
    let mut result: Vec<_> = best.into_values().collect();
    result.sort_by(|a, b| a.subject_id.cmp(&b.subject_id));
    result
}

#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct MappingStats {
    pub total: usize,
    pub mapped: usize,
    pub unmapped: usize,
    pub curated: usize,
    pub exact: usize,
    pub fuzzy: usize,
}

impl MappingStats {
    pub fn from_mappings(mappings: &[SssomMapping]) -> Self {
        let mut stats = Self { total: mappings.len(), ..Self::default() };
        for m in mappings {
            if m.predicate_id == PREDICATE_UNMAPPED {
                stats.unmapped += 1;
                continue;
            }
            stats.mapped += 1;
            match m.mapping_method.as_deref() {
                Some(METHOD_CURATED) => stats.curated += 1,
                Some(METHOD_ONTOLOGY_FUZZY) => stats.fuzzy += 1,
                _ => stats.exact += 1,
            }
        }
        stats
    }

    pub fn mapped_ratio(&self) -> f64 {
        if self.total == 0 {
            0.0
        } else {
            self.mapped as f64 / self.total as f64
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn mapping(subject: &str, object: &str, confidence: f64) -> SssomMapping {
        SssomMapping {
            subject_id: subject.to_string(),
            subject_label: subject.to_string(),
            predicate_id: PREDICATE_EXACT.to_string(),
            object_id: object.to_string(),
            object_label: object.to_string(),
            mapping_justification: JUSTIFICATION_LEXICAL.to_string(),
            confidence,
            mapping_tool: "test".to_string(),
            mapping_method: Some(METHOD_ONTOLOGY_EXACT.to_string()),
            comment: None,
            mapping_date: None,
        }
    }

    #[test]
    fn dedup_keeps_max_confidence() {
        let mappings = vec![mapping("ing:1", "CHEBI:1", 0.7), mapping("ing:1", "CHEBI:1", 0.95)];
        let deduped = dedup_by_confidence(mappings);
        assert_eq!(deduped.len(), 1);
        assert_eq!(deduped[0].confidence, 0.95);
    }

    #[test]
    fn stats_count_unmapped_separately() {
        let mappings = vec![unmapped("ing:2", "mystery powder"), mapping("ing:1", "CHEBI:1", 0.95)];
        let stats = MappingStats::from_mappings(&mappings);
        assert_eq!(stats.total, 2);
        assert_eq!(stats.mapped, 1);
        assert_eq!(stats.unmapped, 1);
    }

    #[test]
    fn fuzzy_confidence_never_exceeds_cap() {
        let confidence = (FUZZY_BASE_CONFIDENCE + FUZZY_SCORE_WEIGHT * 1.0).min(FUZZY_CONFIDENCE_CAP);
        assert_eq!(confidence, FUZZY_CONFIDENCE_CAP);
    }

    fn manual_mapping(object_id: &str) -> SssomMapping {
        SssomMapping {
            subject_id: "ing:1".to_string(),
            subject_label: "yeast extract".to_string(),
            predicate_id: PREDICATE_EXACT.to_string(),
            object_id: object_id.to_string(),
            object_label: "yeast extract".to_string(),
            mapping_justification: JUSTIFICATION_CURATED.to_string(),
            confidence: 0.9,
            mapping_tool: "curator".to_string(),
            mapping_method: Some("manual_curation".to_string()),
            comment: None,
            mapping_date: None,
        }
    }

    fn offline_client() -> OntologyClient {
        let dir = tempfile::tempdir().unwrap();
        OntologyClient::new(
            "http://127.0.0.1:0".to_string(),
            culturemech_cv::ResponseCache::new(dir.path()),
            1000.0,
            0,
            std::time::Duration::from_millis(50),
        )
    }

    #[test]
    fn reverify_leaves_non_manual_mappings_untouched() {
        let client = offline_client();
        let original = mapping("ing:1", "CHEBI:1", 0.95);
        let result = reverify_manual_mapping(&client, original.clone());
        assert_eq!(result, original);
    }

    #[test]
    fn reverify_demotes_a_manual_mapping_with_an_invalid_curie() {
        let client = offline_client();
        let result = reverify_manual_mapping(&client, manual_mapping("CHEBI:10716816"));
        assert_eq!(result.confidence, 0.1);
        assert!(result.comment.is_some());
    }

    #[test]
    fn map_many_preserves_order_and_resolves_curated_hits_without_network() {
        let dir = tempfile::tempdir().unwrap();
        let client = OntologyClient::new(
            "http://127.0.0.1:0".to_string(),
            culturemech_cv::ResponseCache::new(dir.path()),
            1000.0,
            0,
            std::time::Duration::from_millis(50),
        );
        let config = CascadeConfig { primary_ontology: "chebi", fuzzy_threshold: 0.8, fuzzy_limit: 5 };
        let subjects = vec![
            ("ing:1".to_string(), "yeast extract".to_string()),
            ("ing:2".to_string(), "definitely not a real compound xyzzy".to_string()),
        ];
        let results = map_many(&client, &subjects, &config);
        assert_eq!(results.len(), 2);
        let first = results[0].as_ref().unwrap();
        assert_eq!(first.subject_id, "ing:1");
        let second = results[1].as_ref().unwrap();
        assert_eq!(second.subject_id, "ing:2");
        assert_eq!(second.predicate_id, PREDICATE_UNMAPPED);
    }

    #[test]
    fn stage_three_lowercases_the_query_for_foodon_and_emits_a_close_match() {
        // "Casein" normalizes to itself (no formula-style casing rule touches
        // a plain word), so the cascade's FOODON branch must lowercase it to
        // "casein" before searching. The cache is seeded only under that
        // lowercased URL, so a match here proves the lowercasing happened.
        let dir = tempfile::tempdir().unwrap();
        let base_url = "http://127.0.0.1:0";
        let cache = culturemech_cv::ResponseCache::new(dir.path());
        let foodon_url =
            format!("{base_url}/search?q=casein&ontology=foodon&exact=true&queryFields=label,synonym");
        cache
            .put(
                "foodon",
                &foodon_url,
                r#"{"response":{"docs":[{"obo_id":"FOODON:03420180","label":"Casein","synonym":[],"is_obsolete":false}]}}"#,
            )
            .unwrap();
        let client = OntologyClient::new(base_url.to_string(), cache, 1000.0, 0, std::time::Duration::from_millis(50));
        let config = CascadeConfig { primary_ontology: "chebi", fuzzy_threshold: 0.8, fuzzy_limit: 5 };

        let result = map_ingredient(&client, "ing:1", "Casein", &config).unwrap();

        assert_eq!(result.object_id, "FOODON:03420180");
        assert_eq!(result.predicate_id, PREDICATE_CLOSE);
        assert_eq!(result.mapping_method.as_deref(), Some(METHOD_ONTOLOGY_FUZZY));
        assert!((CONFIDENCE_CROSS_ONTOLOGY_SYNONYM..=CONFIDENCE_CROSS_ONTOLOGY_EXACT).contains(&result.confidence));
    }
}

//! Reference/snippet validation (spec §4.12 step 3, §9 open question): a
//! cited reference without a verifiable snippet is fatal under the strict
//! policy and a warning otherwise; a snippet that doesn't actually appear
//! in the cited paper's text is always fatal, with no silent fallback.

use culturemech_core::{Recipe, ValidationConfig};

use crate::report::ValidationReport;

/// A read-only store of cited-reference full text/abstracts, keyed by the
/// citation string (`PMID:...`, `doi:...`) as it appears on an
/// `EvidenceItem`. Populated out-of-band by an external collaborator — the
/// core never queries a literature API itself (spec §1 Non-goals) — so this
/// validation pass only ever reads from whatever is already cached.
pub trait ReferenceCache {
    fn lookup(&self, reference: &str) -> Option<&str>;
}

/// A `ReferenceCache` backed by an in-memory map, for callers that have
/// already resolved the references they need (e.g. a pre-fetch step, or
/// tests). `culturemech_cv::ResponseCache`'s on-disk JSON-blob shape is the
/// natural backing store for a real deployment; this crate does not depend
/// on `culturemech-cv` itself, so it only defines the trait.
#[derive(Clone, Debug, Default)]
pub struct InMemoryReferenceCache {
    texts: std::collections::HashMap<String, String>,
}

impl InMemoryReferenceCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, reference: impl Into<String>, text: impl Into<String>) {
        self.texts.insert(reference.into(), text.into());
    }
}

impl ReferenceCache for InMemoryReferenceCache {
    fn lookup(&self, reference: &str) -> Option<&str> {
        self.texts.get(reference).map(String::as_str)
    }
}

pub fn check(recipe: &Recipe, config: &ValidationConfig, cache: &dyn ReferenceCache, report: &mut ValidationReport) {
    for evidence in &recipe.evidence {
        let has_reference = evidence.reference.as_deref().is_some_and(|s| !s.is_empty());
        let has_snippet = evidence.snippet.as_deref().is_some_and(|s| !s.is_empty());

        if has_reference && !has_snippet {
            let message = format!(
                "evidence cites '{}' with no supporting snippet",
                evidence.reference.as_deref().unwrap_or_default()
            );
            if config.strict_references {
                report.fatal("unverifiable_reference", message);
            } else {
                report.warn("unverifiable_reference", message);
            }
            continue;
        }

        if has_snippet && !has_reference {
            report.warn("orphan_snippet", "evidence has a snippet with no cited reference");
            continue;
        }

        if has_reference && has_snippet {
            let reference = evidence.reference.as_deref().unwrap_or_default();
            let snippet = evidence.snippet.as_deref().unwrap_or_default();
            match cache.lookup(reference) {
                Some(text) if text.contains(snippet) => {}
                Some(_) => {
                    report.fatal(
                        "snippet_not_found",
                        format!("snippet does not appear in the cached text for '{reference}'"),
                    );
                }
                None => {
                    let message = format!("no cached text available to verify reference '{reference}'");
                    if config.strict_references {
                        report.fatal("reference_cache_miss", message);
                    } else {
                        report.warn("reference_cache_miss", message);
                    }
                }
            }
        }
    }
}

//! Cached, rate-limited client for OLS (`https://www.ebi.ac.uk/ols4/api`)
//! and OAK local indices (spec §4.4).
//!
//! OAK itself is a Python tool with local on-disk indices; this crate does
//! not embed it. [`OntologyClient::synonym`] issues the same kind of search
//! request as [`OntologyClient::exact`] against OLS's synonym-aware search
//! endpoint, which is the closest network-reachable equivalent to an OAK
//! synonym lookup and is what the mapping cascade's stage 2 (spec §4.5)
//! actually needs: an exact match against a *synonym* rather than the
//! preferred label.

use std::sync::Mutex;
use std::time::Duration;

use context_error::{BoxedError, Context, CreateError};
use serde::Deserialize;

use crate::cache::ResponseCache;
use crate::curie::Curie;
use crate::error::CvError;
use crate::rate_limit::TokenBucket;

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
enum ApiVersion {
    V3,
    V4,
}

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct OntologyTerm {
    pub id: String,
    pub label: String,
    pub synonyms: Vec<String>,
}

#[derive(Clone, Debug, PartialEq)]
pub struct FuzzyCandidate {
    pub id: String,
    pub label: String,
    /// Source relevance score in `[0, 100]` (spec §4.4).
    pub score: f64,
}

#[derive(Clone, Debug, PartialEq)]
pub struct VerifyResult {
    pub valid: bool,
    pub label: Option<String>,
    pub synonyms: Vec<String>,
    pub formula: Option<String>,
    pub deprecated: bool,
}

#[derive(Debug, Deserialize)]
struct OlsDoc {
    #[serde(default)]
    obo_id: Option<String>,
    #[serde(default)]
    label: Option<String>,
    #[serde(default)]
    synonym: Vec<String>,
    #[serde(default)]
    is_obsolete: bool,
    #[serde(default)]
    chebi_formula: Option<String>,
}

#[derive(Debug, Deserialize)]
struct OlsResponseBody {
    #[serde(default)]
    docs: Vec<OlsDoc>,
}

#[derive(Debug, Deserialize)]
struct OlsSearchResponse {
    response: OlsResponseBody,
}

pub struct OntologyClient {
    http: reqwest::blocking::Client,
    cache: ResponseCache,
    limiter: TokenBucket,
    base_url: String,
    max_retries: u32,
    api_version: Mutex<Option<ApiVersion>>,
}

impl OntologyClient {
    pub fn new(
        base_url: impl Into<String>,
        cache: ResponseCache,
        requests_per_second: f64,
        max_retries: u32,
        timeout: Duration,
    ) -> Self {
        Self {
            http: reqwest::blocking::Client::builder()
                .timeout(timeout)
                .build()
                .expect("reqwest client configuration is valid"),
            cache,
            limiter: TokenBucket::new(requests_per_second),
            base_url: base_url.into(),
            max_retries,
            api_version: Mutex::new(None),
        }
    }

    /// Probe for OLS v4 vs v3 endpoint shape at first use and cache the
    /// choice (spec §4.4).
    fn api_version(&self, ontology: &str) -> ApiVersion {
        if let Some(v) = *self.api_version.lock().expect("api_version mutex poisoned") {
            return v;
        }
        let probe_url = format!("{}/api/v2/ontologies/{ontology}", self.base_url);
        let version = match self.send_raw(&probe_url) {
            Ok(_) => ApiVersion::V4,
            Err(_) => ApiVersion::V3,
        };
        *self.api_version.lock().expect("api_version mutex poisoned") = Some(version);
        version
    }

    fn search_url(&self, ontology: &str, query: &str, exact: bool) -> String {
        match self.api_version(ontology) {
            ApiVersion::V4 => format!(
                "{}/api/v2/entities?search={}&ontologyId={ontology}&exactMatch={exact}",
                self.base_url,
                urlencode(query)
            ),
            ApiVersion::V3 => format!(
                "{}/search?q={}&ontology={ontology}&exact={exact}&queryFields=label,synonym",
                self.base_url,
                urlencode(query)
            ),
        }
    }

    /// OLS exact label match on `name` (spec §4.5 stage 1).
    pub fn exact(
        &self,
        name: &str,
        ontology: &str,
    ) -> Result<Option<OntologyTerm>, BoxedError<'static, CvError>> {
        let url = self.search_url(ontology, name, true);
        let body = self.get_cached_or_fetch(ontology, &url)?;
        let docs = parse_search_docs(&body)?;
        Ok(docs
            .into_iter()
            .find(|d| d.label.as_deref().is_some_and(|l| l.eq_ignore_ascii_case(name)))
            .and_then(doc_into_term))
    }

    /// Exact synonym match (spec §4.5 stage 2) — see module docs.
    pub fn synonym(
        &self,
        name: &str,
        ontology: &str,
    ) -> Result<Option<OntologyTerm>, BoxedError<'static, CvError>> {
        let url = self.search_url(ontology, name, false);
        let body = self.get_cached_or_fetch(ontology, &url)?;
        let docs = parse_search_docs(&body)?;
        Ok(docs
            .into_iter()
            .find(|d| d.synonym.iter().any(|s| s.eq_ignore_ascii_case(name)))
            .and_then(doc_into_term))
    }

    /// Top-N fuzzy candidates, ordered best-first, with a relevance score in
    /// `[0, 100]` (spec §4.4, §4.5 stage 4).
    pub fn fuzzy(
        &self,
        name: &str,
        ontology: &str,
        limit: usize,
    ) -> Result<Vec<FuzzyCandidate>, BoxedError<'static, CvError>> {
        let url = self.search_url(ontology, name, false);
        let body = self.get_cached_or_fetch(ontology, &url)?;
        let docs = parse_search_docs(&body)?;
        let total = docs.len().max(1);
        Ok(docs
            .into_iter()
            .enumerate()
            .take(limit)
            .filter_map(|(rank, doc)| {
                let id = doc.obo_id?;
                let label = doc.label.unwrap_or_default();
                // Relative-rank score: the search endpoint itself returns
                // results best-first but not a numeric score, so rank is
                // converted into a monotonic [0, 100] scale.
                let score = 100.0 * (1.0 - rank as f64 / total as f64);
                Some(FuzzyCandidate { id, label, score })
            })
            .collect())
    }

    /// Verify a CURIE resolves and fetch its authoritative label/synonyms
    /// (spec §4.4). Invalid CURIEs never reach the network (spec §8
    /// invariant 7).
    pub fn verify(
        &self,
        curie: &str,
    ) -> Result<Option<VerifyResult>, BoxedError<'static, CvError>> {
        let Some(parsed) = Curie::parse(curie) else {
            return Err(invalid_id(curie));
        };
        if !parsed.validate().is_valid_for_network() {
            return Err(invalid_id(curie));
        }

        let ontology = parsed.prefix.to_ascii_lowercase();
        let url = format!(
            "{}/api/v2/ontologies/{ontology}/terms?obo_id={}",
            self.base_url,
            urlencode(&parsed.to_string_curie())
        );
        let body = self.get_cached_or_fetch(&ontology, &url)?;
        let docs = parse_search_docs(&body)?;
        Ok(docs.into_iter().next().map(|doc| VerifyResult {
            valid: true,
            label: doc.label,
            synonyms: doc.synonym,
            formula: doc.chebi_formula,
            deprecated: doc.is_obsolete,
        }))
    }

    fn get_cached_or_fetch(
        &self,
        ontology: &str,
        url: &str,
    ) -> Result<String, BoxedError<'static, CvError>> {
        if let Some(cached) = self.cache.get(ontology, url) {
            tracing::debug!(ontology, url, "cache hit");
            return Ok(cached);
        }
        let body = self.send_with_retry(url)?;
        // Cache writes are best-effort: a failure to persist the cache entry
        // must not fail the call that already has a good response.
        let _ = self.cache.put(ontology, url, &body);
        Ok(body)
    }

    fn send_raw(&self, url: &str) -> Result<String, BoxedError<'static, CvError>> {
        self.limiter.acquire();
        let response = self.http.get(url).send().map_err(|e| network_error(url, &e))?;
        if !response.status().is_success() {
            return Err(network_error(url, &response.status()));
        }
        response.text().map_err(|e| network_error(url, &e))
    }

    fn send_with_retry(&self, url: &str) -> Result<String, BoxedError<'static, CvError>> {
        let mut attempt = 0;
        loop {
            self.limiter.acquire();
            let result = self.http.get(url).send();
            match result {
                Ok(response) if response.status().is_success() => {
                    return response.text().map_err(|e| network_error(url, &e));
                }
                Ok(response)
                    if (response.status().as_u16() == 429 || response.status().is_server_error())
                        && attempt < self.max_retries =>
                {
                    attempt += 1;
                    tracing::warn!(url, attempt, status = response.status().as_u16(), "retrying after backoff");
                    std::thread::sleep(Duration::from_millis(200 * 2u64.pow(attempt)));
                }
                Ok(response) => return Err(network_error(url, &response.status())),
                Err(_) if attempt < self.max_retries => {
                    attempt += 1;
                    tracing::warn!(url, attempt, "retrying after transport error");
                    std::thread::sleep(Duration::from_millis(200 * 2u64.pow(attempt)));
                }
                Err(e) => return Err(network_error(url, &e)),
            }
        }
    }
}

fn doc_into_term(doc: OlsDoc) -> Option<OntologyTerm> {
    Some(OntologyTerm {
        id: doc.obo_id?,
        label: doc.label.unwrap_or_default(),
        synonyms: doc.synonym,
    })
}

fn parse_search_docs(body: &str) -> Result<Vec<OlsDoc>, BoxedError<'static, CvError>> {
    serde_json::from_str::<OlsSearchResponse>(body)
        .map(|r| r.response.docs)
        .map_err(|e| {
            BoxedError::new(
                CvError::ParseError,
                "could not parse OLS search response",
                e.to_string(),
                Context::none(),
            )
        })
}

fn network_error(url: &str, source: &dyn std::fmt::Display) -> BoxedError<'static, CvError> {
    BoxedError::new(
        CvError::NetworkError,
        "ontology request failed",
        format!("{url}: {source}"),
        Context::none(),
    )
}

fn invalid_id(curie: &str) -> BoxedError<'static, CvError> {
    BoxedError::new(
        CvError::InvalidId,
        "CURIE failed format validation",
        curie.to_string(),
        Context::none(),
    )
}

fn urlencode(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for b in s.bytes() {
        match b {
            b'A'..=b'Z' | b'a'..=b'z' | b'0'..=b'9' | b'-' | b'_' | b'.' | b'~' => {
                out.push(b as char);
            }
            _ => out.push_str(&format!("%{b:02X}")),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn verify_rejects_invalid_curie_without_network() {
        let client = OntologyClient::new(
            "https://example.invalid",
            ResponseCache::new(std::env::temp_dir().join("culturemech-cv-test")),
            1000.0,
            0,
            Duration::from_secs(1),
        );
        let err = client.verify("CHEBI:10716816").unwrap_err();
        assert_eq!(*err.kind(), CvError::InvalidId);
    }

    #[test]
    fn urlencode_escapes_spaces() {
        assert_eq!(urlencode("alpha glucose"), "alpha%20glucose");
    }
}

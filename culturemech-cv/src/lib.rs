//! Controlled-vocabulary access: CURIE handling, a cached/rate-limited OLS
//! client, and the on-disk response cache that backs it (spec §4.4).

mod cache;
mod client;
mod curie;
mod error;
mod rate_limit;

pub use cache::ResponseCache;
pub use client::{FuzzyCandidate, OntologyClient, OntologyTerm, VerifyResult};
pub use curie::{Curie, CurieValidity};
pub use error::CvError;
pub use rate_limit::TokenBucket;

//! Recipe deduplication, fingerprinting, and the cross-source merge engine
//! (spec §4.10).

pub mod error;
pub mod fingerprint;
pub mod merger;
pub mod stats;

pub use error::MergeError;
pub use merger::{merge_all, merge_group};
pub use stats::{summarize, MergeStats, SkipCounters};

//! The Layer-1-to-Layer-3 importer contract (spec §6, SPEC_FULL.md §6
//! supplement): one `Importer` per upstream source, each turning its raw
//! payload into a typed `Recipe` and nothing more — sanitization,
//! duplicate detection, and category routing are shared, not
//! reimplemented per source (see [`crate::router`]).

use chrono::{DateTime, Utc};
use context_error::BoxedError;
use culturemech_core::Recipe;

use crate::error::ImportError;

/// One Layer-1 payload as handed to an [`Importer`]: the source's own
/// identifiers plus its raw content, already fetched and stored under
/// `raw/<source>/` by a [`crate::fetcher::Fetcher`].
#[derive(Clone, Debug)]
pub struct RawRecord {
    pub source: String,
    pub source_id: String,
    pub name: String,
    pub content: serde_json::Value,
    pub fetch_date: Option<DateTime<Utc>>,
}

/// Converts one upstream source's raw records into `Recipe`s. Implemented
/// by each external collaborator's source-specific crate; this crate only
/// defines the contract and the machinery every implementation shares.
pub trait Importer {
    fn source(&self) -> &'static str;
    fn import(&self, raw: &RawRecord) -> Result<Recipe, BoxedError<'static, ImportError>>;
}

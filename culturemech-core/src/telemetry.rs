//! Tracing setup shared by every batch pass. Libraries only emit events;
//! installing the subscriber is left to the external CLI/build driver, but a
//! convenience installer is provided for tests and examples.

use tracing_subscriber::{EnvFilter, fmt};

/// Install a default `RUST_LOG`-driven subscriber. Safe to call multiple
/// times; subsequent calls are no-ops.
pub fn init_default() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let _ = fmt().with_env_filter(filter).try_init();
}

/// Span fields every batch-stage event should carry, mirroring the
/// structured-diagnostics requirement of spec §6/§7.
#[derive(Clone, Copy, Debug)]
pub struct StageFields<'a> {
    pub stage: &'a str,
    pub layer: Option<&'a str>,
    pub source: Option<&'a str>,
}

impl<'a> StageFields<'a> {
    pub const fn new(stage: &'a str) -> Self {
        Self {
            stage,
            layer: None,
            source: None,
        }
    }
}

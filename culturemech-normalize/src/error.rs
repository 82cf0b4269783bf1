use context_error::ErrorKind;

/// Raised only on an internal invariant violation of the normalizer itself
/// (spec §4.2): malformed input never triggers this, it only ever degrades
/// the quality of the canonical form.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub enum NormalizationError {
    #[default]
    EmptyCanonicalForm,
    StepProducedInvalidUtf8,
}

impl ErrorKind for NormalizationError {
    type Settings = ();

    fn descriptor(&self) -> &'static str {
        match self {
            Self::EmptyCanonicalForm => "normalization produced an empty canonical form",
            Self::StepProducedInvalidUtf8 => "a normalization step produced invalid UTF-8",
        }
    }

    fn ignored(&self, _settings: Self::Settings) -> bool {
        false
    }

    fn is_error(&self, _settings: Self::Settings) -> bool {
        true
    }
}

//! The [`CoreError`] kind, following the teacher's flat-enum-plus-`ErrorKind`
//! shape so downstream crates can match on the exact failure without
//! parsing message strings.

use context_error::ErrorKind;

#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub enum CoreError {
    /// Layer 1 is immutable; `put` was called against it.
    LayerImmutable,
    /// A Layer-4 write collided with an existing record under a different fingerprint.
    FingerprintCollision,
    /// Layer 2/4 regeneration was requested for a layer that isn't regenerable.
    NotRegenerable,
    #[default]
    RecordNotFound,
    RecordCouldNotBeRead,
    RecordCouldNotBeWritten,
    RecordCouldNotBeParsed,
    FilenameCollision,
}

impl ErrorKind for CoreError {
    type Settings = ();

    fn descriptor(&self) -> &'static str {
        match self {
            Self::LayerImmutable => "layer is immutable",
            Self::FingerprintCollision => "fingerprint collision",
            Self::NotRegenerable => "layer is not regenerable",
            Self::RecordNotFound => "record not found",
            Self::RecordCouldNotBeRead => "record could not be read",
            Self::RecordCouldNotBeWritten => "record could not be written",
            Self::RecordCouldNotBeParsed => "record could not be parsed",
            Self::FilenameCollision => "filename collision",
        }
    }

    fn ignored(&self, _settings: Self::Settings) -> bool {
        false
    }

    fn is_error(&self, _settings: Self::Settings) -> bool {
        true
    }
}

use context_error::ErrorKind;

#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub enum MergeError {
    #[default]
    Unmergeable,
    FingerprintCollision,
}

impl ErrorKind for MergeError {
    type Settings = ();

    fn descriptor(&self) -> &'static str {
        match self {
            Self::Unmergeable => "recipe has no stable fingerprint and cannot be merged",
            Self::FingerprintCollision => "merge produced a fingerprint already used by a different group",
        }
    }

    fn ignored(&self, _settings: Self::Settings) -> bool {
        false
    }

    fn is_error(&self, _settings: Self::Settings) -> bool {
        true
    }
}

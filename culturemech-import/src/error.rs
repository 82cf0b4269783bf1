use context_error::ErrorKind;

#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub enum ImportError {
    #[default]
    MalformedRawRecord,
    UnknownCategory,
    DuplicateRejected,
}

impl ErrorKind for ImportError {
    type Settings = ();

    fn descriptor(&self) -> &'static str {
        match self {
            Self::MalformedRawRecord => "raw record could not be converted into a recipe",
            Self::UnknownCategory => "raw record does not map to a known recipe category",
            Self::DuplicateRejected => "raw record duplicates an existing SOURCE+SOURCE_ID pair",
        }
    }

    fn ignored(&self, _settings: Self::Settings) -> bool {
        false
    }

    fn is_error(&self, _settings: Self::Settings) -> bool {
        true
    }
}

use context_error::ErrorKind;

#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub enum RepairError {
    #[default]
    Unrepairable,
    StrictReferenceViolation,
}

impl ErrorKind for RepairError {
    type Settings = ();

    fn descriptor(&self) -> &'static str {
        match self {
            Self::Unrepairable => "YAML could not be repaired into a parseable document",
            Self::StrictReferenceViolation => "reference/snippet failed strict validation",
        }
    }

    fn ignored(&self, _settings: Self::Settings) -> bool {
        false
    }

    fn is_error(&self, _settings: Self::Settings) -> bool {
        true
    }
}

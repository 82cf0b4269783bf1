use context_error::ErrorKind;

#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub enum ValidationError {
    #[default]
    StructuralViolation,
    UnresolvedReference,
}

impl ErrorKind for ValidationError {
    type Settings = ();

    fn descriptor(&self) -> &'static str {
        match self {
            Self::StructuralViolation => "recipe violates a structural invariant",
            Self::UnresolvedReference => "reference could not be resolved under strict validation",
        }
    }

    fn ignored(&self, _settings: Self::Settings) -> bool {
        false
    }

    fn is_error(&self, _settings: Self::Settings) -> bool {
        true
    }
}

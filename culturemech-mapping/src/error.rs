use context_error::ErrorKind;

#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub enum MappingError {
    #[default]
    SssomParse,
    SssomWrite,
    MissingHeader,
}

impl ErrorKind for MappingError {
    type Settings = ();

    fn descriptor(&self) -> &'static str {
        match self {
            Self::SssomParse => "could not parse SSSOM mapping file",
            Self::SssomWrite => "could not write SSSOM mapping file",
            Self::MissingHeader => "SSSOM file is missing its curie_map header",
        }
    }

    fn ignored(&self, _settings: Self::Settings) -> bool {
        false
    }

    fn is_error(&self, _settings: Self::Settings) -> bool {
        true
    }
}

use thiserror::Error;

/// Which of the two error classes a [`SpecoptsError`] belongs to.
///
/// Specification errors are detected while compiling the option
/// specification, before any command-line argument is inspected. Usage
/// errors are detected while parsing arguments or writing resolved values.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    IllegalSpec,
    IllegalUse,
}

#[derive(Debug, Error)]
pub enum SpecoptsError {
    #[error(
        "The flagvalue metadata can only be used if opt/arg is set to 'none' or 'optional' (key: {key})"
    )]
    FlagValueNotAllowed { key: String },

    #[error("Invalid opt/arg value '{value}' — expected 'none', 'optional' or 'required' (key: {key})")]
    InvalidArgMode { key: String, value: String },

    #[error("'-' cannot be used as a short option. It would collide with the special string '--' (key: {key})")]
    ReservedShortDash { key: String },

    #[error("'h' cannot be used as a short option. It is reserved for the help option '-h' (key: {key})")]
    ReservedShortHelp { key: String },

    #[error("'help' cannot be used as a long option. It is reserved for the help option '--help' (key: {key})")]
    ReservedLongHelp { key: String },

    #[error("An option slot must name a short option, a long option, or both (key: {key})")]
    EmptyOptionSlot { key: String },

    #[error(
        "The option '{option}' has already been specified for the key '{existing}' (additional key: {additional})"
    )]
    DuplicateOption {
        option: String,
        existing: String,
        additional: String,
    },

    #[error(
        "The environment variable '{var}' has already been specified for the key '{existing}' (additional key: {additional})"
    )]
    DuplicateEnvVar {
        var: String,
        existing: String,
        additional: String,
    },

    #[error("'args=remaining' can only be set on array keys (basename '#'). Offending key: {key}")]
    RemainingArgsOnNonArrayKey { key: String },

    #[error("Failed to parse spec document: {source}")]
    SpecParse { source: toml::de::Error },

    #[error("Unknown metadata '{name}' in spec document (key: {key})")]
    UnknownMetadata { key: String, name: String },

    #[error("Invalid value for metadata '{name}' in spec document (key: {key}): {reason}")]
    InvalidMetadataValue {
        key: String,
        name: String,
        reason: String,
    },

    #[error("Unknown option: {option}")]
    UnknownOption { option: String },

    #[error("Missing argument for option: {option}")]
    MissingArgument { option: String },

    #[error("This option cannot have an argument: {option}")]
    UnexpectedArgument { option: String },

    #[error("This option cannot be repeated: {option}")]
    RepeatedOption { option: String },

    #[error(
        "The option '{option}' cannot be used, because another option has already been used for the key '{key}'"
    )]
    OptionAlreadyUsed { option: String, key: String },

    #[error(
        "The environment variable '{var}' cannot be used, because another variable has already been used for the key '{key}'"
    )]
    EnvVarAlreadyUsed { var: String, key: String },
}

impl SpecoptsError {
    /// Classify this error as a specification error or a usage error.
    pub fn kind(&self) -> ErrorKind {
        match self {
            SpecoptsError::FlagValueNotAllowed { .. }
            | SpecoptsError::InvalidArgMode { .. }
            | SpecoptsError::ReservedShortDash { .. }
            | SpecoptsError::ReservedShortHelp { .. }
            | SpecoptsError::ReservedLongHelp { .. }
            | SpecoptsError::EmptyOptionSlot { .. }
            | SpecoptsError::DuplicateOption { .. }
            | SpecoptsError::DuplicateEnvVar { .. }
            | SpecoptsError::RemainingArgsOnNonArrayKey { .. }
            | SpecoptsError::SpecParse { .. }
            | SpecoptsError::UnknownMetadata { .. }
            | SpecoptsError::InvalidMetadataValue { .. } => ErrorKind::IllegalSpec,

            SpecoptsError::UnknownOption { .. }
            | SpecoptsError::MissingArgument { .. }
            | SpecoptsError::UnexpectedArgument { .. }
            | SpecoptsError::RepeatedOption { .. }
            | SpecoptsError::OptionAlreadyUsed { .. }
            | SpecoptsError::EnvVarAlreadyUsed { .. } => ErrorKind::IllegalUse,
        }
    }
}

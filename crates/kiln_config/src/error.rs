//! Errors raised while reading `kiln.toml`.

/// Errors that can occur when loading or validating a `kiln.toml` configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// The file could not be read.
    #[error("failed to read configuration: {0}")]
    IoError(#[from] std::io::Error),

    /// The file is not valid TOML for the expected schema.
    #[error("failed to parse configuration: {0}")]
    ParseError(String),

    /// A referenced unit of work does not exist in the configuration.
    #[error("unknown unit of work '{0}'")]
    UnknownWork(String),

    /// A field kiln cannot default was left out.
    #[error("missing required field: {0}")]
    MissingField(String),

    /// An include or exclude pattern is not valid glob syntax.
    #[error("invalid pattern '{pattern}' in {location}: {reason}")]
    InvalidPattern {
        /// Where the pattern was declared (e.g. `work.compile.inputs.sources`).
        location: String,
        /// The offending pattern text.
        pattern: String,
        /// Description of the syntax problem.
        reason: String,
    },

    /// A value parsed but is out of range or inconsistent.
    #[error("validation error: {0}")]
    ValidationError(String),
}

use std::fmt;

use crate::schema::SourceKind;

#[derive(Debug)]
pub enum LinkError {
    /// TOML parse / deserialization error.
    ConfigParse(String),
    /// Config validation error (empty path, bad delimiter, etc.).
    ConfigValidation(String),
    /// One or more required logical fields could not be resolved for a source.
    /// Carries the human labels of every unresolved field, in declaration order.
    MissingColumns { source: SourceKind, fields: Vec<String> },
}

impl fmt::Display for LinkError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ConfigParse(msg) => write!(f, "config parse error: {msg}"),
            Self::ConfigValidation(msg) => write!(f, "config validation error: {msg}"),
            Self::MissingColumns { source, fields } => write!(
                f,
                "{} is missing required columns: {}",
                source.display_name(),
                fields.join(", ")
            ),
        }
    }
}

impl std::error::Error for LinkError {}

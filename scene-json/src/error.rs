use crate::location::SourceLocation;

/// A JSON syntax error, carrying the location where parsing failed.
#[derive(Debug, thiserror::Error)]
#[error("{location}: {message}")]
pub struct JsonError {
    pub location: SourceLocation,
    pub message: String,
}

impl JsonError {
    pub(crate) fn new(location: SourceLocation, message: impl Into<String>) -> Self {
        Self {
            location,
            message: message.into(),
        }
    }
}

use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ModelError {
    /// A required field was absent or blank; carries the field name.
    #[error("{0} is required")]
    MissingField(String),
    #[error("{field} {reason}")]
    InvalidField { field: String, reason: String },
    #[error("validation error: {0}")]
    Validation(String),
}

impl ModelError {
    pub fn missing(field: impl Into<String>) -> Self {
        Self::MissingField(field.into())
    }

    pub fn invalid(field: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidField { field: field.into(), reason: reason.into() }
    }
}

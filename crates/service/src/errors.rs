use thiserror::Error;

/// Message shared by every failed token-gated mutation, whatever the cause.
pub const NOT_FOUND_OR_UNAUTHORIZED: &str = "testimonial not found or edit token invalid";

#[derive(Debug, Error)]
pub enum ServiceError {
    #[error("validation error: {0}")]
    Validation(String),
    #[error("not found: {0}")]
    NotFound(String),
    #[error("database error: {0}")]
    Db(String),
    #[error("model error: {0}")]
    Model(#[from] models::errors::ModelError),
}

impl ServiceError {
    /// Wrong id and wrong token produce this same error.
    pub fn not_found_or_unauthorized() -> Self { Self::NotFound(NOT_FOUND_OR_UNAUTHORIZED.into()) }

    pub fn db(e: impl std::fmt::Display) -> Self { Self::Db(e.to_string()) }
}

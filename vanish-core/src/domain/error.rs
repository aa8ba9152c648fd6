use thiserror::Error;

#[derive(Debug, Error)]
pub enum DomainError {
    #[error("validation failed for '{field}': {message}")]
    Validation {
        field: &'static str,
        message: &'static str,
    },

    #[error("users cannot follow themselves")]
    SelfFollow,

    #[error("resource not found: {0}")]
    NotFound(String),

    #[error("resource already exists: {0}")]
    AlreadyExists(String),

    #[error("storage failure: {0}")]
    Storage(String),
}

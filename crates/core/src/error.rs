// Central Error Type for the Application

use thiserror::Error;

/// Application-level error type
///
/// Only the surrounding services (profile evaluation, background changer)
/// surface this type. Launch, location and connectivity fold their failures
/// into result values instead.
#[derive(Error, Debug)]
pub enum AppError {
    #[error("Domain error: {0}")]
    Domain(#[from] crate::domain::DomainError),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Execution error: {0}")]
    Execution(#[from] crate::port::RunnerError),
}

/// Result type alias using AppError
pub type Result<T> = std::result::Result<T, AppError>;

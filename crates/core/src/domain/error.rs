// Domain Error Types

use thiserror::Error;

#[derive(Error, Debug)]
pub enum DomainError {
    #[error("Invalid command line: {0}")]
    InvalidCommand(#[from] super::command::CommandParseError),

    #[error("Unknown location '{location}' referenced by program '{command}'")]
    UnknownLocation { location: String, command: String },

    #[error("Validation error: {0}")]
    ValidationError(String),
}

pub type Result<T> = std::result::Result<T, DomainError>;

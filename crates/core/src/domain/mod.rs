// Domain Layer - Pure types and parsing rules

pub mod command;
pub mod error;
pub mod launch;
pub mod network;
pub mod profile;

// Re-exports
pub use command::{extract_program, shell_quote, tokenize, CommandParseError};
pub use error::DomainError;
pub use launch::{LaunchStatus, LivenessCheck};
pub use network::{GatewayIdentity, Location, NetworkTable};
pub use profile::{BackgroundRule, NetworkSettings, Profile, ProgramRule};

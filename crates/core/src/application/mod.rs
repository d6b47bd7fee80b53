// Application Layer - Capabilities offered to profile evaluation

pub mod background;
pub mod connectivity;
pub mod constants;
pub mod launcher;
pub mod location;
pub mod profile_runner;

// Re-exports
pub use background::BackgroundChanger;
pub use connectivity::ConnectivityWaiter;
pub use launcher::{LaunchError, Launcher};
pub use location::LocationResolver;
pub use profile_runner::{
    BackgroundOutcome, Capabilities, ProfileReport, ProfileRunner, ProgramOutcome,
};

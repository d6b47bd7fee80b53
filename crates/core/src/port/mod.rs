// Port Layer - Interfaces for external dependencies

pub mod image_catalog;
pub mod process_runner;
pub mod process_table;
pub mod program_locator;

// Re-exports
pub use image_catalog::ImageCatalog;
pub use process_runner::{ProcessRunner, RunnerError};
pub use process_table::ProcessTable;
pub use program_locator::{LocateError, ProgramLocator};

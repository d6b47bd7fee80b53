// Program Locator Port
// Resolves a program reference (bare name or path) to an executable file.

use std::path::PathBuf;
use thiserror::Error;

/// Location errors; both mean "not installed" to the launcher
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum LocateError {
    #[error("Program not found on $PATH: {0}")]
    NotOnPath(String),

    #[error("Program not found or not executable: {}", .0.display())]
    NotExecutable(PathBuf),
}

/// Program locator trait
pub trait ProgramLocator: Send + Sync {
    /// Expand a program reference into the path of an executable file
    ///
    /// A reference without a path separator is searched on `PATH`; anything
    /// else must already point at an executable file. Nothing is cached.
    fn locate(&self, program: &str) -> Result<PathBuf, LocateError>;
}

// ============================================================================
// Mock Implementations for Testing
// ============================================================================

pub mod mocks {
    use super::*;
    use std::collections::HashMap;

    /// Mock ProgramLocator: a fixed name -> path map
    #[derive(Default)]
    pub struct MockProgramLocator {
        installed: HashMap<String, PathBuf>,
    }

    impl MockProgramLocator {
        pub fn new() -> Self {
            Self::default()
        }

        pub fn with_program(mut self, name: &str, path: impl Into<PathBuf>) -> Self {
            self.installed.insert(name.to_string(), path.into());
            self
        }
    }

    impl ProgramLocator for MockProgramLocator {
        fn locate(&self, program: &str) -> Result<PathBuf, LocateError> {
            match self.installed.get(program) {
                Some(path) => Ok(path.clone()),
                None if program.contains('/') => Err(LocateError::NotExecutable(program.into())),
                None => Err(LocateError::NotOnPath(program.to_string())),
            }
        }
    }
}

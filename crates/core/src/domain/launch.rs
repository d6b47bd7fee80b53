// Launch outcome types

use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;

/// Outcome of a single launch request
///
/// Closed on purpose: callers match exhaustively instead of handling errors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LaunchStatus {
    /// The program wasn't running before and has just been started
    Started,
    /// The liveness check reported the program as running
    AlreadyRunning,
    /// The program is not on `PATH`, or the given path is not executable
    NotInstalled,
    /// Anything else: unparsable command line, failed check, failed spawn
    UnspecifiedError,
}

impl LaunchStatus {
    /// True when the program is running after the call
    pub fn is_running(self) -> bool {
        matches!(self, LaunchStatus::Started | LaunchStatus::AlreadyRunning)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            LaunchStatus::Started => "started",
            LaunchStatus::AlreadyRunning => "already_running",
            LaunchStatus::NotInstalled => "not_installed",
            LaunchStatus::UnspecifiedError => "unspecified_error",
        }
    }
}

impl fmt::Display for LaunchStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// How to decide whether a program is already running
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LivenessCheck {
    /// User supplied shell command; exit status 0 means running
    Shell(String),
    /// Default: some process runs this exact executable
    Executable(PathBuf),
}

impl LivenessCheck {
    /// Pick the caller's check if given, else fall back to the executable path
    pub fn resolve(custom: Option<&str>, executable: PathBuf) -> Self {
        match custom.map(str::trim).filter(|c| !c.is_empty()) {
            Some(check) => LivenessCheck::Shell(check.to_string()),
            None => LivenessCheck::Executable(executable),
        }
    }
}

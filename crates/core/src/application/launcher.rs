// Launcher - idempotent "start if not already running"
use std::path::PathBuf;
use std::sync::Arc;
use thiserror::Error;
use tracing::{debug, info, warn};

use super::constants::SHELL;
use crate::domain::{extract_program, CommandParseError, LaunchStatus, LivenessCheck};
use crate::port::{LocateError, ProcessRunner, ProcessTable, ProgramLocator, RunnerError};

/// Internal launch failures, folded into `LaunchStatus` before returning
#[derive(Error, Debug)]
pub enum LaunchError {
    #[error("Failed to parse command line: {0}")]
    CommandParse(#[from] CommandParseError),

    #[error("{0}")]
    ProgramNotFound(#[from] LocateError),

    #[error("Liveness check failed: {0}")]
    LivenessCheck(RunnerError),

    #[error("Failed to start program: {0}")]
    Spawn(RunnerError),
}

impl LaunchError {
    /// Map a failure onto the closed result set
    pub fn status(&self) -> LaunchStatus {
        match self {
            LaunchError::ProgramNotFound(_) => LaunchStatus::NotInstalled,
            _ => LaunchStatus::UnspecifiedError,
        }
    }
}

/// Launches programs unless they are already running
///
/// Stateless: every call resolves the executable and runs the liveness
/// check again.
pub struct Launcher {
    runner: Arc<dyn ProcessRunner>,
    process_table: Arc<dyn ProcessTable>,
    locator: Arc<dyn ProgramLocator>,
}

impl Launcher {
    pub fn new(
        runner: Arc<dyn ProcessRunner>,
        process_table: Arc<dyn ProcessTable>,
        locator: Arc<dyn ProgramLocator>,
    ) -> Self {
        Self {
            runner,
            process_table,
            locator,
        }
    }

    /// Start `command` if it's not already running
    ///
    /// # Arguments
    /// * `command` - Shell command that starts the program
    /// * `is_running` - Optional shell command; exit status 0 means "running".
    ///   Defaults to looking for processes of the resolved executable.
    ///
    /// Never fails: every error is logged and mapped to a `LaunchStatus`.
    ///
    /// # Example
    /// ```text
    /// // Chromium runs through a wrapper script, so match the real binary
    /// launcher.launch(
    ///     "chromium-browser",
    ///     Some("pidof /usr/lib/chromium-browser/chromium-browser"),
    /// ).await;
    /// ```
    pub async fn launch(&self, command: &str, is_running: Option<&str>) -> LaunchStatus {
        match self.try_launch(command, is_running).await {
            Ok(status) => status,
            Err(e @ LaunchError::ProgramNotFound(_)) => {
                warn!(command = %command, error = %e, "Program not installed");
                e.status()
            }
            Err(e) => {
                warn!(command = %command, error = %e, "Failed to start program");
                e.status()
            }
        }
    }

    /// Launch with the failure cause preserved
    pub async fn try_launch(
        &self,
        command: &str,
        is_running: Option<&str>,
    ) -> Result<LaunchStatus, LaunchError> {
        let executable = self.resolve_executable(command)?;
        let check = LivenessCheck::resolve(is_running, executable);

        if self.is_running(&check).await? {
            info!(command = %command, "Command already running");
            return Ok(LaunchStatus::AlreadyRunning);
        }

        info!(command = %command, "Starting command");
        self.runner
            .spawn_detached(SHELL, &["-c".to_string(), command.to_string()])
            .await
            .map_err(LaunchError::Spawn)?;

        Ok(LaunchStatus::Started)
    }

    /// Parse the command line and resolve its program to an executable
    pub fn resolve_executable(&self, command: &str) -> Result<PathBuf, LaunchError> {
        let program = extract_program(command)?;
        let executable = self.locator.locate(&program)?;
        debug!(program = %program, executable = %executable.display(), "Resolved program");
        Ok(executable)
    }

    async fn is_running(&self, check: &LivenessCheck) -> Result<bool, LaunchError> {
        match check {
            LivenessCheck::Shell(script) => {
                debug!(check = %script, "Checking if program is running (custom check)");
                self.runner
                    .run_silently(SHELL, &["-c".to_string(), script.clone()])
                    .await
                    .map_err(LaunchError::LivenessCheck)
            }
            LivenessCheck::Executable(path) => {
                debug!(executable = %path.display(), "Checking if program is running");
                let pids = self.process_table.find_pids_by_executable(path).await;
                debug!(pids = ?pids, "Processes matching executable");
                Ok(!pids.is_empty())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::port::process_runner::mocks::MockProcessRunner;
    use crate::port::process_table::mocks::MockProcessTable;
    use crate::port::program_locator::mocks::MockProgramLocator;
    use tokio_test::{assert_err, assert_ok};

    const DROPBOX: &str = "/usr/bin/dropbox";

    fn launcher(runner: Arc<MockProcessRunner>, table: Arc<MockProcessTable>) -> Launcher {
        let locator = MockProgramLocator::new()
            .with_program("dropbox", DROPBOX)
            .with_program("/usr/bin/dropbox", DROPBOX)
            .with_program("/opt/my app/bin/app", "/opt/my app/bin/app");
        Launcher::new(runner, table, Arc::new(locator))
    }

    #[tokio::test]
    async fn test_starts_program_that_is_not_running() {
        let runner = Arc::new(MockProcessRunner::new());
        let table = Arc::new(MockProcessTable::new());
        let launcher = launcher(runner.clone(), table.clone());

        let status = launcher.launch("dropbox start", None).await;

        assert_eq!(status, LaunchStatus::Started);
        assert_eq!(table.lookup_count(), 1);
        let spawned = runner.detached();
        assert_eq!(spawned.len(), 1);
        assert_eq!(spawned[0].program, "sh");
        assert_eq!(spawned[0].args, vec!["-c", "dropbox start"]);
    }

    #[tokio::test]
    async fn test_default_check_finds_running_executable() {
        let runner = Arc::new(MockProcessRunner::new());
        let table = Arc::new(MockProcessTable::new().with_running(DROPBOX, 4242));
        let launcher = launcher(runner.clone(), table);

        let status = launcher.launch("dropbox start", None).await;

        assert_eq!(status, LaunchStatus::AlreadyRunning);
        assert_eq!(runner.spawn_count(), 0);
    }

    #[tokio::test]
    async fn test_custom_check_success_means_already_running() {
        let runner = Arc::new(MockProcessRunner::new().with_silent("sh", &[true]));
        let table = Arc::new(MockProcessTable::new());
        let launcher = launcher(runner.clone(), table.clone());

        let status = launcher
            .launch("dropbox start", Some("pgrep -f dropbox-dist"))
            .await;

        assert_eq!(status, LaunchStatus::AlreadyRunning);
        assert_eq!(runner.spawn_count(), 0);
        // Custom check replaces the default lookup
        assert_eq!(table.lookup_count(), 0);
        assert_eq!(runner.calls()[0].args, vec!["-c", "pgrep -f dropbox-dist"]);
    }

    #[tokio::test]
    async fn test_custom_check_failure_means_not_running() {
        // Non-zero exit, signal death and unparsable check scripts all look like Ok(false)
        let runner = Arc::new(MockProcessRunner::new().with_silent("sh", &[false]));
        let launcher = launcher(runner.clone(), Arc::new(MockProcessTable::new()));

        let status = launcher.launch("dropbox start", Some("false")).await;

        assert_eq!(status, LaunchStatus::Started);
        assert_eq!(runner.spawn_count(), 1);
    }

    #[tokio::test]
    async fn test_missing_program_is_not_installed() {
        let runner = Arc::new(MockProcessRunner::new());
        let launcher = launcher(runner.clone(), Arc::new(MockProcessTable::new()));

        assert_eq!(
            launcher.launch("no-such-program --flag", None).await,
            LaunchStatus::NotInstalled
        );
        assert_eq!(
            launcher.launch("/opt/missing/bin/tool", None).await,
            LaunchStatus::NotInstalled
        );
        assert_eq!(runner.spawn_count(), 0);
        assert!(runner.calls().is_empty());
    }

    #[tokio::test]
    async fn test_unparsable_command_is_unspecified_error() {
        let runner = Arc::new(MockProcessRunner::new());
        let launcher = launcher(runner.clone(), Arc::new(MockProcessTable::new()));

        assert_eq!(
            launcher.launch("dropbox 'start", None).await,
            LaunchStatus::UnspecifiedError
        );
        assert_eq!(launcher.launch("   ", None).await, LaunchStatus::UnspecifiedError);
        assert_eq!(runner.spawn_count(), 0);

        let err = assert_err!(launcher.try_launch("", None).await);
        assert!(matches!(err, LaunchError::CommandParse(CommandParseError::Empty)));
    }

    #[tokio::test]
    async fn test_liveness_check_error_is_unspecified_error() {
        let runner = Arc::new(MockProcessRunner::new().with_silent_error(
            "sh",
            RunnerError::Timeout {
                program: "sh".to_string(),
                timeout_ms: 5000,
            },
        ));
        let launcher = launcher(runner.clone(), Arc::new(MockProcessTable::new()));

        let status = launcher.launch("dropbox start", Some("sleep 60")).await;

        assert_eq!(status, LaunchStatus::UnspecifiedError);
        assert_eq!(runner.spawn_count(), 0);
    }

    #[tokio::test]
    async fn test_spawn_failure_is_unspecified_error() {
        let runner = Arc::new(MockProcessRunner::new().with_spawn_error(
            RunnerError::SpawnFailed {
                program: "sh".to_string(),
                reason: "No such file or directory".to_string(),
            },
        ));
        let launcher = launcher(runner.clone(), Arc::new(MockProcessTable::new()));

        assert_eq!(
            launcher.launch("dropbox start", None).await,
            LaunchStatus::UnspecifiedError
        );
        assert_eq!(runner.spawn_count(), 0);
    }

    #[tokio::test]
    async fn test_quoted_path_with_spaces_resolves() {
        let runner = Arc::new(MockProcessRunner::new());
        let launcher = launcher(runner.clone(), Arc::new(MockProcessTable::new()));

        let path = assert_ok!(launcher.resolve_executable(r#""/opt/my app/bin/app" --x"#));
        assert_eq!(path, PathBuf::from("/opt/my app/bin/app"));
        assert_eq!(
            launcher.launch(r#""/opt/my app/bin/app" --x"#, None).await,
            LaunchStatus::Started
        );
    }

    #[tokio::test]
    async fn test_second_launch_sees_first_spawn() {
        let runner = Arc::new(MockProcessRunner::new().with_silent("sh", &[false, true]));
        let launcher = launcher(runner.clone(), Arc::new(MockProcessTable::new()));

        let first = launcher.launch("dropbox start", Some("pgrep dropbox")).await;
        let second = launcher.launch("dropbox start", Some("pgrep dropbox")).await;

        assert_eq!(first, LaunchStatus::Started);
        assert_eq!(second, LaunchStatus::AlreadyRunning);
        assert_eq!(runner.spawn_count(), 1);
    }

    #[tokio::test]
    async fn test_default_check_idempotence_with_process_table() {
        let runner = Arc::new(MockProcessRunner::new());
        let table = Arc::new(MockProcessTable::new());
        let launcher = launcher(runner.clone(), table.clone());

        assert_eq!(launcher.launch("dropbox", None).await, LaunchStatus::Started);
        table.set_running(DROPBOX, 100);
        assert_eq!(launcher.launch("dropbox", None).await, LaunchStatus::AlreadyRunning);
        assert_eq!(runner.spawn_count(), 1);
    }
}

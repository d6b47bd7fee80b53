// Subprocess runner implementation
// reason: tokio::process for non-blocking waits with a timeout on every query
use async_trait::async_trait;
use std::process::Stdio;
use std::time::Duration;
use tokio::process::Command;
use tokio::time::timeout;
use tracing::{debug, info};

use locus_core::application::constants::DEFAULT_QUERY_TIMEOUT;
use locus_core::port::process_runner::display_invocation;
use locus_core::port::{ProcessRunner, RunnerError};

/// Backgrounds "$@" and exits, so the program is reparented to init
const DETACH_SCRIPT: &str = r#"exec "$@" </dev/null >/dev/null 2>&1 &"#;

/// Runs real child processes
pub struct SubprocessRunner {
    query_timeout: Duration,
}

impl SubprocessRunner {
    /// Create a runner with the default query timeout (5s)
    pub fn new() -> Self {
        Self::with_timeout(DEFAULT_QUERY_TIMEOUT)
    }

    /// Create a runner whose captures and silent runs give up after `query_timeout`
    ///
    /// # Example
    /// ```ignore
    /// let runner = SubprocessRunner::with_timeout(Duration::from_secs(2));
    /// ```
    pub fn with_timeout(query_timeout: Duration) -> Self {
        Self { query_timeout }
    }

    fn command(program: &str, args: &[String]) -> Command {
        let mut cmd = Command::new(program);
        cmd.args(args).stdin(Stdio::null()).kill_on_drop(true);
        cmd
    }

    fn spawn_error(program: &str, e: std::io::Error) -> RunnerError {
        RunnerError::SpawnFailed {
            program: program.to_string(),
            reason: e.to_string(),
        }
    }

    fn timeout_error(&self, program: &str) -> RunnerError {
        RunnerError::Timeout {
            program: program.to_string(),
            timeout_ms: self.query_timeout.as_millis() as u64,
        }
    }
}

impl Default for SubprocessRunner {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ProcessRunner for SubprocessRunner {
    async fn capture(&self, program: &str, args: &[String]) -> Result<String, RunnerError> {
        debug!(command = %display_invocation(program, args), "Capturing command output");

        let child = Self::command(program, args)
            .stdout(Stdio::piped())
            .stderr(Stdio::null())
            .spawn()
            .map_err(|e| Self::spawn_error(program, e))?;

        // Dropping the future on timeout drops the child, which kills it
        let output = match timeout(self.query_timeout, child.wait_with_output()).await {
            Ok(Ok(output)) => output,
            Ok(Err(e)) => return Err(RunnerError::Io(e.to_string())),
            Err(_) => return Err(self.timeout_error(program)),
        };

        if !output.status.success() {
            return Err(RunnerError::NonZeroExit {
                program: program.to_string(),
                code: output.status.code(),
            });
        }

        Ok(String::from_utf8_lossy(&output.stdout).into_owned())
    }

    async fn run_silently(&self, program: &str, args: &[String]) -> Result<bool, RunnerError> {
        let mut child = Self::command(program, args)
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .spawn()
            .map_err(|e| Self::spawn_error(program, e))?;

        let status = match timeout(self.query_timeout, child.wait()).await {
            Ok(Ok(status)) => status,
            Ok(Err(e)) => return Err(RunnerError::Io(e.to_string())),
            Err(_) => {
                let _ = child.kill().await;
                return Err(self.timeout_error(program));
            }
        };

        debug!(
            command = %display_invocation(program, args),
            exit_code = ?status.code(),
            success = status.success(),
            "Silent command finished"
        );

        // A signal-terminated child has no code and counts as failure
        Ok(status.success())
    }

    async fn spawn_detached(&self, program: &str, args: &[String]) -> Result<(), RunnerError> {
        info!(command = %display_invocation(program, args), "Spawning detached process");

        let mut std_cmd = std::process::Command::new("sh");
        std_cmd
            .arg("-c")
            .arg(DETACH_SCRIPT)
            .arg("locus-detach")
            .arg(program)
            .args(args)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null());

        // Own process group: a Ctrl+C aimed at the caller's terminal does not reach it
        #[cfg(unix)]
        {
            use std::os::unix::process::CommandExt;
            std_cmd.process_group(0);
        }

        let mut cmd = Command::from(std_cmd);

        // The intermediate shell exits right after backgrounding the program
        let status = cmd
            .status()
            .await
            .map_err(|e| Self::spawn_error(program, e))?;

        if !status.success() {
            return Err(RunnerError::NonZeroExit {
                program: "sh".to_string(),
                code: status.code(),
            });
        }

        Ok(())
    }
}

// Process Runner Port
// Facade over external process execution; every OS query goes through here.

use async_trait::async_trait;
use thiserror::Error;

/// Process execution errors
///
/// A non-zero exit from `run_silently` is NOT an error; it is `Ok(false)`.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RunnerError {
    #[error("Spawn failed for {program}: {reason}")]
    SpawnFailed { program: String, reason: String },

    #[error("{program} exited with status {code:?}")]
    NonZeroExit { program: String, code: Option<i32> },

    #[error("{program} timed out after {timeout_ms}ms")]
    Timeout { program: String, timeout_ms: u64 },

    #[error("IO error: {0}")]
    Io(String),
}

/// Process Runner trait
///
/// Implementations:
/// - SubprocessRunner: real child processes (infra-system)
/// - MockProcessRunner: scripted results for tests
#[async_trait]
pub trait ProcessRunner: Send + Sync {
    /// Run a program and capture its stdout
    ///
    /// # Errors
    /// - RunnerError::SpawnFailed if the program cannot be started
    /// - RunnerError::NonZeroExit if it exits unsuccessfully
    /// - RunnerError::Timeout if it exceeds the query timeout
    async fn capture(&self, program: &str, args: &[String]) -> Result<String, RunnerError>;

    /// Run a program with all output discarded and report success
    ///
    /// Returns `Ok(false)` for a non-zero exit or death by signal.
    ///
    /// # Errors
    /// - RunnerError::SpawnFailed if the program cannot be started
    /// - RunnerError::Timeout if it exceeds the query timeout
    async fn run_silently(&self, program: &str, args: &[String]) -> Result<bool, RunnerError>;

    /// Start a program fully detached from the caller
    ///
    /// Fire-and-forget: the program outlives the caller, is never reaped by
    /// it, and its stdio goes to `/dev/null`.
    async fn spawn_detached(&self, program: &str, args: &[String]) -> Result<(), RunnerError>;
}

/// Render an invocation for logs
pub fn display_invocation(program: &str, args: &[String]) -> String {
    std::iter::once(program)
        .chain(args.iter().map(String::as_str))
        .collect::<Vec<_>>()
        .join(" ")
}

// ============================================================================
// Mock Implementations for Testing
// ============================================================================

pub mod mocks {
    use super::*;
    use std::collections::{HashMap, VecDeque};
    use std::sync::Mutex;

    /// One recorded invocation
    #[derive(Debug, Clone, PartialEq, Eq)]
    pub struct Invocation {
        pub program: String,
        pub args: Vec<String>,
    }

    /// Mock Process Runner for testing
    ///
    /// Results are keyed by program name. Silent results are consumed in
    /// order; the last one repeats once the queue is down to one entry.
    /// Unscripted programs fail with `SpawnFailed` (capture) or report
    /// `Ok(false)` (silent run).
    #[derive(Default)]
    pub struct MockProcessRunner {
        captures: Mutex<HashMap<String, Result<String, RunnerError>>>,
        silent: Mutex<HashMap<String, VecDeque<Result<bool, RunnerError>>>>,
        spawn_error: Mutex<Option<RunnerError>>,
        calls: Mutex<Vec<Invocation>>,
        detached: Mutex<Vec<Invocation>>,
    }

    impl MockProcessRunner {
        pub fn new() -> Self {
            Self::default()
        }

        pub fn with_capture(self, program: &str, stdout: &str) -> Self {
            self.captures
                .lock()
                .unwrap()
                .insert(program.to_string(), Ok(stdout.to_string()));
            self
        }

        pub fn with_capture_error(self, program: &str, error: RunnerError) -> Self {
            self.captures
                .lock()
                .unwrap()
                .insert(program.to_string(), Err(error));
            self
        }

        pub fn with_silent(self, program: &str, results: &[bool]) -> Self {
            self.silent
                .lock()
                .unwrap()
                .entry(program.to_string())
                .or_default()
                .extend(results.iter().map(|r| Ok(*r)));
            self
        }

        pub fn with_silent_error(self, program: &str, error: RunnerError) -> Self {
            self.silent
                .lock()
                .unwrap()
                .entry(program.to_string())
                .or_default()
                .push_back(Err(error));
            self
        }

        pub fn with_spawn_error(self, error: RunnerError) -> Self {
            *self.spawn_error.lock().unwrap() = Some(error);
            self
        }

        /// Every capture and silent invocation, in order
        pub fn calls(&self) -> Vec<Invocation> {
            self.calls.lock().unwrap().clone()
        }

        pub fn call_count(&self, program: &str) -> usize {
            self.calls
                .lock()
                .unwrap()
                .iter()
                .filter(|c| c.program == program)
                .count()
        }

        /// Successful detached spawns
        pub fn detached(&self) -> Vec<Invocation> {
            self.detached.lock().unwrap().clone()
        }

        pub fn spawn_count(&self) -> usize {
            self.detached.lock().unwrap().len()
        }

        fn record(&self, program: &str, args: &[String]) {
            self.calls.lock().unwrap().push(Invocation {
                program: program.to_string(),
                args: args.to_vec(),
            });
        }
    }

    #[async_trait]
    impl ProcessRunner for MockProcessRunner {
        async fn capture(&self, program: &str, args: &[String]) -> Result<String, RunnerError> {
            self.record(program, args);
            self.captures
                .lock()
                .unwrap()
                .get(program)
                .cloned()
                .unwrap_or_else(|| {
                    Err(RunnerError::SpawnFailed {
                        program: program.to_string(),
                        reason: "not scripted".to_string(),
                    })
                })
        }

        async fn run_silently(&self, program: &str, args: &[String]) -> Result<bool, RunnerError> {
            self.record(program, args);
            let mut silent = self.silent.lock().unwrap();
            match silent.get_mut(program) {
                Some(queue) if queue.len() > 1 => queue.pop_front().unwrap_or(Ok(false)),
                Some(queue) => queue.front().cloned().unwrap_or(Ok(false)),
                None => Ok(false),
            }
        }

        async fn spawn_detached(&self, program: &str, args: &[String]) -> Result<(), RunnerError> {
            if let Some(error) = self.spawn_error.lock().unwrap().clone() {
                return Err(error);
            }
            self.detached.lock().unwrap().push(Invocation {
                program: program.to_string(),
                args: args.to_vec(),
            });
            Ok(())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::mocks::MockProcessRunner;
    use super::*;

    #[test]
    fn test_display_invocation() {
        assert_eq!(
            display_invocation("ping", &["-c1".to_string(), "8.8.8.8".to_string()]),
            "ping -c1 8.8.8.8"
        );
        assert_eq!(display_invocation("ip", &[]), "ip");
    }

    #[tokio::test]
    async fn test_mock_silent_results_are_sequenced_then_sticky() {
        let runner = MockProcessRunner::new().with_silent("ping", &[false, true]);
        assert_eq!(runner.run_silently("ping", &[]).await, Ok(false));
        assert_eq!(runner.run_silently("ping", &[]).await, Ok(true));
        assert_eq!(runner.run_silently("ping", &[]).await, Ok(true));
        assert_eq!(runner.run_silently("other", &[]).await, Ok(false));
        assert_eq!(runner.call_count("ping"), 3);
    }
}

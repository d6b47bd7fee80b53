// Process Table Port
// Backs the default "is it already running?" check.
use async_trait::async_trait;
use std::path::Path;

/// Process table port for liveness lookups
#[async_trait]
pub trait ProcessTable: Send + Sync {
    /// Find processes running the executable at `path`
    ///
    /// # Returns
    /// PIDs of matching processes; empty when none run it
    ///
    /// # Example
    /// ```text
    /// let pids = table.find_pids_by_executable(Path::new("/usr/bin/dropbox")).await;
    /// if !pids.is_empty() {
    ///     println!("dropbox is already running");
    /// }
    /// ```
    async fn find_pids_by_executable(&self, path: &Path) -> Vec<u32>;
}

// ============================================================================
// Mock Implementations for Testing
// ============================================================================

pub mod mocks {
    use super::*;
    use std::collections::HashMap;
    use std::path::PathBuf;
    use std::sync::Mutex;

    /// Mock ProcessTable for testing
    #[derive(Default)]
    pub struct MockProcessTable {
        running: Mutex<HashMap<PathBuf, Vec<u32>>>,
        lookups: Mutex<usize>,
    }

    impl MockProcessTable {
        pub fn new() -> Self {
            Self::default()
        }

        pub fn with_running(self, path: impl Into<PathBuf>, pid: u32) -> Self {
            self.set_running(path, pid);
            self
        }

        pub fn set_running(&self, path: impl Into<PathBuf>, pid: u32) {
            self.running
                .lock()
                .unwrap()
                .entry(path.into())
                .or_default()
                .push(pid);
        }

        pub fn lookup_count(&self) -> usize {
            *self.lookups.lock().unwrap()
        }
    }

    #[async_trait]
    impl ProcessTable for MockProcessTable {
        async fn find_pids_by_executable(&self, path: &Path) -> Vec<u32> {
            *self.lookups.lock().unwrap() += 1;
            self.running
                .lock()
                .unwrap()
                .get(path)
                .cloned()
                .unwrap_or_default()
        }
    }
}

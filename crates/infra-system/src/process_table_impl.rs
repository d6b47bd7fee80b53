// Process table implementation
// reason: sysinfo for portable process enumeration
use async_trait::async_trait;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use sysinfo::System;
use tracing::debug;

use locus_core::port::ProcessTable;

/// Process table backed by sysinfo
///
/// A process matches when its executable path, or its `argv[0]`, equals
/// the requested path, either literally or after resolving symlinks.
pub struct SysinfoProcessTable {
    system: Arc<Mutex<System>>,
}

impl SysinfoProcessTable {
    pub fn new() -> Self {
        Self {
            system: Arc::new(Mutex::new(System::new())),
        }
    }
}

impl Default for SysinfoProcessTable {
    fn default() -> Self {
        Self::new()
    }
}

/// Both spellings of a path: as given, and canonical when it resolves
fn path_variants(path: &Path) -> Vec<PathBuf> {
    let mut variants = vec![path.to_path_buf()];
    if let Ok(canonical) = std::fs::canonicalize(path) {
        if canonical != path {
            variants.push(canonical);
        }
    }
    variants
}

#[async_trait]
impl ProcessTable for SysinfoProcessTable {
    async fn find_pids_by_executable(&self, path: &Path) -> Vec<u32> {
        let wanted = path_variants(path);
        let mut sys = match self.system.lock() {
            Ok(sys) => sys,
            Err(poisoned) => poisoned.into_inner(),
        };

        sys.refresh_processes();

        let mut pids: Vec<u32> = sys
            .processes()
            .iter()
            .filter(|(_, process)| {
                let exe_matches = process
                    .exe()
                    .is_some_and(|exe| wanted.iter().any(|w| w == exe));
                let argv0_matches = process
                    .cmd()
                    .first()
                    .is_some_and(|arg0| wanted.iter().any(|w| w == Path::new(arg0)));
                exe_matches || argv0_matches
            })
            .map(|(pid, _)| pid.as_u32())
            .collect();
        pids.sort_unstable();

        debug!(
            executable = %path.display(),
            pids = ?pids,
            "Process table lookup completed"
        );

        pids
    }
}

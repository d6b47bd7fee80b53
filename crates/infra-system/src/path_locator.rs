// PATH-based program locator
// reason: `which` performs the same lookup and X_OK check as the shell
use std::ffi::OsString;
use std::path::{Path, PathBuf};
use tracing::debug;

use locus_core::port::{LocateError, ProgramLocator};

/// Resolves program references against a search path
pub struct PathLocator {
    search_path: Option<OsString>,
}

impl PathLocator {
    /// Use the process `PATH`, read fresh on every lookup
    pub fn from_env() -> Self {
        Self { search_path: None }
    }

    /// Use a fixed search path (colon separated, like `PATH`)
    pub fn with_search_path(search_path: impl Into<OsString>) -> Self {
        Self {
            search_path: Some(search_path.into()),
        }
    }

    fn search_path(&self) -> Option<OsString> {
        self.search_path
            .clone()
            .or_else(|| std::env::var_os("PATH"))
    }
}

impl Default for PathLocator {
    fn default() -> Self {
        Self::from_env()
    }
}

impl ProgramLocator for PathLocator {
    fn locate(&self, program: &str) -> Result<PathBuf, LocateError> {
        let cwd = std::env::current_dir().unwrap_or_else(|_| PathBuf::from("/"));

        // A directory component means "this file", not a PATH search
        if program.contains('/') {
            debug!(program = %program, "Validating executable path");
            let absolute = cwd.join(Path::new(program));
            return which::which_in(&absolute, None::<OsString>, &cwd)
                .map_err(|_| LocateError::NotExecutable(absolute));
        }

        let located = which::which_in(program, self.search_path(), &cwd)
            .map_err(|_| LocateError::NotOnPath(program.to_string()))?;
        debug!(program = %program, executable = %located.display(), "Found program on search path");
        Ok(located)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use std::os::unix::fs::PermissionsExt;
    use tempfile::TempDir;

    fn write_file(dir: &Path, name: &str, mode: u32) -> PathBuf {
        let path = dir.join(name);
        fs::write(&path, "#!/bin/sh\nexit 0\n").unwrap();
        fs::set_permissions(&path, fs::Permissions::from_mode(mode)).unwrap();
        path
    }

    #[test]
    fn test_bare_name_found_on_search_path() {
        let first = TempDir::new().unwrap();
        let second = TempDir::new().unwrap();
        let expected = write_file(second.path(), "tool", 0o755);
        let search = std::env::join_paths([first.path(), second.path()]).unwrap();

        let locator = PathLocator::with_search_path(search);

        assert_eq!(locator.locate("tool"), Ok(expected));
    }

    #[test]
    fn test_first_match_wins() {
        let first = TempDir::new().unwrap();
        let second = TempDir::new().unwrap();
        let expected = write_file(first.path(), "tool", 0o755);
        write_file(second.path(), "tool", 0o755);
        let search = std::env::join_paths([first.path(), second.path()]).unwrap();

        assert_eq!(PathLocator::with_search_path(search).locate("tool"), Ok(expected));
    }

    #[test]
    fn test_non_executable_on_path_is_skipped() {
        let dir = TempDir::new().unwrap();
        write_file(dir.path(), "tool", 0o644);

        let locator = PathLocator::with_search_path(dir.path().as_os_str());

        assert_eq!(
            locator.locate("tool"),
            Err(LocateError::NotOnPath("tool".to_string()))
        );
    }

    #[test]
    fn test_explicit_path_must_be_executable() {
        let dir = TempDir::new().unwrap();
        let good = write_file(dir.path(), "good", 0o755);
        let bad = write_file(dir.path(), "bad", 0o644);
        let locator = PathLocator::with_search_path("");

        assert_eq!(locator.locate(good.to_str().unwrap()), Ok(good.clone()));
        assert_eq!(
            locator.locate(bad.to_str().unwrap()),
            Err(LocateError::NotExecutable(bad))
        );
        assert!(matches!(
            locator.locate(dir.path().join("missing").to_str().unwrap()),
            Err(LocateError::NotExecutable(_))
        ));
    }

    #[test]
    fn test_directory_is_not_executable_program() {
        let dir = TempDir::new().unwrap();
        fs::create_dir(dir.path().join("tool")).unwrap();

        let locator = PathLocator::with_search_path(dir.path().as_os_str());

        assert!(locator.locate("tool").is_err());
    }

    #[test]
    fn test_path_with_spaces() {
        let dir = TempDir::new().unwrap();
        let spaced = dir.path().join("my app");
        fs::create_dir(&spaced).unwrap();
        let expected = write_file(&spaced, "run me", 0o755);

        let locator = PathLocator::with_search_path("");

        assert_eq!(locator.locate(expected.to_str().unwrap()), Ok(expected));
    }
}

// Background changer - random desktop wallpaper
use rand::seq::SliceRandom;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{debug, info};

use super::constants::SHELL;
use crate::domain::profile::IMAGE_MARKER;
use crate::domain::{shell_quote, BackgroundRule};
use crate::error::{AppError, Result};
use crate::port::{ImageCatalog, ProcessRunner, RunnerError};

/// Picks a random image and hands it to a wallpaper command
pub struct BackgroundChanger {
    runner: Arc<dyn ProcessRunner>,
    catalog: Arc<dyn ImageCatalog>,
}

impl BackgroundChanger {
    pub fn new(runner: Arc<dyn ProcessRunner>, catalog: Arc<dyn ImageCatalog>) -> Self {
        Self { runner, catalog }
    }

    /// Set a random background from `directory`
    ///
    /// # Arguments
    /// * `command` - Shell command with an `{image}` marker, e.g. `feh --bg-fill {image}`
    /// * `directory` - Directory tree searched for `.jpg`, `.jpeg` and `.png` files
    ///
    /// # Errors
    /// - AppError::Validation if `command` has no `{image}` marker
    /// - AppError::NotFound if the directory holds no images
    /// - AppError::Execution if the wallpaper command fails
    pub async fn set_random_background(&self, command: &str, directory: &Path) -> Result<PathBuf> {
        if !command.contains(IMAGE_MARKER) {
            return Err(AppError::Validation(format!(
                "background command must contain an {} marker",
                IMAGE_MARKER
            )));
        }

        debug!(directory = %directory.display(), "Searching for desktop backgrounds");
        let images = self.catalog.list_images(directory)?;
        debug!(count = images.len(), "Found desktop backgrounds");

        let selected = images
            .choose(&mut rand::thread_rng())
            .cloned()
            .ok_or_else(|| {
                AppError::NotFound(format!("no images below {}", directory.display()))
            })?;
        info!(image = %selected.display(), "Selected random background");

        let script = command.replace(IMAGE_MARKER, &shell_quote(&selected.to_string_lossy()));
        let applied = self
            .runner
            .run_silently(SHELL, &["-c".to_string(), script])
            .await?;
        if !applied {
            return Err(RunnerError::NonZeroExit {
                program: command.to_string(),
                code: None,
            }
            .into());
        }

        Ok(selected)
    }

    /// Apply a profile background rule (directory already expanded by the loader)
    pub async fn apply(&self, rule: &BackgroundRule) -> Result<PathBuf> {
        self.set_random_background(&rule.command, Path::new(&rule.directory))
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::port::image_catalog::mocks::MockImageCatalog;
    use crate::port::process_runner::mocks::MockProcessRunner;

    fn changer(runner: Arc<MockProcessRunner>, images: Vec<PathBuf>) -> BackgroundChanger {
        BackgroundChanger::new(runner, Arc::new(MockImageCatalog::new(images)))
    }

    #[tokio::test]
    async fn test_sets_background_with_quoted_path() {
        let runner = Arc::new(MockProcessRunner::new().with_silent("sh", &[true]));
        let image = PathBuf::from("/home/me/My Pictures/lake.jpg");
        let changer = changer(runner.clone(), vec![image.clone()]);

        let selected = changer
            .set_random_background("feh --bg-fill {image}", Path::new("/home/me/My Pictures"))
            .await
            .unwrap();

        assert_eq!(selected, image);
        assert_eq!(
            runner.calls()[0].args,
            vec!["-c", "feh --bg-fill '/home/me/My Pictures/lake.jpg'"]
        );
    }

    #[tokio::test]
    async fn test_rejects_command_without_marker() {
        let runner = Arc::new(MockProcessRunner::new());
        let changer = changer(runner.clone(), vec![PathBuf::from("/a.png")]);

        let err = changer
            .set_random_background("feh --bg-fill", Path::new("/"))
            .await
            .unwrap_err();

        assert!(matches!(err, AppError::Validation(_)));
        assert!(runner.calls().is_empty());
    }

    #[tokio::test]
    async fn test_empty_directory_is_not_found() {
        let runner = Arc::new(MockProcessRunner::new());
        let changer = changer(runner, vec![]);

        let err = changer
            .set_random_background("feh {image}", Path::new("/empty"))
            .await
            .unwrap_err();

        assert!(matches!(err, AppError::NotFound(_)));
    }

    #[tokio::test]
    async fn test_failing_command_is_execution_error() {
        let runner = Arc::new(MockProcessRunner::new().with_silent("sh", &[false]));
        let changer = changer(runner, vec![PathBuf::from("/a.png")]);

        let err = changer
            .set_random_background("feh {image}", Path::new("/"))
            .await
            .unwrap_err();

        assert!(matches!(err, AppError::Execution(RunnerError::NonZeroExit { .. })));
    }
}

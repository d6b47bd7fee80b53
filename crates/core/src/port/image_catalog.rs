// Image Catalog Port
// Lists wallpaper candidates for the background changer.

use crate::error::Result;
use std::path::{Path, PathBuf};

/// Image catalog trait
pub trait ImageCatalog: Send + Sync {
    /// Recursively list image files (`.jpg`, `.jpeg`, `.png`) below `directory`
    ///
    /// # Errors
    /// - AppError::Io if the directory cannot be read
    fn list_images(&self, directory: &Path) -> Result<Vec<PathBuf>>;
}

pub mod mocks {
    use super::*;

    /// Mock ImageCatalog returning a fixed listing
    #[derive(Default)]
    pub struct MockImageCatalog {
        images: Vec<PathBuf>,
    }

    impl MockImageCatalog {
        pub fn new(images: Vec<PathBuf>) -> Self {
            Self { images }
        }
    }

    impl ImageCatalog for MockImageCatalog {
        fn list_images(&self, _directory: &Path) -> Result<Vec<PathBuf>> {
            Ok(self.images.clone())
        }
    }
}

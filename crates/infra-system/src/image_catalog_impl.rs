// Filesystem image catalog
use std::path::{Path, PathBuf};
use tracing::debug;
use walkdir::WalkDir;

use locus_core::application::constants::IMAGE_EXTENSIONS;
use locus_core::port::ImageCatalog;
use locus_core::Result;

/// Walks a directory tree looking for wallpapers
#[derive(Default)]
pub struct FsImageCatalog;

impl FsImageCatalog {
    pub fn new() -> Self {
        Self
    }
}

fn is_image(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| IMAGE_EXTENSIONS.iter().any(|known| ext.eq_ignore_ascii_case(known)))
}

impl ImageCatalog for FsImageCatalog {
    fn list_images(&self, directory: &Path) -> Result<Vec<PathBuf>> {
        let mut images = Vec::new();
        for entry in WalkDir::new(directory).follow_links(true) {
            let entry = match entry {
                Ok(entry) => entry,
                // An unreadable root is an error; anything below it is skipped
                Err(e) if e.depth() == 0 => return Err(std::io::Error::from(e).into()),
                Err(e) => {
                    debug!(error = %e, "Skipping unreadable entry");
                    continue;
                }
            };
            if entry.file_type().is_file() && is_image(entry.path()) {
                images.push(entry.into_path());
            }
        }
        images.sort();
        debug!(directory = %directory.display(), count = images.len(), "Listed images");
        Ok(images)
    }
}

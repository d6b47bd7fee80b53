//! Profile loading
//!
//! Reads the TOML profile through the `config` crate and expands `~` in paths.

use anyhow::{Context, Result};
use config::{File, FileFormat, Source, Value};
use std::path::{Path, PathBuf};
use tracing::info;

use locus_core::domain::Profile;

/// Default location of the user's profile
pub const DEFAULT_PROFILE: &str = "~/.locus.toml";

/// Expand a user supplied path (`~` and `$VAR`)
pub fn expand_path(raw: &str) -> PathBuf {
    match shellexpand::full(raw) {
        Ok(expanded) => PathBuf::from(expanded.into_owned()),
        Err(_) => PathBuf::from(shellexpand::tilde(raw).into_owned()),
    }
}

/// Load and validate a profile
///
/// # Errors
/// Fails if the file is missing, is not valid TOML, has unknown keys, or
/// does not pass `Profile::validate`.
pub fn load_profile(path: &Path) -> Result<Profile> {
    info!(profile = %path.display(), "Loading profile");

    // Collect the file source directly: merging through `Config::builder`
    // lowercases keys, and location names are keys.
    let table = File::from(path)
        .format(FileFormat::Toml)
        .required(true)
        .collect()
        .with_context(|| format!("Failed to read profile {}", path.display()))?;

    let mut profile: Profile = Value::new(None, table)
        .try_deserialize()
        .with_context(|| format!("Invalid profile {}", path.display()))?;

    if let Some(background) = profile.background.as_mut() {
        background.directory = expand_path(&background.directory)
            .to_string_lossy()
            .into_owned();
    }

    profile
        .validate()
        .with_context(|| format!("Invalid profile {}", path.display()))?;

    Ok(profile)
}

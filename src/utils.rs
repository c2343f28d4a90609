//! File locations and loading helpers shared by the CLI and integration
//! tests.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use time::{Date, OffsetDateTime};

use crate::{Catalog, Preset, catalog};

/// Environment variable overriding the catalog path.
pub const CATALOG_ENV: &str = "JUDQ_CATALOG";

/// Environment variable overriding the preset path.
pub const PRESETS_ENV: &str = "JUDQ_PRESETS";

/// Gets the cross-platform data directory for judq.
///
/// Returns `{data_dir}/judq` where `data_dir` is:
/// - Linux: `~/.local/share`
/// - macOS: `~/Library/Application Support`
/// - Windows: `C:\Users\<user>\AppData\Roaming`
///
/// # Errors
///
/// Returns an error if the data directory cannot be determined.
pub fn get_data_dir() -> Result<PathBuf> {
    let data_dir =
        dirs::data_dir().ok_or_else(|| anyhow::anyhow!("Failed to determine data directory"))?;

    Ok(data_dir.join("judq"))
}

/// Reads a path from a non-empty environment variable.
fn env_path(env_var: &str) -> Option<PathBuf> {
    std::env::var(env_var)
        .ok()
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
        .map(PathBuf::from)
}

/// Resolves a file path: explicit flag first, then a non-empty environment
/// variable, then `file_name` in the data directory.
fn resolve_path(flag: Option<&Path>, env_var: &str, file_name: &str) -> Result<PathBuf> {
    if let Some(path) = flag {
        return Ok(path.to_path_buf());
    }
    if let Some(path) = env_path(env_var) {
        return Ok(path);
    }

    Ok(get_data_dir()?.join(file_name))
}

/// Gets the tag catalog path.
pub fn get_catalog_path(flag: Option<&Path>) -> Result<PathBuf> {
    resolve_path(flag, CATALOG_ENV, "tags.json")
}

/// Gets the preset file path.
pub fn get_presets_path(flag: Option<&Path>) -> Result<PathBuf> {
    resolve_path(flag, PRESETS_ENV, "presets.json")
}

/// Returns true when the preset path was set by flag or environment rather
/// than defaulted to the data directory.
pub fn presets_configured(flag: Option<&Path>) -> bool {
    flag.is_some() || env_path(PRESETS_ENV).is_some()
}

/// Loads the tag catalog.
///
/// # Errors
///
/// Returns an error if the file cannot be read or is not a valid catalog.
pub fn load_catalog(path: &Path) -> Result<Catalog> {
    Catalog::load(path)
        .with_context(|| format!("Failed to load tag catalog: {}", path.display()))
}

/// Loads presets.
///
/// A missing file yields no presets unless `required` is set, so the
/// catalog can be used on its own.
///
/// # Errors
///
/// Returns an error if the file exists but is invalid, or is required and
/// missing.
pub fn load_presets(path: &Path, required: bool) -> Result<Vec<Preset>> {
    if !required && !path.exists() {
        tracing::debug!(path = %path.display(), "no preset file");
        return Ok(Vec::new());
    }

    catalog::load_presets(path)
        .with_context(|| format!("Failed to load presets: {}", path.display()))
}

/// Returns today's date in UTC.
pub fn today() -> Date {
    OffsetDateTime::now_utc().date()
}

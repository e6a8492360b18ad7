#![allow(clippy::module_name_repetitions)]
//! Canonical file paths for the data directory.
//!
//! The data directory is `INCIDENT_MAP_DATA_DIR` when set, otherwise the
//! project root's `data/` directory.

use std::path::{Path, PathBuf};

/// Environment variable overriding [`data_dir`].
pub const DATA_DIR_ENV: &str = "INCIDENT_MAP_DATA_DIR";

/// Returns the workspace root directory.
///
/// Resolved at compile time from `CARGO_MANIFEST_DIR`.
///
/// # Panics
///
/// Panics if the project root cannot be resolved.
#[must_use]
pub fn project_root() -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR"))
        .ancestors()
        .nth(2)
        .expect("Failed to find project root from CARGO_MANIFEST_DIR")
        .to_path_buf()
}

/// Returns the data directory path.
#[must_use]
pub fn data_dir() -> PathBuf {
    std::env::var_os(DATA_DIR_ENV)
        .filter(|v| !v.is_empty())
        .map_or_else(|| project_root().join("data"), PathBuf::from)
}

/// Returns the `filters/` directory holding persisted filter slots.
#[must_use]
pub fn filters_dir_in(data_dir: &Path) -> PathBuf {
    data_dir.join("filters")
}

/// Returns the `published/` directory for exported snapshots.
#[must_use]
pub fn published_dir_in(data_dir: &Path) -> PathBuf {
    data_dir.join("published")
}

/// Ensures a directory exists, creating it if necessary.
///
/// # Errors
///
/// Returns an I/O error if the directory cannot be created.
pub fn ensure_dir(path: &Path) -> std::io::Result<()> {
    if !path.exists() {
        std::fs::create_dir_all(path)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn subdirectories_hang_off_the_data_dir() {
        let base = Path::new("/srv/incidents");
        assert_eq!(filters_dir_in(base), Path::new("/srv/incidents/filters"));
        assert_eq!(
            published_dir_in(base),
            Path::new("/srv/incidents/published")
        );
    }

    #[test]
    fn project_root_contains_the_workspace_manifest() {
        assert!(project_root().join("Cargo.toml").exists());
    }
}

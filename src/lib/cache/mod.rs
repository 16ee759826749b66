//! The Swift package dependency cache handling: locating it on the fs,
//! recognizing the corrupted-state failure and removing it before the
//! single build retry

use std::path::{Path, PathBuf};

use color_eyre::{eyre::Context, Result};
use walkdir::WalkDir;

use crate::utils::constants::error_messages;

/// The marker `xcodebuild` prints when the Swift packages cache is in an
/// invalid state. This is an external contract with the build tool: keep
/// the check behind [`is_cache_invalidated`] so a message change in a
/// future Xcode stays a one-line fix
pub const SWIFT_PACKAGES_STATE_INVALID: &str = "Could not resolve package dependencies";

/// Relative location of the DerivedData root under the user's home
const DERIVED_DATA_DIR: &str = "Library/Developer/Xcode/DerivedData";

/// Name of the package checkout directory inside a DerivedData entry
const SOURCE_PACKAGES_DIR: &str = "SourcePackages";

/// Whether the captured build output reports the corrupted package cache
/// condition that warrants the one-shot remove-and-retry
pub fn is_cache_invalidated(raw_build_output: &str) -> bool {
    raw_build_output.contains(SWIFT_PACKAGES_STATE_INVALID)
}

/// Locates the Swift packages checkout of the project under build: the
/// `SourcePackages` directory of the newest DerivedData entry whose name
/// was derived from the project's file stem. Returns `None` when there's
/// no home dir, no DerivedData or no matching entry, which simply leaves
/// the retry policy inert
pub fn swift_packages_dir(project_path: &Path) -> Option<PathBuf> {
    let home = std::env::var_os("HOME")?;
    swift_packages_dir_under(&PathBuf::from(home).join(DERIVED_DATA_DIR), project_path)
}

fn swift_packages_dir_under(derived_data: &Path, project_path: &Path) -> Option<PathBuf> {
    let stem = project_path.file_stem()?.to_str()?;
    let prefix = format!("{stem}-");

    let newest = WalkDir::new(derived_data)
        .min_depth(1)
        .max_depth(1)
        .into_iter()
        .filter_map(|e| e.ok())
        .filter(|e| e.file_type().is_dir())
        .filter(|e| {
            e.file_name()
                .to_str()
                .is_some_and(|name| name.starts_with(&prefix))
        })
        .max_by_key(|e| {
            e.metadata()
                .ok()
                .and_then(|m| m.modified().ok())
                .unwrap_or(std::time::SystemTime::UNIX_EPOCH)
        })?;

    let packages = newest.path().join(SOURCE_PACKAGES_DIR);
    packages.exists().then_some(packages)
}

/// Deletes the cache directory so the retried build resolves the package
/// graph from scratch
pub fn remove(cache_dir: &Path) -> Result<()> {
    log::debug!("Removing the Swift packages cache at {cache_dir:?}");
    std::fs::remove_dir_all(cache_dir)
        .with_context(|| format!("{}: {cache_dir:?}", error_messages::SWIFT_PACKAGES_REMOVAL))
}

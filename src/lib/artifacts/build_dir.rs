//! Normalization of raw build output directories.
//!
//! `TARGET_BUILD_DIR` embeds the build tool's canonical `Build/` segment,
//! after which per-target and per-configuration subpaths diverge. Invoking
//! the settings query through `-workspace/-scheme` vs `-project/-target`
//! yields structurally different absolute paths for the same physical
//! location, so the step splits every raw dir at the marker and recombines
//! one target's relative part with another target's base

use std::path::{Path, PathBuf};

/// The canonical intermediate directory segment of a build output path
pub const BUILD_DIR_MARKER: &str = "Build/";

/// A raw build output directory split at the marker: `base` reaches up to
/// and including the `Build` segment, `relative` is whatever diverged after
/// it
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SplitBuildDir {
    pub base: PathBuf,
    pub relative: PathBuf,
}

/// Splits `raw` at the first occurrence of the marker. A raw dir without
/// the marker (unexpected format) is kept unmodified as the base with an
/// empty relative part, which degrades the candidate list instead of
/// failing the run
pub fn normalize_build_dir(raw: &str) -> SplitBuildDir {
    match raw.split_once(BUILD_DIR_MARKER) {
        Some((prefix, rest)) => SplitBuildDir {
            base: Path::new(prefix).join("Build"),
            relative: PathBuf::from(rest),
        },
        None => {
            log::debug!(
                "Could not split the build dir ({raw}) at the '{BUILD_DIR_MARKER}' marker, \
                 using it unmodified"
            );
            SplitBuildDir {
                base: PathBuf::from(raw),
                relative: PathBuf::new(),
            }
        }
    }
}

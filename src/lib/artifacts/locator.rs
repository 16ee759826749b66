//! Location and export of one generated app bundle: an ordered list of
//! candidate source directories is probed until one of them holds the
//! bundle and the copy into the deploy dir succeeds

use std::path::{Path, PathBuf};

use color_eyre::{eyre::eyre, Result};

use crate::project_model::target::BuildTarget;
use crate::utils::constants::error_messages;
use crate::utils::fs;

/// Everything the locator needs to find and export one target's bundle.
///
/// `wrapper_name` is the `WRAPPER_NAME` build setting of the target, used
/// as the fallback bundle name when the product reference's recorded path
/// doesn't match what the build actually produced (renamed products)
pub struct LocateRequest<'a> {
    pub target: &'a BuildTarget,
    pub scheme_base: &'a Path,
    pub target_relative: &'a Path,
    pub project_dir: &'a Path,
    pub deploy_dir: &'a Path,
    pub wrapper_name: Option<&'a str>,
}

/// Tries the candidate directories in priority order and copies the first
/// bundle found to `deploy_dir`, returning the destination path. A copy
/// failure on one candidate moves on to the next; only exhausting every
/// candidate (wrapper-name fallback included) fails
pub fn locate_and_copy(request: &LocateRequest) -> Result<PathBuf> {
    let candidates = candidate_dirs(request);
    let destination = request.deploy_dir.join(&request.target.product_path);

    for candidate in &candidates {
        for name in bundle_names(request) {
            let source = candidate.join(name);
            log::debug!("Checking the candidate artifact path {source:?}");
            if !source.exists() {
                continue;
            }

            match copy_bundle(&source, &destination) {
                Ok(()) => {
                    log::info!("Copy: {}", destination.display());
                    zip_alongside(&destination);
                    return Ok(destination);
                }
                Err(copy_err) => {
                    log::warn!(
                        "Failed to copy {source:?} to the deploy dir ({copy_err}), \
                         trying the next candidate"
                    );
                }
            }
        }
    }

    Err(eyre!(
        "{}: target {} (checked {:?})",
        error_messages::ARTIFACT_NOT_FOUND,
        request.target.name,
        candidates
    ))
}

/// The ordered candidate source directories:
/// 1. the scheme's build base recombined with the target's relative dir
///    (dependents sharing the main scheme's derived data root),
/// 2. the scheme's build base alone (custom shared `TARGET_BUILD_DIR`),
/// 3. the scheme's build base resolved against the project file's dir
///    (custom build dirs recorded relative to the container)
fn candidate_dirs(request: &LocateRequest) -> Vec<PathBuf> {
    vec![
        request.scheme_base.join(request.target_relative),
        request.scheme_base.to_path_buf(),
        request.project_dir.join(request.scheme_base),
    ]
}

fn bundle_names<'a>(request: &LocateRequest<'a>) -> Vec<&'a str> {
    let mut names = vec![request.target.product_path.as_str()];
    if let Some(wrapper) = request.wrapper_name {
        if !wrapper.is_empty() && wrapper != request.target.product_path {
            names.push(wrapper);
        }
    }
    names
}

fn copy_bundle(source: &Path, destination: &Path) -> Result<()> {
    fs::remove_if_exists(destination)?;
    fs::copy_dir_recursive(source, destination)
}

/// Zips the exported bundle next to its unzipped copy. A failed zip is a
/// warning, never a step failure
fn zip_alongside(bundle: &Path) {
    match fs::zip_dir(bundle) {
        Ok(zip_path) => log::info!("Zip: {}", zip_path.display()),
        Err(zip_err) => log::warn!("Failed to zip {bundle:?}: {zip_err}"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use color_eyre::Result;
    use tempfile::tempdir;

    fn make_bundle(dir: &Path, name: &str) -> Result<()> {
        fs::create_directory(&dir.join(name))?;
        fs::create_file(&dir.join(name), "Info.plist", b"<plist/>")?;
        Ok(())
    }

    #[test]
    fn test_first_candidate_wins() -> Result<()> {
        let temp = tempdir()?;
        let scheme_base = temp.path().join("Build");
        let deploy = temp.path().join("deploy");
        let products = scheme_base.join("Products/Debug-iphonesimulator");
        make_bundle(&products, "App.app")?;
        fs::create_directory(&deploy)?;

        let target = BuildTarget::new("APP", "App", "App.app");
        let copied = locate_and_copy(&LocateRequest {
            target: &target,
            scheme_base: &scheme_base,
            target_relative: Path::new("Products/Debug-iphonesimulator"),
            project_dir: temp.path(),
            deploy_dir: &deploy,
            wrapper_name: None,
        })?;

        assert_eq!(copied, deploy.join("App.app"));
        assert!(copied.join("Info.plist").exists());

        Ok(())
    }

    #[test]
    fn test_bundle_only_under_the_second_candidate() -> Result<()> {
        let temp = tempdir()?;
        let scheme_base = temp.path().join("shared-out");
        let deploy = temp.path().join("deploy");
        // the bundle sits directly in the scheme base, not under the
        // target's relative dir
        make_bundle(&scheme_base, "App.app")?;
        fs::create_directory(&deploy)?;

        let target = BuildTarget::new("APP", "App", "App.app");
        let copied = locate_and_copy(&LocateRequest {
            target: &target,
            scheme_base: &scheme_base,
            target_relative: Path::new("Products/Debug-iphonesimulator"),
            project_dir: temp.path(),
            deploy_dir: &deploy,
            wrapper_name: None,
        })?;

        // the returned path lives under the deploy dir, never under any
        // candidate source dir
        assert!(copied.starts_with(&deploy));
        assert!(copied.join("Info.plist").exists());

        Ok(())
    }

    #[test]
    fn test_wrapper_name_fallback() -> Result<()> {
        let temp = tempdir()?;
        let scheme_base = temp.path().join("Build");
        let relative = Path::new("Products/Debug-iphonesimulator");
        let deploy = temp.path().join("deploy");
        // the product reference says App.app but the build produced
        // Renamed.app
        make_bundle(&scheme_base.join(relative), "Renamed.app")?;
        fs::create_directory(&deploy)?;

        let target = BuildTarget::new("APP", "App", "App.app");
        let copied = locate_and_copy(&LocateRequest {
            target: &target,
            scheme_base: &scheme_base,
            target_relative: relative,
            project_dir: temp.path(),
            deploy_dir: &deploy,
            wrapper_name: Some("Renamed.app"),
        })?;

        // the destination keeps the product reference's name
        assert_eq!(copied, deploy.join("App.app"));
        assert!(copied.join("Info.plist").exists());

        Ok(())
    }

    #[test]
    fn test_exhausted_candidates_fail_with_the_target_name() -> Result<()> {
        let temp = tempdir()?;
        let deploy = temp.path().join("deploy");
        fs::create_directory(&deploy)?;

        let target = BuildTarget::new("APP", "App", "App.app");
        let err = locate_and_copy(&LocateRequest {
            target: &target,
            scheme_base: &temp.path().join("Build"),
            target_relative: Path::new("Products/Debug-iphonesimulator"),
            project_dir: temp.path(),
            deploy_dir: &deploy,
            wrapper_name: Some("Other.app"),
        })
        .unwrap_err();

        let rendered = err.to_string();
        assert!(rendered.contains(error_messages::ARTIFACT_NOT_FOUND));
        assert!(rendered.contains("App"));

        Ok(())
    }

    #[test]
    fn test_stale_destination_is_replaced() -> Result<()> {
        let temp = tempdir()?;
        let scheme_base = temp.path().join("Build");
        let deploy = temp.path().join("deploy");
        make_bundle(&scheme_base, "App.app")?;
        // a leftover bundle from a previous run with different contents
        make_bundle(&deploy, "App.app")?;
        fs::create_file(&deploy.join("App.app"), "stale.txt", b"old")?;

        let target = BuildTarget::new("APP", "App", "App.app");
        let copied = locate_and_copy(&LocateRequest {
            target: &target,
            scheme_base: &scheme_base,
            target_relative: Path::new(""),
            project_dir: temp.path(),
            deploy_dir: &deploy,
            wrapper_name: None,
        })?;

        assert!(copied.join("Info.plist").exists());
        assert!(!copied.join("stale.txt").exists());

        Ok(())
    }
}

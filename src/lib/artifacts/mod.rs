//! The artifact resolution and export pipeline: which targets to look at,
//! where their bundles landed, copying them into the output directory and
//! exporting the resulting paths for the rest of the CI workflow

pub mod build_dir;
pub mod locator;
pub mod resolver;

use std::path::{Path, PathBuf};
use std::process::Command;

use color_eyre::{
    eyre::{eyre, Context},
    Result,
};

use crate::project_model::{query::ProjectQuery, scheme::Scheme, ProjectKind, XcodeProject};
use crate::utils::constants::{env_keys, error_messages, settings_keys, PATH_LIST_SEPARATOR};
use crate::xcodebuild::{Platform, WATCHOS_PLATFORM_MARKER, WATCHOS_SIMULATOR_SDK};

/// Resolves every app bundle the scheme generated and copies each one into
/// `deploy_dir`, returning the copied paths (main target first). At least
/// the main target must resolve or the whole export fails
pub fn export_artifacts(
    query: &dyn ProjectQuery,
    project: &XcodeProject,
    scheme: &Scheme,
    configuration: Option<&str>,
    custom_options: &[String],
    platform: Platform,
    deploy_dir: &Path,
) -> Result<Vec<PathBuf>> {
    let resolved = resolver::resolve_targets(scheme, project)?;
    let scheme_sdk = platform.simulator_sdk();

    // The scheme-level build dir anchors every candidate path; a workspace
    // only answers this query through the scheme
    let scheme_base_settings = match project.kind {
        ProjectKind::Workspace => {
            query.scheme_build_settings(configuration, &with_sdk(scheme_sdk, custom_options))?
        }
        ProjectKind::Project => query.target_build_settings(
            &resolved.main.name,
            configuration,
            &with_sdk(scheme_sdk, custom_options),
        )?,
    };
    let scheme_split = build_dir::normalize_build_dir(
        scheme_base_settings.require(settings_keys::TARGET_BUILD_DIR)?,
    );
    log::debug!(
        "Scheme ({}) build dir base: {:?}",
        scheme.name,
        scheme_split.base
    );

    let mut artifacts: Vec<PathBuf> = Vec::new();
    for target in resolved.all() {
        log::info!("{}...", target.name);

        if !target.is_app_bundle() {
            log::info!("Target ({}) does not produce an .app bundle - SKIP", target.name);
            continue;
        }

        let sdk = simulator_sdk_for_target(query, &target.name, configuration, scheme_sdk);

        let settings = query
            .target_build_settings(
                &target.name,
                configuration,
                &with_sdk(sdk, custom_options),
            )
            .with_context(|| format!("target {}", target.name))?;
        let raw_build_dir = settings
            .require(settings_keys::TARGET_BUILD_DIR)
            .with_context(|| format!("target {}", target.name))?;
        log::debug!("Target ({}) TARGET_BUILD_DIR: {raw_build_dir}", target.name);

        let target_split = build_dir::normalize_build_dir(raw_build_dir);
        let copied = locator::locate_and_copy(&locator::LocateRequest {
            target,
            scheme_base: &scheme_split.base,
            target_relative: &target_split.relative,
            project_dir: project.project_dir(),
            deploy_dir,
            wrapper_name: settings.get(settings_keys::WRAPPER_NAME),
        })?;
        artifacts.push(copied);
    }

    if artifacts.is_empty() {
        return Err(eyre!(error_messages::NO_ARTIFACTS));
    }

    Ok(artifacts)
}

/// The simulator SDK the target actually builds against: the scheme's
/// platform family by default, overridden to the watch simulator when the
/// target's `SDKROOT` points at the watchOS platform. A failed probe keeps
/// the default, like every other degraded introspection path
fn simulator_sdk_for_target<'a>(
    query: &dyn ProjectQuery,
    target_name: &str,
    configuration: Option<&str>,
    scheme_sdk: &'a str,
) -> &'a str {
    match query.target_build_settings(target_name, configuration, &[]) {
        Ok(settings) => match settings.get(settings_keys::SDKROOT) {
            Some(sdk_root) => {
                log::debug!("Target ({target_name}) SDKROOT: {sdk_root}");
                if sdk_root.contains(WATCHOS_PLATFORM_MARKER) {
                    WATCHOS_SIMULATOR_SDK
                } else {
                    scheme_sdk
                }
            }
            None => {
                log::debug!("No SDKROOT entry found for the ({target_name}) target");
                scheme_sdk
            }
        },
        Err(probe_err) => {
            log::debug!("Failed to fetch the ({target_name}) target settings: {probe_err}");
            scheme_sdk
        }
    }
}

fn with_sdk(sdk: &str, custom_options: &[String]) -> Vec<String> {
    let mut extra = vec!["-sdk".to_owned(), sdk.to_owned()];
    extra.extend(custom_options.iter().cloned());
    extra
}

/// How the step hands its outputs to the surrounding CI workflow
pub trait EnvExporter {
    fn export(&self, key: &str, value: &str) -> Result<()>;
}

/// Production exporter shelling out to the workflow's environment manager
pub struct EnvmanExporter;

impl EnvExporter for EnvmanExporter {
    fn export(&self, key: &str, value: &str) -> Result<()> {
        let output = Command::new("envman")
            .args(["add", "--key", key, "--value", value])
            .output()
            .with_context(|| error_messages::ENV_EXPORT)?;

        if !output.status.success() {
            return Err(eyre!(
                "{}: envman add {key} exited with {}",
                error_messages::ENV_EXPORT,
                output.status
            ));
        }

        Ok(())
    }
}

/// Exports the primary bundle path and the pipe-separated list of every
/// copied bundle path, returning both rendered values for the final log
pub fn export_output(
    artifacts: &[PathBuf],
    exporter: &dyn EnvExporter,
) -> Result<(String, String)> {
    let primary = artifacts
        .first()
        .ok_or_else(|| eyre!(error_messages::NO_ARTIFACTS))?
        .display()
        .to_string();
    exporter
        .export(env_keys::APP_DIR_PATH, &primary)
        .with_context(|| error_messages::ENV_EXPORT)?;

    let joined = artifacts
        .iter()
        .map(|path| path.display().to_string())
        .collect::<Vec<_>>()
        .join(&PATH_LIST_SEPARATOR.to_string());
    let path_list = joined.trim_matches(PATH_LIST_SEPARATOR).to_owned();
    exporter
        .export(env_keys::APP_DIR_PATH_LIST, &path_list)
        .with_context(|| error_messages::ENV_EXPORT)?;

    Ok((primary, path_list))
}

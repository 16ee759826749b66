//! The introspection seam between the step and the project under build.
//!
//! The step never parses Apple's project file formats itself: everything it
//! needs to know about a project is phrased as one of the queries below, and
//! the shipped implementation answers them by driving `xcodebuild`'s own
//! introspection modes (`-list -json`, `-showBuildSettings`)

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::process::Command;

use color_eyre::{
    eyre::{eyre, Context},
    Result,
};
use indexmap::IndexMap;
use serde::Deserialize;

use crate::utils::constants::{error_messages, settings_keys};

use super::{
    scheme::{BuildActionEntry, Scheme},
    settings::BuildSettings,
    target::BuildTarget,
    ProjectKind, XcodeProject,
};

/// Prefix shared by every application product type: the plain
/// `com.apple.product-type.application` and its watch/extension subtypes
const APPLICATION_PRODUCT_TYPE_PREFIX: &str = "com.apple.product-type.application";

/// The queries the artifact resolution core performs against the project
/// under build. A query handle is scoped to one (container, scheme) pair
/// for the whole run.
///
/// `load` materializes the read-only value model; the settings queries run
/// the settings introspection mode scoped either to a project target
/// (direct) or through the scheme (indirect, the only shape a workspace
/// answers, since a workspace's settings vary with the contained project
/// that is active)
pub trait ProjectQuery {
    fn load(&self) -> Result<XcodeProject>;

    fn target_build_settings(
        &self,
        target: &str,
        configuration: Option<&str>,
        extra: &[String],
    ) -> Result<BuildSettings>;

    fn scheme_build_settings(
        &self,
        configuration: Option<&str>,
        extra: &[String],
    ) -> Result<BuildSettings>;
}

/// Production implementation backed by the `xcodebuild` binary
pub struct XcodebuildQuery {
    project_path: PathBuf,
    kind: ProjectKind,
    scheme: String,
}

impl XcodebuildQuery {
    pub fn new(project_path: &Path, scheme: &str) -> Result<Self> {
        Ok(Self {
            project_path: project_path.to_path_buf(),
            kind: ProjectKind::from_path(project_path)?,
            scheme: scheme.to_owned(),
        })
    }

    fn container_args(&self) -> Vec<String> {
        vec![
            self.kind.container_flag().to_owned(),
            self.project_path.display().to_string(),
        ]
    }

    fn scheme_scope(&self) -> Vec<String> {
        let mut scope = self.container_args();
        scope.push("-scheme".into());
        scope.push(self.scheme.clone());
        scope
    }

    /// Spawns `xcodebuild` with the given arguments and returns its trimmed
    /// stdout. Every issued query gets traced, so verbose runs show the
    /// full introspection traffic
    fn run_introspection(&self, args: &[String]) -> Result<String> {
        log::debug!("$ xcodebuild {}", args.join(" "));

        let output = Command::new("xcodebuild")
            .args(args)
            .output()
            .with_context(|| error_messages::SETTINGS_QUERY)?;

        if !output.status.success() {
            return Err(eyre!(
                "xcodebuild {} exited with {}: {}",
                args.join(" "),
                output.status,
                String::from_utf8_lossy(&output.stderr).trim()
            ));
        }

        Ok(String::from_utf8_lossy(&output.stdout).trim().to_owned())
    }

    fn show_build_settings(
        &self,
        scope: &[String],
        configuration: Option<&str>,
        extra: &[String],
        json: bool,
    ) -> Result<String> {
        let mut args = scope.to_vec();
        if let Some(configuration) = configuration {
            args.push("-configuration".into());
            args.push(configuration.into());
        }
        args.push("-showBuildSettings".into());
        if json {
            args.push("-json".into());
        }
        args.extend(extra.iter().cloned());

        self.run_introspection(&args)
    }

    fn list(&self) -> Result<ContainerInfo> {
        let mut args = self.container_args();
        args.push("-list".into());
        args.push("-json".into());

        let raw = self
            .run_introspection(&args)
            .with_context(|| error_messages::PROJECT_LISTING)?;
        let listing: ListOutput =
            serde_json::from_str(&raw).with_context(|| error_messages::PROJECT_LISTING)?;

        listing
            .project
            .or(listing.workspace)
            .ok_or_else(|| eyre!(error_messages::PROJECT_LISTING))
    }

    /// Per-target settings of everything the scheme builds, in the order
    /// the introspection mode reports them
    fn scheme_target_settings(
        &self,
        configuration: Option<&str>,
        extra: &[String],
    ) -> Result<Vec<TargetSettings>> {
        let raw = self.show_build_settings(&self.scheme_scope(), configuration, extra, true)?;
        serde_json::from_str(&raw).with_context(|| error_messages::SETTINGS_QUERY)
    }
}

impl ProjectQuery for XcodebuildQuery {
    fn load(&self) -> Result<XcodeProject> {
        let info = self.list()?;
        if !info
            .schemes
            .as_deref()
            .unwrap_or_default()
            .iter()
            .any(|s| *s == self.scheme)
        {
            return Err(eyre!(
                "{}: {}",
                error_messages::SCHEME_NOT_FOUND,
                self.scheme
            ));
        }

        let per_target = self.scheme_target_settings(None, &[])?;

        // Root applications ahead of watch companions and other application
        // subtypes, so the scheme's first app reference is the main target
        // regardless of the order the introspection mode emitted
        let mut ordered: Vec<&TargetSettings> = per_target
            .iter()
            .filter(|ts| ts.product_type() == Some(APPLICATION_PRODUCT_TYPE_PREFIX))
            .collect();
        ordered.extend(
            per_target
                .iter()
                .filter(|ts| ts.product_type() != Some(APPLICATION_PRODUCT_TYPE_PREFIX)),
        );

        let mut targets: IndexMap<String, BuildTarget> = IndexMap::new();
        let mut entries = Vec::with_capacity(ordered.len());
        for ts in &ordered {
            let product_path = ts.product_path();
            entries.push(BuildActionEntry {
                target_id: ts.target.clone(),
                buildable_name: product_path.clone(),
                build_for_archiving: true,
            });
            targets.insert(
                ts.target.clone(),
                BuildTarget::new(ts.target.clone(), ts.target.clone(), product_path),
            );
        }

        // Dependency edges come from the scheme's own build list: whatever
        // else the scheme builds is built for the main target's sake
        let ids: Vec<String> = targets.keys().cloned().collect();
        if let Some(main_id) = ids.first() {
            let dependency_ids = ids[1..].to_vec();
            if let Some(main) = targets.get_mut(main_id) {
                main.dependency_ids = dependency_ids;
            }
        }

        let mut scheme = Scheme::new(self.scheme.as_str(), entries);
        scheme.default_configuration = ordered
            .first()
            .and_then(|ts| ts.setting(settings_keys::CONFIGURATION))
            .map(str::to_owned);

        Ok(XcodeProject {
            path: self.project_path.clone(),
            kind: self.kind,
            targets,
            schemes: vec![scheme],
        })
    }

    fn target_build_settings(
        &self,
        target: &str,
        configuration: Option<&str>,
        extra: &[String],
    ) -> Result<BuildSettings> {
        match self.kind {
            ProjectKind::Project => {
                let scope = vec![
                    "-project".to_owned(),
                    self.project_path.display().to_string(),
                    "-target".to_owned(),
                    target.to_owned(),
                ];
                let raw = self
                    .show_build_settings(&scope, configuration, extra, false)
                    .with_context(|| {
                        format!("{}: target {target}", error_messages::SETTINGS_QUERY)
                    })?;
                Ok(BuildSettings::parse(&raw))
            }
            // A workspace only answers through a scheme: take the entry of
            // the per-target listing that belongs to the requested target
            ProjectKind::Workspace => {
                let per_target = self
                    .scheme_target_settings(configuration, extra)
                    .with_context(|| {
                        format!("{}: target {target}", error_messages::SETTINGS_QUERY)
                    })?;
                per_target
                    .into_iter()
                    .find(|ts| ts.target == target)
                    .map(|ts| BuildSettings::from_map(ts.build_settings))
                    .ok_or_else(|| {
                        eyre!(
                            "{}: the scheme {} does not build the target {target}",
                            error_messages::SETTINGS_QUERY,
                            self.scheme
                        )
                    })
            }
        }
    }

    fn scheme_build_settings(
        &self,
        configuration: Option<&str>,
        extra: &[String],
    ) -> Result<BuildSettings> {
        let raw = self
            .show_build_settings(&self.scheme_scope(), configuration, extra, false)
            .with_context(|| {
                format!("{}: scheme {}", error_messages::SETTINGS_QUERY, self.scheme)
            })?;

        Ok(BuildSettings::parse(&raw))
    }
}

#[derive(Debug, Deserialize)]
struct ListOutput {
    project: Option<ContainerInfo>,
    workspace: Option<ContainerInfo>,
}

#[derive(Debug, Deserialize)]
struct ContainerInfo {
    schemes: Option<Vec<String>>,
}

/// One element of the JSON array `-showBuildSettings -json` prints per
/// target built by the scheme
#[derive(Debug, Deserialize)]
struct TargetSettings {
    target: String,
    #[serde(rename = "buildSettings")]
    build_settings: HashMap<String, String>,
}

impl TargetSettings {
    fn setting(&self, key: &str) -> Option<&str> {
        self.build_settings.get(key).map(String::as_str)
    }

    fn product_type(&self) -> Option<&str> {
        self.setting(settings_keys::PRODUCT_TYPE)
    }

    /// The product's on-disk name: the wrapper name when the product is a
    /// bundle, the full product name otherwise, the bare target name as the
    /// last resort (which later stages will rightly treat as not-an-app)
    fn product_path(&self) -> String {
        self.setting(settings_keys::WRAPPER_NAME)
            .filter(|name| !name.is_empty())
            .or_else(|| self.setting(settings_keys::FULL_PRODUCT_NAME))
            .unwrap_or(&self.target)
            .to_owned()
    }
}

use clap::Parser;
use color_eyre::{eyre::eyre, Result};
use tempfile::tempdir;

use simbuild::artifacts::{self, EnvExporter};
use simbuild::cli::input::CliArgs;
use simbuild::project_model::query::ProjectQuery;
use simbuild::project_model::scheme::{BuildActionEntry, Scheme};
use simbuild::project_model::settings::BuildSettings;
use simbuild::project_model::target::BuildTarget;
use simbuild::project_model::{ProjectKind, XcodeProject};
use simbuild::worker::run_step;
use simbuild::xcodebuild::Platform;

use std::cell::RefCell;
use std::collections::HashMap;
use std::path::PathBuf;

#[test]
fn test_step_rejects_an_unknown_project_extension() {
    let cli_args = CliArgs::parse_from([
        "",
        "--project-path",
        "App.tar.gz",
        "--scheme",
        "App",
        "--destination",
        "platform=iOS Simulator,name=iPhone 15",
        "--output-dir",
        "out",
    ]);

    let err = run_step(&cli_args).unwrap_err();
    assert!(err
        .to_string()
        .contains("Project file extension should be .xcodeproj or .xcworkspace"));
}

#[test]
fn test_step_rejects_conflicting_settings_overrides() {
    // `-xcconfig` in the free-form options and inline override content at
    // the same time must fail before anything gets spawned
    let cli_args = CliArgs::parse_from([
        "",
        "--project-path",
        "App.xcworkspace",
        "--scheme",
        "App",
        "--destination",
        "platform=iOS Simulator,name=iPhone 15",
        "--output-dir",
        "out",
        "--xcodebuild-options",
        "-xcconfig ci.xcconfig",
        "--xcconfig-content",
        "SWIFT_VERSION = 5.0",
    ]);

    let err = run_step(&cli_args).unwrap_err();
    assert!(err.to_string().contains("-xcconfig"));
}

#[test]
fn test_step_rejects_unbalanced_option_quoting() {
    let cli_args = CliArgs::parse_from([
        "",
        "--project-path",
        "App.xcodeproj",
        "--scheme",
        "App",
        "--destination",
        "id=ABCD",
        "--output-dir",
        "out",
        "--xcodebuild-options",
        "-destination \"platform=iOS",
    ]);

    let err = run_step(&cli_args).unwrap_err();
    assert!(err
        .to_string()
        .contains("The additional xcodebuild options are not valid CLI parameters"));
}

/// Fixture introspection driven through the crate's public seam, the way
/// an alternative collaborator implementation would be
struct CannedQuery {
    responses: HashMap<(String, String), BuildSettings>,
}

impl CannedQuery {
    fn on(&mut self, scope: &str, extra: &[&str], entries: &[(&str, &str)]) {
        let mut map = HashMap::new();
        for (key, value) in entries {
            map.insert((*key).to_owned(), (*value).to_owned());
        }
        self.responses.insert(
            (scope.to_owned(), extra.join(" ")),
            BuildSettings::from_map(map),
        );
    }

    fn lookup(&self, scope: &str, extra: &[String]) -> Result<BuildSettings> {
        self.responses
            .get(&(scope.to_owned(), extra.join(" ")))
            .cloned()
            .ok_or_else(|| eyre!("no canned response for ({scope}, {extra:?})"))
    }
}

impl ProjectQuery for CannedQuery {
    fn load(&self) -> Result<XcodeProject> {
        Err(eyre!("the canned query never loads a model"))
    }

    fn target_build_settings(
        &self,
        target: &str,
        _configuration: Option<&str>,
        extra: &[String],
    ) -> Result<BuildSettings> {
        self.lookup(target, extra)
    }

    fn scheme_build_settings(
        &self,
        _configuration: Option<&str>,
        extra: &[String],
    ) -> Result<BuildSettings> {
        self.lookup("scheme", extra)
    }
}

#[derive(Default)]
struct RecordingExporter {
    exported: RefCell<Vec<(String, String)>>,
}

impl EnvExporter for RecordingExporter {
    fn export(&self, key: &str, value: &str) -> Result<()> {
        self.exported
            .borrow_mut()
            .push((key.to_owned(), value.to_owned()));
        Ok(())
    }
}

#[test]
fn test_artifact_pipeline_through_the_public_api() -> Result<()> {
    let temp = tempdir()?;
    let products = temp.path().join("dd/App-abc/Build/Products/Debug-iphonesimulator");
    let deploy = temp.path().join("deploy");
    std::fs::create_dir_all(products.join("App.app"))?;
    std::fs::create_dir_all(&deploy)?;
    std::fs::write(products.join("App.app/Info.plist"), "<plist/>")?;

    let products_dir = products.display().to_string();
    let mut query = CannedQuery {
        responses: HashMap::new(),
    };
    query.on(
        "scheme",
        &["-sdk", "iphonesimulator"],
        &[("TARGET_BUILD_DIR", &products_dir)],
    );
    query.on("App", &[], &[("SDKROOT", "/Xcode/iPhoneOS.sdk")]);
    query.on(
        "App",
        &["-sdk", "iphonesimulator"],
        &[("TARGET_BUILD_DIR", &products_dir), ("WRAPPER_NAME", "App.app")],
    );

    let scheme = Scheme::new(
        "App",
        vec![BuildActionEntry {
            target_id: "APP".into(),
            buildable_name: "App.app".into(),
            build_for_archiving: true,
        }],
    );
    let mut targets = indexmap::IndexMap::new();
    targets.insert(
        "APP".to_owned(),
        BuildTarget::new("APP", "App", "App.app"),
    );
    let project = XcodeProject {
        path: PathBuf::from("App.xcworkspace"),
        kind: ProjectKind::Workspace,
        targets,
        schemes: vec![scheme.clone()],
    };

    let copied = artifacts::export_artifacts(
        &query,
        &project,
        &scheme,
        None,
        &[],
        Platform::Ios,
        &deploy,
    )?;
    assert_eq!(copied, vec![deploy.join("App.app")]);
    assert!(deploy.join("App.app/Info.plist").exists());

    let exporter = RecordingExporter::default();
    let (primary, path_list) = artifacts::export_output(&copied, &exporter)?;
    assert_eq!(primary, deploy.join("App.app").display().to_string());
    assert_eq!(path_list, primary);

    let exported = exporter.exported.borrow();
    assert_eq!(exported.len(), 2);
    assert_eq!(exported[0].0, "SIMBUILD_APP_DIR_PATH");
    assert_eq!(exported[1].0, "SIMBUILD_APP_DIR_PATH_LIST");

    Ok(())
}

//! Construction of the `xcodebuild` build command line

use std::path::{Path, PathBuf};
use std::process::Command;

use crate::domain::commands::arguments::Arguments;
use crate::project_model::ProjectKind;

/// Build settings pinned on every simulator build: simulator binaries are
/// never signed, so signing is switched off wherever the project might
/// still request it
const SIGNING_OFF_SETTINGS: [&str; 3] = [
    "CODE_SIGN_IDENTITY=",
    "CODE_SIGNING_REQUIRED=NO",
    "CODE_SIGNING_ALLOWED=NO",
];

/// The full specification of one `xcodebuild` build invocation.
///
/// The builder keeps every part the step configures: the container and its
/// kind, scheme, optional configuration, the destination specifier, the
/// optional clean action, the user's free-form extra options and the
/// optional generated settings-override file
#[derive(Debug, Clone)]
pub struct BuildCommand {
    project_path: PathBuf,
    kind: ProjectKind,
    scheme: String,
    configuration: Option<String>,
    destination: String,
    clean: bool,
    disable_code_signing: bool,
    custom_options: Vec<String>,
    xcconfig_path: Option<PathBuf>,
}

impl BuildCommand {
    pub fn new(project_path: &Path, kind: ProjectKind, scheme: &str, destination: &str) -> Self {
        Self {
            project_path: project_path.to_path_buf(),
            kind,
            scheme: scheme.to_owned(),
            configuration: None,
            destination: destination.to_owned(),
            clean: false,
            disable_code_signing: true,
            custom_options: Vec::new(),
            xcconfig_path: None,
        }
    }

    pub fn configuration(mut self, configuration: Option<String>) -> Self {
        self.configuration = configuration;
        self
    }

    /// Prepends the `clean` action to the build action
    pub fn clean(mut self, clean: bool) -> Self {
        self.clean = clean;
        self
    }

    pub fn disable_code_signing(mut self, disable: bool) -> Self {
        self.disable_code_signing = disable;
        self
    }

    /// The user supplied, already shell-word-split extra CLI tokens,
    /// appended after everything the step sets itself
    pub fn custom_options(mut self, options: Vec<String>) -> Self {
        self.custom_options = options;
        self
    }

    pub fn xcconfig_path(mut self, path: Option<PathBuf>) -> Self {
        self.xcconfig_path = path;
        self
    }

    /// Assembles the argument list in the order `xcodebuild` expects it:
    /// container, scheme, configuration, destination, actions, settings
    /// overrides and finally the user's own tokens
    pub fn args(&self) -> Arguments {
        let mut args = Arguments::with_capacity(16);

        args.create_and_push(self.kind.container_flag());
        args.create_and_push(&self.project_path);
        args.create_and_push("-scheme");
        args.create_and_push(self.scheme.as_str());
        if let Some(configuration) = &self.configuration {
            args.create_and_push("-configuration");
            args.create_and_push(configuration);
        }
        args.create_and_push("-destination");
        args.create_and_push(self.destination.as_str());

        if self.clean {
            args.create_and_push("clean");
        }
        args.create_and_push("build");

        if self.disable_code_signing {
            for setting in SIGNING_OFF_SETTINGS {
                args.create_and_push(setting);
            }
        }

        if let Some(xcconfig) = &self.xcconfig_path {
            args.create_and_push("-xcconfig");
            args.create_and_push(xcconfig);
        }

        args.extend(self.custom_options.iter().map(Into::into));

        args
    }

    /// The command line as it would be typed in a shell, for echoing back
    /// to the build log
    pub fn printable(&self) -> String {
        format!("xcodebuild {}", self.args().printable())
    }

    /// Materializes the [`std::process::Command`] ready to be spawned
    pub fn command(&self) -> Command {
        let mut cmd = Command::new("xcodebuild");
        cmd.args(self.args().iter());
        cmd
    }
}

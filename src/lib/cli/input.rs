use std::fmt::Display;
use std::path::PathBuf;

use clap::{ArgAction, Parser, ValueEnum};

use crate::utils::constants::env_keys;

/// [`CliArgs`] is the command line arguments parser.
///
/// Every input can also be fed through its step environment variable, which
/// is how a CI orchestrator drives the binary
///
/// #Test
/// ```rust
/// use clap::Parser;
/// use simbuild::cli::input::{CliArgs, LogFormatter};
///
/// let parser = CliArgs::parse_from([
///     "",
///     "--project-path", "App.xcworkspace",
///     "--scheme", "App",
///     "--destination", "platform=iOS Simulator,name=iPhone 15",
///     "--output-dir", "out",
/// ]);
/// assert_eq!(parser.scheme, "App");
/// assert_eq!(parser.log_formatter, LogFormatter::Xcpretty);
/// assert!(!parser.verbose);
/// ```
#[derive(Parser, Debug)]
#[command(name = "simbuild")]
#[command(version = "0.9.1")]
#[command(
    about = "Builds an Xcode project or workspace for a Simulator destination \
             and exports the generated .app bundles"
)]
pub struct CliArgs {
    /// Path of the .xcodeproj or .xcworkspace to build
    #[arg(long, env = env_keys::PROJECT_PATH)]
    pub project_path: PathBuf,

    /// Name of the scheme to build
    #[arg(long, env = env_keys::SCHEME)]
    pub scheme: String,

    /// Destination specifier, a simulator identifier or a generic platform
    /// descriptor
    #[arg(long, env = env_keys::DESTINATION)]
    pub destination: String,

    /// Build configuration name; empty picks the scheme's default one
    #[arg(long, env = env_keys::CONFIGURATION, default_value = "")]
    pub configuration: String,

    /// Inline build settings override content, written to an .xcconfig file
    /// and passed to the build
    #[arg(long, env = env_keys::XCCONFIG_CONTENT, default_value = "")]
    pub xcconfig_content: String,

    /// Whether to prepend a clean action to the build
    #[arg(long, env = env_keys::PERFORM_CLEAN_ACTION, action = ArgAction::Set, default_value_t = false)]
    pub perform_clean_action: bool,

    /// Additional xcodebuild CLI options, split with shell quoting rules
    #[arg(long, env = env_keys::XCODEBUILD_OPTIONS, default_value = "", allow_hyphen_values = true)]
    pub xcodebuild_options: String,

    /// How the build output is presented
    #[arg(long, env = env_keys::LOG_FORMATTER, value_enum, default_value_t = LogFormatter::Xcpretty)]
    pub log_formatter: LogFormatter,

    /// Directory receiving the copied app bundles and the raw build log
    #[arg(long, env = env_keys::OUTPUT_DIR)]
    pub output_dir: PathBuf,

    /// Trace every settings query and candidate artifact path
    #[arg(short, long, env = env_keys::VERBOSE, action = ArgAction::Set, default_value_t = false)]
    pub verbose: bool,
}

/// [`LogFormatter`] The available presentations of the build tool's output:
/// the xcpretty filter, or the raw xcodebuild stream
#[derive(ValueEnum, Copy, Clone, Debug, PartialEq, Eq)]
pub enum LogFormatter {
    Xcpretty,
    Xcodebuild,
}

impl Display for LogFormatter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match *self {
            LogFormatter::Xcpretty => write!(f, "xcpretty"),
            LogFormatter::Xcodebuild => write!(f, "xcodebuild"),
        }
    }
}

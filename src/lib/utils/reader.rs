//! Assembles the validated [`RunOpts`] model out of the raw [`CliArgs`]
//! input, failing fast on every configuration error before any subprocess
//! gets spawned

use std::path::PathBuf;

use color_eyre::{
    eyre::{eyre, Context},
    Result,
};

use crate::cli::input::{CliArgs, LogFormatter};
use crate::project_model::ProjectKind;
use crate::utils::constants::error_messages;
use crate::xcodebuild::Platform;

/// The step's validated configuration, the read-only input of every later
/// stage
#[derive(Debug, Clone)]
pub struct RunOpts {
    pub project_path: PathBuf,
    pub kind: ProjectKind,
    pub scheme: String,
    pub configuration: Option<String>,
    pub destination: String,
    pub platform: Platform,
    pub xcconfig_content: Option<String>,
    pub perform_clean_action: bool,
    pub xcodebuild_options: Vec<String>,
    pub log_formatter: LogFormatter,
    pub output_dir: PathBuf,
}

pub fn build_run_opts(cli_args: &CliArgs) -> Result<RunOpts> {
    let kind = ProjectKind::from_path(&cli_args.project_path)?;

    let xcodebuild_options = shell_words::split(&cli_args.xcodebuild_options).with_context(|| {
        format!(
            "{} ({})",
            error_messages::INVALID_XCODEBUILD_OPTIONS,
            cli_args.xcodebuild_options
        )
    })?;

    let xcconfig_content = match cli_args.xcconfig_content.trim() {
        "" => None,
        _ => Some(cli_args.xcconfig_content.clone()),
    };
    if xcconfig_content.is_some() && xcodebuild_options.iter().any(|opt| opt == "-xcconfig") {
        return Err(eyre!(error_messages::CONFLICTING_XCCONFIG));
    }

    let configuration = match cli_args.configuration.trim() {
        "" => None,
        trimmed => Some(trimmed.to_owned()),
    };

    let output_dir = crate::utils::fs::absolute(&cli_args.output_dir)?;

    Ok(RunOpts {
        project_path: cli_args.project_path.clone(),
        kind,
        scheme: cli_args.scheme.clone(),
        configuration,
        destination: cli_args.destination.clone(),
        platform: Platform::from_destination(&cli_args.destination),
        xcconfig_content,
        perform_clean_action: cli_args.perform_clean_action,
        xcodebuild_options,
        log_formatter: cli_args.log_formatter,
        output_dir,
    })
}

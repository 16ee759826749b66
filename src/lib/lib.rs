pub mod artifacts;
pub mod cache;
pub mod cli;
pub mod domain;
pub mod project_model;
pub mod utils;
pub mod xcodebuild;

/// The entry point for the execution of the program.
///
/// This module existence is motivated to let us run
/// integration tests for the whole operations of the program
/// without having to do fancy work about checking the
/// data sent to stdout/stderr
pub mod worker {
    use color_eyre::{
        eyre::{eyre, Context, ContextCompat},
        Result,
    };

    use crate::artifacts::{self, EnvmanExporter};
    use crate::cache;
    use crate::cli::input::{CliArgs, LogFormatter};
    use crate::project_model::query::{ProjectQuery, XcodebuildQuery};
    use crate::utils::constants::{env_keys, error_messages};
    use crate::utils::reader::build_run_opts;
    use crate::xcodebuild::{command::BuildCommand, runner, version, xcpretty};

    /// The main work of the step: validate the configuration, prepare the
    /// tooling, run the build (retrying once over a corrupted package
    /// cache), resolve and copy the generated bundles and export their
    /// paths for the rest of the CI workflow
    pub fn run_step(cli_args: &CliArgs) -> Result<()> {
        let opts = build_run_opts(cli_args)?;
        log::info!("step determined configs:");
        log::info!(
            "- project: {:?}, scheme: {}, destination: {}",
            opts.project_path,
            opts.scheme,
            opts.destination
        );
        log::info!(
            "- log formatter: {}, output dir: {:?}",
            opts.log_formatter,
            opts.output_dir
        );

        // Tooling preparation
        let xcodebuild_version =
            version::detect().with_context(|| error_messages::XCODEBUILD_VERSION)?;
        log::info!("- xcodebuild version: {xcodebuild_version}");
        if xcodebuild_version.major < version::MIN_SUPPORTED_XCODE_MAJOR {
            return Err(eyre!(
                "{} ({} < {})",
                error_messages::UNSUPPORTED_XCODE_VERSION,
                xcodebuild_version.major,
                version::MIN_SUPPORTED_XCODE_MAJOR
            ));
        }
        let formatter = xcpretty::ensure(opts.log_formatter);

        helpers::prepare_output_dir(&opts.output_dir)?;

        // Build
        let xcconfig_path = match &opts.xcconfig_content {
            Some(content) => Some(
                helpers::write_xcconfig(content)
                    .with_context(|| error_messages::WRITE_XCCONFIG)?,
            ),
            None => None,
        };
        let build_cmd = BuildCommand::new(
            &opts.project_path,
            opts.kind,
            &opts.scheme,
            &opts.destination,
        )
        .configuration(opts.configuration.clone())
        .clean(opts.perform_clean_action)
        .custom_options(opts.xcodebuild_options.clone())
        .xcconfig_path(xcconfig_path);

        log::info!("Running build");
        let swift_packages = cache::swift_packages_dir(&opts.project_path);
        let (raw_output, build_result) =
            runner::run_with_retry(&build_cmd, formatter, swift_packages.as_deref());
        if let Err(build_err) = build_result {
            // passthrough mode already streamed everything; the pretty mode
            // swallowed the raw log, so persist it before failing
            if formatter == LogFormatter::Xcpretty {
                helpers::export_raw_build_log(&opts.output_dir, &raw_output, &EnvmanExporter);
            }
            return Err(build_err.wrap_err(error_messages::BUILD_FAILED));
        }

        // Artifact resolution and copy
        log::info!("Copying the generated app bundles to the output dir");
        let query = XcodebuildQuery::new(&opts.project_path, &opts.scheme)?;
        let project = query.load()?;
        let scheme = project.scheme(&opts.scheme).with_context(|| {
            format!("{}: {}", error_messages::SCHEME_NOT_FOUND, opts.scheme)
        })?;
        if opts.configuration.is_none() {
            if let Some(default_configuration) = &scheme.default_configuration {
                log::debug!("Using the scheme's default configuration: {default_configuration}");
            }
        }
        let copied = artifacts::export_artifacts(
            &query,
            &project,
            scheme,
            opts.configuration.as_deref(),
            &opts.xcodebuild_options,
            opts.platform,
            &opts.output_dir,
        )?;

        // Output export
        log::info!("Exporting outputs");
        let (primary, path_list) = artifacts::export_output(&copied, &EnvmanExporter)?;
        log::info!("{} -> {primary}", env_keys::APP_DIR_PATH);
        log::info!("{} -> {path_list}", env_keys::APP_DIR_PATH_LIST);

        Ok(())
    }

    mod helpers {
        use std::path::{Path, PathBuf};

        use color_eyre::{eyre::Context, Result};

        use crate::artifacts::EnvExporter;
        use crate::utils::{
            self,
            constants::{self, env_keys, error_messages},
        };

        pub(crate) fn prepare_output_dir(output_dir: &Path) -> Result<()> {
            utils::fs::create_directory(output_dir)
                .with_context(|| error_messages::CREATE_OUTPUT_DIR)?;

            // a previous run of the same job may have left its log behind
            utils::fs::remove_if_exists(&output_dir.join(constants::RAW_BUILD_LOG_FILENAME))
                .with_context(|| error_messages::OUTPUT_DIR_CLEANUP)
        }

        /// Persists the inline settings override content to a generated
        /// xcconfig file under the OS temp dir and returns its path
        pub(crate) fn write_xcconfig(content: &str) -> Result<PathBuf> {
            let dir = std::env::temp_dir().join(constants::SIMBUILD);
            utils::fs::create_directory(&dir)?;
            utils::fs::create_file(
                &dir,
                constants::GENERATED_XCCONFIG_FILENAME,
                content.as_bytes(),
            )?;
            Ok(dir.join(constants::GENERATED_XCCONFIG_FILENAME))
        }

        /// Echoes the tail of a failed pretty-formatted build, persists the
        /// full raw log to the output dir and exports its path. Nothing in
        /// here fails the step: the build error that follows is the one
        /// that matters, and these diagnostics must survive it
        pub(crate) fn export_raw_build_log(
            output_dir: &Path,
            raw_output: &str,
            exporter: &dyn EnvExporter,
        ) {
            log::error!("Last lines of the build log:");
            println!(
                "{}",
                utils::fs::last_n_lines(raw_output, constants::FAILURE_LOG_TAIL_LINES)
            );

            let log_path = output_dir.join(constants::RAW_BUILD_LOG_FILENAME);
            if let Err(write_err) = utils::fs::create_file(
                output_dir,
                constants::RAW_BUILD_LOG_FILENAME,
                raw_output.as_bytes(),
            ) {
                log::warn!("{}: {write_err}", error_messages::RAW_LOG_WRITE);
                return;
            }

            match exporter.export(env_keys::RAW_LOG_PATH, &log_path.display().to_string()) {
                Ok(()) => log::warn!(
                    "The full build log is available in {log_path:?}, its path is exported \
                     in the {} environment variable",
                    env_keys::RAW_LOG_PATH
                ),
                Err(export_err) => {
                    log::warn!("Failed to export {}: {export_err}", env_keys::RAW_LOG_PATH)
                }
            }
        }
    }

}

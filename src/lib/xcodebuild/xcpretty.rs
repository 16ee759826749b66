//! The xcpretty log formatter preparation: probe it, try to install it
//! when it's missing, and fall back to the raw xcodebuild output whenever
//! anything on that path fails. A missing formatter never fails the step

use std::process::Command;

use color_eyre::{
    eyre::{eyre, Context},
    Result,
};

use crate::cli::input::LogFormatter;

/// Makes sure the requested log formatter is usable, downgrading the
/// choice to the raw xcodebuild output when xcpretty can't be probed or
/// installed
pub fn ensure(formatter: LogFormatter) -> LogFormatter {
    if formatter != LogFormatter::Xcpretty {
        return formatter;
    }

    log::info!("Checking if the xcpretty log formatter is installed");
    match probe_version() {
        Ok(version) => {
            log::info!("- xcpretty version: {version}");
            LogFormatter::Xcpretty
        }
        Err(probe_err) => {
            log::warn!("xcpretty is not installed: {probe_err}");
            log::info!("Installing xcpretty");
            install_and_reprobe().unwrap_or_else(|install_err| {
                log::warn!("Failed to set up xcpretty: {install_err}");
                log::warn!("Switching to the raw xcodebuild log output");
                LogFormatter::Xcodebuild
            })
        }
    }
}

fn install_and_reprobe() -> Result<LogFormatter> {
    install()?;
    let version = probe_version()?;
    log::info!("- xcpretty version: {version}");
    Ok(LogFormatter::Xcpretty)
}

fn probe_version() -> Result<String> {
    let output = Command::new("xcpretty")
        .arg("--version")
        .output()
        .with_context(|| "Could not run xcpretty --version")?;

    if !output.status.success() {
        return Err(eyre!("xcpretty --version exited with {}", output.status));
    }

    Ok(String::from_utf8_lossy(&output.stdout).trim().to_owned())
}

fn install() -> Result<()> {
    let output = Command::new("gem")
        .args(["install", "xcpretty", "--no-document"])
        .output()
        .with_context(|| "Could not run the gem install command")?;

    if !output.status.success() {
        return Err(eyre!(
            "gem install xcpretty exited with {}: {}",
            output.status,
            String::from_utf8_lossy(&output.stderr).trim()
        ));
    }

    Ok(())
}

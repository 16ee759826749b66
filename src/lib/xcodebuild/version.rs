//! Detection of the installed `xcodebuild` version

use std::fmt;
use std::process::Command;

use color_eyre::{
    eyre::{eyre, Context},
    Result,
};
use regex::Regex;

use crate::utils::constants::error_messages;

/// Oldest Xcode major version the step knows how to drive
pub const MIN_SUPPORTED_XCODE_MAJOR: u32 = 9;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct XcodebuildVersion {
    pub version: String,
    pub build_version: String,
    pub major: u32,
}

impl fmt::Display for XcodebuildVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Xcode {} ({})", self.version, self.build_version)
    }
}

/// Probes `xcodebuild -version` and parses its two-line report
pub fn detect() -> Result<XcodebuildVersion> {
    let output = Command::new("xcodebuild")
        .arg("-version")
        .output()
        .with_context(|| error_messages::XCODEBUILD_VERSION)?;

    if !output.status.success() {
        return Err(eyre!(
            "{}: xcodebuild -version exited with {}",
            error_messages::XCODEBUILD_VERSION,
            output.status
        ));
    }

    parse_version_output(&String::from_utf8_lossy(&output.stdout))
}

fn parse_version_output(raw: &str) -> Result<XcodebuildVersion> {
    let pattern = Regex::new(r"^Xcode\s+((\d+)(?:\.\d+)*)")
        .with_context(|| error_messages::XCODEBUILD_VERSION)?;

    let mut lines = raw.lines();
    let first = lines
        .next()
        .ok_or_else(|| eyre!(error_messages::XCODEBUILD_VERSION))?;
    let captures = pattern
        .captures(first.trim())
        .ok_or_else(|| eyre!("{}: unexpected output: {first}", error_messages::XCODEBUILD_VERSION))?;

    let version = captures[1].to_owned();
    let major: u32 = captures[2]
        .parse()
        .with_context(|| error_messages::XCODEBUILD_VERSION)?;

    let build_version = lines
        .next()
        .and_then(|line| line.trim().strip_prefix("Build version"))
        .map(str::trim)
        .unwrap_or_default()
        .to_owned();

    Ok(XcodebuildVersion {
        version,
        build_version,
        major,
    })
}

//! Everything that talks to the `xcodebuild` binary for the build itself:
//! command line construction, execution with output capture, the
//! single-retry policy and the surrounding tooling probes

pub mod command;
pub mod runner;
pub mod version;
pub mod xcpretty;

use std::fmt;

/// The simulator platform family the step builds for, derived from the
/// destination specifier. watchOS never appears here: a watch companion is
/// only ever discovered per-target through its `SDKROOT`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Platform {
    Ios,
    TvOs,
}

/// SDK name of the iOS simulator family
pub const IOS_SIMULATOR_SDK: &str = "iphonesimulator";
/// SDK name of the tvOS simulator family
pub const TVOS_SIMULATOR_SDK: &str = "appletvsimulator";
/// SDK name of the watchOS simulator family
pub const WATCHOS_SIMULATOR_SDK: &str = "watchsimulator";

/// Substring of an `SDKROOT` value that identifies a watchOS target
pub const WATCHOS_PLATFORM_MARKER: &str = "WatchOS.platform";

impl Platform {
    /// Derives the platform family from a destination specifier such as
    /// `platform=tvOS Simulator,name=Apple TV` or a plain simulator UDID
    /// specifier (which defaults to iOS)
    pub fn from_destination(destination: &str) -> Self {
        if destination.contains("tvOS") {
            Self::TvOs
        } else {
            Self::Ios
        }
    }

    pub fn simulator_sdk(&self) -> &'static str {
        match self {
            Self::Ios => IOS_SIMULATOR_SDK,
            Self::TvOs => TVOS_SIMULATOR_SDK,
        }
    }
}

impl fmt::Display for Platform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Ios => write!(f, "iOS"),
            Self::TvOs => write!(f, "tvOS"),
        }
    }
}

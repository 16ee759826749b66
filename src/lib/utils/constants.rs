//! Constant value definitions to use across the whole program

pub const SIMBUILD: &str = "simbuild";

/// File name of the full captured build log persisted to the output
/// directory when a pretty-formatted build fails
pub const RAW_BUILD_LOG_FILENAME: &str = "xcodebuild_build.log";

/// File name of the generated build settings override file when the step
/// receives inline xcconfig content
pub const GENERATED_XCCONFIG_FILENAME: &str = "build_settings.xcconfig";

/// Separator of the exported list of generated app bundle paths
pub const PATH_LIST_SEPARATOR: char = '|';

/// Extension of a packaged application bundle, dot included
pub const APP_BUNDLE_EXTENSION: &str = ".app";

/// Number of build log lines echoed back to the console when a
/// pretty-formatted build fails
pub const FAILURE_LOG_TAIL_LINES: usize = 10;

/// The names of the environment variables that carry the step inputs, and
/// the ones the step exports as its outputs
pub mod env_keys {
    pub const PROJECT_PATH: &str = "SIMBUILD_PROJECT_PATH";
    pub const SCHEME: &str = "SIMBUILD_SCHEME";
    pub const DESTINATION: &str = "SIMBUILD_DESTINATION";
    pub const CONFIGURATION: &str = "SIMBUILD_CONFIGURATION";
    pub const XCCONFIG_CONTENT: &str = "SIMBUILD_XCCONFIG_CONTENT";
    pub const PERFORM_CLEAN_ACTION: &str = "SIMBUILD_PERFORM_CLEAN_ACTION";
    pub const XCODEBUILD_OPTIONS: &str = "SIMBUILD_XCODEBUILD_OPTIONS";
    pub const LOG_FORMATTER: &str = "SIMBUILD_LOG_FORMATTER";
    pub const OUTPUT_DIR: &str = "SIMBUILD_OUTPUT_DIR";
    pub const VERBOSE: &str = "SIMBUILD_VERBOSE";

    pub const APP_DIR_PATH: &str = "SIMBUILD_APP_DIR_PATH";
    pub const APP_DIR_PATH_LIST: &str = "SIMBUILD_APP_DIR_PATH_LIST";
    pub const RAW_LOG_PATH: &str = "SIMBUILD_RAW_LOG_PATH";
}

/// The build settings keys the step extracts from the settings
/// introspection output
pub mod settings_keys {
    pub const TARGET_BUILD_DIR: &str = "TARGET_BUILD_DIR";
    pub const SDKROOT: &str = "SDKROOT";
    pub const WRAPPER_NAME: &str = "WRAPPER_NAME";
    pub const FULL_PRODUCT_NAME: &str = "FULL_PRODUCT_NAME";
    pub const PRODUCT_TYPE: &str = "PRODUCT_TYPE";
    pub const CONFIGURATION: &str = "CONFIGURATION";
}

pub mod error_messages {
    pub const INVALID_PROJECT_EXTENSION: &str =
        "Project file extension should be .xcodeproj or .xcworkspace";
    pub const INVALID_XCODEBUILD_OPTIONS: &str =
        "The additional xcodebuild options are not valid CLI parameters";
    pub const CONFLICTING_XCCONFIG: &str = "`-xcconfig` option found in the additional xcodebuild \
        options, the inline build settings content cannot be set as well";
    pub const CREATE_OUTPUT_DIR: &str = "Could not create the output directory";
    pub const OUTPUT_DIR_CLEANUP: &str = "Could not remove a stale file from the output directory";
    pub const XCODEBUILD_VERSION: &str = "Failed to determine the installed xcodebuild version";
    pub const UNSUPPORTED_XCODE_VERSION: &str =
        "The installed Xcode major version is older than the minimum supported one";
    pub const WRITE_XCCONFIG: &str =
        "Failed to write the inline build settings content to an xcconfig file";
    pub const BUILD_FAILED: &str = "The xcodebuild build command failed";
    pub const PROJECT_LISTING: &str = "Failed to list the schemes and targets of the project";
    pub const SCHEME_NOT_FOUND: &str = "The requested scheme was not found in the project";
    pub const NO_MAIN_TARGET: &str =
        "No application target found among the scheme's build action entries";
    pub const SETTINGS_QUERY: &str = "Failed to query the build settings";
    pub const SETTING_UNAVAILABLE: &str =
        "The requested key is not present in the build settings output";
    pub const ARTIFACT_NOT_FOUND: &str =
        "No generated app bundle found under any candidate directory";
    pub const NO_ARTIFACTS: &str = "Didn't find any exportable app artifact";
    pub const SWIFT_PACKAGES_REMOVAL: &str = "Failed to remove the invalid Swift packages cache";
    pub const ENV_EXPORT: &str = "Failed to export the step outputs to the environment";
    pub const RAW_LOG_WRITE: &str = "Failed to persist the raw xcodebuild log";
}

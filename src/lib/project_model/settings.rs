//! The build settings mapping extracted from the build tool's settings
//! introspection mode, and the key lookups the step performs over it

use std::collections::HashMap;

use color_eyre::{eyre::eyre, Result};

use crate::utils::constants::error_messages;

/// An opaque key -> value mapping scoped to one settings introspection
/// query. Different queries over the same target and configuration may
/// disagree (a different `-sdk` substitutes platform-specific directories),
/// so a [`BuildSettings`] is never reused across queries
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct BuildSettings(HashMap<String, String>);

impl BuildSettings {
    pub fn from_map(map: HashMap<String, String>) -> Self {
        Self(map)
    }

    /// Parses the line-oriented output of the settings introspection mode.
    ///
    /// Settings are printed as `    KEY = VALUE` lines surrounded by header
    /// and noise lines; everything that doesn't look like an uppercase
    /// settings key assignment is ignored. Only the first `=` splits, since
    /// values may embed the character themselves
    pub fn parse(raw: &str) -> Self {
        let mut settings = HashMap::new();

        for line in raw.lines() {
            let Some((key, value)) = line.split_once('=') else {
                continue;
            };
            let key = key.trim();
            if key.is_empty() || !is_settings_key(key) {
                continue;
            }
            settings.insert(key.to_owned(), value.trim().to_owned());
        }

        Self(settings)
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.0.get(key).map(String::as_str)
    }

    /// Looks up `key`, failing when the introspection output didn't carry
    /// it (malformed project, unsupported target)
    pub fn require(&self, key: &str) -> Result<&str> {
        self.get(key)
            .ok_or_else(|| eyre!("{}: {key}", error_messages::SETTING_UNAVAILABLE))
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

fn is_settings_key(key: &str) -> bool {
    key.chars()
        .all(|c| c.is_ascii_uppercase() || c.is_ascii_digit() || c == '_')
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::utils::constants::settings_keys;

    const SHOW_BUILD_SETTINGS_OUTPUT: &str = r#"Build settings for action build and target App:
    ACTION = build
    TARGET_BUILD_DIR = /Users/ci/Library/Developer/Xcode/DerivedData/App-abc/Build/Products/Debug-iphonesimulator
    SDKROOT = /Applications/Xcode.app/Contents/Developer/Platforms/iPhoneOS.platform/Developer/SDKs/iPhoneOS17.2.sdk
    WRAPPER_NAME = App.app
    OTHER_LDFLAGS = -ObjC -framework Foo = Bar
"#;

    #[test]
    fn test_parse_extracts_settings_lines() {
        let settings = BuildSettings::parse(SHOW_BUILD_SETTINGS_OUTPUT);

        assert_eq!(
            settings.get(settings_keys::TARGET_BUILD_DIR),
            Some(
                "/Users/ci/Library/Developer/Xcode/DerivedData/App-abc/Build/Products/Debug-iphonesimulator"
            )
        );
        assert_eq!(settings.get(settings_keys::WRAPPER_NAME), Some("App.app"));
        // the header line carries no `=`, so it never becomes an entry
        assert_eq!(settings.get("Build settings for action build and target App:"), None);
    }

    #[test]
    fn test_parse_splits_on_the_first_equals_only() {
        let settings = BuildSettings::parse(SHOW_BUILD_SETTINGS_OUTPUT);
        assert_eq!(
            settings.get("OTHER_LDFLAGS"),
            Some("-ObjC -framework Foo = Bar")
        );
    }

    #[test]
    fn test_parse_tolerates_empty_values() {
        let settings = BuildSettings::parse("    CODE_SIGN_IDENTITY = \n");
        assert_eq!(settings.get("CODE_SIGN_IDENTITY"), Some(""));
    }

    #[test]
    fn test_require_fails_on_absent_keys() {
        let settings = BuildSettings::parse("    SDKROOT = /some/sdk\n");

        assert!(settings.require(settings_keys::SDKROOT).is_ok());
        let err = settings
            .require(settings_keys::TARGET_BUILD_DIR)
            .unwrap_err();
        assert!(err
            .to_string()
            .contains(crate::utils::constants::error_messages::SETTING_UNAVAILABLE));
    }

    #[test]
    fn test_lowercase_noise_is_ignored() {
        let settings = BuildSettings::parse("note = using new build system\n");
        assert!(settings.is_empty());
    }
}

use crate::utils::constants::APP_BUNDLE_EXTENSION;

/// A buildable unit declared in the project, read-only once loaded.
///
/// `product_path` is the file name of the product the target generates on
/// the fs (e.g. `MyApp.app`), taken from the target's product reference.
/// `dependency_ids` holds the identifiers of the targets this one depends
/// on, forming a DAG rooted at the scheme's main target
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuildTarget {
    pub id: String,
    pub name: String,
    pub product_path: String,
    pub dependency_ids: Vec<String>,
}

impl BuildTarget {
    pub fn new<I, N, P>(id: I, name: N, product_path: P) -> Self
    where
        I: Into<String>,
        N: Into<String>,
        P: Into<String>,
    {
        Self {
            id: id.into(),
            name: name.into(),
            product_path: product_path.into(),
            dependency_ids: Vec::new(),
        }
    }

    pub fn with_dependencies(mut self, dependency_ids: Vec<String>) -> Self {
        self.dependency_ids = dependency_ids;
        self
    }

    /// Whether the target's product is a packaged application bundle.
    /// Non-app products (static libs, frameworks) are carried through target
    /// resolution but skipped at the export stage
    pub fn is_app_bundle(&self) -> bool {
        self.product_path.ends_with(APP_BUNDLE_EXTENSION)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_app_bundle_detection() {
        let app = BuildTarget::new("A1", "App", "App.app");
        let lib = BuildTarget::new("L1", "Networking", "libNetworking.a");

        assert!(app.is_app_bundle());
        assert!(!lib.is_app_bundle());
    }
}

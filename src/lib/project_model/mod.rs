//! The read-only model of the Xcode project under build: targets, schemes
//! and the settings introspection seam.
//!
//! The model is loaded once per run and indexed by identifier; dependency
//! edges are plain id lists resolved through the owning [`XcodeProject`]

pub mod query;
pub mod scheme;
pub mod settings;
pub mod target;

use std::path::{Path, PathBuf};

use color_eyre::{eyre::eyre, Result};
use indexmap::IndexMap;

use crate::utils::constants::error_messages;

use self::{scheme::Scheme, target::BuildTarget};

/// Whether the step drives a bare project or a workspace. The distinction
/// matters twice: the container flag of every spawned command, and the
/// shape of the settings queries (workspaces only answer through a scheme)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProjectKind {
    Project,
    Workspace,
}

impl ProjectKind {
    /// Classifies a project path by its extension, rejecting anything that
    /// is neither a project nor a workspace before any subprocess runs
    pub fn from_path(path: &Path) -> Result<Self> {
        match path.extension().and_then(|ext| ext.to_str()) {
            Some("xcodeproj") => Ok(Self::Project),
            Some("xcworkspace") => Ok(Self::Workspace),
            other => Err(eyre!(
                "{}, but got: {:?}",
                error_messages::INVALID_PROJECT_EXTENSION,
                other.unwrap_or_default()
            )),
        }
    }

    /// The container flag the build tool expects for this kind
    pub fn container_flag(&self) -> &'static str {
        match self {
            Self::Project => "-project",
            Self::Workspace => "-workspace",
        }
    }
}

/// The loaded project model: value structs only, no live handles to the fs
#[derive(Debug, Clone)]
pub struct XcodeProject {
    pub path: PathBuf,
    pub kind: ProjectKind,
    pub targets: IndexMap<String, BuildTarget>,
    pub schemes: Vec<Scheme>,
}

impl XcodeProject {
    pub fn target(&self, id: &str) -> Option<&BuildTarget> {
        self.targets.get(id)
    }

    pub fn scheme(&self, name: &str) -> Option<&Scheme> {
        self.schemes.iter().find(|s| s.name == name)
    }

    /// The directory holding the `.xcodeproj`/`.xcworkspace`, used as the
    /// base of relative custom build directories
    pub fn project_dir(&self) -> &Path {
        self.path.parent().unwrap_or_else(|| Path::new("."))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_project_kind_from_path() -> Result<()> {
        assert_eq!(
            ProjectKind::from_path(Path::new("ios/App.xcodeproj"))?,
            ProjectKind::Project
        );
        assert_eq!(
            ProjectKind::from_path(Path::new("App.xcworkspace"))?,
            ProjectKind::Workspace
        );
        assert!(ProjectKind::from_path(Path::new("App.txt")).is_err());
        assert!(ProjectKind::from_path(Path::new("App")).is_err());

        Ok(())
    }

    #[test]
    fn test_project_dir_strips_the_container_file_name() {
        let project = XcodeProject {
            path: PathBuf::from("ios/App.xcodeproj"),
            kind: ProjectKind::Project,
            targets: IndexMap::new(),
            schemes: Vec::new(),
        };
        assert_eq!(project.project_dir(), Path::new("ios"));
    }
}

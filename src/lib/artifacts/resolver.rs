//! Resolution of which targets of a scheme produce the artifacts to
//! export: the scheme's main application target plus the transitive
//! closure of the targets it depends on

use std::collections::{HashSet, VecDeque};

use color_eyre::{eyre::eyre, Result};

use crate::project_model::{scheme::Scheme, target::BuildTarget, XcodeProject};
use crate::utils::constants::error_messages;

/// The outcome of target resolution, main target first. Non-app
/// dependencies are still listed here; the export stage is the one that
/// skips them
#[derive(Debug)]
pub struct ResolvedTargets<'a> {
    pub main: &'a BuildTarget,
    pub dependents: Vec<&'a BuildTarget>,
}

impl<'a> ResolvedTargets<'a> {
    /// All resolved targets in deterministic order, the main target first
    pub fn all(&self) -> impl Iterator<Item = &'a BuildTarget> + '_ {
        std::iter::once(self.main).chain(self.dependents.iter().copied())
    }
}

/// Picks the scheme's main target (the first archivable build action entry
/// that references an application product) and walks the dependency graph
/// it roots, breadth-first and deduplicated. Pure read, no fs access
pub fn resolve_targets<'a>(
    scheme: &Scheme,
    project: &'a XcodeProject,
) -> Result<ResolvedTargets<'a>> {
    let main_entry = scheme
        .entries
        .iter()
        .find(|entry| entry.build_for_archiving && entry.is_app_reference())
        .ok_or_else(|| eyre!("{}: scheme {}", error_messages::NO_MAIN_TARGET, scheme.name))?;

    let main = project.target(&main_entry.target_id).ok_or_else(|| {
        eyre!(
            "{}: scheme {} references the unknown target {}",
            error_messages::NO_MAIN_TARGET,
            scheme.name,
            main_entry.target_id
        )
    })?;

    let mut visited: HashSet<&str> = HashSet::from([main.id.as_str()]);
    let mut queue: VecDeque<&str> = main.dependency_ids.iter().map(String::as_str).collect();
    let mut dependents: Vec<&BuildTarget> = Vec::new();

    while let Some(id) = queue.pop_front() {
        if !visited.insert(id) {
            continue;
        }
        let Some(target) = project.target(id) else {
            log::debug!("Dependency {id} is not a target of the project, skipping it");
            continue;
        };
        dependents.push(target);
        queue.extend(target.dependency_ids.iter().map(String::as_str));
    }

    Ok(ResolvedTargets { main, dependents })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::project_model::scheme::BuildActionEntry;
    use crate::project_model::ProjectKind;
    use indexmap::IndexMap;
    use std::path::PathBuf;

    fn entry(target_id: &str, buildable_name: &str) -> BuildActionEntry {
        BuildActionEntry {
            target_id: target_id.to_owned(),
            buildable_name: buildable_name.to_owned(),
            build_for_archiving: true,
        }
    }

    fn project_with(targets: Vec<BuildTarget>, scheme: Scheme) -> XcodeProject {
        let mut indexed = IndexMap::new();
        for target in targets {
            indexed.insert(target.id.clone(), target);
        }
        XcodeProject {
            path: PathBuf::from("App.xcodeproj"),
            kind: ProjectKind::Project,
            targets: indexed,
            schemes: vec![scheme],
        }
    }

    #[test]
    fn test_first_app_entry_is_the_main_target() -> Result<()> {
        let scheme = Scheme::new(
            "App",
            vec![entry("LIB", "libCore.a"), entry("APP", "App.app")],
        );
        let project = project_with(
            vec![
                BuildTarget::new("LIB", "Core", "libCore.a"),
                BuildTarget::new("APP", "App", "App.app"),
            ],
            scheme.clone(),
        );

        let resolved = resolve_targets(&scheme, &project)?;
        assert_eq!(resolved.main.name, "App");
        assert!(resolved.dependents.is_empty());

        Ok(())
    }

    #[test]
    fn test_non_archivable_app_entries_are_passed_over() -> Result<()> {
        let mut demo = entry("DEMO", "Demo.app");
        demo.build_for_archiving = false;
        let scheme = Scheme::new("App", vec![demo, entry("APP", "App.app")]);
        let project = project_with(
            vec![
                BuildTarget::new("DEMO", "Demo", "Demo.app"),
                BuildTarget::new("APP", "App", "App.app"),
            ],
            scheme.clone(),
        );

        let resolved = resolve_targets(&scheme, &project)?;
        assert_eq!(resolved.main.name, "App");

        Ok(())
    }

    #[test]
    fn test_scheme_without_app_entries_fails() {
        let scheme = Scheme::new("Libs", vec![entry("LIB", "libCore.a")]);
        let project = project_with(
            vec![BuildTarget::new("LIB", "Core", "libCore.a")],
            scheme.clone(),
        );

        let err = resolve_targets(&scheme, &project).unwrap_err();
        assert!(err.to_string().contains(error_messages::NO_MAIN_TARGET));
    }

    #[test]
    fn test_transitive_closure_is_walked_and_deduplicated() -> Result<()> {
        // APP -> WATCH -> EXT, APP -> EXT (diamond): EXT resolves once
        let scheme = Scheme::new("App", vec![entry("APP", "App.app")]);
        let project = project_with(
            vec![
                BuildTarget::new("APP", "App", "App.app")
                    .with_dependencies(vec!["WATCH".into(), "EXT".into()]),
                BuildTarget::new("WATCH", "AppWatch", "AppWatch.app")
                    .with_dependencies(vec!["EXT".into()]),
                BuildTarget::new("EXT", "Widget", "Widget.appex"),
            ],
            scheme.clone(),
        );

        let resolved = resolve_targets(&scheme, &project)?;
        let names: Vec<&str> = resolved.all().map(|t| t.name.as_str()).collect();
        assert_eq!(names, ["App", "AppWatch", "Widget"]);

        Ok(())
    }

    #[test]
    fn test_unknown_dependency_ids_are_skipped() -> Result<()> {
        let scheme = Scheme::new("App", vec![entry("APP", "App.app")]);
        let project = project_with(
            vec![BuildTarget::new("APP", "App", "App.app")
                .with_dependencies(vec!["GONE".into()])],
            scheme.clone(),
        );

        let resolved = resolve_targets(&scheme, &project)?;
        assert!(resolved.dependents.is_empty());

        Ok(())
    }

    #[test]
    fn test_main_entry_referencing_an_unknown_target_fails() {
        let scheme = Scheme::new("App", vec![entry("MISSING", "App.app")]);
        let project = project_with(vec![], scheme.clone());

        assert!(resolve_targets(&scheme, &project).is_err());
    }
}

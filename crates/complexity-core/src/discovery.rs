use std::collections::HashSet;
use std::path::{Component, Path};

use tracing::debug;

use crate::plugin::{is_excluded_name, TechnologyPlugin};
use crate::types::ProjectDescriptor;

/// True when a directory between `repo_root` and `path` (or `path` itself)
/// is named in `excluded`, ignoring case. The root is never tested.
pub fn is_excluded_path<S: AsRef<str>>(repo_root: &Path, path: &Path, excluded: &[S]) -> bool {
    let Ok(relative) = path.strip_prefix(repo_root) else {
        return false;
    };
    relative.components().any(|component| match component {
        Component::Normal(name) => is_excluded_name(name, excluded),
        _ => false,
    })
}

/// Run every plugin over `repo_root` and merge their projects.
///
/// Plugins run in registration order. A path (compared case-insensitively)
/// is kept the first time it is seen, so an earlier plugin's type wins when
/// two ecosystems claim the same directory. Projects inside any `excluded`
/// directory are dropped, whichever plugin found them.
pub fn discover_all<S: AsRef<str>>(
    repo_root: &Path,
    plugins: &[Box<dyn TechnologyPlugin>],
    excluded: &[S],
) -> Vec<ProjectDescriptor> {
    let mut seen = HashSet::new();
    let mut results = Vec::new();

    for plugin in plugins {
        let found = plugin.discover_projects(repo_root);
        debug!(plugin = plugin.name(), count = found.len(), "plugin discovery finished");

        for descriptor in found {
            if is_excluded_path(repo_root, &descriptor.project_path, excluded) {
                debug!(
                    plugin = plugin.name(),
                    path = %descriptor.project_path.display(),
                    "project lies in an excluded directory"
                );
            } else if seen.insert(descriptor.path_key()) {
                results.push(descriptor);
            } else {
                debug!(
                    plugin = plugin.name(),
                    path = %descriptor.project_path.display(),
                    "project already claimed by an earlier plugin"
                );
            }
        }
    }

    results
}

use std::path::Path;

use tracing::debug;

use complexity_core::plugin::{
    detect_markers, exclusions_with, find_marker_dirs, find_marker_files, push_unique,
    read_manifest, MarkerRule, TechnologyPlugin,
};
use complexity_core::types::ProjectDescriptor;

/// Project type label owned by this plugin.
pub const PROJECT_TYPE: &str = "C# / .NET";

const PROJECT_MARKERS: &[&str] = &["*.csproj"];

const FILE_GLOBS: &[&str] = &["*.cs", "*.csproj", "*.sln", "*.json", "*.xml"];

/// Package references looked up in every `.csproj` of a project.
const CSPROJ_RULES: &[MarkerRule] = &[
    MarkerRule::new("ASP.NET Core", &["Microsoft.AspNetCore"]),
    MarkerRule::new("Entity Framework Core", &["Microsoft.EntityFrameworkCore"]),
    MarkerRule::new("Unit Testing", &["xunit", "NUnit", "MSTest"]),
];

/// .NET plugin: a directory holding a `.csproj` is a project.
#[derive(Debug, Default)]
pub struct DotNetPlugin;

impl DotNetPlugin {
    pub fn new() -> Self {
        Self
    }
}

impl TechnologyPlugin for DotNetPlugin {
    fn name(&self) -> &'static str {
        "DotNet"
    }

    fn discover_projects(&self, repo_root: &Path) -> Vec<ProjectDescriptor> {
        let excluded = exclusions_with(self.additional_excluded_dirs());
        find_marker_dirs(repo_root, PROJECT_MARKERS, &excluded)
            .into_iter()
            .map(|dir| ProjectDescriptor::new(PROJECT_TYPE, dir))
            .collect()
    }

    fn file_extensions(&self, project_type: &str) -> &'static [&'static str] {
        if project_type == PROJECT_TYPE {
            FILE_GLOBS
        } else {
            &[]
        }
    }

    fn detect_technologies(&self, project_path: &Path, _project_type: &str) -> Vec<String> {
        let excluded = exclusions_with(self.additional_excluded_dirs());
        let mut technologies = Vec::new();

        for csproj in find_marker_files(project_path, PROJECT_MARKERS, &excluded) {
            if let Some(content) = read_manifest(&csproj) {
                push_unique(&mut technologies, detect_markers(&content, CSPROJ_RULES));
            }
        }

        debug!(project = %project_path.display(), found = ?technologies, "dotnet technologies");
        technologies
    }
}

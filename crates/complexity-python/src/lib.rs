use std::path::Path;

use tracing::debug;

use complexity_core::plugin::{
    detect_markers, exclusions_with, find_marker_dirs, push_unique, read_manifest, MarkerRule,
    TechnologyPlugin,
};
use complexity_core::types::ProjectDescriptor;

/// Project type label owned by this plugin.
pub const PROJECT_TYPE: &str = "Python";

const PROJECT_MARKERS: &[&str] = &["setup.py", "pyproject.toml", "requirements.txt"];

const FILE_GLOBS: &[&str] = &["*.py", "*.pyx", "*.pyd", "*.txt", "*.toml", "*.cfg"];

const EXCLUDED_DIRS: &[&str] = &[".venv", "venv", ".tox"];

// Needles are lowercase; manifests are lowercased before matching.
const MANIFEST_RULES: &[MarkerRule] = &[
    MarkerRule::new("Django", &["django"]),
    MarkerRule::new("Flask", &["flask"]),
    MarkerRule::new("FastAPI", &["fastapi"]),
    MarkerRule::new("Python Testing", &["pytest"]),
];

/// Python plugin: any directory with a packaging or requirements manifest.
#[derive(Debug, Default)]
pub struct PythonPlugin;

impl PythonPlugin {
    pub fn new() -> Self {
        Self
    }
}

impl TechnologyPlugin for PythonPlugin {
    fn name(&self) -> &'static str {
        "Python"
    }

    fn discover_projects(&self, repo_root: &Path) -> Vec<ProjectDescriptor> {
        let excluded = exclusions_with(EXCLUDED_DIRS);
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

    fn additional_excluded_dirs(&self) -> &'static [&'static str] {
        EXCLUDED_DIRS
    }

    fn detect_technologies(&self, project_path: &Path, _project_type: &str) -> Vec<String> {
        let mut technologies = Vec::new();
        for manifest in PROJECT_MARKERS {
            if let Some(content) = read_manifest(&project_path.join(manifest)) {
                push_unique(
                    &mut technologies,
                    detect_markers(&content.to_lowercase(), MANIFEST_RULES),
                );
            }
        }
        debug!(project = %project_path.display(), found = ?technologies, "python technologies");
        technologies
    }
}

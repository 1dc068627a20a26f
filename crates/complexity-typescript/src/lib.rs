use std::collections::HashSet;
use std::path::Path;

use tracing::debug;

use complexity_core::plugin::{
    detect_markers, exclusions_with, find_marker_dirs, read_manifest, MarkerRule,
    TechnologyPlugin,
};
use complexity_core::types::{path_key, ProjectDescriptor};

/// Type of a directory holding `angular.json`.
pub const ANGULAR_PROJECT: &str = "Angular / TypeScript";
/// Type of any other directory holding `package.json`.
pub const NODE_PROJECT: &str = "TypeScript / JavaScript";

const ANGULAR_GLOBS: &[&str] = &["*.ts", "*.js", "*.html", "*.css", "*.scss", "*.json"];
const NODE_GLOBS: &[&str] = &["*.ts", "*.js", "*.jsx", "*.tsx", "*.json"];

const EXCLUDED_DIRS: &[&str] = &[".next", ".angular", "coverage"];

const PACKAGE_JSON_RULES: &[MarkerRule] = &[
    MarkerRule::new("Angular", &["@angular/core"]),
    MarkerRule::new("React", &["react"]),
    MarkerRule::new("Vue.js", &["vue"]),
    MarkerRule::new("JavaScript Testing", &["jest", "jasmine", "karma"]),
];

/// TypeScript/JavaScript plugin covering Angular workspaces and npm packages.
#[derive(Debug, Default)]
pub struct TypeScriptPlugin;

impl TypeScriptPlugin {
    pub fn new() -> Self {
        Self
    }
}

impl TechnologyPlugin for TypeScriptPlugin {
    fn name(&self) -> &'static str {
        "TypeScript"
    }

    fn discover_projects(&self, repo_root: &Path) -> Vec<ProjectDescriptor> {
        let excluded = exclusions_with(EXCLUDED_DIRS);
        let mut seen = HashSet::new();
        let mut projects = Vec::new();

        // angular.json claims a directory before package.json can.
        let markers = [
            ("angular.json", ANGULAR_PROJECT),
            ("package.json", NODE_PROJECT),
        ];
        for (marker, project_type) in markers {
            for dir in find_marker_dirs(repo_root, &[marker], &excluded) {
                if seen.insert(path_key(&dir)) {
                    projects.push(ProjectDescriptor::new(project_type, dir));
                }
            }
        }

        projects
    }

    fn file_extensions(&self, project_type: &str) -> &'static [&'static str] {
        match project_type {
            ANGULAR_PROJECT => ANGULAR_GLOBS,
            NODE_PROJECT => NODE_GLOBS,
            _ => &[],
        }
    }

    fn additional_excluded_dirs(&self) -> &'static [&'static str] {
        EXCLUDED_DIRS
    }

    fn detect_technologies(&self, project_path: &Path, _project_type: &str) -> Vec<String> {
        let Some(content) = read_manifest(&project_path.join("package.json")) else {
            return Vec::new();
        };
        let technologies = detect_markers(&content, PACKAGE_JSON_RULES);
        debug!(project = %project_path.display(), found = ?technologies, "package.json technologies");
        technologies
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn test_angular_wins_over_package_json() {
        let tmp = tempfile::tempdir().unwrap();
        let root = tmp.path();
        fs::create_dir_all(root.join("admin")).unwrap();
        fs::create_dir_all(root.join("site")).unwrap();
        fs::write(root.join("admin/angular.json"), "{}").unwrap();
        fs::write(root.join("admin/package.json"), "{}").unwrap();
        fs::write(root.join("site/package.json"), "{}").unwrap();

        let projects = TypeScriptPlugin::new().discover_projects(root);
        assert_eq!(
            projects,
            vec![
                ProjectDescriptor::new(ANGULAR_PROJECT, root.join("admin")),
                ProjectDescriptor::new(NODE_PROJECT, root.join("site")),
            ]
        );
    }

    #[test]
    fn test_node_modules_never_yield_projects() {
        let tmp = tempfile::tempdir().unwrap();
        let root = tmp.path();
        fs::create_dir_all(root.join("node_modules/left-pad")).unwrap();
        fs::write(root.join("package.json"), "{}").unwrap();
        fs::write(root.join("node_modules/left-pad/package.json"), "{}").unwrap();

        let projects = TypeScriptPlugin::new().discover_projects(root);
        assert_eq!(projects.len(), 1);
        assert_eq!(projects[0].project_path, root);
    }

    #[test]
    fn test_extensions_per_type() {
        let plugin = TypeScriptPlugin::new();
        assert!(plugin.file_extensions(ANGULAR_PROJECT).contains(&"*.scss"));
        assert!(plugin.file_extensions(NODE_PROJECT).contains(&"*.tsx"));
        assert!(plugin.file_extensions("C++").is_empty());
    }

    #[test]
    fn test_detects_frameworks_from_package_json() {
        let tmp = tempfile::tempdir().unwrap();
        fs::write(
            tmp.path().join("package.json"),
            r#"{
  "dependencies": { "react": "^18.2.0", "react-dom": "^18.2.0" },
  "devDependencies": { "jest": "^29.0.0" }
}"#,
        )
        .unwrap();

        let techs = TypeScriptPlugin::new().detect_technologies(tmp.path(), NODE_PROJECT);
        assert_eq!(techs, vec!["React", "JavaScript Testing"]);
    }

    #[test]
    fn test_missing_package_json_detects_nothing() {
        let tmp = tempfile::tempdir().unwrap();
        assert!(TypeScriptPlugin::new()
            .detect_technologies(tmp.path(), "C++")
            .is_empty());
    }
}

use std::path::Path;

use tracing::debug;

use complexity_core::plugin::{
    detect_markers, exclusions_with, find_marker_dirs, read_manifest, MarkerRule,
    TechnologyPlugin,
};
use complexity_core::types::ProjectDescriptor;

/// Project type label owned by this plugin.
pub const PROJECT_TYPE: &str = "C++";

const PROJECT_MARKERS: &[&str] = &["CMakeLists.txt", "Makefile"];

const FILE_GLOBS: &[&str] = &["*.cpp", "*.h", "*.hpp", "*.c", "*.cc", "*.cxx"];

const EXCLUDED_DIRS: &[&str] = &["CMakeFiles"];

const CMAKE_RULES: &[MarkerRule] = &[
    MarkerRule::new("Qt", &["find_package(Qt"]),
    MarkerRule::new("Boost", &["Boost"]),
    MarkerRule::new("Unit Testing", &["GTest", "gtest", "Catch2"]),
];

#[derive(Debug, Default)]
pub struct CppPlugin;

impl CppPlugin {
    pub fn new() -> Self {
        Self
    }
}

impl TechnologyPlugin for CppPlugin {
    fn name(&self) -> &'static str {
        "C++"
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

    // Makefiles carry no reliable dependency information; only CMake is inspected.
    fn detect_technologies(&self, project_path: &Path, _project_type: &str) -> Vec<String> {
        let Some(content) = read_manifest(&project_path.join("CMakeLists.txt")) else {
            return Vec::new();
        };
        let technologies = detect_markers(&content, CMAKE_RULES);
        debug!(project = %project_path.display(), found = ?technologies, "cmake technologies");
        technologies
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn test_discovers_cmake_and_make_directories() {
        let tmp = tempfile::tempdir().unwrap();
        let root = tmp.path();
        fs::create_dir_all(root.join("engine/CMakeFiles/3.28")).unwrap();
        fs::create_dir_all(root.join("tools")).unwrap();
        fs::write(root.join("engine/CMakeLists.txt"), "").unwrap();
        fs::write(root.join("engine/Makefile"), "").unwrap();
        fs::write(root.join("engine/CMakeFiles/3.28/Makefile"), "").unwrap();
        fs::write(root.join("tools/Makefile"), "").unwrap();

        let projects = CppPlugin::new().discover_projects(root);
        assert_eq!(
            projects,
            vec![
                ProjectDescriptor::new(PROJECT_TYPE, root.join("engine")),
                ProjectDescriptor::new(PROJECT_TYPE, root.join("tools")),
            ]
        );
    }

    #[test]
    fn test_extensions_only_for_own_type() {
        let plugin = CppPlugin::new();
        assert_eq!(plugin.file_extensions(PROJECT_TYPE), FILE_GLOBS);
        assert!(plugin.file_extensions("Python").is_empty());
    }

    #[test]
    fn test_detects_cmake_packages() {
        let tmp = tempfile::tempdir().unwrap();
        fs::write(
            tmp.path().join("CMakeLists.txt"),
            "cmake_minimum_required(VERSION 3.20)\n\
             find_package(Qt6 REQUIRED COMPONENTS Widgets)\n\
             find_package(GTest REQUIRED)\n",
        )
        .unwrap();

        let techs = CppPlugin::new().detect_technologies(tmp.path(), PROJECT_TYPE);
        assert_eq!(techs, vec!["Qt", "Unit Testing"]);
    }

    #[test]
    fn test_plain_cmake_detects_nothing() {
        let tmp = tempfile::tempdir().unwrap();
        fs::write(
            tmp.path().join("CMakeLists.txt"),
            "cmake_minimum_required(VERSION 3.20)\nproject(app CXX)\nadd_executable(app main.cpp)\n",
        )
        .unwrap();
        assert!(CppPlugin::new()
            .detect_technologies(tmp.path(), PROJECT_TYPE)
            .is_empty());
    }

    #[test]
    fn test_makefile_only_detects_nothing() {
        let tmp = tempfile::tempdir().unwrap();
        fs::write(tmp.path().join("Makefile"), "LIBS = -lboost_system\n").unwrap();
        assert!(CppPlugin::new()
            .detect_technologies(tmp.path(), PROJECT_TYPE)
            .is_empty());
    }
}

use std::path::{Path, PathBuf};

use tracing::{debug, warn};
use walkdir::WalkDir;

use crate::plugin::{build_globset, is_excluded_name, TechnologyPlugin, CORE_EXCLUDED_DIRS};

/// Glob used when no plugin claims a project type.
pub const MATCH_ALL: &[&str] = &["*"];

/// First non-empty extension list any plugin reports for `project_type`,
/// falling back to [`MATCH_ALL`].
pub fn resolve_extensions(project_type: &str, plugins: &[Box<dyn TechnologyPlugin>]) -> &'static [&'static str] {
    plugins
        .iter()
        .map(|plugin| plugin.file_extensions(project_type))
        .find(|globs| !globs.is_empty())
        .unwrap_or(MATCH_ALL)
}

/// Core exclusions, then every plugin's additions, then `extra`.
pub fn excluded_dirs(plugins: &[Box<dyn TechnologyPlugin>], extra: &[String]) -> Vec<String> {
    let mut dirs: Vec<String> = CORE_EXCLUDED_DIRS.iter().map(|d| d.to_string()).collect();
    for plugin in plugins {
        dirs.extend(plugin.additional_excluded_dirs().iter().map(|d| d.to_string()));
    }
    dirs.extend(extra.iter().cloned());
    dirs.sort_by_key(|d| d.to_lowercase());
    dirs.dedup_by(|a, b| a.eq_ignore_ascii_case(b));
    dirs
}

/// Lists the files that belong to a project.
///
/// The project is walked once; a file is kept when its name matches any of
/// the resolved globs, so overlapping globs never count a file twice. Any
/// path segment below the project root that names an excluded directory
/// (case-insensitive) drops the entry.
pub struct FileCollector<'a> {
    plugins: &'a [Box<dyn TechnologyPlugin>],
    excluded: Vec<String>,
}

impl<'a> FileCollector<'a> {
    pub fn new(plugins: &'a [Box<dyn TechnologyPlugin>], extra_excluded: &[String]) -> Self {
        Self {
            plugins,
            excluded: excluded_dirs(plugins, extra_excluded),
        }
    }

    pub fn collect(&self, project_path: &Path, project_type: &str) -> Vec<PathBuf> {
        let globs = resolve_extensions(project_type, self.plugins);
        let Some(matcher) = build_globset(globs, true) else {
            warn!(project_type, "no usable file patterns, collecting nothing");
            return Vec::new();
        };

        let excluded = &self.excluded;
        let files: Vec<PathBuf> = WalkDir::new(project_path)
            .sort_by_file_name()
            .into_iter()
            .filter_entry(|e| e.depth() == 0 || !is_excluded_name(e.file_name(), excluded))
            .filter_map(|entry| match entry {
                Ok(e) => Some(e),
                Err(e) => {
                    warn!(
                        project = %project_path.display(),
                        error = %e,
                        "failed to enumerate files, skipping entry"
                    );
                    None
                }
            })
            .filter(|e| e.depth() > 0 && !e.path().is_dir())
            .filter(|e| matcher.is_match(e.file_name()))
            .map(|e| e.into_path())
            .collect();

        debug!(
            project = %project_path.display(),
            patterns = ?globs,
            files = files.len(),
            "collected project files"
        );
        files
    }
}

/// Free-function form of [`FileCollector::collect`] with no extra exclusions.
pub fn collect_files(
    project_path: &Path,
    project_type: &str,
    plugins: &[Box<dyn TechnologyPlugin>],
) -> Vec<PathBuf> {
    FileCollector::new(plugins, &[]).collect(project_path, project_type)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::ProjectDescriptor;
    use std::fs;

    struct GlobPlugin {
        owns: &'static str,
        globs: &'static [&'static str],
        extra_excluded: &'static [&'static str],
    }

    impl TechnologyPlugin for GlobPlugin {
        fn name(&self) -> &'static str {
            self.owns
        }

        fn discover_projects(&self, _repo_root: &Path) -> Vec<ProjectDescriptor> {
            Vec::new()
        }

        fn file_extensions(&self, project_type: &str) -> &'static [&'static str] {
            if project_type == self.owns {
                self.globs
            } else {
                &[]
            }
        }

        fn additional_excluded_dirs(&self) -> &'static [&'static str] {
            self.extra_excluded
        }

        fn detect_technologies(&self, _project_path: &Path, _project_type: &str) -> Vec<String> {
            Vec::new()
        }
    }

    fn plugins() -> Vec<Box<dyn TechnologyPlugin>> {
        vec![
            Box::new(GlobPlugin {
                owns: "Python",
                globs: &["*.py", "*.txt"],
                extra_excluded: &[".venv"],
            }),
            Box::new(GlobPlugin {
                owns: "Wide",
                globs: &["*.rs", "*.*"],
                extra_excluded: &[],
            }),
        ]
    }

    fn names(files: &[PathBuf], root: &Path) -> Vec<String> {
        files
            .iter()
            .map(|f| f.strip_prefix(root).unwrap().to_string_lossy().replace('\\', "/"))
            .collect()
    }

    #[test]
    fn test_resolve_extensions_first_non_empty() {
        let plugins = plugins();
        assert_eq!(resolve_extensions("Python", &plugins), &["*.py", "*.txt"]);
        assert_eq!(resolve_extensions("Wide", &plugins), &["*.rs", "*.*"]);
        assert_eq!(resolve_extensions("Unknown", &plugins), MATCH_ALL);
    }

    #[test]
    fn test_excluded_dirs_union() {
        let dirs = excluded_dirs(&plugins(), &["Vendor".to_string(), "BUILD".to_string()]);
        assert!(dirs.iter().any(|d| d == ".venv"));
        assert!(dirs.iter().any(|d| d == "node_modules"));
        assert!(dirs.iter().any(|d| d == "Vendor"));
        assert_eq!(dirs.iter().filter(|d| d.eq_ignore_ascii_case("build")).count(), 1);
    }

    #[test]
    fn test_collect_filters_by_glob_and_exclusions() {
        let tmp = tempfile::tempdir().unwrap();
        let root = tmp.path();
        fs::create_dir_all(root.join("pkg")).unwrap();
        fs::create_dir_all(root.join(".venv/lib")).unwrap();
        fs::create_dir_all(root.join("Build")).unwrap();
        fs::create_dir_all(root.join("rebuild")).unwrap();
        fs::write(root.join("setup.py"), "").unwrap();
        fs::write(root.join("requirements.txt"), "").unwrap();
        fs::write(root.join("README.md"), "").unwrap();
        fs::write(root.join("pkg/Mod.PY"), "").unwrap();
        fs::write(root.join(".venv/lib/site.py"), "").unwrap();
        fs::write(root.join("Build/gen.py"), "").unwrap();
        fs::write(root.join("rebuild/keep.py"), "").unwrap();

        let files = collect_files(root, "Python", &plugins());
        assert_eq!(
            names(&files, root),
            vec!["pkg/Mod.PY", "rebuild/keep.py", "requirements.txt", "setup.py"]
        );
    }

    #[test]
    fn test_overlapping_globs_count_once() {
        let tmp = tempfile::tempdir().unwrap();
        let root = tmp.path();
        fs::write(root.join("main.rs"), "").unwrap();
        fs::write(root.join("notes"), "").unwrap();

        let files = collect_files(root, "Wide", &plugins());
        assert_eq!(names(&files, root), vec!["main.rs"]);
    }

    #[test]
    fn test_unknown_type_collects_everything() {
        let tmp = tempfile::tempdir().unwrap();
        let root = tmp.path();
        fs::create_dir_all(root.join("docs")).unwrap();
        fs::write(root.join("docs/guide.md"), "").unwrap();
        fs::write(root.join("LICENSE"), "").unwrap();

        let files = collect_files(root, "Unknown", &plugins());
        assert_eq!(names(&files, root), vec!["LICENSE", "docs/guide.md"]);
    }

    #[test]
    fn test_extra_exclusions_from_config() {
        let tmp = tempfile::tempdir().unwrap();
        let root = tmp.path();
        fs::create_dir_all(root.join("third_party")).unwrap();
        fs::write(root.join("third_party/lib.py"), "").unwrap();
        fs::write(root.join("app.py"), "").unwrap();

        let plugins = plugins();
        let collector = FileCollector::new(&plugins, &["third_party".to_string()]);
        let files = collector.collect(root, "Python");
        assert_eq!(names(&files, root), vec!["app.py"]);
    }
}

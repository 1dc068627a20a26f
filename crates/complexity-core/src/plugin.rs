use std::collections::HashSet;
use std::ffi::OsStr;
use std::io;
use std::path::{Path, PathBuf};

use globset::{GlobBuilder, GlobSet, GlobSetBuilder};
use tracing::warn;
use walkdir::WalkDir;

use crate::types::{path_key, ProjectDescriptor};

/// Directory names skipped everywhere, regardless of registered plugins.
pub const CORE_EXCLUDED_DIRS: &[&str] = &[
    "node_modules",
    "bin",
    "obj",
    "dist",
    ".git",
    "__pycache__",
    "build",
];

/// Trait that each ecosystem plugin must implement.
///
/// Implementations are pure functions of the filesystem. Registration order
/// matters: the first plugin to claim a directory fixes its project type, and
/// the first non-empty extension list wins for a project type.
pub trait TechnologyPlugin: Send + Sync {
    /// Plugin name (e.g., "C++", "Python")
    fn name(&self) -> &'static str;

    /// Find project roots for this ecosystem under `repo_root`.
    /// Returns an empty list when nothing matches.
    fn discover_projects(&self, repo_root: &Path) -> Vec<ProjectDescriptor>;

    /// File name globs relevant to `project_type` (e.g., `&["*.py"]`).
    /// Empty when this plugin does not own the type.
    fn file_extensions(&self, project_type: &str) -> &'static [&'static str];

    /// Directory names to skip in addition to [`CORE_EXCLUDED_DIRS`].
    fn additional_excluded_dirs(&self) -> &'static [&'static str] {
        &[]
    }

    /// Technologies evidenced by files inside `project_path`.
    /// Empty when nothing is detected or a manifest cannot be read.
    fn detect_technologies(&self, project_path: &Path, project_type: &str) -> Vec<String>;
}

/// One row of a declarative detection table: `technology` is reported when
/// any of `needles` occurs in the inspected content.
#[derive(Debug, Clone, Copy)]
pub struct MarkerRule {
    pub technology: &'static str,
    pub needles: &'static [&'static str],
}

impl MarkerRule {
    pub const fn new(technology: &'static str, needles: &'static [&'static str]) -> Self {
        Self { technology, needles }
    }

    pub fn matches(&self, content: &str) -> bool {
        self.needles.iter().any(|needle| content.contains(needle))
    }
}

/// Evaluate a detection table against raw content, in table order.
pub fn detect_markers(content: &str, rules: &[MarkerRule]) -> Vec<String> {
    rules
        .iter()
        .filter(|rule| rule.matches(content))
        .map(|rule| rule.technology.to_string())
        .collect()
}

/// Append `found` to `into`, skipping entries already present.
pub fn push_unique(into: &mut Vec<String>, found: impl IntoIterator<Item = String>) {
    for item in found {
        if !into.contains(&item) {
            into.push(item);
        }
    }
}

/// True when `name` equals any of `excluded`, ignoring ASCII case.
pub fn is_excluded_name<S: AsRef<str>>(name: &OsStr, excluded: &[S]) -> bool {
    let name = name.to_string_lossy();
    excluded
        .iter()
        .any(|candidate| candidate.as_ref().eq_ignore_ascii_case(&name))
}

/// Core exclusions followed by `extra`.
pub fn exclusions_with(extra: &[&'static str]) -> Vec<&'static str> {
    CORE_EXCLUDED_DIRS.iter().chain(extra).copied().collect()
}

/// Compile file name globs into a matcher. Invalid globs are logged and skipped.
pub fn build_globset<S: AsRef<str>>(globs: &[S], case_insensitive: bool) -> Option<GlobSet> {
    let mut builder = GlobSetBuilder::new();
    let mut added = 0usize;
    for glob in globs {
        let glob = glob.as_ref();
        match GlobBuilder::new(glob).case_insensitive(case_insensitive).build() {
            Ok(g) => {
                builder.add(g);
                added += 1;
            }
            Err(e) => warn!(glob, error = %e, "skipping invalid file pattern"),
        }
    }
    if added == 0 {
        return None;
    }
    match builder.build() {
        Ok(set) => Some(set),
        Err(e) => {
            warn!(error = %e, "failed to compile file patterns");
            None
        }
    }
}

/// Files under `root` whose name matches any of `markers`, in walk order.
///
/// Directories named in `excluded` are not descended into. Unreadable
/// entries are logged and skipped.
pub fn find_marker_files<S: AsRef<str>>(root: &Path, markers: &[&str], excluded: &[S]) -> Vec<PathBuf> {
    let Some(matcher) = build_globset(markers, false) else {
        return Vec::new();
    };

    WalkDir::new(root)
        .sort_by_file_name()
        .into_iter()
        .filter_entry(|e| e.depth() == 0 || !is_excluded_name(e.file_name(), excluded))
        .filter_map(|entry| match entry {
            Ok(e) => Some(e),
            Err(e) => {
                warn!(root = %root.display(), error = %e, "failed to enumerate entry");
                None
            }
        })
        .filter(|e| e.file_type().is_file() && matcher.is_match(e.file_name()))
        .map(|e| e.into_path())
        .collect()
}

/// Directories containing a file matching `markers`, deduplicated in
/// first-seen order.
pub fn find_marker_dirs<S: AsRef<str>>(root: &Path, markers: &[&str], excluded: &[S]) -> Vec<PathBuf> {
    let mut seen = HashSet::new();
    find_marker_files(root, markers, excluded)
        .into_iter()
        .filter_map(|file| file.parent().map(Path::to_path_buf))
        .filter(|dir| seen.insert(path_key(dir)))
        .collect()
}

/// Read a manifest as text. Missing files yield `None` silently; other
/// failures are logged and also yield `None`.
pub fn read_manifest(path: &Path) -> Option<String> {
    match std::fs::read(path) {
        Ok(bytes) => Some(String::from_utf8_lossy(&bytes).into_owned()),
        Err(e) if e.kind() == io::ErrorKind::NotFound => None,
        Err(e) => {
            warn!(path = %path.display(), error = %e, "failed to read manifest");
            None
        }
    }
}

use std::collections::BTreeMap;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use tracing::{info, warn};

use crate::cancel::CancellationToken;
use crate::collector::FileCollector;
use crate::config::Config;
use crate::error::AnalysisError;
use crate::plugin::{push_unique, TechnologyPlugin};
use crate::scoring::{self, ScoreInputs};
use crate::types::{
    ProjectAnalysis, ProjectDescriptor, AVERAGE_FILE_SIZE_IN_LINES, TECHNOLOGY_COUNT,
    UNREADABLE_FILES,
};

/// Raw counts gathered from a project's files.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FileMeasurements {
    pub total_files: usize,
    pub total_lines: usize,
    pub file_types: BTreeMap<String, usize>,
    pub unreadable_files: usize,
}

/// Histogram key for a file: its lowercased extension with a leading dot,
/// or `""` when it has none.
pub fn extension_key(path: &Path) -> String {
    path.extension()
        .map(|ext| format!(".{}", ext.to_string_lossy().to_lowercase()))
        .unwrap_or_default()
}

/// Number of lines in a file. A trailing line without a newline counts.
pub fn count_lines(path: &Path) -> io::Result<usize> {
    let bytes = fs::read(path)?;
    let newlines = bytes.iter().filter(|&&b| b == b'\n').count();
    let unterminated = usize::from(bytes.last().is_some_and(|&b| b != b'\n'));
    Ok(newlines + unterminated)
}

/// Count files, lines and extensions.
///
/// A file that cannot be read still counts as a file and in the histogram
/// but contributes no lines.
pub fn measure_files(
    files: &[PathBuf],
    cancel: &CancellationToken,
) -> Result<FileMeasurements, AnalysisError> {
    let mut measurements = FileMeasurements {
        total_files: files.len(),
        ..Default::default()
    };

    for file in files {
        cancel.check()?;

        *measurements.file_types.entry(extension_key(file)).or_insert(0) += 1;

        match count_lines(file) {
            Ok(lines) => measurements.total_lines += lines,
            Err(e) => {
                warn!(file = %file.display(), error = %e, "failed to read file");
                measurements.unreadable_files += 1;
            }
        }
    }

    Ok(measurements)
}

/// The project's type label, then cross-cutting signals, then every plugin's
/// findings, without duplicates.
pub fn determine_technologies(
    project_path: &Path,
    project_type: &str,
    plugins: &[Box<dyn TechnologyPlugin>],
) -> Vec<String> {
    let mut technologies = vec![project_type.to_string()];

    if project_path.join("Dockerfile").is_file() {
        push_unique(&mut technologies, ["Docker".to_string()]);
    }
    if project_path.join(".github").join("workflows").exists() {
        push_unique(&mut technologies, ["GitHub Actions".to_string()]);
    }
    if project_path.join(".azure").is_dir() {
        push_unique(&mut technologies, ["Azure".to_string()]);
    }

    for plugin in plugins {
        push_unique(
            &mut technologies,
            plugin.detect_technologies(project_path, project_type),
        );
    }

    technologies
}

/// Analyzes one project at a time against a fixed plugin set and config.
pub struct ProjectAnalyzer<'a> {
    plugins: &'a [Box<dyn TechnologyPlugin>],
    config: &'a Config,
    collector: FileCollector<'a>,
}

impl<'a> ProjectAnalyzer<'a> {
    pub fn new(plugins: &'a [Box<dyn TechnologyPlugin>], config: &'a Config) -> Self {
        Self {
            plugins,
            config,
            collector: FileCollector::new(plugins, &config.project.exclude_dirs),
        }
    }

    pub fn analyze(
        &self,
        repo_root: &Path,
        descriptor: &ProjectDescriptor,
        cancel: &CancellationToken,
    ) -> Result<ProjectAnalysis, AnalysisError> {
        cancel.check()?;

        let project_path = descriptor.project_path.as_path();
        let project_type = descriptor.project_type.as_str();
        ensure_directory(project_path)?;

        let name = project_path
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_else(|| "Unknown".to_string());

        info!(project = %name, project_type, "analyzing project");

        let files = self.collector.collect(project_path, project_type);
        let measured = measure_files(&files, cancel)?;
        let technologies = determine_technologies(project_path, project_type, self.plugins);

        let inputs = ScoreInputs {
            total_lines: measured.total_lines,
            total_files: measured.total_files,
            technology_count: technologies.len(),
            file_type_count: measured.file_types.len(),
        };
        let complexity_score = scoring::complexity_score(&inputs, &self.config.scoring);
        let estimated_team_size =
            scoring::estimate_team_size(&inputs, complexity_score, &self.config.staffing);

        let mut metrics = BTreeMap::new();
        metrics.insert(
            AVERAGE_FILE_SIZE_IN_LINES.to_string(),
            measured
                .total_lines
                .checked_div(measured.total_files)
                .unwrap_or(0),
        );
        metrics.insert(TECHNOLOGY_COUNT.to_string(), technologies.len());
        metrics.insert(UNREADABLE_FILES.to_string(), measured.unreadable_files);

        Ok(ProjectAnalysis {
            name,
            project_type: project_type.to_string(),
            path: relative_path(repo_root, project_path),
            total_files: measured.total_files,
            total_lines: measured.total_lines,
            file_types: measured.file_types,
            technologies,
            complexity_score,
            estimated_team_size,
            metrics,
        })
    }
}

/// Analyze a single project with default configuration.
pub fn analyze_project(
    repo_root: &Path,
    descriptor: &ProjectDescriptor,
    plugins: &[Box<dyn TechnologyPlugin>],
) -> Result<ProjectAnalysis, AnalysisError> {
    let config = Config::default();
    ProjectAnalyzer::new(plugins, &config).analyze(repo_root, descriptor, &CancellationToken::new())
}

fn ensure_directory(path: &Path) -> Result<(), AnalysisError> {
    match fs::metadata(path) {
        Ok(meta) if meta.is_dir() => Ok(()),
        Ok(_) => Err(AnalysisError::ProjectMissing(path.to_path_buf())),
        Err(e) if e.kind() == io::ErrorKind::NotFound => {
            Err(AnalysisError::ProjectMissing(path.to_path_buf()))
        }
        Err(source) => Err(AnalysisError::Io {
            path: path.to_path_buf(),
            source,
        }),
    }
}

fn relative_path(repo_root: &Path, project_path: &Path) -> String {
    match project_path.strip_prefix(repo_root) {
        Ok(rel) if rel.as_os_str().is_empty() => ".".to_string(),
        Ok(rel) => rel.to_string_lossy().to_string(),
        Err(_) => project_path.to_string_lossy().to_string(),
    }
}

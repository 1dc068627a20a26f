use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::path::{Path, PathBuf};

/// Key in [`ProjectAnalysis::metrics`] for the mean line count per file.
pub const AVERAGE_FILE_SIZE_IN_LINES: &str = "average_file_size_in_lines";
/// Key in [`ProjectAnalysis::metrics`] for the number of detected technologies.
pub const TECHNOLOGY_COUNT: &str = "technology_count";
/// Key in [`ProjectAnalysis::metrics`] for files that could not be read.
pub const UNREADABLE_FILES: &str = "unreadable_files";

/// A directory claimed by a plugin as the root of one project.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProjectDescriptor {
    pub project_type: String,
    pub project_path: PathBuf,
}

impl ProjectDescriptor {
    pub fn new(project_type: impl Into<String>, project_path: impl Into<PathBuf>) -> Self {
        Self {
            project_type: project_type.into(),
            project_path: project_path.into(),
        }
    }

    /// Identity used for deduplication: the path, compared case-insensitively.
    pub fn path_key(&self) -> String {
        path_key(&self.project_path)
    }
}

/// Case-insensitive comparison key for a path.
pub fn path_key(path: &Path) -> String {
    path.to_string_lossy().to_lowercase()
}

/// Metrics for a single discovered project.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProjectAnalysis {
    pub name: String,
    pub project_type: String,
    /// Path relative to the repository root ("." for the root itself).
    pub path: String,
    pub total_files: usize,
    pub total_lines: usize,
    /// Lowercased extension (with leading dot, "" when absent) to file count.
    pub file_types: BTreeMap<String, usize>,
    /// Ordered, unique; the project's own type label comes first.
    pub technologies: Vec<String>,
    pub complexity_score: usize,
    pub estimated_team_size: usize,
    pub metrics: BTreeMap<String, usize>,
}

impl ProjectAnalysis {
    pub fn complexity_level(&self) -> ComplexityLevel {
        ComplexityLevel::from_score(self.complexity_score)
    }

    pub fn metric(&self, key: &str) -> Option<usize> {
        self.metrics.get(key).copied()
    }
}

/// Aggregate result for a whole repository.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RepositoryAnalysis {
    pub repository_url: String,
    pub repository_name: String,
    pub analyzed_at: DateTime<Utc>,
    /// In discovery order.
    pub projects: Vec<ProjectAnalysis>,
    pub total_complexity_score: usize,
    pub total_estimated_team_size: usize,
    pub file_types: BTreeMap<String, usize>,
    /// Sorted and deduplicated union of every project's technologies.
    pub technologies: Vec<String>,
}

impl RepositoryAnalysis {
    pub fn total_files(&self) -> usize {
        self.projects.iter().map(|p| p.total_files).sum()
    }

    pub fn total_lines(&self) -> usize {
        self.projects.iter().map(|p| p.total_lines).sum()
    }
}

/// Coarse bucket of a complexity score, used when presenting results.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ComplexityLevel {
    Low,
    Medium,
    High,
    VeryHigh,
}

impl ComplexityLevel {
    pub fn from_score(score: usize) -> Self {
        match score {
            0..=49 => ComplexityLevel::Low,
            50..=149 => ComplexityLevel::Medium,
            150..=299 => ComplexityLevel::High,
            _ => ComplexityLevel::VeryHigh,
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            ComplexityLevel::Low => {
                "This project has low complexity. It should be relatively easy to maintain and \
                 extend. A small team or single developer can handle it."
            }
            ComplexityLevel::Medium => {
                "This project has medium complexity. It requires experienced developers and \
                 careful planning for changes. A small to medium-sized team is recommended."
            }
            ComplexityLevel::High => {
                "This project has high complexity. It requires a dedicated team with expertise \
                 in the technologies used. Proper architecture and documentation are essential."
            }
            ComplexityLevel::VeryHigh => {
                "This project has very high complexity. It requires a large team with \
                 specialized skills. Consider breaking it down into smaller, more manageable \
                 components."
            }
        }
    }
}

impl fmt::Display for ComplexityLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ComplexityLevel::Low => write!(f, "Low"),
            ComplexityLevel::Medium => write!(f, "Medium"),
            ComplexityLevel::High => write!(f, "High"),
            ComplexityLevel::VeryHigh => write!(f, "Very High"),
        }
    }
}

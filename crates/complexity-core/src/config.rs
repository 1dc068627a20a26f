use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

use tracing::warn;

/// File name searched for when no explicit config path is given.
pub const CONFIG_FILE_NAME: &str = ".complexity.toml";

/// Top-level configuration from `.complexity.toml`
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub project: ProjectConfig,
    #[serde(default)]
    pub scoring: ScoringConfig,
    #[serde(default)]
    pub staffing: StaffingConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProjectConfig {
    /// Plugin names to enable; empty enables every registered plugin.
    #[serde(default)]
    pub plugins: Vec<String>,
    /// Directory names skipped on top of the core and plugin exclusions.
    #[serde(default)]
    pub exclude_dirs: Vec<String>,
    /// Number of projects analyzed concurrently. 1 keeps analysis sequential.
    #[serde(default = "default_jobs")]
    pub jobs: usize,
}

fn default_jobs() -> usize {
    1
}

impl Default for ProjectConfig {
    fn default() -> Self {
        Self {
            plugins: Vec::new(),
            exclude_dirs: Vec::new(),
            jobs: default_jobs(),
        }
    }
}

impl ProjectConfig {
    /// Whether the plugin called `name` should be registered.
    pub fn plugin_enabled(&self, name: &str) -> bool {
        self.plugins.is_empty() || self.plugins.iter().any(|p| p.eq_ignore_ascii_case(name))
    }
}

/// Divisors and weights of the complexity score.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoringConfig {
    #[serde(default = "default_lines_per_point")]
    pub lines_per_point: usize,
    #[serde(default = "default_files_per_point")]
    pub files_per_point: usize,
    #[serde(default = "default_technology_weight")]
    pub technology_weight: usize,
    #[serde(default = "default_file_type_weight")]
    pub file_type_weight: usize,
}

fn default_lines_per_point() -> usize {
    100
}
fn default_files_per_point() -> usize {
    10
}
fn default_technology_weight() -> usize {
    5
}
fn default_file_type_weight() -> usize {
    2
}

impl Default for ScoringConfig {
    fn default() -> Self {
        Self {
            lines_per_point: default_lines_per_point(),
            files_per_point: default_files_per_point(),
            technology_weight: default_technology_weight(),
            file_type_weight: default_file_type_weight(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StaffingConfig {
    #[serde(default = "default_lines_per_developer")]
    pub lines_per_developer: usize,
}

fn default_lines_per_developer() -> usize {
    10_000
}

impl Default for StaffingConfig {
    fn default() -> Self {
        Self {
            lines_per_developer: default_lines_per_developer(),
        }
    }
}

impl Config {
    /// Load configuration from a `.complexity.toml` file.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read config file '{}'", path.display()))?;
        let config: Config = toml::from_str(&content).with_context(|| {
            format!(
                "failed to parse '{}'. Run `complexity init` to create a valid config file",
                path.display()
            )
        })?;
        Ok(config)
    }

    /// Load from `.complexity.toml` in the given directory or any ancestor, or return defaults.
    pub fn load_or_default(dir: &Path) -> Self {
        let start = dir.canonicalize().unwrap_or_else(|_| dir.to_path_buf());
        for current in start.ancestors() {
            let config_path = current.join(CONFIG_FILE_NAME);
            if config_path.exists() {
                return match Self::load(&config_path) {
                    Ok(config) => config,
                    Err(e) => {
                        warn!(
                            path = %config_path.display(),
                            error = %format!("{e:#}"),
                            "failed to load config, using defaults"
                        );
                        Self::default()
                    }
                };
            }
        }
        Self::default()
    }

    /// Generate default TOML content for `complexity init`.
    pub fn default_toml() -> String {
        r#"# Complexity - Repository Complexity Analysis Configuration

[project]
# Plugins to enable, in registration order: "DotNet", "TypeScript", "Python", "C++".
# An empty list enables all of them.
plugins = []
# Directory names to skip in addition to the built-in list
# (node_modules, bin, obj, dist, .git, __pycache__, build).
exclude_dirs = []
# Projects analyzed concurrently; 1 analyzes them one after another.
jobs = 1

[scoring]
# score = lines / lines_per_point + files / files_per_point
#       + technologies * technology_weight + file types * file_type_weight
lines_per_point = 100
files_per_point = 10
technology_weight = 5
file_type_weight = 2

[staffing]
# Baseline developers = lines / lines_per_developer (at least 1)
lines_per_developer = 10000
"#
        .to_string()
    }
}

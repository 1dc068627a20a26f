use std::collections::BTreeMap;
use std::path::Path;

use chrono::{DateTime, Utc};
use rayon::prelude::*;
use tracing::{error, info, warn};

use crate::cancel::CancellationToken;
use crate::collector::excluded_dirs;
use crate::config::Config;
use crate::discovery;
use crate::error::AnalysisError;
use crate::plugin::TechnologyPlugin;
use crate::project::ProjectAnalyzer;
use crate::types::{ProjectAnalysis, ProjectDescriptor, RepositoryAnalysis};

/// Reusable analysis pipeline over an ordered set of plugins.
///
/// Each run builds fresh accumulators, so one pipeline can analyze any
/// number of repositories.
pub struct AnalysisPipeline {
    plugins: Vec<Box<dyn TechnologyPlugin>>,
    config: Config,
}

impl AnalysisPipeline {
    pub fn new(plugins: Vec<Box<dyn TechnologyPlugin>>, config: Config) -> Self {
        Self { plugins, config }
    }

    pub fn plugins(&self) -> &[Box<dyn TechnologyPlugin>] {
        &self.plugins
    }

    /// Get a reference to the config.
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Discover projects with every registered plugin, first claim wins.
    ///
    /// Projects under a directory excluded by the core list, any plugin, or
    /// the configuration are left out.
    pub fn discover(&self, repo_root: &Path) -> Vec<ProjectDescriptor> {
        let excluded = excluded_dirs(&self.plugins, &self.config.project.exclude_dirs);
        discovery::discover_all(repo_root, &self.plugins, &excluded)
    }

    /// Discover and analyze every project under `repo_root`, then aggregate.
    ///
    /// Projects that fail are logged and left out. Cancellation discards all
    /// work and returns [`AnalysisError::Cancelled`].
    pub fn analyze_repository(
        &self,
        repo_root: &Path,
        repo_url: &str,
        cancel: &CancellationToken,
    ) -> Result<RepositoryAnalysis, AnalysisError> {
        if !repo_root.is_dir() {
            return Err(AnalysisError::RepositoryNotFound(repo_root.to_path_buf()));
        }
        info!(repository = %repo_root.display(), "analyzing repository");

        let descriptors = self.discover(repo_root);
        info!(count = descriptors.len(), "discovered projects");

        let analyzer = ProjectAnalyzer::new(&self.plugins, &self.config);
        let projects = match self.config.project.jobs {
            0 | 1 => analyze_sequential(&analyzer, repo_root, &descriptors, cancel)?,
            jobs => analyze_parallel(&analyzer, repo_root, &descriptors, cancel, jobs)?,
        };

        let repository_name = repo_root
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_else(|| repo_root.to_string_lossy().to_string());

        let analysis = aggregate(repo_url, &repository_name, Utc::now(), projects);
        info!(
            projects = analysis.projects.len(),
            score = analysis.total_complexity_score,
            "repository analysis completed"
        );
        Ok(analysis)
    }
}

fn analyze_sequential(
    analyzer: &ProjectAnalyzer<'_>,
    repo_root: &Path,
    descriptors: &[ProjectDescriptor],
    cancel: &CancellationToken,
) -> Result<Vec<ProjectAnalysis>, AnalysisError> {
    let mut projects = Vec::with_capacity(descriptors.len());
    for descriptor in descriptors {
        let outcome = analyzer.analyze(repo_root, descriptor, cancel);
        if let Some(project) = keep_successful(descriptor, outcome)? {
            projects.push(project);
        }
    }
    Ok(projects)
}

fn analyze_parallel(
    analyzer: &ProjectAnalyzer<'_>,
    repo_root: &Path,
    descriptors: &[ProjectDescriptor],
    cancel: &CancellationToken,
    jobs: usize,
) -> Result<Vec<ProjectAnalysis>, AnalysisError> {
    let pool = match rayon::ThreadPoolBuilder::new().num_threads(jobs).build() {
        Ok(pool) => pool,
        Err(e) => {
            warn!(jobs, error = %e, "failed to start worker pool, analyzing sequentially");
            return analyze_sequential(analyzer, repo_root, descriptors, cancel);
        }
    };

    // Indexed parallel collect keeps discovery order.
    let outcomes: Vec<_> = pool.install(|| {
        descriptors
            .par_iter()
            .map(|descriptor| analyzer.analyze(repo_root, descriptor, cancel))
            .collect()
    });

    let mut projects = Vec::with_capacity(descriptors.len());
    for (descriptor, outcome) in descriptors.iter().zip(outcomes) {
        if let Some(project) = keep_successful(descriptor, outcome)? {
            projects.push(project);
        }
    }
    Ok(projects)
}

/// Cancellation propagates; any other failure drops the project.
fn keep_successful(
    descriptor: &ProjectDescriptor,
    outcome: Result<ProjectAnalysis, AnalysisError>,
) -> Result<Option<ProjectAnalysis>, AnalysisError> {
    match outcome {
        Ok(project) => Ok(Some(project)),
        Err(AnalysisError::Cancelled) => Err(AnalysisError::Cancelled),
        Err(e) => {
            error!(
                project = %descriptor.project_path.display(),
                error = %e,
                "failed to analyze project, leaving it out"
            );
            Ok(None)
        }
    }
}

/// Fold per-project results into the repository totals.
pub fn aggregate(
    repository_url: &str,
    repository_name: &str,
    analyzed_at: DateTime<Utc>,
    projects: Vec<ProjectAnalysis>,
) -> RepositoryAnalysis {
    let total_complexity_score = projects.iter().map(|p| p.complexity_score).sum();
    let total_estimated_team_size = projects.iter().map(|p| p.estimated_team_size).sum();

    let mut file_types: BTreeMap<String, usize> = BTreeMap::new();
    for project in &projects {
        for (ext, count) in &project.file_types {
            *file_types.entry(ext.clone()).or_insert(0) += count;
        }
    }

    let mut technologies: Vec<String> = projects
        .iter()
        .flat_map(|p| p.technologies.iter().cloned())
        .collect();
    technologies.sort();
    technologies.dedup();

    RepositoryAnalysis {
        repository_url: repository_url.to_string(),
        repository_name: repository_name.to_string(),
        analyzed_at,
        projects,
        total_complexity_score,
        total_estimated_team_size,
        file_types,
        technologies,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::plugin::find_marker_dirs;
    use std::fs;

    struct MarkerPlugin {
        label: &'static str,
        marker: &'static str,
        globs: &'static [&'static str],
        excluded: &'static [&'static str],
    }

    impl TechnologyPlugin for MarkerPlugin {
        fn name(&self) -> &'static str {
            self.label
        }

        fn discover_projects(&self, repo_root: &Path) -> Vec<ProjectDescriptor> {
            find_marker_dirs(repo_root, &[self.marker], crate::plugin::CORE_EXCLUDED_DIRS)
                .into_iter()
                .map(|dir| ProjectDescriptor::new(self.label, dir))
                .collect()
        }

        fn file_extensions(&self, project_type: &str) -> &'static [&'static str] {
            if project_type == self.label {
                self.globs
            } else {
                &[]
            }
        }

        fn additional_excluded_dirs(&self) -> &'static [&'static str] {
            self.excluded
        }

        fn detect_technologies(&self, project_path: &Path, _project_type: &str) -> Vec<String> {
            if project_path.join("Dockerfile").exists() {
                vec!["Containers".to_string()]
            } else {
                Vec::new()
            }
        }
    }

    fn pipeline(jobs: usize) -> AnalysisPipeline {
        let mut config = Config::default();
        config.project.jobs = jobs;
        AnalysisPipeline::new(
            vec![
                Box::new(MarkerPlugin {
                    label: "C++",
                    marker: "CMakeLists.txt",
                    globs: &["*.cpp", "*.h"],
                    excluded: &["CMakeFiles"],
                }),
                Box::new(MarkerPlugin {
                    label: "TypeScript / JavaScript",
                    marker: "package.json",
                    globs: &["*.ts", "*.json"],
                    excluded: &["coverage"],
                }),
            ],
            config,
        )
    }

    fn python_and_cpp(exclude_dirs: &[&str]) -> AnalysisPipeline {
        let mut config = Config::default();
        config.project.exclude_dirs = exclude_dirs.iter().map(|d| d.to_string()).collect();
        AnalysisPipeline::new(
            vec![
                Box::new(MarkerPlugin {
                    label: "Python",
                    marker: "requirements.txt",
                    globs: &["*.py", "*.txt"],
                    excluded: &[".venv"],
                }),
                Box::new(MarkerPlugin {
                    label: "C++",
                    marker: "Makefile",
                    globs: &["*.c", "*.h"],
                    excluded: &[],
                }),
            ],
            config,
        )
    }

    fn sample_repo() -> tempfile::TempDir {
        let tmp = tempfile::tempdir().unwrap();
        let root = tmp.path();
        fs::create_dir_all(root.join("native")).unwrap();
        fs::create_dir_all(root.join("web/src")).unwrap();
        fs::write(root.join("native/CMakeLists.txt"), "").unwrap();
        fs::write(root.join("native/main.cpp"), "int main() {}\n").unwrap();
        fs::write(root.join("native/util.h"), "#pragma once\n").unwrap();
        fs::write(root.join("native/package.json"), "{}\n").unwrap();
        fs::write(root.join("web/package.json"), "{\n}\n").unwrap();
        fs::write(root.join("web/src/app.ts"), "export {}\n").unwrap();
        fs::write(root.join("web/Dockerfile"), "FROM node\n").unwrap();
        tmp
    }

    #[test]
    fn test_analyze_repository_aggregates() {
        let repo = sample_repo();
        let analysis = pipeline(1)
            .analyze_repository(repo.path(), "https://example.com/repo.git", &CancellationToken::new())
            .unwrap();

        assert_eq!(analysis.repository_url, "https://example.com/repo.git");
        assert_eq!(analysis.projects.len(), 2);

        // native claimed by C++ first, package.json does not make it a second project
        assert_eq!(analysis.projects[0].project_type, "C++");
        assert_eq!(analysis.projects[0].name, "native");
        assert_eq!(analysis.projects[1].project_type, "TypeScript / JavaScript");

        let score_sum: usize = analysis.projects.iter().map(|p| p.complexity_score).sum();
        let team_sum: usize = analysis.projects.iter().map(|p| p.estimated_team_size).sum();
        assert_eq!(analysis.total_complexity_score, score_sum);
        assert_eq!(analysis.total_estimated_team_size, team_sum);

        let histogram_total: usize = analysis.file_types.values().sum();
        assert_eq!(histogram_total, analysis.total_files());

        assert_eq!(
            analysis.technologies,
            vec!["C++", "Containers", "Docker", "TypeScript / JavaScript"]
        );
    }

    #[test]
    fn test_parallel_matches_sequential() {
        let repo = sample_repo();
        let token = CancellationToken::new();
        let seq = pipeline(1).analyze_repository(repo.path(), "", &token).unwrap();
        let par = pipeline(4).analyze_repository(repo.path(), "", &token).unwrap();

        assert_eq!(seq.projects, par.projects);
        assert_eq!(seq.file_types, par.file_types);
        assert_eq!(seq.technologies, par.technologies);
    }

    #[test]
    fn test_cancelled_run_returns_no_result() {
        let repo = sample_repo();
        let token = CancellationToken::new();
        token.cancel();

        for jobs in [1, 3] {
            let err = pipeline(jobs)
                .analyze_repository(repo.path(), "", &token)
                .unwrap_err();
            assert!(err.is_cancelled());
        }
    }

    #[test]
    fn test_missing_repository_root() {
        let tmp = tempfile::tempdir().unwrap();
        let err = pipeline(1)
            .analyze_repository(&tmp.path().join("nope"), "", &CancellationToken::new())
            .unwrap_err();
        assert!(matches!(err, AnalysisError::RepositoryNotFound(_)));
    }

    #[test]
    fn test_empty_repository() {
        let tmp = tempfile::tempdir().unwrap();
        let analysis = pipeline(1)
            .analyze_repository(tmp.path(), "", &CancellationToken::new())
            .unwrap();
        assert!(analysis.projects.is_empty());
        assert_eq!(analysis.total_complexity_score, 0);
        assert!(analysis.file_types.is_empty());
        assert!(analysis.technologies.is_empty());
    }

    #[test]
    fn test_failed_project_is_dropped() {
        let repo = sample_repo();
        let pipeline = pipeline(1);
        let analyzer = ProjectAnalyzer::new(pipeline.plugins(), pipeline.config());
        let mut descriptors = pipeline.discover(repo.path());
        descriptors.insert(
            1,
            ProjectDescriptor::new("C++", repo.path().join("deleted")),
        );

        let projects =
            analyze_sequential(&analyzer, repo.path(), &descriptors, &CancellationToken::new())
                .unwrap();
        assert_eq!(projects.len(), 2);
        assert!(projects.iter().all(|p| p.name != "deleted"));
    }

    #[test]
    fn test_aggregate_merges_histograms() {
        let project = |name: &str, types: &[(&str, usize)], techs: &[&str]| ProjectAnalysis {
            name: name.to_string(),
            project_type: techs[0].to_string(),
            path: name.to_string(),
            total_files: types.iter().map(|(_, c)| c).sum(),
            total_lines: 0,
            file_types: types.iter().map(|(k, c)| (k.to_string(), *c)).collect(),
            technologies: techs.iter().map(|t| t.to_string()).collect(),
            complexity_score: 7,
            estimated_team_size: 2,
            metrics: BTreeMap::new(),
        };

        let analysis = aggregate(
            "url",
            "repo",
            Utc::now(),
            vec![
                project("a", &[(".py", 2), (".txt", 1)], &["Python", "Django"]),
                project("b", &[(".py", 3)], &["Python", "Docker"]),
            ],
        );

        assert_eq!(analysis.file_types.get(".py"), Some(&5));
        assert_eq!(analysis.file_types.get(".txt"), Some(&1));
        assert_eq!(analysis.total_complexity_score, 14);
        assert_eq!(analysis.total_estimated_team_size, 4);
        assert_eq!(analysis.technologies, vec!["Django", "Docker", "Python"]);
        assert_eq!(analysis.projects[0].name, "a");
    }

    #[test]
    fn test_project_inside_another_plugins_exclusion_is_skipped() {
        let tmp = tempfile::tempdir().unwrap();
        let root = tmp.path();
        let vendored = root.join(".venv/lib/python3.12/site-packages/somepkg");
        fs::create_dir_all(&vendored).unwrap();
        fs::write(root.join("requirements.txt"), "flask\n").unwrap();
        fs::write(root.join("app.py"), "print('hi')\n").unwrap();
        fs::write(vendored.join("Makefile"), "all:\n").unwrap();
        fs::write(vendored.join("ext.c"), "int x;\nint y;\n").unwrap();

        let analysis = python_and_cpp(&[])
            .analyze_repository(root, "", &CancellationToken::new())
            .unwrap();

        assert_eq!(analysis.projects.len(), 1);
        assert_eq!(analysis.projects[0].project_type, "Python");
        assert_eq!(analysis.projects[0].path, ".");
        assert_eq!(analysis.file_types.get(".c"), None);
        assert_eq!(analysis.total_files(), 2);
    }

    #[test]
    fn test_project_inside_configured_exclusion_is_skipped() {
        let tmp = tempfile::tempdir().unwrap();
        let root = tmp.path();
        fs::create_dir_all(root.join("third_party/zlib")).unwrap();
        fs::create_dir_all(root.join("src")).unwrap();
        fs::write(root.join("third_party/zlib/Makefile"), "all:\n").unwrap();
        fs::write(root.join("third_party/zlib/zlib.c"), "int z;\n").unwrap();
        fs::write(root.join("src/Makefile"), "all:\n").unwrap();
        fs::write(root.join("src/main.c"), "int main;\n").unwrap();

        let pipeline = python_and_cpp(&["third_party"]);
        let paths: Vec<_> = pipeline
            .discover(root)
            .into_iter()
            .map(|d| d.project_path)
            .collect();
        assert_eq!(paths, vec![root.join("src")]);

        let analysis = pipeline
            .analyze_repository(root, "", &CancellationToken::new())
            .unwrap();
        assert_eq!(analysis.total_files(), 1);
        assert_eq!(analysis.total_lines(), 1);

        let unfiltered = python_and_cpp(&[])
            .analyze_repository(root, "", &CancellationToken::new())
            .unwrap();
        assert_eq!(unfiltered.projects.len(), 2);
    }
}

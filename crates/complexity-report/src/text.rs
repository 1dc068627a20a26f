use colored::{ColoredString, Colorize};

use complexity_core::types::{ComplexityLevel, ProjectAnalysis, RepositoryAnalysis};

use crate::{by_count_desc, file_type_label, group_thousands};

const FILE_TYPE_LIMIT: usize = 5;

/// Format a repository analysis for terminal output.
pub fn format_report(analysis: &RepositoryAnalysis) -> String {
    let mut out = String::new();

    // Header
    out.push_str(&format!(
        "\n{}\n",
        "Complexity - Repository Analysis".bold()
    ));
    out.push_str(&format!("{}\n\n", "=".repeat(40)));

    out.push_str(&format!(
        "{}: {}\n",
        "Repository".bold(),
        analysis.repository_url
    ));
    out.push_str(&format!(
        "{}: {}\n",
        "Analyzed".bold(),
        analysis.analyzed_at.format("%Y-%m-%d %H:%M:%S UTC")
    ));

    // Totals
    out.push_str(&format!(
        "\n{}: {} projects, {} files, {} lines\n",
        "Summary".bold(),
        analysis.projects.len(),
        analysis.total_files(),
        group_thousands(analysis.total_lines()),
    ));
    out.push_str(&format!(
        "  Complexity score: {}\n",
        level_colored(
            ComplexityLevel::from_score(analysis.total_complexity_score),
            &analysis.total_complexity_score.to_string()
        )
    ));
    out.push_str(&format!(
        "  Estimated team size: {} developers\n",
        analysis.total_estimated_team_size
    ));
    if !analysis.technologies.is_empty() {
        out.push_str(&format!(
            "  Technologies: {}\n",
            analysis.technologies.join(", ")
        ));
    }

    if analysis.projects.is_empty() {
        out.push_str(&format!("\n{}\n", "No projects found.".yellow().bold()));
    } else {
        out.push_str(&format!(
            "\n{} ({} found)\n{}\n",
            "Projects".bold(),
            analysis.projects.len(),
            "-".repeat(40),
        ));

        let mut projects: Vec<&ProjectAnalysis> = analysis.projects.iter().collect();
        projects.sort_by(|a, b| b.complexity_score.cmp(&a.complexity_score));
        for project in projects {
            out.push_str(&format_project(project));
        }
    }

    out.push('\n');
    out
}

fn format_project(project: &ProjectAnalysis) -> String {
    let mut out = String::new();
    let level = project.complexity_level();

    out.push_str(&format!(
        "\n  {} [{}] {}\n",
        project.name.bold(),
        project.project_type.cyan(),
        project.path,
    ));
    out.push_str(&format!(
        "    score {} ({}), team {}, {} files, {} lines\n",
        level_colored(level, &project.complexity_score.to_string()),
        level_colored(level, &level.to_string()),
        project.estimated_team_size,
        project.total_files,
        group_thousands(project.total_lines),
    ));

    if !project.technologies.is_empty() {
        out.push_str(&format!(
            "    {}: {}\n",
            "Technologies".cyan(),
            project.technologies.join(", ")
        ));
    }

    if !project.file_types.is_empty() {
        let top: Vec<String> = by_count_desc(&project.file_types)
            .into_iter()
            .take(FILE_TYPE_LIMIT)
            .map(|(key, count)| format!("{} {count}", file_type_label(key)))
            .collect();
        out.push_str(&format!("    {}: {}\n", "File types".cyan(), top.join(", ")));
    }

    out
}

fn level_colored(level: ComplexityLevel, text: &str) -> ColoredString {
    match level {
        ComplexityLevel::Low => text.green(),
        ComplexityLevel::Medium => text.yellow(),
        ComplexityLevel::High => text.red(),
        ComplexityLevel::VeryHigh => text.red().bold(),
    }
}

use complexity_core::types::{ProjectAnalysis, RepositoryAnalysis, AVERAGE_FILE_SIZE_IN_LINES};

use crate::{by_count_desc, file_type_label, group_thousands};

/// File types listed per project.
const PROJECT_FILE_TYPE_LIMIT: usize = 10;

const HIGH_TOTAL_SCORE: usize = 500;
const LARGE_TEAM: usize = 10;
const MANY_TECHNOLOGIES: usize = 10;
const LARGE_PROJECT_LINES: usize = 50_000;

/// Format a full repository analysis as Markdown.
pub fn format_report(analysis: &RepositoryAnalysis) -> String {
    let mut out = String::new();

    out.push_str("# Code Repository Analysis Report\n\n");
    out.push_str(&format!("**Repository:** {}\n", analysis.repository_url));
    out.push_str(&format!(
        "**Analysis Date:** {} UTC\n\n",
        analysis.analyzed_at.format("%Y-%m-%d %H:%M:%S")
    ));

    // Executive summary
    out.push_str("## Executive Summary\n\n");
    out.push_str(&format!(
        "- **Total Projects Analyzed:** {}\n",
        analysis.projects.len()
    ));
    out.push_str(&format!(
        "- **Overall Complexity Score:** {}\n",
        analysis.total_complexity_score
    ));
    out.push_str(&format!(
        "- **Recommended Total Team Size:** {} developers\n",
        analysis.total_estimated_team_size
    ));
    out.push_str(&format!(
        "- **Technologies Used:** {}\n\n",
        analysis.technologies.join(", ")
    ));

    if !analysis.file_types.is_empty() {
        out.push_str("### Overall File Type Distribution\n\n");
        push_file_type_table(&mut out, &by_count_desc(&analysis.file_types));
    }

    out.push_str("## Project Analysis\n\n");
    let mut projects: Vec<&ProjectAnalysis> = analysis.projects.iter().collect();
    projects.sort_by(|a, b| b.complexity_score.cmp(&a.complexity_score));
    for project in projects {
        out.push_str(&format_project(project));
    }

    out.push_str("## Recommendations\n\n");
    for recommendation in recommendations(analysis) {
        out.push_str(&format!("- {recommendation}\n\n"));
    }

    out
}

fn format_project(project: &ProjectAnalysis) -> String {
    let mut out = String::new();

    out.push_str(&format!("### {}\n\n", project.name));
    out.push_str(&format!("**Type:** {}\n", project.project_type));
    out.push_str(&format!("**Path:** `{}`\n\n", project.path));

    out.push_str("#### Metrics\n\n");
    out.push_str("| Metric | Value |\n");
    out.push_str("|--------|-------|\n");
    out.push_str(&format!("| Total Files | {} |\n", project.total_files));
    out.push_str(&format!(
        "| Total Lines of Code | {} |\n",
        group_thousands(project.total_lines)
    ));
    out.push_str(&format!(
        "| Complexity Score | {} |\n",
        project.complexity_score
    ));
    out.push_str(&format!(
        "| Estimated Team Size | {} developer(s) |\n",
        project.estimated_team_size
    ));
    if let Some(average) = project.metric(AVERAGE_FILE_SIZE_IN_LINES) {
        out.push_str(&format!("| Average File Size | {average} lines |\n"));
    }
    out.push('\n');

    if !project.technologies.is_empty() {
        out.push_str("#### Technologies\n\n");
        for tech in &project.technologies {
            out.push_str(&format!("- {tech}\n"));
        }
        out.push('\n');
    }

    if !project.file_types.is_empty() {
        out.push_str("#### File Type Distribution\n\n");
        let mut rows = by_count_desc(&project.file_types);
        rows.truncate(PROJECT_FILE_TYPE_LIMIT);
        push_file_type_table(&mut out, &rows);
    }

    let level = project.complexity_level();
    out.push_str("#### Complexity Assessment\n\n");
    out.push_str(&format!("**Complexity Level:** {level}\n\n"));
    out.push_str(level.description());
    out.push_str("\n\n---\n\n");

    out
}

fn push_file_type_table(out: &mut String, rows: &[(&str, usize)]) {
    out.push_str("| File Type | Count |\n");
    out.push_str("|-----------|-------|\n");
    for (key, count) in rows {
        out.push_str(&format!("| {} | {count} |\n", file_type_label(key)));
    }
    out.push('\n');
}

fn recommendations(analysis: &RepositoryAnalysis) -> Vec<String> {
    let mut items = Vec::new();

    if analysis.total_complexity_score > HIGH_TOTAL_SCORE {
        items.push(
            "**High Overall Complexity**: Consider breaking down large projects into smaller, \
             more manageable microservices or modules."
                .to_string(),
        );
    }

    if analysis.total_estimated_team_size > LARGE_TEAM {
        items.push(format!(
            "**Large Team Required**: With an estimated team size of {} developers, ensure \
             proper team organization, clear communication channels, and well-defined \
             responsibilities.",
            analysis.total_estimated_team_size
        ));
    }

    if analysis.technologies.len() > MANY_TECHNOLOGIES {
        items.push(format!(
            "**Technology Diversity**: The codebase uses {} different technologies. Consider \
             standardizing on fewer technologies to reduce maintenance overhead and skill \
             requirements.",
            analysis.technologies.len()
        ));
    }

    let large = analysis
        .projects
        .iter()
        .filter(|p| p.total_lines > LARGE_PROJECT_LINES)
        .count();
    if large > 0 {
        items.push(format!(
            "**Large Projects Detected**: {large} project(s) have more than 50,000 lines of \
             code. Consider refactoring these projects to improve maintainability."
        ));
    }

    items.push(
        "**Code Quality**: Implement automated testing, code reviews, and continuous \
         integration to maintain code quality."
            .to_string(),
    );
    items.push(
        "**Documentation**: Ensure comprehensive documentation for all projects, especially \
         those with high complexity."
            .to_string(),
    );
    items.push(
        "**Technical Debt**: Regularly review and address technical debt to prevent it from \
         accumulating."
            .to_string(),
    );

    items
}

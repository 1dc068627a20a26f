use complexity_core::types::RepositoryAnalysis;

/// Format a repository analysis as JSON.
pub fn format_report(analysis: &RepositoryAnalysis, compact: bool) -> serde_json::Result<String> {
    if compact {
        serde_json::to_string(analysis)
    } else {
        serde_json::to_string_pretty(analysis)
    }
}

//! Complexity and staffing heuristics.
//!
//! Both are coarse, monotonic sums of independent signals. They never look at
//! source syntax, only at line, file, technology and file type counts.

use crate::config::{ScoringConfig, StaffingConfig};

/// Scores above this add one developer.
pub const TEAM_THRESHOLD_MEDIUM: usize = 100;
/// Scores above this add another developer.
pub const TEAM_THRESHOLD_LARGE: usize = 200;
/// Scores above this add two more developers.
pub const TEAM_THRESHOLD_HUGE: usize = 500;
/// More technologies than this add one developer.
pub const TEAM_TECHNOLOGY_THRESHOLD: usize = 5;

/// Inputs shared by both heuristics.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScoreInputs {
    pub total_lines: usize,
    pub total_files: usize,
    pub technology_count: usize,
    pub file_type_count: usize,
}

/// `lines/100 + files/10 + 5*technologies + 2*file types`, at least 1.
pub fn complexity_score(inputs: &ScoreInputs, config: &ScoringConfig) -> usize {
    let score = inputs.total_lines / config.lines_per_point.max(1)
        + inputs.total_files / config.files_per_point.max(1)
        + inputs.technology_count * config.technology_weight
        + inputs.file_type_count * config.file_type_weight;
    score.max(1)
}

/// Developers needed for a project.
///
/// The baseline is one developer per `lines_per_developer` lines (at least
/// one). The score bands are cumulative, so a score of 600 adds 1 + 1 + 2.
pub fn estimate_team_size(
    inputs: &ScoreInputs,
    complexity_score: usize,
    config: &StaffingConfig,
) -> usize {
    let mut team = (inputs.total_lines / config.lines_per_developer.max(1)).max(1);

    if complexity_score > TEAM_THRESHOLD_MEDIUM {
        team += 1;
    }
    if complexity_score > TEAM_THRESHOLD_LARGE {
        team += 1;
    }
    if complexity_score > TEAM_THRESHOLD_HUGE {
        team += 2;
    }
    if inputs.technology_count > TEAM_TECHNOLOGY_THRESHOLD {
        team += 1;
    }

    team.max(1)
}

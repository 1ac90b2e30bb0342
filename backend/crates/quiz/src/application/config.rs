//! Application Configuration

use std::time::Duration;

#[derive(Debug, Clone)]
pub struct QuizConfig {
    /// Deadline for one use case, transaction included
    pub operation_timeout: Duration,
    /// Edits tolerated in `fill_the_gap` answers
    pub typo_tolerance: usize,
    /// Name given to players created implicitly
    pub default_player_name: String,
    /// Player-entered names are cut to this many chars
    pub max_player_name_len: usize,
    pub default_page_limit: u32,
    pub max_page_limit: u32,
}

impl Default for QuizConfig {
    fn default() -> Self {
        Self {
            operation_timeout: Duration::from_secs(5),
            typo_tolerance: 2,
            default_player_name: "unknown".to_string(),
            max_player_name_len: 25,
            default_page_limit: 20,
            max_page_limit: 100,
        }
    }
}

impl QuizConfig {
    /// Generous deadline for local debugging sessions
    pub fn development() -> Self {
        Self {
            operation_timeout: Duration::from_secs(30),
            ..Self::default()
        }
    }

    /// Clamp a requested page size into `1..=max_page_limit`
    pub fn page_limit(&self, requested: Option<u32>) -> u32 {
        requested
            .unwrap_or(self.default_page_limit)
            .clamp(1, self.max_page_limit.max(1))
    }
}

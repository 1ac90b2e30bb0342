//! Player Entity

use chrono::{DateTime, Utc};
use kernel::id::PlayerId;

use crate::error::{QuizError, QuizResult};

/// Someone taking quizzes. Identity comes from outside the engine; the record
/// is created lazily with a placeholder name on the first session start.
#[derive(Debug, Clone)]
pub struct Player {
    pub id: PlayerId,
    pub name: String,
    /// The name was typed by the player rather than defaulted
    pub name_user_entered: bool,
    pub created_at: DateTime<Utc>,
}

impl Player {
    pub fn new(id: PlayerId, default_name: &str) -> Self {
        Self {
            id,
            name: default_name.to_string(),
            name_user_entered: false,
            created_at: Utc::now(),
        }
    }

    /// Set a player-entered name, trimmed and cut to `max_len` chars
    pub fn rename(&mut self, raw: &str, max_len: usize) -> QuizResult<()> {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Err(QuizError::InvalidInput("player name is empty".into()));
        }
        self.name = trimmed.chars().take(max_len).collect();
        self.name_user_entered = true;
        Ok(())
    }
}

//! Game Entity

use chrono::{DateTime, Utc};
use kernel::id::GameId;

use crate::domain::value_object::{
    game_settings::GameSettings, game_status::GameStatus, game_type::GameType,
};
use crate::error::{QuizError, QuizResult};

/// An author-configured quiz instance
#[derive(Debug, Clone)]
pub struct Game {
    pub id: GameId,
    pub title: Option<String>,
    pub status: GameStatus,
    pub game_type: GameType,
    pub settings: GameSettings,
    pub created_at: DateTime<Utc>,
}

impl Game {
    pub fn new(title: Option<String>, settings: GameSettings) -> Self {
        Self {
            id: GameId::new(),
            title: title
                .map(|t| t.trim().to_string())
                .filter(|t| !t.is_empty()),
            status: GameStatus::Created,
            game_type: GameType::Async,
            settings,
            created_at: Utc::now(),
        }
    }

    /// Players may only interact with a started game
    pub fn ensure_active(&self) -> QuizResult<()> {
        if self.status.is_active() {
            Ok(())
        } else {
            Err(QuizError::GameNotActive)
        }
    }

    pub fn ensure_editable(&self) -> QuizResult<()> {
        if self.status.is_editable() {
            Ok(())
        } else {
            Err(QuizError::GameNotEditable)
        }
    }

    pub fn start(&mut self) -> QuizResult<()> {
        self.transition(GameStatus::Started)
    }

    pub fn finish(&mut self) -> QuizResult<()> {
        self.transition(GameStatus::Finished)
    }

    fn transition(&mut self, next: GameStatus) -> QuizResult<()> {
        if !self.status.can_transition_to(next) {
            return Err(QuizError::InvalidGameTransition {
                from: self.status.code(),
                to: next.code(),
            });
        }
        self.status = next;
        Ok(())
    }
}

/// Participation summary for one game
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GameStatistics {
    pub participants_count: u64,
    pub finished_count: u64,
    /// Percent of participants whose session is finished
    pub completion_rate: u8,
}

impl GameStatistics {
    pub fn from_counts(participants_count: u64, finished_count: u64) -> Self {
        let completion_rate = if participants_count == 0 {
            0
        } else {
            (finished_count.min(participants_count) * 100 / participants_count) as u8
        };
        Self {
            participants_count,
            finished_count,
            completion_rate,
        }
    }
}

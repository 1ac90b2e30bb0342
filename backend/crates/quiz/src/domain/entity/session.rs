//! Session Entities
//!
//! One session per (game, player). Items are appended as questions are shown:
//! an item without `answered_at` is pending, an item with it is frozen.

use chrono::{DateTime, Utc};
use kernel::id::{GameId, PlayerId, QuestionId, SessionId, SessionItemId};

use crate::domain::value_object::session_status::SessionStatus;
use crate::error::{QuizError, QuizResult};

#[derive(Debug, Clone)]
pub struct Session {
    pub id: SessionId,
    pub game_id: GameId,
    pub player_id: PlayerId,
    pub status: SessionStatus,
    pub created_at: DateTime<Utc>,
}

impl Session {
    pub fn new(game_id: GameId, player_id: PlayerId) -> Self {
        Self {
            id: SessionId::new(),
            game_id,
            player_id,
            status: SessionStatus::Started,
            created_at: Utc::now(),
        }
    }

    pub fn is_finished(&self) -> bool {
        self.status == SessionStatus::Finished
    }

    pub fn ensure_active(&self) -> QuizResult<()> {
        match self.status {
            SessionStatus::Started => Ok(()),
            SessionStatus::Finished => Err(QuizError::SessionNotActive),
        }
    }

    pub fn finish(&mut self) {
        self.status = SessionStatus::Finished;
    }

    /// Back to `started`; the caller deletes the items
    pub fn restart(&mut self) {
        self.status = SessionStatus::Started;
    }
}

#[derive(Debug, Clone)]
pub struct SessionItem {
    pub id: SessionItemId,
    pub session_id: SessionId,
    pub question_id: QuestionId,
    pub answers: Vec<String>,
    pub is_correct: Option<bool>,
    pub answered_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

impl SessionItem {
    /// A question that has been shown and awaits an answer
    pub fn pending(session_id: SessionId, question_id: QuestionId) -> Self {
        Self {
            id: SessionItemId::new(),
            session_id,
            question_id,
            answers: Vec::new(),
            is_correct: None,
            answered_at: None,
            created_at: Utc::now(),
        }
    }

    #[inline]
    pub fn is_pending(&self) -> bool {
        self.answered_at.is_none()
    }

    #[inline]
    pub fn is_answered(&self) -> bool {
        self.answered_at.is_some()
    }

    pub fn record_answer(&mut self, answers: Vec<String>, is_correct: bool) -> QuizResult<()> {
        if self.is_answered() {
            return Err(QuizError::AlreadyAnswered);
        }
        self.answers = answers;
        self.is_correct = Some(is_correct);
        self.answered_at = Some(Utc::now());
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SessionStatistics {
    pub questions_count: u64,
    pub answered_count: u64,
    pub correct_answers_count: u64,
}

impl SessionStatistics {
    pub fn from_items(questions_count: u64, items: &[SessionItem]) -> Self {
        Self {
            questions_count,
            answered_count: items.iter().filter(|i| i.is_answered()).count() as u64,
            correct_answers_count: items
                .iter()
                .filter(|i| i.is_correct == Some(true))
                .count() as u64,
        }
    }
}

/// A session together with its player's name and every item
#[derive(Debug, Clone)]
pub struct ExtendedSession {
    pub session: Session,
    pub player_name: String,
    pub items: Vec<SessionItem>,
}

impl ExtendedSession {
    pub fn answered_count(&self) -> u64 {
        self.items.iter().filter(|i| i.is_answered()).count() as u64
    }

    pub fn correct_answers_count(&self) -> u64 {
        self.items
            .iter()
            .filter(|i| i.is_correct == Some(true))
            .count() as u64
    }

    /// Percent of the game's questions answered, 0..=100
    pub fn completion_rate(&self, total_questions: u64) -> u8 {
        if total_questions == 0 {
            return 0;
        }
        (self.answered_count().min(total_questions) * 100 / total_questions) as u8
    }
}

/// One page of extended sessions, newest first
#[derive(Debug, Clone)]
pub struct ExtendedSessionsPage {
    pub sessions: Vec<ExtendedSession>,
    pub total_count: u64,
    pub questions_count: u64,
}

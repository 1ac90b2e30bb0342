//! Get Current State Use Case
//!
//! "What's next" for a player. Re-shows the pending question if there is one;
//! otherwise picks the next question and records it as pending in the same
//! unit of work, so the choice survives reloads.

use std::sync::Arc;

use kernel::id::{GameId, PlayerId};

use crate::application::config::QuizConfig;
use crate::application::execution::{load_active_game, load_session, within_deadline};
use crate::domain::entity::{question::Question, session::SessionItem};
use crate::domain::repository::{
    QuestionRepository, SessionRepository, TransactionManager, UnitOfWork,
};
use crate::domain::service::selection::{NextQuestion, select_next};
use crate::domain::value_object::session_status::SessionStatus;
use crate::error::{QuizError, QuizResult};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Progress {
    pub answered: u64,
    pub total: u64,
}

#[derive(Debug, Clone)]
pub struct SessionState {
    pub status: SessionStatus,
    /// `None` once the session is finished
    pub current_question: Option<Question>,
    pub progress: Progress,
}

pub struct GetCurrentStateUseCase<T>
where
    T: TransactionManager,
{
    tx_manager: Arc<T>,
    config: Arc<QuizConfig>,
}

impl<T> GetCurrentStateUseCase<T>
where
    T: TransactionManager,
{
    pub fn new(tx_manager: Arc<T>, config: Arc<QuizConfig>) -> Self {
        Self { tx_manager, config }
    }

    pub async fn execute(&self, game_id: GameId, player_id: PlayerId) -> QuizResult<SessionState> {
        within_deadline(self.config.operation_timeout, self.run(game_id, player_id)).await
    }

    async fn run(&self, game_id: GameId, player_id: PlayerId) -> QuizResult<SessionState> {
        let mut tx = self.tx_manager.begin().await?;

        let game = load_active_game(&mut tx, game_id).await?;
        let session = load_session(&mut tx, game_id, player_id).await?;

        if session.is_finished() {
            return Ok(SessionState {
                status: SessionStatus::Finished,
                current_question: None,
                progress: Progress::default(),
            });
        }

        let questions = tx.questions_for_game(game_id).await?;
        let items = tx.session_items(session.id).await?;

        let next = select_next(&questions, &items, &game.settings)?;
        let question = questions
            .iter()
            .find(|q| q.id == next.question_id())
            .ok_or(QuizError::QuestionNotFound)?;

        if let NextQuestion::New(question_id) = next {
            tx.insert_session_item(&SessionItem::pending(session.id, question_id))
                .await?;
        }

        let progress = Progress {
            answered: items.iter().filter(|i| i.is_answered()).count() as u64,
            total: questions.len() as u64,
        };

        // Only the returned copy is shuffled; stored order stays put.
        let current_question = if game.settings.shuffle_answers {
            question.with_shuffled_options()
        } else {
            question.clone()
        };

        tx.commit().await?;

        tracing::debug!(
            game_id = %game_id,
            player_id = %player_id,
            question_id = %current_question.id,
            resumed = matches!(next, NextQuestion::Pending(_)),
            answered = progress.answered,
            total = progress.total,
            "Current question resolved"
        );

        Ok(SessionState {
            status: session.status,
            current_question: Some(current_question),
            progress,
        })
    }
}

//! Accept Answers Use Case
//!
//! Scores the answer to the pending question and freezes the item.

use std::sync::Arc;

use kernel::id::{GameId, PlayerId, QuestionId};

use crate::application::config::QuizConfig;
use crate::application::execution::{load_active_game, load_session, within_deadline};
use crate::domain::entity::question::AnswerOption;
use crate::domain::repository::{
    QuestionRepository, SessionRepository, TransactionManager, UnitOfWork,
};
use crate::domain::service::acceptor::{AnswerAcceptor, AnswerDetail};
use crate::error::{QuizError, QuizResult};

#[derive(Debug, Clone)]
pub struct AcceptAnswersInput {
    pub game_id: GameId,
    pub player_id: PlayerId,
    pub question_id: QuestionId,
    pub answers: Vec<String>,
}

#[derive(Debug, Clone)]
pub struct AcceptAnswersOutput {
    pub is_correct: bool,
    pub details: Vec<AnswerDetail>,
    /// Present only when the game reveals right answers
    pub right_answers: Option<Vec<AnswerOption>>,
}

pub struct AcceptAnswersUseCase<T>
where
    T: TransactionManager,
{
    tx_manager: Arc<T>,
    config: Arc<QuizConfig>,
}

impl<T> AcceptAnswersUseCase<T>
where
    T: TransactionManager,
{
    pub fn new(tx_manager: Arc<T>, config: Arc<QuizConfig>) -> Self {
        Self { tx_manager, config }
    }

    pub async fn execute(&self, input: AcceptAnswersInput) -> QuizResult<AcceptAnswersOutput> {
        within_deadline(self.config.operation_timeout, self.run(input)).await
    }

    async fn run(&self, input: AcceptAnswersInput) -> QuizResult<AcceptAnswersOutput> {
        let mut tx = self.tx_manager.begin().await?;

        let game = load_active_game(&mut tx, input.game_id).await?;
        let session = load_session(&mut tx, input.game_id, input.player_id).await?;
        session.ensure_active()?;

        let mut item = tx
            .session_items(session.id)
            .await?
            .into_iter()
            .find(|i| i.question_id == input.question_id)
            .ok_or(QuizError::SessionItemNotFound)?;
        if item.is_answered() {
            return Err(QuizError::AlreadyAnswered);
        }

        let question = tx
            .find_question(input.game_id, input.question_id)
            .await?
            .ok_or(QuizError::QuestionNotFound)?;

        let verdict =
            AnswerAcceptor::new(self.config.typo_tolerance).accept(&question, &input.answers)?;

        item.record_answer(input.answers, verdict.is_correct)?;
        tx.update_session_item(&item).await?;

        tx.commit().await?;

        tracing::info!(
            game_id = %input.game_id,
            player_id = %input.player_id,
            question_id = %input.question_id,
            is_correct = verdict.is_correct,
            "Answer accepted"
        );

        Ok(AcceptAnswersOutput {
            is_correct: verdict.is_correct,
            details: verdict.details,
            right_answers: game
                .settings
                .show_right_answers
                .then(|| question.right_answers()),
        })
    }
}

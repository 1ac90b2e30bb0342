//! Session Statistics Use Case

use std::sync::Arc;

use kernel::id::{GameId, PlayerId};

use crate::application::config::QuizConfig;
use crate::application::execution::{load_game, load_session, within_deadline};
use crate::domain::entity::session::SessionStatistics;
use crate::domain::repository::{
    QuestionRepository, SessionRepository, TransactionManager, UnitOfWork,
};
use crate::error::QuizResult;

pub struct SessionStatisticsUseCase<T>
where
    T: TransactionManager,
{
    tx_manager: Arc<T>,
    config: Arc<QuizConfig>,
}

impl<T> SessionStatisticsUseCase<T>
where
    T: TransactionManager,
{
    pub fn new(tx_manager: Arc<T>, config: Arc<QuizConfig>) -> Self {
        Self { tx_manager, config }
    }

    pub async fn execute(
        &self,
        game_id: GameId,
        player_id: PlayerId,
    ) -> QuizResult<SessionStatistics> {
        within_deadline(self.config.operation_timeout, self.run(game_id, player_id)).await
    }

    async fn run(&self, game_id: GameId, player_id: PlayerId) -> QuizResult<SessionStatistics> {
        let mut tx = self.tx_manager.begin().await?;

        // Results stay readable after the author finishes the game.
        load_game(&mut tx, game_id).await?;
        let session = load_session(&mut tx, game_id, player_id).await?;

        let questions_count = tx.questions_for_game(game_id).await?.len() as u64;
        let items = tx.session_items(session.id).await?;
        tx.commit().await?;

        Ok(SessionStatistics::from_items(questions_count, &items))
    }
}

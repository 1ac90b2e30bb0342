//! Restart Session Use Case
//!
//! Drops every item of the session and reopens it, so the player can replay
//! the game from the start.

use std::sync::Arc;

use kernel::id::{GameId, PlayerId};

use crate::application::config::QuizConfig;
use crate::application::execution::{load_active_game, load_session, within_deadline};
use crate::domain::repository::{SessionRepository, TransactionManager, UnitOfWork};
use crate::error::QuizResult;

pub struct RestartSessionUseCase<T>
where
    T: TransactionManager,
{
    tx_manager: Arc<T>,
    config: Arc<QuizConfig>,
}

impl<T> RestartSessionUseCase<T>
where
    T: TransactionManager,
{
    pub fn new(tx_manager: Arc<T>, config: Arc<QuizConfig>) -> Self {
        Self { tx_manager, config }
    }

    pub async fn execute(&self, game_id: GameId, player_id: PlayerId) -> QuizResult<()> {
        within_deadline(self.config.operation_timeout, self.run(game_id, player_id)).await
    }

    async fn run(&self, game_id: GameId, player_id: PlayerId) -> QuizResult<()> {
        let mut tx = self.tx_manager.begin().await?;

        load_active_game(&mut tx, game_id).await?;
        let mut session = load_session(&mut tx, game_id, player_id).await?;

        let cleared = tx.delete_session_items(session.id).await?;
        session.restart();
        tx.update_session(&session).await?;

        tx.commit().await?;

        tracing::info!(
            game_id = %game_id,
            player_id = %player_id,
            items_cleared = cleared,
            "Session restarted"
        );

        Ok(())
    }
}

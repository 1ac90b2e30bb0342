//! Start Session Use Case
//!
//! Opens the (game, player) session. The player record is created on the fly
//! with the default name when it does not exist yet.

use std::sync::Arc;

use kernel::id::{GameId, PlayerId};

use crate::application::config::QuizConfig;
use crate::application::execution::{load_active_game, within_deadline};
use crate::domain::entity::{player::Player, session::Session};
use crate::domain::repository::{
    PlayerRepository, SessionRepository, TransactionManager, UnitOfWork,
};
use crate::error::QuizResult;

pub struct StartSessionUseCase<T>
where
    T: TransactionManager,
{
    tx_manager: Arc<T>,
    config: Arc<QuizConfig>,
}

impl<T> StartSessionUseCase<T>
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

        if tx.find_player(player_id).await?.is_none() {
            let player = Player::new(player_id, &self.config.default_player_name);
            tx.insert_player(&player).await?;
            tracing::debug!(player_id = %player_id, "Player created");
        }

        // A second session for the pair is rejected by the store.
        let session = Session::new(game_id, player_id);
        tx.insert_session(&session).await?;

        tx.commit().await?;

        tracing::info!(
            game_id = %game_id,
            player_id = %player_id,
            session_id = %session.id,
            "Session started"
        );

        Ok(())
    }
}

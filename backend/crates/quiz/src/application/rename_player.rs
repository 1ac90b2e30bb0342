//! Rename Player Use Case

use std::sync::Arc;

use kernel::id::PlayerId;

use crate::application::config::QuizConfig;
use crate::application::execution::within_deadline;
use crate::domain::entity::player::Player;
use crate::domain::repository::{PlayerRepository, TransactionManager, UnitOfWork};
use crate::error::{QuizError, QuizResult};

pub struct RenamePlayerUseCase<T>
where
    T: TransactionManager,
{
    tx_manager: Arc<T>,
    config: Arc<QuizConfig>,
}

impl<T> RenamePlayerUseCase<T>
where
    T: TransactionManager,
{
    pub fn new(tx_manager: Arc<T>, config: Arc<QuizConfig>) -> Self {
        Self { tx_manager, config }
    }

    pub async fn execute(&self, player_id: PlayerId, name: String) -> QuizResult<Player> {
        within_deadline(self.config.operation_timeout, self.run(player_id, name)).await
    }

    async fn run(&self, player_id: PlayerId, name: String) -> QuizResult<Player> {
        let mut tx = self.tx_manager.begin().await?;

        let mut player = tx
            .find_player(player_id)
            .await?
            .ok_or(QuizError::PlayerNotFound)?;
        player.rename(&name, self.config.max_player_name_len)?;
        tx.update_player(&player).await?;

        tx.commit().await?;

        tracing::info!(player_id = %player_id, "Player renamed");

        Ok(player)
    }
}

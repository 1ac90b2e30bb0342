//! List Sessions Use Case
//!
//! Author view: every session of a game with its items, newest first.

use std::sync::Arc;

use kernel::id::GameId;

use crate::application::config::QuizConfig;
use crate::application::execution::{load_game, within_deadline};
use crate::domain::entity::session::ExtendedSessionsPage;
use crate::domain::repository::{
    QuestionRepository, SessionRepository, TransactionManager, UnitOfWork,
};
use crate::error::QuizResult;

#[derive(Debug, Clone, Copy, Default)]
pub struct PageRequest {
    /// 1-based
    pub page: Option<u32>,
    pub limit: Option<u32>,
}

pub struct ListSessionsUseCase<T>
where
    T: TransactionManager,
{
    tx_manager: Arc<T>,
    config: Arc<QuizConfig>,
}

impl<T> ListSessionsUseCase<T>
where
    T: TransactionManager,
{
    pub fn new(tx_manager: Arc<T>, config: Arc<QuizConfig>) -> Self {
        Self { tx_manager, config }
    }

    pub async fn execute(
        &self,
        game_id: GameId,
        page: PageRequest,
    ) -> QuizResult<ExtendedSessionsPage> {
        within_deadline(self.config.operation_timeout, self.run(game_id, page)).await
    }

    async fn run(&self, game_id: GameId, page: PageRequest) -> QuizResult<ExtendedSessionsPage> {
        let limit = self.config.page_limit(page.limit);
        let page_number = page.page.unwrap_or(1).max(1);
        let offset = u64::from(page_number - 1) * u64::from(limit);

        let mut tx = self.tx_manager.begin().await?;

        load_game(&mut tx, game_id).await?;
        let questions_count = tx.questions_for_game(game_id).await?.len() as u64;
        let counts = tx.session_counts(game_id).await?;
        let sessions = tx.extended_sessions(game_id, limit, offset).await?;
        tx.commit().await?;

        tracing::debug!(
            game_id = %game_id,
            page = page_number,
            limit,
            returned = sessions.len(),
            "Sessions listed"
        );

        Ok(ExtendedSessionsPage {
            sessions,
            total_count: counts.total,
            questions_count,
        })
    }
}

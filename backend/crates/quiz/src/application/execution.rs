//! Shared plumbing for use cases

use std::future::Future;
use std::time::Duration;

use kernel::id::{GameId, PlayerId};

use crate::domain::entity::{game::Game, session::Session};
use crate::domain::repository::{GameRepository, SessionRepository};
use crate::error::{QuizError, QuizResult};

/// Run `operation` under a deadline.
///
/// On expiry the operation future is dropped, and with it any open unit of
/// work, so nothing it wrote is committed.
pub async fn within_deadline<T, F>(deadline: Duration, operation: F) -> QuizResult<T>
where
    F: Future<Output = QuizResult<T>>,
{
    match tokio::time::timeout(deadline, operation).await {
        Ok(result) => result,
        Err(_) => {
            tracing::warn!(deadline_ms = deadline.as_millis() as u64, "Quiz operation timed out");
            Err(QuizError::Timeout)
        }
    }
}

pub(crate) async fn load_game<R: GameRepository>(
    repo: &mut R,
    game_id: GameId,
) -> QuizResult<Game> {
    repo.find_game(game_id)
        .await?
        .ok_or(QuizError::GameNotFound)
}

/// Like [`load_game`], but the game row stays locked until the unit of work
/// ends. Used by anything that changes the game or its questions.
pub(crate) async fn lock_game<R: GameRepository>(
    repo: &mut R,
    game_id: GameId,
) -> QuizResult<Game> {
    repo.lock_game(game_id)
        .await?
        .ok_or(QuizError::GameNotFound)
}

/// The game must exist and be `started`
pub(crate) async fn load_active_game<R: GameRepository>(
    repo: &mut R,
    game_id: GameId,
) -> QuizResult<Game> {
    let game = load_game(repo, game_id).await?;
    game.ensure_active()?;
    Ok(game)
}

pub(crate) async fn load_session<R: SessionRepository>(
    repo: &mut R,
    game_id: GameId,
    player_id: PlayerId,
) -> QuizResult<Session> {
    repo.find_session(game_id, player_id)
        .await?
        .ok_or(QuizError::SessionNotFound)
}

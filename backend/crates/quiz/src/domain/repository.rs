//! Repository Traits
//!
//! Interfaces for data persistence. Implementations live in the infra layer.
//!
//! Every repository method runs inside one unit of work. Methods take
//! `&mut self` because a unit of work owns its transaction.

use kernel::id::{GameId, PlayerId, QuestionId, SessionId};

use crate::domain::entity::{
    game::Game,
    player::Player,
    question::{Question, QuestionDraft},
    session::{ExtendedSession, Session, SessionItem},
};
use crate::error::QuizResult;

/// Session counts for one game
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SessionCounts {
    pub total: u64,
    pub finished: u64,
}

#[trait_variant::make(GameRepository: Send)]
pub trait LocalGameRepository {
    async fn insert_game(&mut self, game: &Game) -> QuizResult<()>;

    async fn find_game(&mut self, game_id: GameId) -> QuizResult<Option<Game>>;

    /// Find and lock the game row until the unit of work ends.
    ///
    /// Status changes and question edits go through this so that a question
    /// cannot be added to a game that another unit of work is starting.
    async fn lock_game(&mut self, game_id: GameId) -> QuizResult<Option<Game>>;

    /// Persist status changes
    async fn update_game(&mut self, game: &Game) -> QuizResult<()>;
}

#[trait_variant::make(QuestionRepository: Send)]
pub trait LocalQuestionRepository {
    /// `max(sort) + 1` within the game, 1 for the first question
    async fn next_question_sort(&mut self, game_id: GameId) -> QuizResult<i64>;

    /// Store a draft; the store numbers its answer options
    async fn insert_question(&mut self, draft: QuestionDraft) -> QuizResult<Question>;

    /// Every question of a game with options, highest `sort` first
    async fn questions_for_game(&mut self, game_id: GameId) -> QuizResult<Vec<Question>>;

    async fn find_question(
        &mut self,
        game_id: GameId,
        question_id: QuestionId,
    ) -> QuizResult<Option<Question>>;
}

#[trait_variant::make(PlayerRepository: Send)]
pub trait LocalPlayerRepository {
    async fn find_player(&mut self, player_id: PlayerId) -> QuizResult<Option<Player>>;

    /// Insert unless a player with this id already exists
    async fn insert_player(&mut self, player: &Player) -> QuizResult<()>;

    async fn update_player(&mut self, player: &Player) -> QuizResult<()>;
}

#[trait_variant::make(SessionRepository: Send)]
pub trait LocalSessionRepository {
    /// Fails with `SessionAlreadyExists` for a second (game, player) session
    async fn insert_session(&mut self, session: &Session) -> QuizResult<()>;

    /// Find and lock the session until the unit of work ends
    async fn find_session(
        &mut self,
        game_id: GameId,
        player_id: PlayerId,
    ) -> QuizResult<Option<Session>>;

    async fn update_session(&mut self, session: &Session) -> QuizResult<()>;

    /// Items in insertion order
    async fn session_items(&mut self, session_id: SessionId) -> QuizResult<Vec<SessionItem>>;

    /// Fails with `ConcurrentModification` when the session already has a
    /// pending item or already holds this question
    async fn insert_session_item(&mut self, item: &SessionItem) -> QuizResult<()>;

    /// Record an answer on a pending item; `AlreadyAnswered` if it was not pending
    async fn update_session_item(&mut self, item: &SessionItem) -> QuizResult<()>;

    async fn delete_session_items(&mut self, session_id: SessionId) -> QuizResult<u64>;

    /// Sessions of a game with player names and items, newest first
    async fn extended_sessions(
        &mut self,
        game_id: GameId,
        limit: u32,
        offset: u64,
    ) -> QuizResult<Vec<ExtendedSession>>;

    async fn session_counts(&mut self, game_id: GameId) -> QuizResult<SessionCounts>;
}

/// All repositories over one transaction
///
/// Dropping a unit of work without calling [`commit`](LocalUnitOfWork::commit)
/// discards every write made through it.
#[trait_variant::make(UnitOfWork: Send)]
pub trait LocalUnitOfWork:
    GameRepository + QuestionRepository + PlayerRepository + SessionRepository
{
    async fn commit(self) -> QuizResult<()>;
}

/// Opens units of work
#[trait_variant::make(TransactionManager: Send)]
pub trait LocalTransactionManager {
    type Tx: UnitOfWork + Send + 'static;

    async fn begin(&self) -> QuizResult<Self::Tx>;
}

//! In-Memory Store
//!
//! A unit of work holds the store lock for its whole lifetime and writes to a
//! private copy of the state. `commit` swaps the copy in; dropping the unit of
//! work throws it away. Units of work are therefore fully serialized, which is
//! the strongest isolation a real store can offer.

use std::cmp::Reverse;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use kernel::id::{GameId, PlayerId, QuestionId, SessionId};
use tokio::sync::{Mutex, OwnedMutexGuard};

use crate::domain::entity::{
    game::Game,
    player::Player,
    question::{Question, QuestionDraft},
    session::{ExtendedSession, Session, SessionItem},
};
use crate::domain::repository::{
    GameRepository, PlayerRepository, QuestionRepository, SessionCounts, SessionRepository,
    TransactionManager, UnitOfWork,
};
use crate::domain::value_object::answer_option_id::AnswerOptionId;
use crate::error::{QuizError, QuizResult};

#[derive(Debug, Clone, Default)]
pub(crate) struct MemoryState {
    pub(crate) games: HashMap<GameId, Game>,
    /// Insertion order
    pub(crate) questions: Vec<Question>,
    pub(crate) players: HashMap<PlayerId, Player>,
    pub(crate) sessions: Vec<Session>,
    pub(crate) items: Vec<SessionItem>,
    last_option_id: i64,
    /// Games read through `lock_game` by committed units of work
    #[cfg(test)]
    pub(crate) game_locks: Vec<GameId>,
}

#[derive(Debug, Clone, Default)]
pub struct InMemoryTransactionManager {
    state: Arc<Mutex<MemoryState>>,
    commit_delay: Option<Duration>,
}

impl InMemoryTransactionManager {
    pub fn new() -> Self {
        Self::default()
    }

    /// Every commit sleeps this long before applying its writes
    pub fn with_commit_delay(mut self, delay: Duration) -> Self {
        self.commit_delay = Some(delay);
        self
    }

    #[cfg(test)]
    pub(crate) async fn snapshot(&self) -> MemoryState {
        self.state.lock().await.clone()
    }
}

impl TransactionManager for InMemoryTransactionManager {
    type Tx = InMemoryUnitOfWork;

    async fn begin(&self) -> QuizResult<Self::Tx> {
        let guard = Arc::clone(&self.state).lock_owned().await;
        let working = guard.clone();
        Ok(InMemoryUnitOfWork {
            guard,
            working,
            commit_delay: self.commit_delay,
        })
    }
}

pub struct InMemoryUnitOfWork {
    guard: OwnedMutexGuard<MemoryState>,
    working: MemoryState,
    commit_delay: Option<Duration>,
}

impl UnitOfWork for InMemoryUnitOfWork {
    async fn commit(mut self) -> QuizResult<()> {
        if let Some(delay) = self.commit_delay {
            tokio::time::sleep(delay).await;
        }
        *self.guard = std::mem::take(&mut self.working);
        Ok(())
    }
}

impl GameRepository for InMemoryUnitOfWork {
    async fn insert_game(&mut self, game: &Game) -> QuizResult<()> {
        self.working.games.insert(game.id, game.clone());
        Ok(())
    }

    async fn find_game(&mut self, game_id: GameId) -> QuizResult<Option<Game>> {
        Ok(self.working.games.get(&game_id).cloned())
    }

    // The whole store is already locked for this unit of work.
    async fn lock_game(&mut self, game_id: GameId) -> QuizResult<Option<Game>> {
        #[cfg(test)]
        self.working.game_locks.push(game_id);
        Ok(self.working.games.get(&game_id).cloned())
    }

    async fn update_game(&mut self, game: &Game) -> QuizResult<()> {
        let stored = self
            .working
            .games
            .get_mut(&game.id)
            .ok_or(QuizError::GameNotFound)?;
        *stored = game.clone();
        Ok(())
    }
}

impl QuestionRepository for InMemoryUnitOfWork {
    async fn next_question_sort(&mut self, game_id: GameId) -> QuizResult<i64> {
        let max = self
            .working
            .questions
            .iter()
            .filter(|q| q.game_id == game_id)
            .map(|q| q.sort)
            .max();
        Ok(max.map_or(1, |s| s + 1))
    }

    async fn insert_question(&mut self, draft: QuestionDraft) -> QuizResult<Question> {
        let clash = self
            .working
            .questions
            .iter()
            .any(|q| q.game_id == draft.game_id && q.sort == draft.sort);
        if clash {
            return Err(QuizError::ConcurrentModification);
        }

        let option_ids: Vec<AnswerOptionId> = draft
            .answer_options
            .iter()
            .map(|_| {
                self.working.last_option_id += 1;
                AnswerOptionId::new(self.working.last_option_id)
            })
            .collect();
        let question = draft.into_question(&option_ids)?;
        self.working.questions.push(question.clone());
        Ok(question)
    }

    async fn questions_for_game(&mut self, game_id: GameId) -> QuizResult<Vec<Question>> {
        let mut questions: Vec<Question> = self
            .working
            .questions
            .iter()
            .filter(|q| q.game_id == game_id)
            .cloned()
            .collect();
        questions.sort_by_key(|q| Reverse(q.sort));
        Ok(questions)
    }

    async fn find_question(
        &mut self,
        game_id: GameId,
        question_id: QuestionId,
    ) -> QuizResult<Option<Question>> {
        Ok(self
            .working
            .questions
            .iter()
            .find(|q| q.game_id == game_id && q.id == question_id)
            .cloned())
    }
}

impl PlayerRepository for InMemoryUnitOfWork {
    async fn find_player(&mut self, player_id: PlayerId) -> QuizResult<Option<Player>> {
        Ok(self.working.players.get(&player_id).cloned())
    }

    async fn insert_player(&mut self, player: &Player) -> QuizResult<()> {
        self.working
            .players
            .entry(player.id)
            .or_insert_with(|| player.clone());
        Ok(())
    }

    async fn update_player(&mut self, player: &Player) -> QuizResult<()> {
        let stored = self
            .working
            .players
            .get_mut(&player.id)
            .ok_or(QuizError::PlayerNotFound)?;
        *stored = player.clone();
        Ok(())
    }
}

impl SessionRepository for InMemoryUnitOfWork {
    async fn insert_session(&mut self, session: &Session) -> QuizResult<()> {
        let exists = self
            .working
            .sessions
            .iter()
            .any(|s| s.game_id == session.game_id && s.player_id == session.player_id);
        if exists {
            return Err(QuizError::SessionAlreadyExists);
        }
        self.working.sessions.push(session.clone());
        Ok(())
    }

    async fn find_session(
        &mut self,
        game_id: GameId,
        player_id: PlayerId,
    ) -> QuizResult<Option<Session>> {
        Ok(self
            .working
            .sessions
            .iter()
            .find(|s| s.game_id == game_id && s.player_id == player_id)
            .cloned())
    }

    async fn update_session(&mut self, session: &Session) -> QuizResult<()> {
        let stored = self
            .working
            .sessions
            .iter_mut()
            .find(|s| s.id == session.id)
            .ok_or(QuizError::SessionNotFound)?;
        *stored = session.clone();
        Ok(())
    }

    async fn session_items(&mut self, session_id: SessionId) -> QuizResult<Vec<SessionItem>> {
        Ok(self
            .working
            .items
            .iter()
            .filter(|i| i.session_id == session_id)
            .cloned()
            .collect())
    }

    async fn insert_session_item(&mut self, item: &SessionItem) -> QuizResult<()> {
        let conflict = self.working.items.iter().any(|i| {
            i.session_id == item.session_id && (i.is_pending() || i.question_id == item.question_id)
        });
        if conflict {
            return Err(QuizError::ConcurrentModification);
        }
        self.working.items.push(item.clone());
        Ok(())
    }

    async fn update_session_item(&mut self, item: &SessionItem) -> QuizResult<()> {
        let stored = self
            .working
            .items
            .iter_mut()
            .find(|i| i.id == item.id)
            .ok_or(QuizError::SessionItemNotFound)?;
        if stored.is_answered() {
            return Err(QuizError::AlreadyAnswered);
        }
        *stored = item.clone();
        Ok(())
    }

    async fn delete_session_items(&mut self, session_id: SessionId) -> QuizResult<u64> {
        let before = self.working.items.len();
        self.working.items.retain(|i| i.session_id != session_id);
        Ok((before - self.working.items.len()) as u64)
    }

    async fn extended_sessions(
        &mut self,
        game_id: GameId,
        limit: u32,
        offset: u64,
    ) -> QuizResult<Vec<ExtendedSession>> {
        let mut sessions: Vec<(usize, &Session)> = self
            .working
            .sessions
            .iter()
            .enumerate()
            .filter(|(_, s)| s.game_id == game_id)
            .collect();
        // Newest first; later inserts win ties on the timestamp.
        sessions.sort_by_key(|(idx, s)| Reverse((s.created_at, *idx)));

        let page = sessions
            .into_iter()
            .skip(usize::try_from(offset).unwrap_or(usize::MAX))
            .take(limit as usize)
            .map(|(_, session)| ExtendedSession {
                session: session.clone(),
                player_name: self
                    .working
                    .players
                    .get(&session.player_id)
                    .map(|p| p.name.clone())
                    .unwrap_or_default(),
                items: self
                    .working
                    .items
                    .iter()
                    .filter(|i| i.session_id == session.id)
                    .cloned()
                    .collect(),
            })
            .collect();
        Ok(page)
    }

    async fn session_counts(&mut self, game_id: GameId) -> QuizResult<SessionCounts> {
        let (total, finished) = self
            .working
            .sessions
            .iter()
            .filter(|s| s.game_id == game_id)
            .fold((0, 0), |(total, finished), s| {
                (total + 1, finished + u64::from(s.is_finished()))
            });
        Ok(SessionCounts { total, finished })
    }
}

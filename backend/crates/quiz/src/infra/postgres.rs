//! PostgreSQL Repository Implementations
//!
//! One unit of work is one database transaction. `find_session` takes a row
//! lock, so concurrent requests for the same session queue up behind it.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use kernel::id::{GameId, PlayerId, QuestionId, SessionId, SessionItemId};
use sqlx::types::Json;
use sqlx::{PgPool, Postgres, Transaction};
use uuid::Uuid;

use crate::domain::entity::{
    game::Game,
    player::Player,
    question::{AnswerOption, Question, QuestionDraft},
    session::{ExtendedSession, Session, SessionItem},
};
use crate::domain::repository::{
    GameRepository, PlayerRepository, QuestionRepository, SessionCounts, SessionRepository,
    TransactionManager, UnitOfWork,
};
use crate::domain::value_object::{
    answer_option_id::AnswerOptionId, game_settings::GameSettings, game_status::GameStatus,
    game_type::GameType, question_type::QuestionType, session_status::SessionStatus,
};
use crate::error::{QuizError, QuizResult};

/// Opens one database transaction per unit of work
#[derive(Clone)]
pub struct PgTransactionManager {
    pool: PgPool,
}

impl PgTransactionManager {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

impl TransactionManager for PgTransactionManager {
    type Tx = PgUnitOfWork;

    async fn begin(&self) -> QuizResult<Self::Tx> {
        let tx = self.pool.begin().await?;
        Ok(PgUnitOfWork { tx })
    }
}

/// Rolled back by sqlx when dropped uncommitted
pub struct PgUnitOfWork {
    tx: Transaction<'static, Postgres>,
}

impl UnitOfWork for PgUnitOfWork {
    async fn commit(self) -> QuizResult<()> {
        self.tx.commit().await?;
        Ok(())
    }
}

fn is_unique_violation(err: &sqlx::Error) -> bool {
    err.as_database_error()
        .is_some_and(|db| db.is_unique_violation())
}

impl GameRepository for PgUnitOfWork {
    async fn insert_game(&mut self, game: &Game) -> QuizResult<()> {
        sqlx::query(
            r#"
            INSERT INTO game (
                game_id,
                title,
                status,
                game_type,
                is_private,
                shuffle_questions,
                shuffle_answers,
                show_right_answers,
                input_custom_name,
                created_at
            ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
            "#,
        )
        .bind(game.id.into_uuid())
        .bind(game.title.as_deref())
        .bind(game.status.code())
        .bind(game.game_type.code())
        .bind(game.settings.is_private)
        .bind(game.settings.shuffle_questions)
        .bind(game.settings.shuffle_answers)
        .bind(game.settings.show_right_answers)
        .bind(game.settings.input_custom_name)
        .bind(game.created_at)
        .execute(&mut *self.tx)
        .await?;

        Ok(())
    }

    async fn find_game(&mut self, game_id: GameId) -> QuizResult<Option<Game>> {
        self.fetch_game(SELECT_GAME, game_id).await
    }

    async fn lock_game(&mut self, game_id: GameId) -> QuizResult<Option<Game>> {
        self.fetch_game(LOCK_GAME, game_id).await
    }

    async fn update_game(&mut self, game: &Game) -> QuizResult<()> {
        let affected = sqlx::query("UPDATE game SET status = $2 WHERE game_id = $1")
            .bind(game.id.into_uuid())
            .bind(game.status.code())
            .execute(&mut *self.tx)
            .await?
            .rows_affected();

        if affected == 0 {
            return Err(QuizError::GameNotFound);
        }
        Ok(())
    }
}

const SELECT_GAME: &str = r#"
    SELECT
        game_id,
        title,
        status,
        game_type,
        is_private,
        shuffle_questions,
        shuffle_answers,
        show_right_answers,
        input_custom_name,
        created_at
    FROM game
    WHERE game_id = $1
"#;

const LOCK_GAME: &str = r#"
    SELECT
        game_id,
        title,
        status,
        game_type,
        is_private,
        shuffle_questions,
        shuffle_answers,
        show_right_answers,
        input_custom_name,
        created_at
    FROM game
    WHERE game_id = $1
    FOR UPDATE
"#;

impl PgUnitOfWork {
    async fn fetch_game(&mut self, sql: &'static str, game_id: GameId) -> QuizResult<Option<Game>> {
        let row = sqlx::query_as::<_, GameRow>(sql)
            .bind(game_id.into_uuid())
            .fetch_optional(&mut *self.tx)
            .await?;

        row.map(GameRow::into_game).transpose()
    }
}

impl QuestionRepository for PgUnitOfWork {
    async fn next_question_sort(&mut self, game_id: GameId) -> QuizResult<i64> {
        let next = sqlx::query_scalar::<_, i64>(
            "SELECT COALESCE(MAX(sort), 0) + 1 FROM question WHERE game_id = $1",
        )
        .bind(game_id.into_uuid())
        .fetch_one(&mut *self.tx)
        .await?;

        Ok(next)
    }

    async fn insert_question(&mut self, draft: QuestionDraft) -> QuizResult<Question> {
        let inserted = sqlx::query(
            r#"
            INSERT INTO question (
                question_id,
                game_id,
                text,
                question_type,
                image_id,
                sort,
                created_at
            ) VALUES ($1, $2, $3, $4, $5, $6, $7)
            "#,
        )
        .bind(draft.id.into_uuid())
        .bind(draft.game_id.into_uuid())
        .bind(&draft.text)
        .bind(draft.question_type.code())
        .bind(draft.image_id.as_deref())
        .bind(draft.sort)
        .bind(draft.created_at)
        .execute(&mut *self.tx)
        .await;

        if let Err(err) = inserted {
            if is_unique_violation(&err) {
                tracing::warn!(game_id = %draft.game_id, sort = draft.sort, "Question sort taken");
                return Err(QuizError::ConcurrentModification);
            }
            return Err(err.into());
        }

        let mut option_ids = Vec::with_capacity(draft.answer_options.len());
        for (position, option) in draft.answer_options.iter().enumerate() {
            let id = sqlx::query_scalar::<_, i64>(
                r#"
                INSERT INTO question_answer_option (
                    question_id,
                    position,
                    text,
                    is_correct,
                    next_question_id
                ) VALUES ($1, $2, $3, $4, $5)
                RETURNING answer_option_id
                "#,
            )
            .bind(draft.id.into_uuid())
            .bind(position as i32)
            .bind(&option.text)
            .bind(option.is_correct)
            .bind(option.next_question_id.map(QuestionId::into_uuid))
            .fetch_one(&mut *self.tx)
            .await?;
            option_ids.push(AnswerOptionId::new(id));
        }

        draft.into_question(&option_ids)
    }

    async fn questions_for_game(&mut self, game_id: GameId) -> QuizResult<Vec<Question>> {
        let rows = sqlx::query_as::<_, QuestionRow>(
            r#"
            SELECT
                question_id,
                game_id,
                text,
                question_type,
                image_id,
                sort,
                created_at
            FROM question
            WHERE game_id = $1
            ORDER BY sort DESC
            "#,
        )
        .bind(game_id.into_uuid())
        .fetch_all(&mut *self.tx)
        .await?;

        let ids: Vec<Uuid> = rows.iter().map(|r| r.question_id).collect();
        let mut options = self.options_for(&ids).await?;

        rows.into_iter()
            .map(|r| {
                let opts = options.remove(&r.question_id).unwrap_or_default();
                r.into_question(opts)
            })
            .collect()
    }

    async fn find_question(
        &mut self,
        game_id: GameId,
        question_id: QuestionId,
    ) -> QuizResult<Option<Question>> {
        let row = sqlx::query_as::<_, QuestionRow>(
            r#"
            SELECT
                question_id,
                game_id,
                text,
                question_type,
                image_id,
                sort,
                created_at
            FROM question
            WHERE game_id = $1 AND question_id = $2
            "#,
        )
        .bind(game_id.into_uuid())
        .bind(question_id.into_uuid())
        .fetch_optional(&mut *self.tx)
        .await?;

        let Some(row) = row else {
            return Ok(None);
        };
        let mut options = self.options_for(&[row.question_id]).await?;
        let opts = options.remove(&row.question_id).unwrap_or_default();
        row.into_question(opts).map(Some)
    }
}

impl PgUnitOfWork {
    /// Options of the given questions, grouped by question, in authored order
    async fn options_for(
        &mut self,
        question_ids: &[Uuid],
    ) -> QuizResult<HashMap<Uuid, Vec<AnswerOption>>> {
        if question_ids.is_empty() {
            return Ok(HashMap::new());
        }

        let rows = sqlx::query_as::<_, AnswerOptionRow>(
            r#"
            SELECT
                answer_option_id,
                question_id,
                text,
                is_correct,
                next_question_id
            FROM question_answer_option
            WHERE question_id = ANY($1)
            ORDER BY question_id, position
            "#,
        )
        .bind(question_ids)
        .fetch_all(&mut *self.tx)
        .await?;

        let mut grouped: HashMap<Uuid, Vec<AnswerOption>> = HashMap::new();
        for row in rows {
            grouped
                .entry(row.question_id)
                .or_default()
                .push(row.into_option());
        }
        Ok(grouped)
    }

    async fn items_for(
        &mut self,
        session_ids: &[Uuid],
    ) -> QuizResult<HashMap<Uuid, Vec<SessionItem>>> {
        if session_ids.is_empty() {
            return Ok(HashMap::new());
        }

        let rows = sqlx::query_as::<_, SessionItemRow>(
            r#"
            SELECT
                session_item_id,
                session_id,
                question_id,
                answers,
                is_correct,
                answered_at,
                created_at
            FROM player_session_item
            WHERE session_id = ANY($1)
            ORDER BY seq
            "#,
        )
        .bind(session_ids)
        .fetch_all(&mut *self.tx)
        .await?;

        let mut grouped: HashMap<Uuid, Vec<SessionItem>> = HashMap::new();
        for row in rows {
            grouped
                .entry(row.session_id)
                .or_default()
                .push(row.into_item());
        }
        Ok(grouped)
    }
}

impl PlayerRepository for PgUnitOfWork {
    async fn find_player(&mut self, player_id: PlayerId) -> QuizResult<Option<Player>> {
        let row = sqlx::query_as::<_, PlayerRow>(
            r#"
            SELECT player_id, name, name_user_entered, created_at
            FROM player
            WHERE player_id = $1
            "#,
        )
        .bind(player_id.into_uuid())
        .fetch_optional(&mut *self.tx)
        .await?;

        Ok(row.map(PlayerRow::into_player))
    }

    async fn insert_player(&mut self, player: &Player) -> QuizResult<()> {
        sqlx::query(
            r#"
            INSERT INTO player (player_id, name, name_user_entered, created_at)
            VALUES ($1, $2, $3, $4)
            ON CONFLICT (player_id) DO NOTHING
            "#,
        )
        .bind(player.id.into_uuid())
        .bind(&player.name)
        .bind(player.name_user_entered)
        .bind(player.created_at)
        .execute(&mut *self.tx)
        .await?;

        Ok(())
    }

    async fn update_player(&mut self, player: &Player) -> QuizResult<()> {
        let affected = sqlx::query(
            "UPDATE player SET name = $2, name_user_entered = $3 WHERE player_id = $1",
        )
        .bind(player.id.into_uuid())
        .bind(&player.name)
        .bind(player.name_user_entered)
        .execute(&mut *self.tx)
        .await?
        .rows_affected();

        if affected == 0 {
            return Err(QuizError::PlayerNotFound);
        }
        Ok(())
    }
}

impl SessionRepository for PgUnitOfWork {
    async fn insert_session(&mut self, session: &Session) -> QuizResult<()> {
        let inserted = sqlx::query(
            r#"
            INSERT INTO player_session (session_id, game_id, player_id, status, created_at)
            VALUES ($1, $2, $3, $4, $5)
            "#,
        )
        .bind(session.id.into_uuid())
        .bind(session.game_id.into_uuid())
        .bind(session.player_id.into_uuid())
        .bind(session.status.code())
        .bind(session.created_at)
        .execute(&mut *self.tx)
        .await;

        match inserted {
            Ok(_) => Ok(()),
            Err(err) if is_unique_violation(&err) => Err(QuizError::SessionAlreadyExists),
            Err(err) => Err(err.into()),
        }
    }

    async fn find_session(
        &mut self,
        game_id: GameId,
        player_id: PlayerId,
    ) -> QuizResult<Option<Session>> {
        let row = sqlx::query_as::<_, SessionRow>(
            r#"
            SELECT session_id, game_id, player_id, status, created_at
            FROM player_session
            WHERE game_id = $1 AND player_id = $2
            FOR UPDATE
            "#,
        )
        .bind(game_id.into_uuid())
        .bind(player_id.into_uuid())
        .fetch_optional(&mut *self.tx)
        .await?;

        row.map(SessionRow::into_session).transpose()
    }

    async fn update_session(&mut self, session: &Session) -> QuizResult<()> {
        let affected = sqlx::query("UPDATE player_session SET status = $2 WHERE session_id = $1")
            .bind(session.id.into_uuid())
            .bind(session.status.code())
            .execute(&mut *self.tx)
            .await?
            .rows_affected();

        if affected == 0 {
            return Err(QuizError::SessionNotFound);
        }
        Ok(())
    }

    async fn session_items(&mut self, session_id: SessionId) -> QuizResult<Vec<SessionItem>> {
        let id = session_id.into_uuid();
        let mut items = self.items_for(&[id]).await?;
        Ok(items.remove(&id).unwrap_or_default())
    }

    async fn insert_session_item(&mut self, item: &SessionItem) -> QuizResult<()> {
        let inserted = sqlx::query(
            r#"
            INSERT INTO player_session_item (
                session_item_id,
                session_id,
                question_id,
                answers,
                is_correct,
                answered_at,
                created_at
            ) VALUES ($1, $2, $3, $4, $5, $6, $7)
            "#,
        )
        .bind(item.id.into_uuid())
        .bind(item.session_id.into_uuid())
        .bind(item.question_id.into_uuid())
        .bind(Json(&item.answers))
        .bind(item.is_correct)
        .bind(item.answered_at)
        .bind(item.created_at)
        .execute(&mut *self.tx)
        .await;

        match inserted {
            Ok(_) => Ok(()),
            Err(err) if is_unique_violation(&err) => {
                tracing::warn!(session_id = %item.session_id, "Pending item already recorded");
                Err(QuizError::ConcurrentModification)
            }
            Err(err) => Err(err.into()),
        }
    }

    async fn update_session_item(&mut self, item: &SessionItem) -> QuizResult<()> {
        let affected = sqlx::query(
            r#"
            UPDATE player_session_item
            SET answers = $2, is_correct = $3, answered_at = $4
            WHERE session_item_id = $1 AND answered_at IS NULL
            "#,
        )
        .bind(item.id.into_uuid())
        .bind(Json(&item.answers))
        .bind(item.is_correct)
        .bind(item.answered_at)
        .execute(&mut *self.tx)
        .await?
        .rows_affected();

        if affected == 0 {
            return Err(QuizError::AlreadyAnswered);
        }
        Ok(())
    }

    async fn delete_session_items(&mut self, session_id: SessionId) -> QuizResult<u64> {
        let deleted = sqlx::query("DELETE FROM player_session_item WHERE session_id = $1")
            .bind(session_id.into_uuid())
            .execute(&mut *self.tx)
            .await?
            .rows_affected();

        Ok(deleted)
    }

    async fn extended_sessions(
        &mut self,
        game_id: GameId,
        limit: u32,
        offset: u64,
    ) -> QuizResult<Vec<ExtendedSession>> {
        let rows = sqlx::query_as::<_, ExtendedSessionRow>(
            r#"
            SELECT
                s.session_id,
                s.game_id,
                s.player_id,
                s.status,
                s.created_at,
                p.name AS player_name
            FROM player_session s
            JOIN player p ON p.player_id = s.player_id
            WHERE s.game_id = $1
            ORDER BY s.created_at DESC
            LIMIT $2 OFFSET $3
            "#,
        )
        .bind(game_id.into_uuid())
        .bind(i64::from(limit))
        .bind(i64::try_from(offset).unwrap_or(i64::MAX))
        .fetch_all(&mut *self.tx)
        .await?;

        let ids: Vec<Uuid> = rows.iter().map(|r| r.session.session_id).collect();
        let mut items = self.items_for(&ids).await?;

        rows.into_iter()
            .map(|r| {
                let session_items = items.remove(&r.session.session_id).unwrap_or_default();
                Ok(ExtendedSession {
                    session: r.session.into_session()?,
                    player_name: r.player_name,
                    items: session_items,
                })
            })
            .collect()
    }

    async fn session_counts(&mut self, game_id: GameId) -> QuizResult<SessionCounts> {
        let (total, finished) = sqlx::query_as::<_, (i64, i64)>(
            r#"
            SELECT
                COUNT(*),
                COUNT(*) FILTER (WHERE status = 'finished')
            FROM player_session
            WHERE game_id = $1
            "#,
        )
        .bind(game_id.into_uuid())
        .fetch_one(&mut *self.tx)
        .await?;

        Ok(SessionCounts {
            total: total as u64,
            finished: finished as u64,
        })
    }
}

// Row types for sqlx mapping

fn unknown_code(what: &str, code: &str) -> QuizError {
    QuizError::Internal(format!("unknown {what} '{code}' in store"))
}

#[derive(sqlx::FromRow)]
struct GameRow {
    game_id: Uuid,
    title: Option<String>,
    status: String,
    game_type: String,
    is_private: bool,
    shuffle_questions: bool,
    shuffle_answers: bool,
    show_right_answers: bool,
    input_custom_name: bool,
    created_at: DateTime<Utc>,
}

impl GameRow {
    fn into_game(self) -> QuizResult<Game> {
        Ok(Game {
            id: GameId::from_uuid(self.game_id),
            title: self.title,
            status: GameStatus::from_code(&self.status)
                .ok_or_else(|| unknown_code("game status", &self.status))?,
            game_type: GameType::from_code(&self.game_type)
                .ok_or_else(|| unknown_code("game type", &self.game_type))?,
            settings: GameSettings {
                is_private: self.is_private,
                shuffle_questions: self.shuffle_questions,
                shuffle_answers: self.shuffle_answers,
                show_right_answers: self.show_right_answers,
                input_custom_name: self.input_custom_name,
            },
            created_at: self.created_at,
        })
    }
}

#[derive(sqlx::FromRow)]
struct QuestionRow {
    question_id: Uuid,
    game_id: Uuid,
    text: String,
    question_type: String,
    image_id: Option<String>,
    sort: i64,
    created_at: DateTime<Utc>,
}

impl QuestionRow {
    fn into_question(self, answer_options: Vec<AnswerOption>) -> QuizResult<Question> {
        Ok(Question {
            id: QuestionId::from_uuid(self.question_id),
            game_id: GameId::from_uuid(self.game_id),
            text: self.text,
            question_type: self.question_type.parse::<QuestionType>()?,
            image_id: self.image_id,
            sort: self.sort,
            answer_options,
            created_at: self.created_at,
        })
    }
}

#[derive(sqlx::FromRow)]
struct AnswerOptionRow {
    answer_option_id: i64,
    question_id: Uuid,
    text: String,
    is_correct: bool,
    next_question_id: Option<Uuid>,
}

impl AnswerOptionRow {
    fn into_option(self) -> AnswerOption {
        AnswerOption {
            id: AnswerOptionId::new(self.answer_option_id),
            text: self.text,
            is_correct: self.is_correct,
            next_question_id: self.next_question_id.map(QuestionId::from_uuid),
        }
    }
}

#[derive(sqlx::FromRow)]
struct PlayerRow {
    player_id: Uuid,
    name: String,
    name_user_entered: bool,
    created_at: DateTime<Utc>,
}

impl PlayerRow {
    fn into_player(self) -> Player {
        Player {
            id: PlayerId::from_uuid(self.player_id),
            name: self.name,
            name_user_entered: self.name_user_entered,
            created_at: self.created_at,
        }
    }
}

#[derive(sqlx::FromRow)]
struct SessionRow {
    session_id: Uuid,
    game_id: Uuid,
    player_id: Uuid,
    status: String,
    created_at: DateTime<Utc>,
}

impl SessionRow {
    fn into_session(self) -> QuizResult<Session> {
        Ok(Session {
            id: SessionId::from_uuid(self.session_id),
            game_id: GameId::from_uuid(self.game_id),
            player_id: PlayerId::from_uuid(self.player_id),
            status: SessionStatus::from_code(&self.status)
                .ok_or_else(|| unknown_code("session status", &self.status))?,
            created_at: self.created_at,
        })
    }
}

#[derive(sqlx::FromRow)]
struct ExtendedSessionRow {
    #[sqlx(flatten)]
    session: SessionRow,
    player_name: String,
}

#[derive(sqlx::FromRow)]
struct SessionItemRow {
    session_item_id: Uuid,
    session_id: Uuid,
    question_id: Uuid,
    answers: Json<Vec<String>>,
    is_correct: Option<bool>,
    answered_at: Option<DateTime<Utc>>,
    created_at: DateTime<Utc>,
}

impl SessionItemRow {
    fn into_item(self) -> SessionItem {
        SessionItem {
            id: SessionItemId::from_uuid(self.session_item_id),
            session_id: SessionId::from_uuid(self.session_id),
            question_id: QuestionId::from_uuid(self.question_id),
            answers: self.answers.0,
            is_correct: self.is_correct,
            answered_at: self.answered_at,
            created_at: self.created_at,
        }
    }
}

//! HTTP Handlers

use std::sync::Arc;

use axum::Json;
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use kernel::id::{GameId, PlayerId, QuestionId};
use uuid::Uuid;

use crate::application::accept_answers::{AcceptAnswersInput, AcceptAnswersUseCase};
use crate::application::config::QuizConfig;
use crate::application::finish_session::FinishSessionUseCase;
use crate::application::get_current_state::{GetCurrentStateUseCase, SessionState};
use crate::application::list_sessions::{ListSessionsUseCase, PageRequest};
use crate::application::manage_game::{AddQuestionInput, CreateGameInput, GameUseCase};
use crate::application::rename_player::RenamePlayerUseCase;
use crate::application::restart_session::RestartSessionUseCase;
use crate::application::session_statistics::SessionStatisticsUseCase;
use crate::application::start_session::StartSessionUseCase;
use crate::domain::entity::question::NewAnswerOption;
use crate::domain::repository::TransactionManager;
use crate::error::{QuizError, QuizResult};
use crate::presentation::dto::{
    AcceptAnswersRequest, AcceptAnswersResponse, AddQuestionRequest, AuthorQuestionView,
    CreateGameRequest, ExtendedSessionsResponse, GameDetailsResponse, GameResponse,
    GameStatisticsResponse, PlayerResponse, RenamePlayerRequest, SessionStateResponse,
    SessionStatisticsResponse, SessionsQuery,
};

/// Shared state for quiz handlers
#[derive(Clone)]
pub struct QuizAppState<T>
where
    T: TransactionManager + Clone + Send + Sync + 'static,
{
    pub tx_manager: Arc<T>,
    pub config: Arc<QuizConfig>,
}

impl<T> QuizAppState<T>
where
    T: TransactionManager + Clone + Send + Sync + 'static,
{
    fn games(&self) -> GameUseCase<T> {
        GameUseCase::new(self.tx_manager.clone(), self.config.clone())
    }
}

// ---------------------------------------------------------------------------
// Author side
// ---------------------------------------------------------------------------

/// POST /api/games
pub async fn create_game<T>(
    State(state): State<QuizAppState<T>>,
    Json(req): Json<CreateGameRequest>,
) -> QuizResult<impl IntoResponse>
where
    T: TransactionManager + Clone + Send + Sync + 'static,
{
    let game = state
        .games()
        .create(CreateGameInput {
            title: req.title,
            settings: req.settings,
        })
        .await?;

    Ok((StatusCode::CREATED, Json(GameResponse::from(&game))))
}

/// GET /api/games/{game_id}
pub async fn get_game<T>(
    State(state): State<QuizAppState<T>>,
    Path(game_id): Path<Uuid>,
) -> QuizResult<Json<GameDetailsResponse>>
where
    T: TransactionManager + Clone + Send + Sync + 'static,
{
    let details = state.games().get(GameId::from_uuid(game_id)).await?;
    Ok(Json(GameDetailsResponse::from(&details)))
}

/// POST /api/games/{game_id}/questions
pub async fn add_question<T>(
    State(state): State<QuizAppState<T>>,
    Path(game_id): Path<Uuid>,
    Json(req): Json<AddQuestionRequest>,
) -> QuizResult<impl IntoResponse>
where
    T: TransactionManager + Clone + Send + Sync + 'static,
{
    let input = AddQuestionInput {
        text: req.text,
        question_type: req.question_type.parse()?,
        image_id: req.image_id,
        answer_options: req
            .answer_options
            .into_iter()
            .map(|o| NewAnswerOption {
                text: o.text,
                is_correct: o.is_correct,
                next_question_id: o.next_question_id.map(QuestionId::from_uuid),
            })
            .collect(),
    };

    let question = state
        .games()
        .add_question(GameId::from_uuid(game_id), input)
        .await?;

    Ok((StatusCode::CREATED, Json(AuthorQuestionView::from(&question))))
}

/// POST /api/games/{game_id}/start
pub async fn start_game<T>(
    State(state): State<QuizAppState<T>>,
    Path(game_id): Path<Uuid>,
) -> QuizResult<Json<GameResponse>>
where
    T: TransactionManager + Clone + Send + Sync + 'static,
{
    let game = state.games().start(GameId::from_uuid(game_id)).await?;
    Ok(Json(GameResponse::from(&game)))
}

/// POST /api/games/{game_id}/finish
pub async fn finish_game<T>(
    State(state): State<QuizAppState<T>>,
    Path(game_id): Path<Uuid>,
) -> QuizResult<Json<GameResponse>>
where
    T: TransactionManager + Clone + Send + Sync + 'static,
{
    let game = state.games().finish(GameId::from_uuid(game_id)).await?;
    Ok(Json(GameResponse::from(&game)))
}

/// GET /api/games/{game_id}/statistics
pub async fn game_statistics<T>(
    State(state): State<QuizAppState<T>>,
    Path(game_id): Path<Uuid>,
) -> QuizResult<Json<GameStatisticsResponse>>
where
    T: TransactionManager + Clone + Send + Sync + 'static,
{
    let stats = state.games().statistics(GameId::from_uuid(game_id)).await?;
    Ok(Json(stats.into()))
}

/// GET /api/games/{game_id}/sessions?page&limit
pub async fn list_sessions<T>(
    State(state): State<QuizAppState<T>>,
    Path(game_id): Path<Uuid>,
    Query(query): Query<SessionsQuery>,
) -> QuizResult<Json<ExtendedSessionsResponse>>
where
    T: TransactionManager + Clone + Send + Sync + 'static,
{
    let use_case = ListSessionsUseCase::new(state.tx_manager.clone(), state.config.clone());
    let page = use_case
        .execute(
            GameId::from_uuid(game_id),
            PageRequest {
                page: query.page,
                limit: query.limit,
            },
        )
        .await?;

    Ok(Json(ExtendedSessionsResponse::from(&page)))
}

// ---------------------------------------------------------------------------
// Player side
// ---------------------------------------------------------------------------

/// POST /api/games/{game_id}/players/{player_id}/session
pub async fn start_session<T>(
    State(state): State<QuizAppState<T>>,
    Path((game_id, player_id)): Path<(Uuid, Uuid)>,
) -> QuizResult<StatusCode>
where
    T: TransactionManager + Clone + Send + Sync + 'static,
{
    let use_case = StartSessionUseCase::new(state.tx_manager.clone(), state.config.clone());
    use_case
        .execute(GameId::from_uuid(game_id), PlayerId::from_uuid(player_id))
        .await?;

    Ok(StatusCode::CREATED)
}

/// GET /api/games/{game_id}/players/{player_id}/session
///
/// Starts the session on first visit and finishes it once no question is
/// left, so players only ever need this one call to progress.
pub async fn current_state<T>(
    State(state): State<QuizAppState<T>>,
    Path((game_id, player_id)): Path<(Uuid, Uuid)>,
) -> QuizResult<Json<SessionStateResponse>>
where
    T: TransactionManager + Clone + Send + Sync + 'static,
{
    let game_id = GameId::from_uuid(game_id);
    let player_id = PlayerId::from_uuid(player_id);
    let use_case = GetCurrentStateUseCase::new(state.tx_manager.clone(), state.config.clone());

    let current = match use_case.execute(game_id, player_id).await {
        Err(QuizError::SessionNotFound) => {
            let start = StartSessionUseCase::new(state.tx_manager.clone(), state.config.clone());
            match start.execute(game_id, player_id).await {
                // Lost the race to a parallel first visit.
                Ok(()) | Err(QuizError::SessionAlreadyExists) => {}
                Err(err) => return Err(err),
            }
            use_case.execute(game_id, player_id).await
        }
        other => other,
    };

    let current: SessionState = match current {
        Err(QuizError::QuestionQueueEmpty) => {
            let finish = FinishSessionUseCase::new(state.tx_manager.clone(), state.config.clone());
            finish.execute(game_id, player_id).await?;
            use_case.execute(game_id, player_id).await?
        }
        other => other?,
    };

    Ok(Json(SessionStateResponse::from(&current)))
}

/// POST /api/games/{game_id}/players/{player_id}/session/answers
pub async fn accept_answers<T>(
    State(state): State<QuizAppState<T>>,
    Path((game_id, player_id)): Path<(Uuid, Uuid)>,
    Json(req): Json<AcceptAnswersRequest>,
) -> QuizResult<Json<AcceptAnswersResponse>>
where
    T: TransactionManager + Clone + Send + Sync + 'static,
{
    let use_case = AcceptAnswersUseCase::new(state.tx_manager.clone(), state.config.clone());
    let output = use_case
        .execute(AcceptAnswersInput {
            game_id: GameId::from_uuid(game_id),
            player_id: PlayerId::from_uuid(player_id),
            question_id: QuestionId::from_uuid(req.question_id),
            answers: req.answers,
        })
        .await?;

    Ok(Json(AcceptAnswersResponse::from(&output)))
}

/// POST /api/games/{game_id}/players/{player_id}/session/finish
pub async fn finish_session<T>(
    State(state): State<QuizAppState<T>>,
    Path((game_id, player_id)): Path<(Uuid, Uuid)>,
) -> QuizResult<StatusCode>
where
    T: TransactionManager + Clone + Send + Sync + 'static,
{
    let use_case = FinishSessionUseCase::new(state.tx_manager.clone(), state.config.clone());
    use_case
        .execute(GameId::from_uuid(game_id), PlayerId::from_uuid(player_id))
        .await?;

    Ok(StatusCode::NO_CONTENT)
}

/// POST /api/games/{game_id}/players/{player_id}/session/restart
pub async fn restart_session<T>(
    State(state): State<QuizAppState<T>>,
    Path((game_id, player_id)): Path<(Uuid, Uuid)>,
) -> QuizResult<StatusCode>
where
    T: TransactionManager + Clone + Send + Sync + 'static,
{
    let use_case = RestartSessionUseCase::new(state.tx_manager.clone(), state.config.clone());
    use_case
        .execute(GameId::from_uuid(game_id), PlayerId::from_uuid(player_id))
        .await?;

    Ok(StatusCode::NO_CONTENT)
}

/// GET /api/games/{game_id}/players/{player_id}/session/statistics
pub async fn session_statistics<T>(
    State(state): State<QuizAppState<T>>,
    Path((game_id, player_id)): Path<(Uuid, Uuid)>,
) -> QuizResult<Json<SessionStatisticsResponse>>
where
    T: TransactionManager + Clone + Send + Sync + 'static,
{
    let use_case = SessionStatisticsUseCase::new(state.tx_manager.clone(), state.config.clone());
    let stats = use_case
        .execute(GameId::from_uuid(game_id), PlayerId::from_uuid(player_id))
        .await?;

    Ok(Json(stats.into()))
}

/// PUT /api/players/{player_id}/name
pub async fn rename_player<T>(
    State(state): State<QuizAppState<T>>,
    Path(player_id): Path<Uuid>,
    Json(req): Json<RenamePlayerRequest>,
) -> QuizResult<Json<PlayerResponse>>
where
    T: TransactionManager + Clone + Send + Sync + 'static,
{
    let use_case = RenamePlayerUseCase::new(state.tx_manager.clone(), state.config.clone());
    let player = use_case
        .execute(PlayerId::from_uuid(player_id), req.name)
        .await?;

    Ok(Json(PlayerResponse::from(&player)))
}

//! Quiz Router

use std::sync::Arc;

use axum::{
    Router,
    routing::{get, post, put},
};

use crate::application::config::QuizConfig;
use crate::domain::repository::TransactionManager;
use crate::infra::postgres::PgTransactionManager;
use crate::presentation::handlers::{self, QuizAppState};

/// Create the quiz router over PostgreSQL
pub fn quiz_router(tx_manager: PgTransactionManager, config: QuizConfig) -> Router {
    quiz_router_generic(tx_manager, config)
}

/// Create the quiz router for any store implementation
pub fn quiz_router_generic<T>(tx_manager: T, config: QuizConfig) -> Router
where
    T: TransactionManager + Clone + Send + Sync + 'static,
{
    let state = QuizAppState {
        tx_manager: Arc::new(tx_manager),
        config: Arc::new(config),
    };

    Router::new()
        .route("/games", post(handlers::create_game::<T>))
        .route("/games/{game_id}", get(handlers::get_game::<T>))
        .route(
            "/games/{game_id}/questions",
            post(handlers::add_question::<T>),
        )
        .route("/games/{game_id}/start", post(handlers::start_game::<T>))
        .route("/games/{game_id}/finish", post(handlers::finish_game::<T>))
        .route(
            "/games/{game_id}/statistics",
            get(handlers::game_statistics::<T>),
        )
        .route(
            "/games/{game_id}/sessions",
            get(handlers::list_sessions::<T>),
        )
        .route(
            "/games/{game_id}/players/{player_id}/session",
            post(handlers::start_session::<T>).get(handlers::current_state::<T>),
        )
        .route(
            "/games/{game_id}/players/{player_id}/session/answers",
            post(handlers::accept_answers::<T>),
        )
        .route(
            "/games/{game_id}/players/{player_id}/session/finish",
            post(handlers::finish_session::<T>),
        )
        .route(
            "/games/{game_id}/players/{player_id}/session/restart",
            post(handlers::restart_session::<T>),
        )
        .route(
            "/games/{game_id}/players/{player_id}/session/statistics",
            get(handlers::session_statistics::<T>),
        )
        .route(
            "/players/{player_id}/name",
            put(handlers::rename_player::<T>),
        )
        .with_state(state)
}

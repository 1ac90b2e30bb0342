//! Quiz Error Types
//!
//! Engine-specific error variants that integrate with the unified
//! `kernel::error::AppError` system.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use kernel::error::{app_error::AppError, kind::ErrorKind};
use thiserror::Error;

use crate::domain::service::question_graph::GraphError;

pub type QuizResult<T> = Result<T, QuizError>;

#[derive(Debug, Error)]
pub enum QuizError {
    #[error("Game not found")]
    GameNotFound,

    /// Game exists but is not in `started`
    #[error("Game is not active")]
    GameNotActive,

    /// Questions can only be added while the game is `created`
    #[error("Game can no longer be edited")]
    GameNotEditable,

    #[error("Game cannot move from {from} to {to}")]
    InvalidGameTransition {
        from: &'static str,
        to: &'static str,
    },

    #[error("Game has no questions")]
    GameHasNoQuestions,

    #[error("Question must have at least one answer option")]
    EmptyAnswerOptions,

    #[error("Invalid question graph: {0}")]
    InvalidGraph(#[from] GraphError),

    #[error("Session not found")]
    SessionNotFound,

    #[error("Session is not active")]
    SessionNotActive,

    #[error("Session already exists")]
    SessionAlreadyExists,

    #[error("Question was not presented in this session")]
    SessionItemNotFound,

    #[error("Question is already answered")]
    AlreadyAnswered,

    #[error("Question not found")]
    QuestionNotFound,

    /// No question left to present; the caller finishes the session
    #[error("Question queue is empty")]
    QuestionQueueEmpty,

    #[error("Player not found")]
    PlayerNotFound,

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Unsupported question type: {0}")]
    UnsupportedQuestionType(String),

    /// A concurrent request for the same session won; retrying is safe
    #[error("Concurrent modification, retry the request")]
    ConcurrentModification,

    #[error("Operation timed out")]
    Timeout,

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl QuizError {
    pub fn status_code(&self) -> StatusCode {
        StatusCode::from_u16(self.kind().status_code())
            .unwrap_or(StatusCode::INTERNAL_SERVER_ERROR)
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            QuizError::GameNotFound
            | QuizError::SessionNotFound
            | QuizError::SessionItemNotFound
            | QuizError::QuestionNotFound
            | QuizError::PlayerNotFound => ErrorKind::NotFound,
            QuizError::GameNotActive
            | QuizError::GameNotEditable
            | QuizError::InvalidGameTransition { .. }
            | QuizError::SessionNotActive
            | QuizError::SessionAlreadyExists
            | QuizError::AlreadyAnswered
            | QuizError::ConcurrentModification => ErrorKind::Conflict,
            QuizError::QuestionQueueEmpty => ErrorKind::Gone,
            QuizError::GameHasNoQuestions
            | QuizError::EmptyAnswerOptions
            | QuizError::InvalidGraph(_)
            | QuizError::UnsupportedQuestionType(_) => ErrorKind::UnprocessableEntity,
            QuizError::InvalidInput(_) => ErrorKind::BadRequest,
            QuizError::Timeout => ErrorKind::RequestTimeout,
            QuizError::Database(_) | QuizError::Internal(_) => ErrorKind::InternalServerError,
        }
    }

    pub(crate) fn log(&self) {
        match self {
            QuizError::Database(e) => {
                tracing::error!(error = %e, "Quiz database error");
            }
            QuizError::Internal(msg) => {
                tracing::error!(message = %msg, "Quiz internal error");
            }
            QuizError::Timeout => {
                tracing::warn!("Quiz operation exceeded its deadline");
            }
            QuizError::AlreadyAnswered => {
                tracing::warn!("Repeated answer for an answered question");
            }
            QuizError::ConcurrentModification => {
                tracing::warn!("Concurrent session modification rejected");
            }
            QuizError::InvalidGraph(e) => {
                tracing::warn!(error = %e, "Rejected malformed question graph");
            }
            _ => {
                tracing::debug!(error = %self, "Quiz error");
            }
        }
    }
}

impl From<QuizError> for AppError {
    fn from(err: QuizError) -> Self {
        let kind = err.kind();
        let app_err = AppError::new(kind, err.to_string());
        match err {
            QuizError::QuestionQueueEmpty => {
                app_err.with_action("Finish the session to see the results")
            }
            QuizError::ConcurrentModification | QuizError::Timeout => {
                app_err.with_action("Retry the request")
            }
            // Storage details stay in the log; SQLSTATE picks the kind.
            QuizError::Database(e) => AppError::from(e),
            _ => app_err,
        }
    }
}

impl IntoResponse for QuizError {
    fn into_response(self) -> Response {
        self.log();
        AppError::from(self).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_codes() {
        assert_eq!(QuizError::GameNotFound.status_code(), StatusCode::NOT_FOUND);
        assert_eq!(QuizError::GameNotActive.status_code(), StatusCode::CONFLICT);
        assert_eq!(QuizError::AlreadyAnswered.status_code(), StatusCode::CONFLICT);
        assert_eq!(QuizError::SessionAlreadyExists.status_code(), StatusCode::CONFLICT);
        assert_eq!(QuizError::QuestionQueueEmpty.status_code(), StatusCode::GONE);
        assert_eq!(
            QuizError::InvalidInput("x".into()).status_code(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            QuizError::UnsupportedQuestionType("essay".into()).status_code(),
            StatusCode::UNPROCESSABLE_ENTITY
        );
        assert_eq!(QuizError::Timeout.status_code(), StatusCode::REQUEST_TIMEOUT);
        assert_eq!(
            QuizError::Internal("x".into()).status_code(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn test_into_app_error_keeps_message() {
        let app: AppError = QuizError::SessionNotFound.into();
        assert_eq!(app.kind(), ErrorKind::NotFound);
        assert_eq!(app.message(), "Session not found");
        assert!(app.action().is_none());
    }

    #[test]
    fn test_queue_empty_carries_action() {
        let app: AppError = QuizError::QuestionQueueEmpty.into();
        assert_eq!(app.kind(), ErrorKind::Gone);
        assert!(app.action().is_some());
    }

    #[test]
    fn test_database_error_hides_details() {
        let app: AppError = QuizError::Database(sqlx::Error::PoolClosed).into();
        assert_eq!(app.kind(), ErrorKind::InternalServerError);
        assert_eq!(app.message(), "Database error");
    }
}

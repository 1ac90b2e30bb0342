//! API DTOs (Data Transfer Objects)
//!
//! Player-facing question views never carry `is_correct` or edges; the author
//! view of a game does.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::application::accept_answers::AcceptAnswersOutput;
use crate::application::get_current_state::SessionState;
use crate::application::manage_game::GameDetails;
use crate::domain::entity::{
    game::{Game, GameStatistics},
    player::Player,
    question::{AnswerOption, Question},
    session::{ExtendedSession, ExtendedSessionsPage, SessionItem, SessionStatistics},
};
use crate::domain::value_object::{
    answer_option_id::AnswerOptionId, game_settings::GameSettings, game_status::GameStatus,
    game_type::GameType, question_type::QuestionType, session_status::SessionStatus,
};

// ---------------------------------------------------------------------------
// Requests
// ---------------------------------------------------------------------------

/// Request for POST /api/games
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateGameRequest {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub settings: GameSettings,
}

/// Request for POST /api/games/{game_id}/questions
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AddQuestionRequest {
    pub text: String,
    /// Parsed by the engine so unknown types surface as a domain error
    pub question_type: String,
    #[serde(default)]
    pub image_id: Option<String>,
    #[serde(default)]
    pub answer_options: Vec<AnswerOptionRequest>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnswerOptionRequest {
    pub text: String,
    #[serde(default)]
    pub is_correct: bool,
    #[serde(default)]
    pub next_question_id: Option<Uuid>,
}

/// Request for POST /api/games/{game_id}/players/{player_id}/session/answers
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AcceptAnswersRequest {
    pub question_id: Uuid,
    /// Option ids as strings for choice questions, free text for `fill_the_gap`
    pub answers: Vec<String>,
}

/// Request for PUT /api/players/{player_id}/name
#[derive(Debug, Clone, Deserialize)]
pub struct RenamePlayerRequest {
    pub name: String,
}

/// Query for GET /api/games/{game_id}/sessions
#[derive(Debug, Clone, Copy, Default, Deserialize)]
pub struct SessionsQuery {
    pub page: Option<u32>,
    pub limit: Option<u32>,
}

// ---------------------------------------------------------------------------
// Responses
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GameResponse {
    pub game_id: Uuid,
    pub title: Option<String>,
    pub status: GameStatus,
    pub game_type: GameType,
    pub settings: GameSettings,
    pub created_at: DateTime<Utc>,
}

impl From<&Game> for GameResponse {
    fn from(game: &Game) -> Self {
        Self {
            game_id: game.id.into_uuid(),
            title: game.title.clone(),
            status: game.status,
            game_type: game.game_type,
            settings: game.settings,
            created_at: game.created_at,
        }
    }
}

/// Response for GET /api/games/{game_id}
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GameDetailsResponse {
    #[serde(flatten)]
    pub game: GameResponse,
    pub questions: Vec<AuthorQuestionView>,
}

impl From<&GameDetails> for GameDetailsResponse {
    fn from(details: &GameDetails) -> Self {
        Self {
            game: GameResponse::from(&details.game),
            questions: details.questions.iter().map(AuthorQuestionView::from).collect(),
        }
    }
}

/// Full question as authored
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthorQuestionView {
    pub question_id: Uuid,
    pub text: String,
    pub question_type: QuestionType,
    pub image_id: Option<String>,
    pub sort: i64,
    pub answer_options: Vec<AuthorOptionView>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthorOptionView {
    pub id: AnswerOptionId,
    pub text: String,
    pub is_correct: bool,
    pub next_question_id: Option<Uuid>,
}

impl From<&Question> for AuthorQuestionView {
    fn from(q: &Question) -> Self {
        Self {
            question_id: q.id.into_uuid(),
            text: q.text.clone(),
            question_type: q.question_type,
            image_id: q.image_id.clone(),
            sort: q.sort,
            answer_options: q
                .answer_options
                .iter()
                .map(|o| AuthorOptionView {
                    id: o.id,
                    text: o.text.clone(),
                    is_correct: o.is_correct,
                    next_question_id: o.next_question_id.map(|id| id.into_uuid()),
                })
                .collect(),
        }
    }
}

/// Question as a player sees it
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct QuestionView {
    pub question_id: Uuid,
    pub text: String,
    pub question_type: QuestionType,
    pub image_id: Option<String>,
    /// Empty for `fill_the_gap`: the only option is the reference answer
    pub answer_options: Vec<OptionView>,
}

#[derive(Debug, Clone, Serialize)]
pub struct OptionView {
    pub id: AnswerOptionId,
    pub text: String,
}

impl From<&AnswerOption> for OptionView {
    fn from(o: &AnswerOption) -> Self {
        Self {
            id: o.id,
            text: o.text.clone(),
        }
    }
}

impl From<&Question> for QuestionView {
    fn from(q: &Question) -> Self {
        let answer_options = if q.question_type.is_choice_family() {
            q.answer_options.iter().map(OptionView::from).collect()
        } else {
            Vec::new()
        };
        Self {
            question_id: q.id.into_uuid(),
            text: q.text.clone(),
            question_type: q.question_type,
            image_id: q.image_id.clone(),
            answer_options,
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize)]
pub struct ProgressView {
    pub answered: u64,
    pub total: u64,
}

/// Response for GET /api/games/{game_id}/players/{player_id}/session
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionStateResponse {
    pub status: SessionStatus,
    pub current_question: Option<QuestionView>,
    pub progress: ProgressView,
}

impl From<&SessionState> for SessionStateResponse {
    fn from(state: &SessionState) -> Self {
        Self {
            status: state.status,
            current_question: state.current_question.as_ref().map(QuestionView::from),
            progress: ProgressView {
                answered: state.progress.answered,
                total: state.progress.total,
            },
        }
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AnswerDetailView {
    pub answer: String,
    pub is_correct: bool,
}

/// Response for POST .../session/answers
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AcceptAnswersResponse {
    pub is_correct: bool,
    pub details: Vec<AnswerDetailView>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub right_answers: Option<Vec<OptionView>>,
}

impl From<&AcceptAnswersOutput> for AcceptAnswersResponse {
    fn from(out: &AcceptAnswersOutput) -> Self {
        Self {
            is_correct: out.is_correct,
            details: out
                .details
                .iter()
                .map(|d| AnswerDetailView {
                    answer: d.answer.clone(),
                    is_correct: d.is_correct,
                })
                .collect(),
            right_answers: out
                .right_answers
                .as_ref()
                .map(|opts| opts.iter().map(OptionView::from).collect()),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionStatisticsResponse {
    pub questions_count: u64,
    pub answered_count: u64,
    pub correct_answers_count: u64,
}

impl From<SessionStatistics> for SessionStatisticsResponse {
    fn from(stats: SessionStatistics) -> Self {
        Self {
            questions_count: stats.questions_count,
            answered_count: stats.answered_count,
            correct_answers_count: stats.correct_answers_count,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GameStatisticsResponse {
    pub participants_count: u64,
    pub finished_count: u64,
    pub completion_rate: u8,
}

impl From<GameStatistics> for GameStatisticsResponse {
    fn from(stats: GameStatistics) -> Self {
        Self {
            participants_count: stats.participants_count,
            finished_count: stats.finished_count,
            completion_rate: stats.completion_rate,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionItemView {
    pub question_id: Uuid,
    pub answers: Vec<String>,
    pub is_correct: Option<bool>,
    pub answered_at: Option<DateTime<Utc>>,
}

impl From<&SessionItem> for SessionItemView {
    fn from(item: &SessionItem) -> Self {
        Self {
            question_id: item.question_id.into_uuid(),
            answers: item.answers.clone(),
            is_correct: item.is_correct,
            answered_at: item.answered_at,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ExtendedSessionView {
    pub session_id: Uuid,
    pub player_id: Uuid,
    pub player_name: String,
    pub status: SessionStatus,
    pub created_at: DateTime<Utc>,
    pub answered_count: u64,
    pub correct_answers_count: u64,
    pub completion_rate: u8,
    pub items: Vec<SessionItemView>,
}

impl ExtendedSessionView {
    fn new(extended: &ExtendedSession, questions_count: u64) -> Self {
        Self {
            session_id: extended.session.id.into_uuid(),
            player_id: extended.session.player_id.into_uuid(),
            player_name: extended.player_name.clone(),
            status: extended.session.status,
            created_at: extended.session.created_at,
            answered_count: extended.answered_count(),
            correct_answers_count: extended.correct_answers_count(),
            completion_rate: extended.completion_rate(questions_count),
            items: extended.items.iter().map(SessionItemView::from).collect(),
        }
    }
}

/// Response for GET /api/games/{game_id}/sessions
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ExtendedSessionsResponse {
    pub sessions: Vec<ExtendedSessionView>,
    pub total_count: u64,
    pub questions_count: u64,
}

impl From<&ExtendedSessionsPage> for ExtendedSessionsResponse {
    fn from(page: &ExtendedSessionsPage) -> Self {
        Self {
            sessions: page
                .sessions
                .iter()
                .map(|s| ExtendedSessionView::new(s, page.questions_count))
                .collect(),
            total_count: page.total_count,
            questions_count: page.questions_count,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PlayerResponse {
    pub player_id: Uuid,
    pub name: String,
    pub name_user_entered: bool,
}

impl From<&Player> for PlayerResponse {
    fn from(player: &Player) -> Self {
        Self {
            player_id: player.id.into_uuid(),
            name: player.name.clone(),
            name_user_entered: player.name_user_entered,
        }
    }
}

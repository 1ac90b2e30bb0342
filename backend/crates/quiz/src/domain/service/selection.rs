//! Next Question Selection
//!
//! Decides which question a session shows next, given every question of the
//! game and the session's items in insertion order.

use std::collections::HashSet;

use kernel::id::QuestionId;

use crate::domain::entity::question::{Question, is_branching};
use crate::domain::entity::session::SessionItem;
use crate::domain::service::question_graph::QuestionGraph;
use crate::domain::value_object::{game_settings::GameSettings, question_type::QuestionType};
use crate::error::{QuizError, QuizResult};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NextQuestion {
    /// Already shown and unanswered; show it again without a new item
    Pending(QuestionId),
    /// Freshly chosen; the caller records a pending item for it
    New(QuestionId),
}

impl NextQuestion {
    pub fn question_id(&self) -> QuestionId {
        match self {
            Self::Pending(id) | Self::New(id) => *id,
        }
    }
}

pub fn select_next(
    questions: &[Question],
    items: &[SessionItem],
    settings: &GameSettings,
) -> QuizResult<NextQuestion> {
    if let Some(pending) = items.iter().find(|i| i.is_pending()) {
        return Ok(NextQuestion::Pending(pending.question_id));
    }

    if is_branching(questions) {
        select_by_graph(questions, items)
    } else {
        select_linear(questions, items, settings.shuffle_questions)
    }
}

/// Questions not yet in the session, highest `sort` first
fn select_linear(
    questions: &[Question],
    items: &[SessionItem],
    shuffle: bool,
) -> QuizResult<NextQuestion> {
    let seen: HashSet<QuestionId> = items.iter().map(|i| i.question_id).collect();
    let mut remaining: Vec<&Question> = questions
        .iter()
        .filter(|q| !seen.contains(&q.id))
        .collect();
    if remaining.is_empty() {
        return Err(QuizError::QuestionQueueEmpty);
    }
    remaining.sort_by(|a, b| b.sort.cmp(&a.sort));

    let idx = if shuffle {
        platform::random::random_index(remaining.len()).unwrap_or(0)
    } else {
        0
    };
    Ok(NextQuestion::New(remaining[idx].id))
}

/// Root first, then the edge of the last answered item
fn select_by_graph(questions: &[Question], items: &[SessionItem]) -> QuizResult<NextQuestion> {
    let graph = QuestionGraph::build(questions)?;

    let Some(last) = items.last() else {
        return Ok(NextQuestion::New(graph.first().id));
    };

    let from = graph.question(last.question_id)?;
    let chosen = match from.question_type {
        // free text has no option to pick; its single option carries the edge
        QuestionType::FillTheGap => from.answer_options.first().map(|o| o.id),
        _ => last.answers.first().and_then(|a| a.parse().ok()),
    };

    let next = chosen
        .and_then(|option_id| graph.next_question(from.id, option_id).ok())
        .ok_or(QuizError::QuestionQueueEmpty)?;

    if items.iter().any(|i| i.question_id == next.id) {
        return Err(QuizError::QuestionQueueEmpty);
    }
    Ok(NextQuestion::New(next.id))
}

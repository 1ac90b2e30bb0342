//! Answer Acceptors
//!
//! Scores a submission against a question. Choice-type submissions are option
//! ids as strings; `fill_the_gap` submissions are free text.

use std::collections::HashSet;

use crate::domain::entity::question::Question;
use crate::domain::value_object::{answer_option_id::AnswerOptionId, question_type::QuestionType};
use crate::error::{QuizError, QuizResult};

/// Verdict for one submitted value
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnswerDetail {
    pub answer: String,
    pub is_correct: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnswerVerdict {
    pub is_correct: bool,
    pub details: Vec<AnswerDetail>,
}

#[derive(Debug, Clone, Copy)]
pub struct AnswerAcceptor {
    /// Edits allowed between a free-text answer and the reference
    typo_tolerance: usize,
}

impl AnswerAcceptor {
    pub fn new(typo_tolerance: usize) -> Self {
        Self { typo_tolerance }
    }

    pub fn accept(&self, question: &Question, answers: &[String]) -> QuizResult<AnswerVerdict> {
        if answers.is_empty() {
            return Err(QuizError::InvalidInput("answers are empty".into()));
        }

        match question.question_type {
            QuestionType::Choice => accept_choice(question, answers),
            QuestionType::OneOfChoice => accept_one_of_choice(question, answers),
            QuestionType::MultipleChoice => accept_multiple_choice(question, answers),
            QuestionType::FillTheGap => self.accept_fill_the_gap(question, answers),
        }
    }

    fn accept_fill_the_gap(
        &self,
        question: &Question,
        answers: &[String],
    ) -> QuizResult<AnswerVerdict> {
        let [answer] = answers else {
            return Err(QuizError::InvalidInput(
                "fill_the_gap takes exactly one answer".into(),
            ));
        };
        let reference = question.correct_options().next().ok_or_else(|| {
            QuizError::InvalidInput("question has no reference answer".into())
        })?;

        let is_correct =
            platform::text::within_distance(answer, &reference.text, self.typo_tolerance);
        Ok(AnswerVerdict {
            is_correct,
            details: vec![AnswerDetail {
                answer: answer.clone(),
                is_correct,
            }],
        })
    }
}

fn parse_option_ids(answers: &[String]) -> QuizResult<Vec<AnswerOptionId>> {
    answers.iter().map(|a| a.parse()).collect()
}

fn correct_ids(question: &Question) -> HashSet<AnswerOptionId> {
    question.correct_options().map(|o| o.id).collect()
}

fn details_for(
    answers: &[String],
    ids: &[AnswerOptionId],
    correct: &HashSet<AnswerOptionId>,
) -> Vec<AnswerDetail> {
    answers
        .iter()
        .zip(ids)
        .map(|(answer, id)| AnswerDetail {
            answer: answer.clone(),
            is_correct: correct.contains(id),
        })
        .collect()
}

/// Exactly one pick; right when it is any correct option
fn accept_choice(question: &Question, answers: &[String]) -> QuizResult<AnswerVerdict> {
    if answers.len() > 1 {
        return Err(QuizError::InvalidInput("choice takes exactly one answer".into()));
    }
    let ids = parse_option_ids(answers)?;
    let correct = correct_ids(question);
    let details = details_for(answers, &ids, &correct);
    Ok(AnswerVerdict {
        is_correct: details.iter().all(|d| d.is_correct),
        details,
    })
}

/// Any number of picks; a single wrong pick spoils the whole answer
fn accept_one_of_choice(question: &Question, answers: &[String]) -> QuizResult<AnswerVerdict> {
    let ids = parse_option_ids(answers)?;
    let correct = correct_ids(question);
    let details = details_for(answers, &ids, &correct);
    Ok(AnswerVerdict {
        is_correct: details.iter().all(|d| d.is_correct),
        details,
    })
}

/// The de-duplicated picks must be exactly the correct set.
///
/// Each correct option is used up by its first pick; a repeat is reported as
/// wrong in `details` but does not spoil the verdict.
fn accept_multiple_choice(question: &Question, answers: &[String]) -> QuizResult<AnswerVerdict> {
    let ids = parse_option_ids(answers)?;
    let correct = correct_ids(question);

    let mut remaining = correct.clone();
    let mut seen = HashSet::with_capacity(ids.len());
    let mut has_wrong = false;
    let mut details = Vec::with_capacity(answers.len());
    for (answer, id) in answers.iter().zip(ids) {
        let first_pick = seen.insert(id);
        let is_correct = remaining.remove(&id);
        if first_pick && !is_correct {
            has_wrong = true;
        }
        details.push(AnswerDetail {
            answer: answer.clone(),
            is_correct,
        });
    }

    Ok(AnswerVerdict {
        is_correct: !has_wrong && remaining.is_empty(),
        details,
    })
}

//! Question Entity
//!
//! A question belongs to exactly one game. Its options are numbered by the
//! store on insert, so authoring goes through [`QuestionDraft`].

use chrono::{DateTime, Utc};
use kernel::id::{GameId, QuestionId};

use crate::domain::value_object::{answer_option_id::AnswerOptionId, question_type::QuestionType};
use crate::error::{QuizError, QuizResult};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnswerOption {
    pub id: AnswerOptionId,
    pub text: String,
    pub is_correct: bool,
    /// Branching edge: the question shown after this option is chosen
    pub next_question_id: Option<QuestionId>,
}

#[derive(Debug, Clone)]
pub struct Question {
    pub id: QuestionId,
    pub game_id: GameId,
    pub text: String,
    pub question_type: QuestionType,
    pub image_id: Option<String>,
    /// Insertion rank within the game, starting at 1
    pub sort: i64,
    pub answer_options: Vec<AnswerOption>,
    pub created_at: DateTime<Utc>,
}

impl Question {
    pub fn option(&self, id: AnswerOptionId) -> Option<&AnswerOption> {
        self.answer_options.iter().find(|o| o.id == id)
    }

    pub fn correct_options(&self) -> impl Iterator<Item = &AnswerOption> {
        self.answer_options.iter().filter(|o| o.is_correct)
    }

    /// Correct options, in stored order, for revealing after an answer
    pub fn right_answers(&self) -> Vec<AnswerOption> {
        self.correct_options().cloned().collect()
    }

    pub fn has_branches(&self) -> bool {
        self.answer_options
            .iter()
            .any(|o| o.next_question_id.is_some())
    }

    /// Copy of this question with its options shuffled
    pub fn with_shuffled_options(&self) -> Question {
        let mut copy = self.clone();
        platform::random::shuffle(&mut copy.answer_options);
        copy
    }
}

/// A game is branching when any option of any question carries an edge
pub fn is_branching(questions: &[Question]) -> bool {
    questions.iter().any(Question::has_branches)
}

#[derive(Debug, Clone)]
pub struct NewAnswerOption {
    pub text: String,
    pub is_correct: bool,
    pub next_question_id: Option<QuestionId>,
}

/// A validated question that has not been stored yet
#[derive(Debug, Clone)]
pub struct QuestionDraft {
    pub id: QuestionId,
    pub game_id: GameId,
    pub text: String,
    pub question_type: QuestionType,
    pub image_id: Option<String>,
    pub sort: i64,
    pub answer_options: Vec<NewAnswerOption>,
    pub created_at: DateTime<Utc>,
}

impl QuestionDraft {
    /// Validate the authored content
    ///
    /// - text must not be blank
    /// - at least one option
    /// - `fill_the_gap`: exactly one option, which is the reference answer
    /// - choice types: at least one correct option
    pub fn new(
        game_id: GameId,
        sort: i64,
        text: String,
        question_type: QuestionType,
        image_id: Option<String>,
        mut answer_options: Vec<NewAnswerOption>,
    ) -> QuizResult<Self> {
        let text = text.trim().to_string();
        if text.is_empty() {
            return Err(QuizError::InvalidInput("question text is empty".into()));
        }
        if answer_options.is_empty() {
            return Err(QuizError::EmptyAnswerOptions);
        }
        if answer_options.iter().any(|o| o.text.trim().is_empty()) {
            return Err(QuizError::InvalidInput("answer option text is empty".into()));
        }

        match question_type {
            QuestionType::FillTheGap => {
                if answer_options.len() != 1 {
                    return Err(QuizError::InvalidInput(
                        "fill_the_gap takes exactly one reference answer".into(),
                    ));
                }
                answer_options[0].is_correct = true;
            }
            QuestionType::Choice | QuestionType::OneOfChoice | QuestionType::MultipleChoice => {
                if !answer_options.iter().any(|o| o.is_correct) {
                    return Err(QuizError::InvalidInput(format!(
                        "{question_type} needs at least one correct option"
                    )));
                }
            }
        }

        Ok(Self {
            id: QuestionId::new(),
            game_id,
            text,
            question_type,
            image_id: image_id.filter(|i| !i.trim().is_empty()),
            sort,
            answer_options,
            created_at: Utc::now(),
        })
    }

    /// Attach the option ids assigned by the store
    pub fn into_question(self, option_ids: &[AnswerOptionId]) -> QuizResult<Question> {
        if option_ids.len() != self.answer_options.len() {
            return Err(QuizError::Internal(format!(
                "expected {} option ids, got {}",
                self.answer_options.len(),
                option_ids.len()
            )));
        }
        let answer_options = self
            .answer_options
            .into_iter()
            .zip(option_ids)
            .map(|(o, id)| AnswerOption {
                id: *id,
                text: o.text,
                is_correct: o.is_correct,
                next_question_id: o.next_question_id,
            })
            .collect();

        Ok(Question {
            id: self.id,
            game_id: self.game_id,
            text: self.text,
            question_type: self.question_type,
            image_id: self.image_id,
            sort: self.sort,
            answer_options,
            created_at: self.created_at,
        })
    }
}

//! Question Type
//!
//! Each variant selects one answer acceptor. The set is closed: a stored or
//! submitted code that does not parse is the only way to reach
//! `UnsupportedQuestionType`.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::QuizError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum QuestionType {
    /// Exactly one option may be submitted
    Choice,
    /// Any number of options; every one of them must be correct
    OneOfChoice,
    /// The submitted set must equal the correct set
    MultipleChoice,
    /// Free text compared to a single reference answer
    FillTheGap,
}

impl QuestionType {
    #[inline]
    pub const fn code(&self) -> &'static str {
        match self {
            Self::Choice => "choice",
            Self::OneOfChoice => "one_of_choice",
            Self::MultipleChoice => "multiple_choice",
            Self::FillTheGap => "fill_the_gap",
        }
    }

    /// Submissions are option ids rather than free text
    #[inline]
    pub const fn is_choice_family(&self) -> bool {
        !matches!(self, Self::FillTheGap)
    }
}

impl FromStr for QuestionType {
    type Err = QuizError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "choice" => Ok(Self::Choice),
            "one_of_choice" => Ok(Self::OneOfChoice),
            "multiple_choice" => Ok(Self::MultipleChoice),
            "fill_the_gap" => Ok(Self::FillTheGap),
            other => Err(QuizError::UnsupportedQuestionType(other.to_string())),
        }
    }
}

impl fmt::Display for QuestionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

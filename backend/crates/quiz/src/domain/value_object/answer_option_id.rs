//! Answer Option ID
//!
//! Options are numbered by the store (bigserial). Players submit them back as
//! strings, so parsing a submission lives here.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::QuizError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AnswerOptionId(i64);

impl AnswerOptionId {
    #[inline]
    pub const fn new(value: i64) -> Self {
        Self(value)
    }

    #[inline]
    pub const fn value(&self) -> i64 {
        self.0
    }
}

impl FromStr for AnswerOptionId {
    type Err = QuizError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.trim()
            .parse::<i64>()
            .map(Self)
            .map_err(|_| QuizError::InvalidInput(format!("'{s}' is not an answer option id")))
    }
}

impl fmt::Display for AnswerOptionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_submission() {
        assert_eq!("42".parse::<AnswerOptionId>().unwrap(), AnswerOptionId::new(42));
        assert_eq!(" 7 ".parse::<AnswerOptionId>().unwrap(), AnswerOptionId::new(7));
    }

    #[test]
    fn test_parse_rejects_text() {
        let err = "A".parse::<AnswerOptionId>().unwrap_err();
        assert!(matches!(err, QuizError::InvalidInput(_)));
    }
}

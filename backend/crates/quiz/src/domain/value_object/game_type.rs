//! Game Type

use serde::{Deserialize, Serialize};
use std::fmt;

/// How players progress through a game. Only self-paced play exists today.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GameType {
    #[default]
    Async,
}

impl GameType {
    #[inline]
    pub const fn code(&self) -> &'static str {
        match self {
            Self::Async => "async",
        }
    }

    #[inline]
    pub fn from_code(code: &str) -> Option<Self> {
        match code {
            "async" => Some(Self::Async),
            _ => None,
        }
    }
}

impl fmt::Display for GameType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

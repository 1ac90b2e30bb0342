//! Game Status
//!
//! `Created -> Started -> Finished`, monotonic. There is no way back.

use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GameStatus {
    /// Being authored; questions may still be added
    #[default]
    Created,
    /// Open for players; answers are accepted
    Started,
    /// Closed by the author
    Finished,
}

impl GameStatus {
    #[inline]
    pub const fn code(&self) -> &'static str {
        match self {
            Self::Created => "created",
            Self::Started => "started",
            Self::Finished => "finished",
        }
    }

    #[inline]
    pub fn from_code(code: &str) -> Option<Self> {
        match code {
            "created" => Some(Self::Created),
            "started" => Some(Self::Started),
            "finished" => Some(Self::Finished),
            _ => None,
        }
    }

    #[inline]
    pub const fn is_editable(&self) -> bool {
        matches!(self, Self::Created)
    }

    #[inline]
    pub const fn is_active(&self) -> bool {
        matches!(self, Self::Started)
    }

    /// Whether the author may move the game from `self` to `next`
    #[inline]
    pub const fn can_transition_to(&self, next: GameStatus) -> bool {
        matches!(
            (self, next),
            (Self::Created, Self::Started) | (Self::Started, Self::Finished)
        )
    }
}

impl fmt::Display for GameStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

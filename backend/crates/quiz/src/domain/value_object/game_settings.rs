//! Game Settings

use serde::{Deserialize, Serialize};

/// Play settings chosen by the author when creating a game
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct GameSettings {
    /// Hidden from public listings
    pub is_private: bool,
    /// Pick the next question at random instead of in `sort` order
    pub shuffle_questions: bool,
    /// Shuffle answer options in the view shown to the player
    pub shuffle_answers: bool,
    /// Reveal the correct options after each answer
    pub show_right_answers: bool,
    /// Ask players to enter a name before playing
    pub input_custom_name: bool,
}

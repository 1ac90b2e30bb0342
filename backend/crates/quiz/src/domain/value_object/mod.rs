//! Value Object Module

pub mod answer_option_id;
pub mod game_settings;
pub mod game_status;
pub mod game_type;
pub mod question_type;
pub mod session_status;

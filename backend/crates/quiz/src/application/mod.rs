//! Application Layer - Use Cases
//!
//! Each use case opens one unit of work, runs under the configured deadline
//! and commits only when every step succeeded.

pub mod accept_answers;
pub mod config;
pub mod execution;
pub mod finish_session;
pub mod get_current_state;
pub mod list_sessions;
pub mod manage_game;
pub mod rename_player;
pub mod restart_session;
pub mod session_statistics;
pub mod start_session;

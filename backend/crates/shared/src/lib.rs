//! Shared Kernel - vocabulary shared by every quiz crate
//!
//! This crate holds only what is hard to change and means the same
//! thing everywhere:
//! - The unified [`error::app_error::AppError`] and its [`error::kind::ErrorKind`]
//! - Typed identifiers for games, questions, players and sessions

pub mod error {
    pub mod app_error;
    pub mod conversions;
    pub mod kind;
}
pub mod id;

//! Entity Module

pub mod game;
pub mod player;
pub mod question;
pub mod session;

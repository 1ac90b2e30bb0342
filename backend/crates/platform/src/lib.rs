//! Platform Crate - Technical Infrastructure
//!
//! Domain-free helpers used by the quiz engine:
//! - Non-predictable random selection (OS RNG)
//! - Answer text normalization and edit distance

pub mod random;
pub mod text;

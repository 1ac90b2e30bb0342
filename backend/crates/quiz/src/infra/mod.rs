//! Infrastructure Layer
//!
//! Store implementations of the repository traits.

pub mod memory;
pub mod postgres;

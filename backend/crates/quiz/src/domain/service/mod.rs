//! Domain Services
//!
//! Pure logic with no I/O:
//! - Answer scoring per question type
//! - Branching question graph
//! - Choosing the next question for a session

pub mod acceptor;
pub mod question_graph;
pub mod selection;

//! Quiz Session Engine
//!
//! Clean Architecture structure:
//! - `domain/` - Games, questions, sessions, answer acceptors, question graph
//! - `application/` - Use cases, each one store transaction under a deadline
//! - `infra/` - PostgreSQL and in-memory stores
//! - `presentation/` - HTTP handlers, DTOs, router
//!
//! ## Consistency Model
//! - Every state-changing use case runs in one unit of work; dropping it rolls back
//! - At most one pending (shown, unanswered) item per session
//! - An answered item is never rewritten

pub mod application;
pub mod domain;
pub mod error;
pub mod infra;
pub mod presentation;

// Re-exports for convenience
pub use application::config::QuizConfig;
pub use error::{QuizError, QuizResult};
pub use infra::memory::InMemoryTransactionManager;
pub use infra::postgres::PgTransactionManager;
pub use presentation::router::{quiz_router, quiz_router_generic};

pub use kernel::error::{
    app_error::{AppError, AppResult},
    kind::ErrorKind,
};

#[cfg(test)]
mod tests;

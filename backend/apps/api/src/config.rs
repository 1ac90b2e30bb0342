//! Server configuration from the environment

use std::env;
use std::net::SocketAddr;
use std::str::FromStr;
use std::time::Duration;

use anyhow::Context;
use quiz::QuizConfig;

const DEFAULT_PORT: u16 = 31113;
const DEFAULT_MAX_CONNECTIONS: u32 = 5;
const DEFAULT_FRONTEND_ORIGINS: &str = "http://localhost:40922,http://127.0.0.1:40922";

#[derive(Debug, Clone)]
pub struct ApiConfig {
    pub database_url: String,
    pub bind_addr: SocketAddr,
    pub max_connections: u32,
    pub frontend_origins: Vec<String>,
    pub quiz: QuizConfig,
}

impl ApiConfig {
    /// Read settings; call after `.env` is loaded
    pub fn from_env() -> anyhow::Result<Self> {
        let database_url =
            env::var("DATABASE_URL").context("DATABASE_URL must be set in environment")?;

        let bind_addr = parse_opt("BIND_ADDR")?
            .unwrap_or_else(|| SocketAddr::from(([0, 0, 0, 0], DEFAULT_PORT)));
        let max_connections =
            parse_opt("DATABASE_MAX_CONNECTIONS")?.unwrap_or(DEFAULT_MAX_CONNECTIONS);

        let frontend_origins = env::var("FRONTEND_ORIGINS")
            .unwrap_or_else(|_| DEFAULT_FRONTEND_ORIGINS.to_string())
            .split(',')
            .map(|origin| origin.trim().to_string())
            .filter(|origin| !origin.is_empty())
            .collect();

        let mut quiz = if cfg!(debug_assertions) {
            QuizConfig::development()
        } else {
            QuizConfig::default()
        };
        if let Some(ms) = parse_opt::<u64>("QUIZ_OPERATION_TIMEOUT_MS")? {
            quiz.operation_timeout = Duration::from_millis(ms);
        }
        if let Some(tolerance) = parse_opt::<usize>("QUIZ_TYPO_TOLERANCE")? {
            quiz.typo_tolerance = tolerance;
        }

        Ok(Self {
            database_url,
            bind_addr,
            max_connections,
            frontend_origins,
            quiz,
        })
    }
}

fn parse_opt<T>(key: &str) -> anyhow::Result<Option<T>>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match env::var(key) {
        Ok(raw) => raw
            .trim()
            .parse()
            .map(Some)
            .with_context(|| format!("{key} has an invalid value: {raw}")),
        Err(_) => Ok(None),
    }
}

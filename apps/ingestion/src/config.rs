use std::str::FromStr;
use std::time::Duration;

use anyhow::{Context, Result};

/// Worker configuration loaded from environment variables.
/// Every variable is optional; unparseable numeric values fail startup.
#[derive(Debug, Clone)]
pub struct Config {
    pub redis_host: String,
    pub redis_port: u16,
    pub pg_host: String,
    pub pg_port: u16,
    pub pg_db: String,
    pub pg_user: String,
    pub pg_password: String,
    pub poll: PollConfig,
    pub retry: RetryPolicy,
    pub rust_log: String,
}

/// Adaptive delay between scan cycles.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PollConfig {
    /// Wait after a cycle that created at least one row.
    pub active_wait: Duration,
    /// Wait after a cycle that found nothing new.
    pub idle_wait: Duration,
}

impl Default for PollConfig {
    fn default() -> Self {
        Self {
            active_wait: Duration::from_secs(1),
            idle_wait: Duration::from_secs(30),
        }
    }
}

/// Bounded, fixed-delay retry of a whole worker session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    pub max_attempts: u32,
    pub delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 5,
            delay: Duration::from_secs(5),
        }
    }
}

impl RetryPolicy {
    /// Whether a failure of session `attempt` (1-based) is followed by another one.
    pub fn retries_after(&self, attempt: u32) -> bool {
        attempt < self.max_attempts
    }
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing

        let poll_defaults = PollConfig::default();
        let retry_defaults = RetryPolicy::default();

        Ok(Config {
            redis_host: env_or("REDIS_HOST", "redis"),
            redis_port: parse_env("REDIS_PORT", 6379)?,
            pg_host: env_or("PG_HOST", "postgres"),
            pg_port: parse_env("PG_PORT", 5432)?,
            pg_db: env_or("PG_DB", "dw"),
            pg_user: env_or("PG_USER", "user"),
            pg_password: env_or("PG_PASSWORD", "senhaForte2025"),
            poll: PollConfig {
                active_wait: Duration::from_secs(parse_env(
                    "POLL_ACTIVE_WAIT_SECS",
                    poll_defaults.active_wait.as_secs(),
                )?),
                idle_wait: Duration::from_secs(parse_env(
                    "POLL_IDLE_WAIT_SECS",
                    poll_defaults.idle_wait.as_secs(),
                )?),
            },
            retry: RetryPolicy {
                max_attempts: parse_env("MAX_RETRIES", retry_defaults.max_attempts)?,
                delay: Duration::from_secs(parse_env(
                    "RETRY_DELAY_SECS",
                    retry_defaults.delay.as_secs(),
                )?),
            },
            rust_log: env_or("RUST_LOG", "info"),
        })
    }

    pub fn redis_url(&self) -> String {
        format!("redis://{}:{}/", self.redis_host, self.redis_port)
    }

    pub fn database_url(&self) -> String {
        format!(
            "postgres://{}:{}@{}:{}/{}",
            self.pg_user, self.pg_password, self.pg_host, self.pg_port, self.pg_db
        )
    }

    /// Postgres target without credentials, for log lines.
    pub fn database_target(&self) -> String {
        format!("{}:{}/{}", self.pg_host, self.pg_port, self.pg_db)
    }
}

fn env_or(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_string())
}

fn parse_env<T>(key: &str, default: T) -> Result<T>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match std::env::var(key) {
        Ok(raw) => raw
            .trim()
            .parse::<T>()
            .with_context(|| format!("Environment variable '{key}' has invalid value '{raw}'")),
        Err(_) => Ok(default),
    }
}

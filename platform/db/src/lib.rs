//! Persistence gateway: pool construction from the environment and
//! translation of vendor error codes.
//!
//! The pool hands out a connection per statement and takes it back when the
//! statement future completes or is dropped, so release happens on every exit
//! path. Callers beyond `max_connections` wait up to `acquire_timeout`.

mod vendor;

use std::{str::FromStr, time::Duration};

use sea_orm::{ConnectOptions, ConnectionTrait, Database, DatabaseConnection, DbErr, Statement};
use serde::Deserialize;
use thiserror::Error;
use tracing::info;

pub use vendor::{Vendor, VendorError, VendorErrorKind, classify, lookup};

/// Shared pool handle. Cloning is cheap; clones share the underlying pool.
pub type DbPool = DatabaseConnection;

#[derive(Debug, Error)]
pub enum DbError {
    #[error("database url missing (set {0})")]
    MissingUrl(String),
    #[error("invalid value for {key}: {value}")]
    InvalidSetting { key: &'static str, value: String },
    #[error("failed to connect to database: {0}")]
    Connect(#[from] DbErr),
}

pub type DbResult<T> = Result<T, DbError>;

/// Pool sizing and connection settings.
#[derive(Clone, Debug, Deserialize)]
pub struct DatabaseSettings {
    pub url: String,
    #[serde(default = "default_min_connections")]
    pub min_connections: u32,
    #[serde(default = "default_max_connections")]
    pub max_connections: u32,
    #[serde(default = "default_acquire_timeout_secs")]
    pub acquire_timeout_secs: u64,
    #[serde(default = "default_idle_timeout_secs")]
    pub idle_timeout_secs: u64,
}

fn default_min_connections() -> u32 {
    2
}

fn default_max_connections() -> u32 {
    10
}

fn default_acquire_timeout_secs() -> u64 {
    60
}

fn default_idle_timeout_secs() -> u64 {
    60
}

impl DatabaseSettings {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            min_connections: default_min_connections(),
            max_connections: default_max_connections(),
            acquire_timeout_secs: default_acquire_timeout_secs(),
            idle_timeout_secs: default_idle_timeout_secs(),
        }
    }

    /// Reads `DATABASE_URL`, `DB_POOL_MIN`, `DB_POOL_MAX`,
    /// `DB_POOL_TIMEOUT_SECS` and `DB_IDLE_TIMEOUT_SECS`.
    pub fn from_env() -> DbResult<Self> {
        let url = std::env::var("DATABASE_URL")
            .map_err(|_| DbError::MissingUrl("DATABASE_URL".into()))?;
        let mut settings = Self::new(url);
        if let Some(min) = env_number("DB_POOL_MIN")? {
            settings.min_connections = min;
        }
        if let Some(max) = env_number("DB_POOL_MAX")? {
            settings.max_connections = max;
        }
        if let Some(secs) = env_number("DB_POOL_TIMEOUT_SECS")? {
            settings.acquire_timeout_secs = secs;
        }
        if let Some(secs) = env_number("DB_IDLE_TIMEOUT_SECS")? {
            settings.idle_timeout_secs = secs;
        }
        if settings.min_connections > settings.max_connections {
            return Err(DbError::InvalidSetting {
                key: "DB_POOL_MIN",
                value: format!(
                    "{} exceeds DB_POOL_MAX {}",
                    settings.min_connections, settings.max_connections
                ),
            });
        }
        Ok(settings)
    }

    pub fn connect_options(&self) -> ConnectOptions {
        let mut options = ConnectOptions::new(self.url.clone());
        options
            .min_connections(self.min_connections)
            .max_connections(self.max_connections)
            .acquire_timeout(Duration::from_secs(self.acquire_timeout_secs))
            .idle_timeout(Duration::from_secs(self.idle_timeout_secs))
            .sqlx_logging(false);
        options
    }
}

fn env_number<T: FromStr>(key: &'static str) -> DbResult<Option<T>> {
    match std::env::var(key) {
        Ok(raw) => parse_number(key, &raw).map(Some),
        Err(_) => Ok(None),
    }
}

/// Values that do not fit `T` are rejected rather than truncated.
fn parse_number<T: FromStr>(key: &'static str, raw: &str) -> DbResult<T> {
    raw.trim().parse::<T>().map_err(|_| DbError::InvalidSetting {
        key,
        value: raw.to_string(),
    })
}

/// Open the bounded pool described by `settings`.
pub async fn connect(settings: &DatabaseSettings) -> DbResult<DbPool> {
    let pool = Database::connect(settings.connect_options()).await?;
    info!(
        backend = ?pool.get_database_backend(),
        min = settings.min_connections,
        max = settings.max_connections,
        "database pool ready"
    );
    Ok(pool)
}

/// Round-trip a trivial statement through the pool.
pub async fn ping<C: ConnectionTrait>(conn: &C) -> Result<(), DbErr> {
    let backend = conn.get_database_backend();
    conn.execute(Statement::from_string(backend, "SELECT 1".to_string()))
        .await
        .map(|_| ())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn settings_default_to_small_bounded_pool() {
        let settings = DatabaseSettings::new("postgres://localhost/hr");
        assert_eq!(settings.min_connections, 2);
        assert_eq!(settings.max_connections, 10);
        assert_eq!(settings.acquire_timeout_secs, 60);
    }

    #[test]
    fn pool_sizes_outside_u32_are_invalid() {
        assert_eq!(parse_number::<u32>("DB_POOL_MAX", " 25 ").ok(), Some(25));
        let err = parse_number::<u32>("DB_POOL_MAX", "4294967297").unwrap_err();
        assert!(matches!(
            err,
            DbError::InvalidSetting { key: "DB_POOL_MAX", ref value } if value == "4294967297"
        ));
    }

    #[tokio::test]
    async fn ping_succeeds_against_sqlite() {
        let pool = connect(&DatabaseSettings::new("sqlite::memory:"))
            .await
            .expect("sqlite pool");
        ping(&pool).await.expect("ping");
    }
}

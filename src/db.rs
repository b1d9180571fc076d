//! Database handle setup and raw statements. The pool is owned by the caller; nothing here closes it.

use crate::error::CrudError;
use sqlx::any::AnyPoolOptions;
use sqlx::AnyPool;

/// Connection settings for [`connect`].
///
/// Pools go through the sqlx `Any` driver, which has no mapping for SQLite `BOOLEAN`,
/// uuid, timestamp or json column types. On SQLite keep flags in `INTEGER` columns and decode
/// them with [`bool_from_int`](crate::sql::row::bool_from_int).
#[derive(Clone, Debug)]
pub struct DatabaseConfig {
    /// `postgres://...`, `sqlite://path?mode=rwc` or `sqlite::memory:`.
    pub url: String,
    pub max_connections: u32,
}

impl DatabaseConfig {
    pub fn new(url: impl Into<String>) -> Self {
        DatabaseConfig {
            url: url.into(),
            max_connections: 5,
        }
    }

    pub fn max_connections(mut self, n: u32) -> Self {
        self.max_connections = n;
        self
    }

    /// Every in-memory SQLite connection is its own database.
    pub fn is_in_memory(&self) -> bool {
        self.url.starts_with("sqlite:") && self.url.contains(":memory:")
    }

    pub async fn connect(&self) -> Result<AnyPool, sqlx::Error> {
        sqlx::any::install_default_drivers();
        let options = AnyPoolOptions::new();
        let options = if self.is_in_memory() {
            // one connection that never expires, or the data goes with it
            options
                .max_connections(1)
                .min_connections(1)
                .idle_timeout(None)
                .max_lifetime(None)
        } else {
            options.max_connections(self.max_connections)
        };
        let pool = options.connect(&self.url).await?;
        tracing::info!(url = %redact(&self.url), "database connected");
        Ok(pool)
    }
}

/// Connect with default settings.
pub async fn connect(url: &str) -> Result<AnyPool, sqlx::Error> {
    DatabaseConfig::new(url).connect().await
}

/// Run a raw statement (DDL, maintenance) on the database.
pub async fn run(db: &AnyPool, sql: &str) -> Result<(), CrudError> {
    tracing::debug!(sql = %sql, "raw query");
    sqlx::raw_sql(sql).execute(db).await?;
    Ok(())
}

/// Drop the password from a connection URL before logging it.
fn redact(url: &str) -> String {
    let Some((scheme, rest)) = url.split_once("://") else {
        return url.to_string();
    };
    let Some((credentials, host)) = rest.split_once('@') else {
        return url.to_string();
    };
    match credentials.split_once(':') {
        Some((user, _)) => format!("{}://{}:***@{}", scheme, user, host),
        None => url.to_string(),
    }
}

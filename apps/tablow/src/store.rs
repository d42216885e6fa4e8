//! # SQLite Store
//!
//! Runs planned [`SqlStatement`]s against SQLite through sqlx.

use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions, SqliteRow};
use sqlx::FromRow;
use std::str::FromStr;
use std::time::Duration;
use tablow_core::{SqlParam, SqlStatement};
use thiserror::Error;

/// Database URL of a private in-memory database.
pub const MEMORY_URL: &str = "sqlite::memory:";

/// Store failures.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("invalid database url '{url}': {source}")]
    InvalidUrl {
        url: String,
        #[source]
        source: sqlx::Error,
    },

    #[error(transparent)]
    Database(#[from] sqlx::Error),
}

/// Binds every planned parameter, in placeholder order.
macro_rules! bind_params {
    ($query:expr, $params:expr) => {{
        let mut query = $query;
        for param in $params {
            query = match param {
                SqlParam::Text(text) => query.bind(text.clone()),
                SqlParam::Integer(int) => query.bind(*int),
                SqlParam::Bool(flag) => query.bind(*flag),
                SqlParam::Null => query.bind(None::<String>),
            };
        }
        query
    }};
}

/// Handle to the SQLite pool. Cheap to clone.
#[derive(Debug, Clone)]
pub struct Store {
    pool: SqlitePool,
}

impl Store {
    /// Open a pool for `database_url`, creating file databases on demand.
    ///
    /// In-memory databases live and die with their connection, so they get a
    /// single connection that is never recycled.
    pub async fn connect(database_url: &str) -> Result<Self, StoreError> {
        let options = SqliteConnectOptions::from_str(database_url)
            .map_err(|source| StoreError::InvalidUrl {
                url: database_url.to_string(),
                source,
            })?
            .create_if_missing(true);

        let pool_options = if database_url.contains(":memory:") {
            SqlitePoolOptions::new()
                .max_connections(1)
                .min_connections(1)
                .idle_timeout(None::<Duration>)
                .max_lifetime(None::<Duration>)
        } else {
            SqlitePoolOptions::new().max_connections(5)
        };

        let pool = pool_options.connect_with(options).await?;
        tracing::debug!(url = %database_url, "sqlite pool opened");
        Ok(Self { pool })
    }

    #[must_use]
    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    /// Run a planned select and decode every row into `M`.
    pub async fn fetch<M>(&self, statement: &SqlStatement) -> Result<Vec<M>, StoreError>
    where
        M: for<'r> FromRow<'r, SqliteRow> + Send + Unpin,
    {
        tracing::debug!(sql = %statement.sql, params = statement.params.len(), "fetch");
        let query = bind_params!(sqlx::query_as::<_, M>(&statement.sql), &statement.params);
        Ok(query.fetch_all(&self.pool).await?)
    }

    /// Run a planned write, returning the number of affected rows.
    pub async fn execute(&self, statement: &SqlStatement) -> Result<u64, StoreError> {
        tracing::debug!(sql = %statement.sql, params = statement.params.len(), "execute");
        let query = bind_params!(sqlx::query(&statement.sql), &statement.params);
        Ok(query.execute(&self.pool).await?.rows_affected())
    }

    /// Run unparameterized SQL (schema set-up).
    pub async fn run_script(&self, sql: &str) -> Result<(), StoreError> {
        sqlx::raw_sql(sql).execute(&self.pool).await?;
        Ok(())
    }
}

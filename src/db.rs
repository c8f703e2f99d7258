use std::future::Future;
use std::time::Duration;

use sqlx::{postgres::PgPoolOptions, PgPool};

use crate::config::DatabaseConfig;
use crate::errors::ReportError;
use crate::queries::{ReportQuery, READ_ONLY_TRANSACTION};

/// Anything that can answer a report query with pipe-delimited text rows.
pub trait RowSource {
    fn fetch_rows(
        &self,
        query: &ReportQuery,
    ) -> impl Future<Output = Result<Vec<String>, ReportError>> + Send;
}

pub struct Database {
    pub pool: PgPool,
}

impl Database {
    /// Creates a lazily connected pool.
    ///
    /// No connection is attempted here; an unreachable host surfaces as a
    /// `QueryFailure` on the first query instead.
    pub fn connect_lazy(config: &DatabaseConfig) -> Self {
        let pool = PgPoolOptions::new()
            .max_connections(1)
            .acquire_timeout(Duration::from_secs(15))
            .connect_lazy_with(config.connect_options());

        Self { pool }
    }
}

impl RowSource for Database {
    async fn fetch_rows(&self, query: &ReportQuery) -> Result<Vec<String>, ReportError> {
        tracing::debug!("Running {:?} query (limit {})", query.section, query.limit);

        // Each read runs in its own read-only transaction, which transaction-mode
        // poolers pass through unchanged. Statements are not persisted because
        // those poolers also reject named statements.
        let mut tx = self.pool.begin().await?;
        sqlx::query(READ_ONLY_TRANSACTION)
            .persistent(false)
            .execute(&mut *tx)
            .await?;

        let rows = sqlx::query_scalar::<_, String>(query.sql())
            .bind(query.limit)
            .persistent(false)
            .fetch_all(&mut *tx)
            .await?;

        tx.rollback().await?;

        tracing::debug!("{:?} query returned {} rows", query.section, rows.len());
        Ok(rows)
    }
}

//! Query execution.
//!
//! The executor owns no state between calls: every execution resolves the
//! target source by key, borrows a connection from its pool, renders the
//! query's template, binds its values in order, and runs it. The connection
//! is scoped to the call and returns to the pool on every exit path,
//! including errors. No statement or connection caching happens here, and no
//! retry: driver failures propagate untouched.

use crate::error::{DbError, DbResult};
use crate::query::SqlQuery;
use crate::registry::{SourceRegistry, SqlSource};
use sqlx::mysql::MySqlRow;
use std::sync::Arc;
use tracing::debug;

/// Stateless execution helper shared by all query kinds.
#[derive(Debug, Clone, Copy, Default)]
pub struct QueryExecutor;

impl QueryExecutor {
    /// Create a new query executor.
    pub fn new() -> Self {
        Self
    }

    /// Execute a mutating query and return the affected-row count.
    pub async fn execute_update<Q: SqlQuery>(
        &self,
        registry: &SourceRegistry,
        query: &Q,
    ) -> DbResult<u64> {
        let source = self.source_for(registry, query).await?;
        let template = query.build_template(&source.db_name);
        debug!(key = %source.key, sql = %template, "Executing update");

        let mut conn = source.pool().acquire().await.map_err(DbError::from)?;
        let result = query
            .bind_values(sqlx::query(&template))
            .execute(&mut *conn)
            .await
            .map_err(DbError::from)?;
        Ok(result.rows_affected())
    }

    /// Execute a reading query and return its first result row, if any.
    pub async fn fetch_optional_row<Q: SqlQuery>(
        &self,
        registry: &SourceRegistry,
        query: &Q,
    ) -> DbResult<Option<MySqlRow>> {
        let source = self.source_for(registry, query).await?;
        let template = query.build_template(&source.db_name);
        debug!(key = %source.key, sql = %template, "Executing query");

        let mut conn = source.pool().acquire().await.map_err(DbError::from)?;
        query
            .bind_values(sqlx::query(&template))
            .fetch_optional(&mut *conn)
            .await
            .map_err(DbError::from)
    }

    async fn source_for<Q: SqlQuery>(
        &self,
        registry: &SourceRegistry,
        query: &Q,
    ) -> DbResult<Arc<SqlSource>> {
        registry
            .get_source(query.source_key())
            .await
            .ok_or_else(|| DbError::source_not_found(query.source_key()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::query::InsertQuery;

    #[tokio::test]
    async fn test_unknown_key_is_source_not_found() {
        let registry = SourceRegistry::new();
        let mut query = InsertQuery::new("missing", "users").unwrap();
        query.add_int("age", 42);

        let result = QueryExecutor::new().execute_update(&registry, &query).await;
        assert!(matches!(result, Err(DbError::SourceNotFound { .. })));
    }
}

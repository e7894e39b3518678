//! Row counting.

use crate::error::{DbError, DbResult};
use crate::executor::QueryExecutor;
use crate::filter::{Condition, render_where};
use crate::query::SqlQuery;
use crate::registry::SourceRegistry;
use crate::value::MySqlQuery;
use sqlx::Row;
use sqlx::mysql::MySqlRow;

/// Selects the number of rows matching the given conditions.
#[derive(Debug, Clone)]
pub struct SelectCountQuery {
    key: String,
    table: String,
    conditions: Vec<Condition>,
}

impl SelectCountQuery {
    /// Create a count query against `table` on the source identified by
    /// `key`.
    pub fn new(key: impl Into<String>, table: impl Into<String>) -> DbResult<Self> {
        let key = key.into();
        let table = table.into();
        if key.is_empty() {
            return Err(DbError::configuration("source key cannot be empty"));
        }
        if table.is_empty() {
            return Err(DbError::configuration("table name cannot be empty"));
        }
        Ok(Self {
            key,
            table,
            conditions: Vec::new(),
        })
    }

    /// Restrict the count with a condition. Conditions join with `and`.
    pub fn add_condition(&mut self, condition: Condition) -> &mut Self {
        self.conditions.push(condition);
        self
    }

    /// Execute and return the count. An absent result row is treated as zero
    /// by explicit policy, not as an error.
    pub async fn fetch_count(&self, registry: &SourceRegistry) -> DbResult<i64> {
        let row = QueryExecutor::new()
            .fetch_optional_row(registry, self)
            .await?;
        count_from_row(row)
    }
}

fn count_from_row(row: Option<MySqlRow>) -> DbResult<i64> {
    match row {
        None => Ok(0),
        Some(row) => row.try_get::<i64, _>(0).map_err(DbError::from),
    }
}

impl SqlQuery for SelectCountQuery {
    fn source_key(&self) -> &str {
        &self.key
    }

    fn build_template(&self, db_name: &str) -> String {
        format!(
            "select count(*) from `{}`.`{}`{};",
            db_name,
            self.table,
            render_where(&self.conditions)
        )
    }

    fn bind_values<'q>(&'q self, query: MySqlQuery<'q>) -> MySqlQuery<'q> {
        self.conditions.iter().fold(query, |q, c| c.bind(q))
    }
}

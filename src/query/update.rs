//! Row mutation: update and delete.

use crate::error::{DbError, DbResult};
use crate::executor::QueryExecutor;
use crate::filter::{Condition, render_where};
use crate::query::SqlQuery;
use crate::registry::SourceRegistry;
use crate::value::{ColumnData, ColumnValue, MySqlQuery};

fn validate_target(key: &str, table: &str) -> DbResult<()> {
    if key.is_empty() {
        return Err(DbError::configuration("source key cannot be empty"));
    }
    if table.is_empty() {
        return Err(DbError::configuration("table name cannot be empty"));
    }
    Ok(())
}

/// Updates rows in a table.
///
/// Assignments render through each value's assignment fragment, so deltas
/// become `` `t`.`c` = `t`.`c` + n `` with no bound parameter while scalars
/// bind normally. Set values bind before condition values. At least one
/// assignment is expected; the server rejects an empty set list.
#[derive(Debug, Clone)]
pub struct UpdateQuery {
    key: String,
    table: String,
    values: Vec<ColumnValue>,
    conditions: Vec<Condition>,
}

impl UpdateQuery {
    /// Create an update query against `table` on the source identified by
    /// `key`.
    pub fn new(key: impl Into<String>, table: impl Into<String>) -> DbResult<Self> {
        let key = key.into();
        let table = table.into();
        validate_target(&key, &table)?;
        Ok(Self {
            key,
            table,
            values: Vec::new(),
            conditions: Vec::new(),
        })
    }

    /// Set an integer column.
    pub fn set_int(&mut self, column: impl Into<String>, value: i32) -> &mut Self {
        self.push(column, ColumnData::Int(value))
    }

    /// Set a long integer column.
    pub fn set_long(&mut self, column: impl Into<String>, value: i64) -> &mut Self {
        self.push(column, ColumnData::Long(value))
    }

    /// Set a double column.
    pub fn set_double(&mut self, column: impl Into<String>, value: f64) -> &mut Self {
        self.push(column, ColumnData::Double(value))
    }

    /// Set a boolean column.
    pub fn set_bool(&mut self, column: impl Into<String>, value: bool) -> &mut Self {
        self.push(column, ColumnData::Bool(value))
    }

    /// Set a string column.
    pub fn set_text(&mut self, column: impl Into<String>, value: impl Into<String>) -> &mut Self {
        self.push(column, ColumnData::Text(value.into()))
    }

    /// Set a string column to a value encrypted with `encryption_key`.
    pub fn set_encrypted(
        &mut self,
        column: impl Into<String>,
        value: impl Into<String>,
        encryption_key: impl Into<String>,
    ) -> &mut Self {
        self.push(
            column,
            ColumnData::Encrypted {
                value: value.into(),
                key: encryption_key.into(),
            },
        )
    }

    /// Adjust an integer column by `delta` relative to its current value.
    pub fn set_delta(&mut self, column: impl Into<String>, delta: i64) -> &mut Self {
        self.push(column, ColumnData::Delta(delta))
    }

    /// Restrict the update with a condition. Conditions join with `and`.
    pub fn add_condition(&mut self, condition: Condition) -> &mut Self {
        self.conditions.push(condition);
        self
    }

    fn push(&mut self, column: impl Into<String>, data: ColumnData) -> &mut Self {
        self.values
            .push(ColumnValue::new(self.table.clone(), column, data));
        self
    }

    /// The ordered assignments added so far.
    pub fn values(&self) -> &[ColumnValue] {
        &self.values
    }

    /// Execute against the registry and return the affected-row count.
    pub async fn execute(&self, registry: &SourceRegistry) -> DbResult<u64> {
        QueryExecutor::new().execute_update(registry, self).await
    }
}

impl SqlQuery for UpdateQuery {
    fn source_key(&self) -> &str {
        &self.key
    }

    fn build_template(&self, db_name: &str) -> String {
        let assignments: Vec<String> = self
            .values
            .iter()
            .map(|v| v.assignment_fragment())
            .collect();
        format!(
            "update `{}`.`{}` set {}{};",
            db_name,
            self.table,
            assignments.join(","),
            render_where(&self.conditions)
        )
    }

    fn bind_values<'q>(&'q self, query: MySqlQuery<'q>) -> MySqlQuery<'q> {
        let query = self.values.iter().fold(query, |q, v| v.bind(q));
        self.conditions.iter().fold(query, |q, c| c.bind(q))
    }
}

/// Deletes rows from a table.
#[derive(Debug, Clone)]
pub struct DeleteQuery {
    key: String,
    table: String,
    conditions: Vec<Condition>,
}

impl DeleteQuery {
    /// Create a delete query against `table` on the source identified by
    /// `key`.
    pub fn new(key: impl Into<String>, table: impl Into<String>) -> DbResult<Self> {
        let key = key.into();
        let table = table.into();
        validate_target(&key, &table)?;
        Ok(Self {
            key,
            table,
            conditions: Vec::new(),
        })
    }

    /// Restrict the delete with a condition. Conditions join with `and`.
    pub fn add_condition(&mut self, condition: Condition) -> &mut Self {
        self.conditions.push(condition);
        self
    }

    /// Execute against the registry and return the affected-row count.
    pub async fn execute(&self, registry: &SourceRegistry) -> DbResult<u64> {
        QueryExecutor::new().execute_update(registry, self).await
    }
}

impl SqlQuery for DeleteQuery {
    fn source_key(&self) -> &str {
        &self.key
    }

    fn build_template(&self, db_name: &str) -> String {
        format!(
            "delete from `{}`.`{}`{};",
            db_name,
            self.table,
            render_where(&self.conditions)
        )
    }

    fn bind_values<'q>(&'q self, query: MySqlQuery<'q>) -> MySqlQuery<'q> {
        self.conditions.iter().fold(query, |q, c| c.bind(q))
    }
}

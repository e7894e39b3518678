//! Row insertion.

use crate::error::{DbError, DbResult};
use crate::executor::QueryExecutor;
use crate::query::SqlQuery;
use crate::registry::SourceRegistry;
use crate::value::{ColumnData, ColumnValue, MySqlQuery};

/// Inserts one row into a table.
///
/// Columns are added through the typed `add_*` methods; insertion order is
/// bind order. Zero-placeholder values (delta) are structural entries that
/// appear in neither the column list nor the value list.
#[derive(Debug, Clone)]
pub struct InsertQuery {
    key: String,
    table: String,
    values: Vec<ColumnValue>,
}

impl InsertQuery {
    /// Create an insert query against `table` on the source identified by
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
            values: Vec::new(),
        })
    }

    /// Add an integer column value.
    pub fn add_int(&mut self, column: impl Into<String>, value: i32) -> &mut Self {
        self.push(column, ColumnData::Int(value))
    }

    /// Add a long integer column value.
    pub fn add_long(&mut self, column: impl Into<String>, value: i64) -> &mut Self {
        self.push(column, ColumnData::Long(value))
    }

    /// Add a double column value.
    pub fn add_double(&mut self, column: impl Into<String>, value: f64) -> &mut Self {
        self.push(column, ColumnData::Double(value))
    }

    /// Add a boolean column value.
    pub fn add_bool(&mut self, column: impl Into<String>, value: bool) -> &mut Self {
        self.push(column, ColumnData::Bool(value))
    }

    /// Add a string column value.
    pub fn add_text(&mut self, column: impl Into<String>, value: impl Into<String>) -> &mut Self {
        self.push(column, ColumnData::Text(value.into()))
    }

    /// Add a string column value stored encrypted with `encryption_key`.
    /// Renders as `AES_ENCRYPT(?, ?)` and binds the plaintext first, then
    /// the key.
    pub fn add_encrypted(
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

    /// Add a delta entry. Contributes no placeholder and no bound parameter
    /// to the insert.
    pub fn add_delta(&mut self, column: impl Into<String>, delta: i64) -> &mut Self {
        self.push(column, ColumnData::Delta(delta))
    }

    fn push(&mut self, column: impl Into<String>, data: ColumnData) -> &mut Self {
        self.values
            .push(ColumnValue::new(self.table.clone(), column, data));
        self
    }

    /// The ordered column values added so far.
    pub fn values(&self) -> &[ColumnValue] {
        &self.values
    }

    /// Execute against the registry and return the affected-row count.
    pub async fn execute(&self, registry: &SourceRegistry) -> DbResult<u64> {
        QueryExecutor::new().execute_update(registry, self).await
    }
}

impl SqlQuery for InsertQuery {
    fn source_key(&self) -> &str {
        &self.key
    }

    fn build_template(&self, db_name: &str) -> String {
        // Column list and value list come from the same ordered sequence, so
        // position i of one corresponds to position i of the other.
        let placed: Vec<&ColumnValue> = self
            .values
            .iter()
            .filter(|v| v.placeholder_count() > 0)
            .collect();
        let columns: Vec<String> = placed.iter().map(|v| v.qualified_name()).collect();
        let fragments: Vec<&str> = placed
            .iter()
            .filter_map(|v| v.value_fragment())
            .collect();
        format!(
            "insert into `{}`.`{}` ({}) values ({});",
            db_name,
            self.table,
            columns.join(","),
            fragments.join(",")
        )
    }

    fn bind_values<'q>(&'q self, query: MySqlQuery<'q>) -> MySqlQuery<'q> {
        self.values.iter().fold(query, |q, v| v.bind(q))
    }
}

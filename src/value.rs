//! Typed column values.
//!
//! A [`ColumnValue`] is a self-describing unit: it knows how many template
//! placeholders it occupies, how many parameters it binds at execution time,
//! and how to chain those parameters onto a query. Keeping that logic on the
//! variant keeps the query builders free of type dispatch and makes the
//! "placeholders emitted == parameters bound, in the same order" invariant
//! local to each variant.

use sqlx::MySql;
use sqlx::mysql::MySqlArguments;

/// A parameterized MySQL query in the middle of its bind chain.
pub type MySqlQuery<'q> = sqlx::query::Query<'q, MySql, MySqlArguments>;

/// The payload of a column value.
#[derive(Debug, Clone, PartialEq)]
pub enum ColumnData {
    Int(i32),
    Long(i64),
    Double(f64),
    Bool(bool),
    Text(String),
    /// Stored encrypted via `AES_ENCRYPT`. Binds the plaintext first, then
    /// the encryption key.
    Encrypted { value: String, key: String },
    /// An integer adjustment applied to the current column value. Renders as
    /// an arithmetic expression, never as a placeholder, so it binds nothing.
    Delta(i64),
}

/// One value destined for a single table column.
#[derive(Debug, Clone, PartialEq)]
pub struct ColumnValue {
    /// Name of the table, used when rendering the qualified column reference.
    pub table: String,
    /// Name of the column.
    pub column: String,
    pub data: ColumnData,
}

impl ColumnValue {
    /// Create a column value.
    pub fn new(table: impl Into<String>, column: impl Into<String>, data: ColumnData) -> Self {
        Self {
            table: table.into(),
            column: column.into(),
            data,
        }
    }

    /// Fully-qualified column reference, backtick-quoted.
    pub fn qualified_name(&self) -> String {
        format!("`{}`.`{}`", self.table, self.column)
    }

    /// How many placeholder positions this value occupies in a template's
    /// column/value lists. The encrypted variant occupies one position whose
    /// value clause is a two-argument function call; delta occupies none.
    pub fn placeholder_count(&self) -> usize {
        match self.data {
            ColumnData::Delta(_) => 0,
            _ => 1,
        }
    }

    /// How many parameters this value binds at execution time. Always equal
    /// to the number of `?` markers its fragments emit.
    pub fn bound_param_count(&self) -> usize {
        match self.data {
            ColumnData::Delta(_) => 0,
            ColumnData::Encrypted { .. } => 2,
            _ => 1,
        }
    }

    /// The value-clause fragment for insert templates, or `None` for
    /// zero-placeholder variants.
    pub fn value_fragment(&self) -> Option<&'static str> {
        match self.data {
            ColumnData::Delta(_) => None,
            ColumnData::Encrypted { .. } => Some("AES_ENCRYPT(?, ?)"),
            _ => Some("?"),
        }
    }

    /// The `set` fragment for update templates. Delta renders as a literal
    /// arithmetic expression with no placeholder.
    pub fn assignment_fragment(&self) -> String {
        let name = self.qualified_name();
        match &self.data {
            ColumnData::Delta(delta) if *delta < 0 => {
                format!("{} = {} - {}", name, name, delta.unsigned_abs())
            }
            ColumnData::Delta(delta) => format!("{} = {} + {}", name, name, delta),
            ColumnData::Encrypted { .. } => format!("{} = AES_ENCRYPT(?, ?)", name),
            _ => format!("{} = ?", name),
        }
    }

    /// Chain this value's parameters onto the query, in the same order its
    /// fragments emit `?` markers. Consumes exactly
    /// [`bound_param_count`](Self::bound_param_count) slots.
    pub fn bind<'q>(&'q self, query: MySqlQuery<'q>) -> MySqlQuery<'q> {
        match &self.data {
            ColumnData::Int(v) => query.bind(*v),
            ColumnData::Long(v) => query.bind(*v),
            ColumnData::Double(v) => query.bind(*v),
            ColumnData::Bool(v) => query.bind(*v),
            ColumnData::Text(v) => query.bind(v.as_str()),
            ColumnData::Encrypted { value, key } => query.bind(value.as_str()).bind(key.as_str()),
            ColumnData::Delta(_) => query,
        }
    }
}

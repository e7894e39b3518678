//! Named, pooled SQL sources with typed query building.
//!
//! This crate sits between application code and MySQL. It keeps a registry of
//! logical sources - each a named connection pool, reached directly or
//! through a forwarding tunnel - so that every call site targeting the same
//! logical database shares one pool. On top of that it builds parameterized
//! statements from typed column values, so callers never hand-assemble SQL
//! and bindings stay correctly ordered even when a value expands into more
//! than one bound parameter.
//!
//! ```no_run
//! use sqlsource::{InsertQuery, SourceConfig, SourceRegistry};
//!
//! # async fn demo() -> sqlsource::DbResult<()> {
//! let registry = SourceRegistry::new();
//! registry
//!     .attach_if_absent(SourceConfig::new(
//!         "shard1", "db.internal", 3306, "app", "svc", "secret",
//!     )?)
//!     .await?;
//!
//! let mut insert = InsertQuery::new("shard1", "users")?;
//! insert
//!     .add_int("age", 42)
//!     .add_text("name", "Alice")
//!     .add_encrypted("secret", "x", "k");
//! let rows = insert.execute(&registry).await?;
//! # Ok(())
//! # }
//! ```

pub mod config;
pub mod error;
pub mod executor;
pub mod filter;
pub mod query;
pub mod registry;
pub mod tunnel;
pub mod value;

pub use config::{PoolOptions, SourceConfig, TunnelConfig};
pub use error::{DbError, DbResult};
pub use executor::QueryExecutor;
pub use filter::{Comparison, Condition};
pub use query::{DeleteQuery, InsertQuery, SelectCountQuery, SqlQuery, UpdateQuery};
pub use registry::{SourceRegistry, SqlSource};
pub use tunnel::{TunnelHandle, TunnelProvider};
pub use value::{ColumnData, ColumnValue};

//! Query kinds.
//!
//! Every concrete query implements [`SqlQuery`]: render a template, then bind
//! values in template order. The two operations must agree - the number of
//! `?` markers in the rendered template always equals the number of
//! parameters the bind chain lays down, in the same left-to-right order.
//! Templates are rebuilt on every execution; queries are one-shot units with
//! no caching.

pub mod count;
pub mod insert;
pub mod update;

pub use count::SelectCountQuery;
pub use insert::InsertQuery;
pub use update::{DeleteQuery, UpdateQuery};

use crate::value::MySqlQuery;

/// Contract between a query kind and the executor.
pub trait SqlQuery {
    /// Key of the source this query targets.
    fn source_key(&self) -> &str;

    /// Render the SQL template. `db_name` comes from the resolved source
    /// descriptor at execution time.
    fn build_template(&self, db_name: &str) -> String;

    /// Chain all of this query's parameters onto `query`, in the same order
    /// the template emits placeholders.
    fn bind_values<'q>(&'q self, query: MySqlQuery<'q>) -> MySqlQuery<'q>;
}

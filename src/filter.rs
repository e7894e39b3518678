//! Predicate builder for `where` clauses.
//!
//! A [`Condition`] wraps a [`ColumnValue`] with a comparison operator and
//! renders as `` `table`.`column` <op> ? ``. Conditions carry the same
//! placeholder/bind bookkeeping as the values they wrap, so queries can mix
//! them with assignments without special cases.

use crate::error::{DbError, DbResult};
use crate::value::{ColumnData, ColumnValue, MySqlQuery};

/// Comparison operator for a condition.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Comparison {
    Eq,
    Ne,
    Lt,
    Le,
    Gt,
    Ge,
}

impl Comparison {
    /// The SQL symbol for this comparison.
    pub fn symbol(&self) -> &'static str {
        match self {
            Self::Eq => "=",
            Self::Ne => "<>",
            Self::Lt => "<",
            Self::Le => "<=",
            Self::Gt => ">",
            Self::Ge => ">=",
        }
    }
}

/// One predicate over a single column.
#[derive(Debug, Clone)]
pub struct Condition {
    op: Comparison,
    value: ColumnValue,
}

impl Condition {
    /// Create a condition. Delta values are rejected: an adjustment has no
    /// meaning as a comparison operand.
    pub fn new(op: Comparison, value: ColumnValue) -> DbResult<Self> {
        if matches!(value.data, ColumnData::Delta(_)) {
            return Err(DbError::configuration(
                "delta values cannot be used in a condition",
            ));
        }
        Ok(Self { op, value })
    }

    /// Shorthand for an equality condition.
    pub fn equals(value: ColumnValue) -> DbResult<Self> {
        Self::new(Comparison::Eq, value)
    }

    /// Render this condition's template fragment.
    pub fn fragment(&self) -> String {
        let name = self.value.qualified_name();
        match self.value.data {
            ColumnData::Encrypted { .. } => {
                format!("{} {} AES_ENCRYPT(?, ?)", name, self.op.symbol())
            }
            _ => format!("{} {} ?", name, self.op.symbol()),
        }
    }

    /// How many parameters this condition binds.
    pub fn bound_param_count(&self) -> usize {
        self.value.bound_param_count()
    }

    /// Chain this condition's parameters onto the query.
    pub fn bind<'q>(&'q self, query: MySqlQuery<'q>) -> MySqlQuery<'q> {
        self.value.bind(query)
    }
}

/// Render a `where` clause from a condition list, or an empty string when
/// there are no conditions.
pub(crate) fn render_where(conditions: &[Condition]) -> String {
    if conditions.is_empty() {
        return String::new();
    }
    let fragments: Vec<String> = conditions.iter().map(Condition::fragment).collect();
    format!(" where {}", fragments.join(" and "))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_condition_fragment() {
        let cond = Condition::equals(ColumnValue::new("users", "id", ColumnData::Long(7))).unwrap();
        assert_eq!(cond.fragment(), "`users`.`id` = ?");
        assert_eq!(cond.bound_param_count(), 1);
    }

    #[test]
    fn test_condition_operators() {
        let cond = Condition::new(
            Comparison::Ge,
            ColumnValue::new("users", "age", ColumnData::Int(18)),
        )
        .unwrap();
        assert_eq!(cond.fragment(), "`users`.`age` >= ?");
    }

    #[test]
    fn test_encrypted_condition_fragment() {
        let cond = Condition::equals(ColumnValue::new(
            "users",
            "secret",
            ColumnData::Encrypted {
                value: "x".to_string(),
                key: "k".to_string(),
            },
        ))
        .unwrap();
        assert_eq!(cond.fragment(), "`users`.`secret` = AES_ENCRYPT(?, ?)");
        assert_eq!(cond.bound_param_count(), 2);
    }

    #[test]
    fn test_delta_condition_rejected() {
        let result = Condition::equals(ColumnValue::new("users", "age", ColumnData::Delta(1)));
        assert!(matches!(result, Err(DbError::Configuration { .. })));
    }

    #[test]
    fn test_render_where() {
        assert_eq!(render_where(&[]), "");

        let a = Condition::equals(ColumnValue::new("users", "id", ColumnData::Long(7))).unwrap();
        let b = Condition::new(
            Comparison::Gt,
            ColumnValue::new("users", "age", ColumnData::Int(18)),
        )
        .unwrap();
        assert_eq!(
            render_where(&[a, b]),
            " where `users`.`id` = ? and `users`.`age` > ?"
        );
    }
}

//! Integration tests for template rendering and bind bookkeeping across
//! query kinds.

use sqlsource::query::SqlQuery;
use sqlsource::value::{ColumnData, ColumnValue};
use sqlsource::{Comparison, Condition, DeleteQuery, InsertQuery, SelectCountQuery, UpdateQuery};

/// The reference scenario: int, string, and encrypted values into `users`.
#[test]
fn test_insert_reference_scenario() {
    let mut insert = InsertQuery::new("shard1", "users").unwrap();
    insert
        .add_int("age", 42)
        .add_text("name", "Alice")
        .add_encrypted("secret", "x", "k");

    assert_eq!(
        insert.build_template("db"),
        "insert into `db`.`users` (`users`.`age`,`users`.`name`,`users`.`secret`) \
         values (?,?,AES_ENCRYPT(?, ?));"
    );

    // Four parameters bind in order: 42, "Alice", "x", "k".
    let values = insert.values();
    assert_eq!(values[0].data, ColumnData::Int(42));
    assert_eq!(values[1].data, ColumnData::Text("Alice".to_string()));
    assert_eq!(
        values[2].data,
        ColumnData::Encrypted {
            value: "x".to_string(),
            key: "k".to_string(),
        }
    );
    let bound: usize = values.iter().map(|v| v.bound_param_count()).sum();
    assert_eq!(bound, 4);
}

/// For any value sequence, `?` markers in the template equal the sum of
/// per-value bound-parameter contributions.
#[test]
fn test_marker_and_bind_sums_agree_across_kinds() {
    let mut insert = InsertQuery::new("shard1", "events").unwrap();
    insert
        .add_long("id", 1)
        .add_delta("seen", 1)
        .add_encrypted("payload", "data", "k1")
        .add_bool("ack", false)
        .add_double("score", 0.25);

    let template = insert.build_template("db");
    let bound: usize = insert.values().iter().map(|v| v.bound_param_count()).sum();
    assert_eq!(template.matches('?').count(), bound);

    let mut update = UpdateQuery::new("shard1", "events").unwrap();
    update
        .set_delta("seen", 2)
        .set_encrypted("payload", "data", "k1")
        .add_condition(
            Condition::new(
                Comparison::Ge,
                ColumnValue::new("events", "score", ColumnData::Double(0.5)),
            )
            .unwrap(),
        );

    let template = update.build_template("db");
    let bound: usize =
        update.values().iter().map(|v| v.bound_param_count()).sum::<usize>() + 1;
    assert_eq!(template.matches('?').count(), bound);
}

#[test]
fn test_count_and_delete_templates() {
    let mut count = SelectCountQuery::new("shard1", "users").unwrap();
    count.add_condition(
        Condition::equals(ColumnValue::new("users", "age", ColumnData::Int(42))).unwrap(),
    );
    assert_eq!(
        count.build_template("db"),
        "select count(*) from `db`.`users` where `users`.`age` = ?;"
    );

    let mut delete = DeleteQuery::new("shard1", "users").unwrap();
    delete.add_condition(
        Condition::new(
            Comparison::Lt,
            ColumnValue::new("users", "age", ColumnData::Int(18)),
        )
        .unwrap(),
    );
    assert_eq!(
        delete.build_template("db"),
        "delete from `db`.`users` where `users`.`age` < ?;"
    );
}

/// The bind chain accepts every variant without panicking, in template order.
#[test]
fn test_bind_chain_covers_all_variants() {
    let mut insert = InsertQuery::new("shard1", "users").unwrap();
    insert
        .add_int("a", 1)
        .add_long("b", 2)
        .add_double("c", 3.0)
        .add_bool("d", true)
        .add_text("e", "five")
        .add_encrypted("f", "six", "k")
        .add_delta("g", 7);

    let template = insert.build_template("db");
    let _ = insert.bind_values(sqlx::query(&template));
}

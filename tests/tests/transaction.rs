use tests::*;

use pretty_assertions::assert_eq;
use relata::{
    driver::operation::Transaction as TxOp,
    stmt::{Expr, Record},
    Command, Output, Query, Transaction,
};
use serde_json::json;

fn tag(label: &str) -> Command {
    Command::insert("tags", Record::new().with("label", label)).returning(["id"])
}

fn labels(test: &DbTest) -> Vec<Record> {
    test.rows(Query::new("tags").select([Expr::field("label")]).order_by("id"))
}

#[test]
fn failure_rolls_back_every_step() {
    let test = DbTest::new();

    let mut transaction = Transaction::new();
    transaction.push(tag("a"));
    transaction.push(tag("b"));
    transaction.push(tag("a"));
    transaction.push(tag("c"));

    let err = assert_err!(test.db().exec(transaction));
    assert!(err.is_driver_operation_failed());
    assert!(err.to_string().contains("UNIQUE"), "{err}");

    let log = test.log();
    assert_eq!(log.sql().len(), 3);
    assert_eq!(log.failures(), 1);
    assert_eq!(log.transactions(), [TxOp::Start, TxOp::Rollback]);

    assert_empty!(labels(&test));
}

#[test]
fn outputs_are_listed_in_order() {
    let test = DbTest::new();

    let mut transaction = Transaction::new();
    transaction.push(tag("a"));
    transaction.push(Command::update(
        "tags",
        Record::new().with("label", "b"),
        Expr::is_eq(Expr::field("label"), "a"),
    ));
    transaction.push(Query::new("tags").select([Expr::field("label")]));

    let output = test.db().exec(transaction).unwrap();
    assert_eq!(
        output,
        Output::List(vec![
            Output::Key(Record::new().with("id", 1)),
            Output::Count(1),
            Output::Rows(vec![Record::new().with("label", "b")]),
        ])
    );
}

#[test]
fn deferred_step_sees_prior_outputs() {
    let test = DbTest::new();

    let mut transaction = Transaction::new();
    let first = transaction.push(tag("a"));
    transaction.defer_result(move |outputs| {
        let id = outputs[first].key_value("id")?;
        Ok(Command::update(
            "tags",
            Record::new().with("label", "renamed"),
            Expr::is_eq(Expr::field("id"), id),
        )
        .into())
    });

    let output = test.db().exec(transaction).unwrap();
    assert_eq!(output, Output::Count(1));
    assert_eq!(labels(&test), [Record::new().with("label", "renamed")]);
}

#[test]
fn failing_deferred_step_rolls_back() {
    let test = DbTest::new();

    let mut transaction = Transaction::new();
    transaction.push(tag("a"));
    transaction.defer(|_| Err(relata::err!("cannot build the next step")));

    let err = assert_err!(test.db().exec(transaction));
    assert_eq!(err.to_string(), "cannot build the next step");
    assert_eq!(test.log().transactions(), [TxOp::Start, TxOp::Rollback]);
    assert_empty!(labels(&test));
}

#[test]
fn nested_transaction_uses_a_savepoint() {
    let test = DbTest::new();

    let mut inner = Transaction::new();
    inner.push(tag("b"));

    let mut outer = Transaction::new();
    outer.push(tag("a"));
    outer.push(inner);

    test.db().exec(outer).unwrap();

    assert_eq!(
        test.log().transactions(),
        [
            TxOp::Start,
            TxOp::Savepoint(1),
            TxOp::ReleaseSavepoint(1),
            TxOp::Commit,
        ]
    );
    assert_eq!(
        labels(&test),
        [Record::new().with("label", "a"), Record::new().with("label", "b")]
    );
}

#[test]
fn failing_savepoint_unwinds_both_levels() {
    let test = DbTest::new();

    let mut inner = Transaction::new();
    inner.push(tag("b"));
    inner.push(tag("a"));

    let mut outer = Transaction::new();
    outer.push(tag("a"));
    outer.push(inner);

    assert_err!(test.db().exec(outer));
    assert_eq!(
        test.log().transactions(),
        [
            TxOp::Start,
            TxOp::Savepoint(1),
            TxOp::RollbackToSavepoint(1),
            TxOp::Rollback,
        ]
    );
    assert_empty!(labels(&test));
}

#[test]
fn propagating_transaction_runs_inline() {
    let test = DbTest::new();
    let repository = documents();
    let document = repository.entity("document").unwrap();

    // Aggregate creates propagate, so no savepoint is opened for them.
    let mut outer = Transaction::new();
    outer.push(tag("a"));
    outer.push(
        document
            .create(json!({ "status": "new", "items": [{ "qty": 1 }] }))
            .unwrap(),
    );

    test.db().exec(outer).unwrap();
    assert_eq!(test.log().transactions(), [TxOp::Start, TxOp::Commit]);
    assert_eq!(test.log().sql().len(), 3);
}

#[test]
fn connection_is_reusable_after_rollback() {
    let test = DbTest::new();

    let mut transaction = Transaction::new();
    transaction.push(tag("a"));
    transaction.push(tag("a"));
    assert_err!(test.db().exec(transaction));

    test.db().exec(tag("a")).unwrap();
    assert_eq!(labels(&test), [Record::new().with("label", "a")]);
    assert_eq!(test.db().pool().open(), 1);
}

const DEFERRED_DDL: &str = "
    CREATE TABLE parents (id INTEGER PRIMARY KEY);
    CREATE TABLE children (
        id INTEGER PRIMARY KEY,
        parent_id INTEGER REFERENCES parents(id) DEFERRABLE INITIALLY DEFERRED
    );
";

#[test]
fn refused_commit_is_rolled_back() {
    let test = DbTest::with_builder(DEFERRED_DDL, |_| {});
    let db = test.db();

    // The dangling reference is only checked at COMMIT.
    let mut orphan = Transaction::new();
    orphan.push(Command::insert(
        "children",
        Record::new().with("parent_id", 99),
    ));
    let err = assert_err!(db.exec(orphan));
    assert!(err.is_driver_operation_failed());
    assert!(err.to_string().contains("FOREIGN KEY"), "{err}");

    let mut valid = Transaction::new();
    valid.push(Command::insert("parents", Record::new().with("id", 1)));
    valid.push(Command::insert(
        "children",
        Record::new().with("parent_id", 1),
    ));
    db.exec(valid).unwrap();

    assert_eq!(
        test.log().transactions(),
        [
            TxOp::Start,
            TxOp::Commit,
            TxOp::Rollback,
            TxOp::Start,
            TxOp::Commit
        ]
    );
    assert_eq!(
        test.rows(Query::new("children").select([Expr::field("parent_id")])),
        [Record::new().with("parent_id", 1)]
    );
    assert_eq!(db.pool().open(), 1);
}

use tests::*;

use pretty_assertions::assert_eq;
use relata::{
    driver::operation::Transaction as TxOp,
    stmt::{Expr, Record},
    Query,
};
use serde_json::json;

fn seed(test: &DbTest) {
    let repository = documents();
    let document = repository.entity("document").unwrap();

    for (status, owner, qty) in [("new", "Ann", 1), ("new", "Bo", 2), ("done", "Ann", 3)] {
        test.db()
            .exec(
                document
                    .create(json!({
                        "status": status,
                        "owner": { "name": owner },
                        "items": [{ "qty": qty }],
                    }))
                    .unwrap(),
            )
            .unwrap();
    }
}

fn statuses(test: &DbTest) -> Vec<Record> {
    test.rows(
        Query::new("documents")
            .select([Expr::field("id"), Expr::field("status")])
            .order_by("id"),
    )
}

#[test]
fn plain_update_is_a_single_statement() {
    let test = DbTest::new();
    seed(&test);
    let mut log = test.log();
    log.clear();

    let repository = documents();
    let document = repository.entity("document").unwrap();

    let output = test
        .db()
        .exec(
            document
                .update(json!({ "status": "filed" }), Expr::is_eq(Expr::field("status"), "new"))
                .unwrap(),
        )
        .unwrap();

    assert_eq!(output.count().unwrap(), 2);
    assert_eq!(log.sql(), ["UPDATE documents SET status = ? WHERE status = ?"]);
    assert_empty!(log.transactions());
}

#[test]
fn relation_filter_preselects_keys() {
    let test = DbTest::new();
    seed(&test);
    let mut log = test.log();
    log.clear();

    let repository = documents();
    let document = repository.entity("document").unwrap();

    let output = test
        .db()
        .exec(
            document
                .update(
                    json!({ "status": "archived" }),
                    Expr::from_map([("document.owner/name", "Ann")]),
                )
                .unwrap(),
        )
        .unwrap();

    assert_eq!(output.count().unwrap(), 2);

    let sql = log.sql();
    assert_eq!(sql.len(), 2, "{sql:#?}");
    assert!(sql[0].starts_with("SELECT DISTINCT document.id AS \"id\" FROM documents AS document LEFT JOIN people"));
    assert!(sql[1].starts_with("UPDATE documents SET status = ? WHERE id IN"), "{}", sql[1]);
    assert_eq!(log.transactions(), [TxOp::Start, TxOp::Commit]);

    assert_eq!(
        statuses(&test),
        [
            Record::new().with("id", 1).with("status", "archived"),
            Record::new().with("id", 2).with("status", "new"),
            Record::new().with("id", 3).with("status", "archived"),
        ]
    );
}

#[test]
fn relation_filter_matching_nothing() {
    let test = DbTest::new();
    seed(&test);

    let repository = documents();
    let document = repository.entity("document").unwrap();

    let output = test
        .db()
        .exec(
            document
                .update(
                    json!({ "status": "archived" }),
                    Expr::from_map([("document.owner/name", "Nobody")]),
                )
                .unwrap(),
        )
        .unwrap();

    assert_eq!(output.count().unwrap(), 0);
    assert_eq!(statuses(&test)[0], Record::new().with("id", 1).with("status", "new"));
}

#[test]
fn embedded_update_touches_related_rows() {
    let test = DbTest::new();
    seed(&test);

    let repository = documents();
    let document = repository.entity("document").unwrap();

    test.db()
        .exec(
            document
                .update(
                    json!({
                        "owner": { "name": "Ann B." },
                        "items": [{ "id": 1, "qty": 10 }, { "qty": 11 }],
                    }),
                    Expr::is_eq(Expr::field("id"), 1),
                )
                .unwrap(),
        )
        .unwrap();

    let people = test.rows(
        Query::new("people")
            .select([Expr::field("id"), Expr::field("name")])
            .order_by("id"),
    );
    assert_eq!(people[0], Record::new().with("id", 1).with("name", "Ann B."));

    let items = test.rows(
        Query::new("doc_items")
            .select([Expr::field("qty")])
            .restrict(Expr::is_eq(Expr::field("document_id"), 1))
            .order_by("id"),
    );
    assert_eq!(
        items,
        [Record::new().with("qty", 10), Record::new().with("qty", 11)]
    );
}

#[test]
fn null_owner_unlinks() {
    let test = DbTest::new();
    seed(&test);

    let repository = documents();
    let document = repository.entity("document").unwrap();

    test.db()
        .exec(
            document
                .update(json!({ "owner": null }), Expr::is_eq(Expr::field("id"), 2))
                .unwrap(),
        )
        .unwrap();

    let owners = test.rows(
        Query::new("documents")
            .select([Expr::field("owner_id")])
            .restrict(Expr::is_eq(Expr::field("id"), 2)),
    );
    assert_eq!(owners, [Record::new().with("owner_id", relata::stmt::Value::Null)]);
}

#[test]
fn relation_filtered_delete() {
    let test = DbTest::new();
    seed(&test);
    let mut log = test.log();
    log.clear();

    let repository = documents();
    let item = repository.entity("item").unwrap();

    let output = test
        .db()
        .exec(
            item.delete(Expr::is_eq(Expr::field("item.document/status"), "new"))
                .unwrap(),
        )
        .unwrap();

    assert_eq!(output.count().unwrap(), 2);
    assert_eq!(log.sql().len(), 2);
    assert!(log.sql()[1].starts_with("DELETE FROM doc_items WHERE id IN"));

    let remaining = test.rows(Query::new("doc_items").select([Expr::field("qty")]));
    assert_eq!(remaining, [Record::new().with("qty", 3)]);
}

#[test]
fn instance_persist_and_remove() {
    let test = DbTest::new();
    let repository = documents();
    let person = repository.entity("person").unwrap();
    let db = test.db();

    db.exec(person.create(json!({ "name": "Ann" })).unwrap())
        .unwrap();

    let mut connection = db.connection().unwrap();
    let ann = person
        .find(Expr::default())
        .unwrap()
        .fetch_one(&mut connection)
        .unwrap();
    drop(connection);

    let mut value = ann.clone().into_value();
    value.insert("name", "Anna");
    let renamed = relata::Instance::new(person.clone(), value);
    db.exec(renamed.persist().unwrap()).unwrap();

    let rows = test.rows(Query::new("people").select([Expr::field("name")]));
    assert_eq!(rows, [Record::new().with("name", "Anna")]);

    db.exec(ann.remove().unwrap()).unwrap();
    assert_empty!(test.rows(Query::new("people")));
}

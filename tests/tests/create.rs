use tests::*;

use pretty_assertions::assert_eq;
use relata::{
    driver::operation::Transaction as TxOp,
    stmt::{Expr, Record, Value},
    Query,
};
use serde_json::json;

#[test]
fn has_many_items_carry_the_generated_key() {
    let test = DbTest::new();
    let repository = documents();
    let document = repository.entity("document").unwrap();

    let output = test
        .db()
        .exec(
            document
                .create(json!({ "status": "new", "items": [{ "qty": 10 }, { "qty": 20 }] }))
                .unwrap(),
        )
        .unwrap();

    assert_eq!(output.key_value("id").unwrap(), Value::I64(1));
    assert_eq!(
        test.log().sql(),
        [
            "INSERT INTO documents (status) VALUES (?) RETURNING id",
            "INSERT INTO doc_items (qty, document_id) VALUES (?, ?) RETURNING id",
            "INSERT INTO doc_items (qty, document_id) VALUES (?, ?) RETURNING id",
        ]
    );
    assert_eq!(test.log().transactions(), [TxOp::Start, TxOp::Commit]);

    let items = test.rows(
        Query::new("doc_items")
            .select([Expr::field("qty"), Expr::field("document_id")])
            .order_by("id"),
    );
    assert_eq!(
        items,
        [
            Record::new().with("qty", 10).with("document_id", 1),
            Record::new().with("qty", 20).with("document_id", 1),
        ]
    );
}

#[test]
fn flat_create_runs_outside_a_transaction() {
    let test = DbTest::new();
    let repository = documents();
    let person = repository.entity("person").unwrap();

    let output = test
        .db()
        .exec(person.create(json!({ "name": "Ann" })).unwrap())
        .unwrap();

    assert_eq!(output.into_key().unwrap(), Record::new().with("id", 1));
    assert_empty!(test.log().transactions());
}

#[test]
fn owner_then_root_then_dependents_then_links() {
    let test = DbTest::new();
    let repository = documents();
    let document = repository.entity("document").unwrap();
    let tag = repository.entity("tag").unwrap();
    let db = test.db();

    db.exec(tag.create(json!({ "label": "urgent" })).unwrap())
        .unwrap();
    let mut log = test.log();
    log.clear();

    db.exec(
        document
            .create(json!({
                "status": "new",
                "owner": { "name": "Ann" },
                "items": [{ "qty": 1 }],
                "tags": [{ "id": 1 }, { "label": "later" }],
            }))
            .unwrap(),
    )
    .unwrap();

    assert_eq!(
        log.sql(),
        [
            "INSERT INTO people (name) VALUES (?) RETURNING id",
            "INSERT INTO documents (status, owner_id) VALUES (?, ?) RETURNING id",
            "INSERT INTO doc_items (qty, document_id) VALUES (?, ?) RETURNING id",
            "INSERT INTO document_tags (document_id, tag_id) VALUES (?, ?)",
            "INSERT INTO tags (label) VALUES (?) RETURNING id",
            "INSERT INTO document_tags (document_id, tag_id) VALUES (?, ?)",
        ]
    );

    let links = test.rows(
        Query::new("document_tags")
            .select([Expr::field("document_id"), Expr::field("tag_id")])
            .order_by("tag_id"),
    );
    assert_eq!(
        links,
        [
            Record::new().with("document_id", 1).with("tag_id", 1),
            Record::new().with("document_id", 1).with("tag_id", 2),
        ]
    );

    let owners = test.rows(Query::new("documents").select([Expr::field("owner_id")]));
    assert_eq!(owners, [Record::new().with("owner_id", 1)]);
}

#[test]
fn duplicate_link_is_rejected_by_the_join_table() {
    let test = DbTest::new();
    let repository = documents();
    let document = repository.entity("document").unwrap();
    let db = test.db();

    let err = assert_err!(db.exec(
        document
            .create(json!({ "status": "new", "tags": [{ "label": "a" }, { "id": 1 }] }))
            .unwrap(),
    ));
    assert!(err.is_driver_operation_failed());

    // Nothing from the failed aggregate survives.
    assert_empty!(test.rows(Query::new("documents")));
    assert_empty!(test.rows(Query::new("tags")));
}

#[test]
fn prepare_hook_shapes_the_payload() {
    let test = DbTest::new();
    let repository = documents()
        .add(
            relata::Entity::new("person", "people")
                .fields(["name"])
                .prepare(|mut payload| {
                    if let Some(name) = payload.get("name").and_then(|name| name.as_str()) {
                        let trimmed = name.trim().to_string();
                        payload.insert("name", trimmed);
                    }
                    Ok(payload)
                }),
        )
        .unwrap();
    let person = repository.entity("person").unwrap();

    test.db()
        .exec(person.create(json!({ "name": "  Ann  " })).unwrap())
        .unwrap();

    let rows = test.rows(Query::new("people").select([Expr::field("name")]));
    assert_eq!(rows, [Record::new().with("name", "Ann")]);
}

#[test]
fn links_follow_dependents_whatever_the_payload_order() {
    let test = DbTest::new();
    let document = documents().entity("document").unwrap();
    let db = test.db();

    db.exec(
        document
            .create(json!({
                "status": "new",
                "tags": [{ "label": "red" }],
                "items": [{ "qty": 1 }],
                "owner": { "name": "Ann" },
            }))
            .unwrap(),
    )
    .unwrap();

    assert_eq!(
        test.log().sql(),
        [
            "INSERT INTO people (name) VALUES (?) RETURNING id",
            "INSERT INTO documents (status, owner_id) VALUES (?, ?) RETURNING id",
            "INSERT INTO doc_items (qty, document_id) VALUES (?, ?) RETURNING id",
            "INSERT INTO tags (label) VALUES (?) RETURNING id",
            "INSERT INTO document_tags (document_id, tag_id) VALUES (?, ?)",
        ]
    );

    let mut connection = db.connection().unwrap();
    let tags = document
        .find_related("tags", Expr::is_eq(Expr::field("document/status"), "new"))
        .unwrap()
        .fetch(&mut connection)
        .unwrap();
    assert_eq!(tags.len(), 1);
    assert_eq!(tags[0].to_json()["label"], json!("red"));
}

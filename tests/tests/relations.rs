use tests::*;

use pretty_assertions::assert_eq;
use relata::{
    stmt::{Expr, Record, Value},
    Query,
};
use serde_json::json;

fn seed(test: &DbTest) {
    let repository = documents();
    let db = test.db();

    for name in ["Ann", "Bo"] {
        db.exec(repository.entity("person").unwrap().create(json!({ "name": name })).unwrap())
            .unwrap();
    }
    for label in ["red", "blue"] {
        db.exec(repository.entity("tag").unwrap().create(json!({ "label": label })).unwrap())
            .unwrap();
    }
    db.exec(
        repository
            .entity("document")
            .unwrap()
            .create(json!({ "status": "new" }))
            .unwrap(),
    )
    .unwrap();
    db.exec(
        repository
            .entity("item")
            .unwrap()
            .create(json!({ "qty": 4 }))
            .unwrap(),
    )
    .unwrap();
}

fn column(test: &DbTest, table: &str, column: &str) -> Vec<Record> {
    test.rows(Query::new(table).select([Expr::field(column)]).order_by("id"))
}

#[test]
fn belongs_to_link_and_unlink() {
    let test = DbTest::new();
    seed(&test);

    let repository = documents();
    let document = repository.entity("document").unwrap();
    let db = test.db();

    db.exec(document.create_relation("owner", 1, 2).unwrap()).unwrap();
    assert_eq!(
        column(&test, "documents", "owner_id"),
        [Record::new().with("owner_id", 2)]
    );

    // Unlinking a different owner leaves the row alone.
    let output = db.exec(document.delete_relation("owner", 1, 1).unwrap()).unwrap();
    assert_eq!(output.count().unwrap(), 0);

    db.exec(document.delete_relation("owner", 1, 2).unwrap()).unwrap();
    assert_eq!(
        column(&test, "documents", "owner_id"),
        [Record::new().with("owner_id", Value::Null)]
    );
}

#[test]
fn has_many_link_points_the_target_at_the_owner() {
    let test = DbTest::new();
    seed(&test);

    let repository = documents();
    let document = repository.entity("document").unwrap();
    let db = test.db();

    db.exec(document.create_relation("items", 1, 1).unwrap()).unwrap();
    assert_eq!(
        column(&test, "doc_items", "document_id"),
        [Record::new().with("document_id", 1)]
    );

    db.exec(document.delete_relation("items", 1, 1).unwrap()).unwrap();
    assert_eq!(
        column(&test, "doc_items", "document_id"),
        [Record::new().with("document_id", Value::Null)]
    );
}

#[test]
fn many_to_many_link_rows() {
    let test = DbTest::new();
    seed(&test);

    let repository = documents();
    let document = repository.entity("document").unwrap();
    let db = test.db();

    db.exec(document.create_relation("tags", 1, 1).unwrap()).unwrap();
    db.exec(document.create_relation("tags", 1, 2).unwrap()).unwrap();

    let err = assert_err!(db.exec(document.create_relation("tags", 1, 2).unwrap()));
    assert!(err.is_driver_operation_failed());

    let output = db.exec(document.delete_relation("tags", 1, 1).unwrap()).unwrap();
    assert_eq!(output.count().unwrap(), 1);

    let links = test.rows(Query::new("document_tags").select([Expr::field("tag_id")]));
    assert_eq!(links, [Record::new().with("tag_id", 2)]);
}

#[test]
fn many_to_many_update_replaces_links() {
    let test = DbTest::new();
    seed(&test);

    let repository = documents();
    let document = repository.entity("document").unwrap();
    let db = test.db();

    for _ in 0..2 {
        db.exec(
            document
                .update(
                    json!({ "tags": [{ "id": 1, "label": "crimson" }] }),
                    Expr::is_eq(Expr::field("id"), 1),
                )
                .unwrap(),
        )
        .unwrap();
    }

    let links = test.rows(Query::new("document_tags").select([Expr::field("tag_id")]));
    assert_eq!(links, [Record::new().with("tag_id", 1)]);
    assert_eq!(
        column(&test, "tags", "label"),
        [Record::new().with("label", "crimson"), Record::new().with("label", "blue")]
    );
}

#[test]
fn unknown_relation_lists_the_declared_ones() {
    let repository = documents();
    let document = repository.entity("document").unwrap();

    let err = assert_err!(document.create_relation("reviewers", 1, 1));
    assert!(err.is_unsupported_query());
    assert!(err.to_string().contains("owner"), "{err}");
}

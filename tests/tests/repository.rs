use tests::*;

use pretty_assertions::assert_eq;
use relata::{stmt::Expr, Repository};
use serde_json::json;

const MAPPING: &str = r#"
[[entities]]
name = "person"
table = "people"
fields = ["name"]

[[entities]]
name = "open_document"
table = "documents"
fields = ["status", "owner_id"]
filter = { status = "new" }

[entities.relations.owner]
kind = "belongs-to"
entity = "person"
foreign-key = "owner_id"
eager = true

[entities.relations.items]
kind = "has-many"
entity = "item"
foreign-key = "document_id"
filter = { qty = { ">" = 1 } }

[[entities]]
name = "item"
table = "doc_items"
fields = ["qty", "document_id"]
"#;

fn seed(test: &DbTest) {
    let repository = documents();
    let document = repository.entity("document").unwrap();

    for (status, qty) in [("new", 1), ("new", 2), ("done", 3)] {
        test.db()
            .exec(
                document
                    .create(json!({
                        "status": status,
                        "owner": { "name": format!("owner of {qty}") },
                        "items": [{ "qty": qty }],
                    }))
                    .unwrap(),
            )
            .unwrap();
    }
}

#[test]
fn persistent_filter_scopes_reads_and_writes() {
    let test = DbTest::new();
    seed(&test);

    let repository = Repository::from_toml(MAPPING).unwrap();
    let open = repository.entity("open_document").unwrap();
    let db = test.db();

    let mut connection = db.connection().unwrap();
    let found = open
        .find(Expr::default())
        .unwrap()
        .order_by("id")
        .fetch(&mut connection)
        .unwrap();
    drop(connection);

    assert_eq!(found.len(), 2);
    assert_eq!(found[1].to_json()["owner"]["name"], json!("owner of 2"));

    // The done document is outside the entity and is left untouched.
    let output = db
        .exec(open.update(json!({ "status": "review" }), Expr::default()).unwrap())
        .unwrap();
    assert_eq!(output.count().unwrap(), 2);

    let mut connection = db.connection().unwrap();
    assert_eq!(
        open.find(Expr::default())
            .unwrap()
            .fetch_count(&mut connection)
            .unwrap(),
        0
    );
}

#[test]
fn relation_filter_applies_to_navigation() {
    let test = DbTest::new();
    seed(&test);

    let repository = Repository::from_toml(MAPPING).unwrap();
    let open = repository.entity("open_document").unwrap();

    let mut connection = test.db().connection().unwrap();
    let items = open
        .find_related("items", Expr::default())
        .unwrap()
        .fetch(&mut connection)
        .unwrap();

    // Document 1's item fails the relation filter; document 3 is not open.
    assert_eq!(items.len(), 1);
    assert_eq!(items[0].to_json()["qty"], json!(2));
}

#[test]
fn subsets_drop_dangling_relations() {
    let repository = Repository::from_toml(MAPPING).unwrap();

    let only = repository.only(["open_document", "person"]).unwrap();
    let open = only.entity("open_document").unwrap();
    assert!(open.has_relation("owner"));
    assert!(!open.has_relation("items"));

    let without_people = repository.except(["person"]).unwrap();
    assert!(!without_people
        .entity("open_document")
        .unwrap()
        .has_relation("owner"));
    assert!(without_people
        .entity("person")
        .unwrap_err()
        .is_invalid_mapping());
}

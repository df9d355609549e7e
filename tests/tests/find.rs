use tests::*;

use pretty_assertions::assert_eq;
use relata::{
    stmt::{Expr, Record, Value},
    Command, Entity, Instance, Relation, Repository,
};
use serde_json::json;

fn seed(test: &DbTest) {
    let repository = documents();
    let employee = repository.entity("employee").unwrap();
    let db = test.db();

    db.exec(
        employee
            .create(json!({ "title": "CTO", "person": { "name": "Jane Doe" } }))
            .unwrap(),
    )
    .unwrap();
    db.exec(
        employee
            .create(json!({ "title": "Engineer", "person": { "name": "John Roe" } }))
            .unwrap(),
    )
    .unwrap();
    db.exec(employee.create(json!({ "title": "Intern" })).unwrap())
        .unwrap();
}

#[test]
fn eager_relation_is_joined_and_nested() {
    let test = DbTest::new();
    seed(&test);
    let mut log = test.log();
    log.clear();

    let repository = documents();
    let employee = repository.entity("employee").unwrap();

    let query = employee
        .find(Expr::from_map([("employee.person/name", "Jane Doe")]))
        .unwrap();
    let mut connection = test.db().connection().unwrap();
    let found = query.fetch(&mut connection).unwrap();

    assert_eq!(found.len(), 1);
    assert_eq!(
        found[0].to_json(),
        json!({
            "id": 1,
            "title": "CTO",
            "person_id": 1,
            "person": { "id": 1, "name": "Jane Doe" },
        })
    );

    let sql = log.sql();
    assert_eq!(sql.len(), 1);
    assert!(
        sql[0].contains(
            "FROM employees AS employee \
             LEFT JOIN people AS \"employee.person\" ON employee.person_id = \"employee.person\".id \
             WHERE \"employee.person\".name = ?"
        ),
        "{}",
        sql[0]
    );
}

#[test]
fn unmatched_eager_relation_is_null() {
    let test = DbTest::new();
    seed(&test);

    let repository = documents();
    let employee = repository.entity("employee").unwrap();
    let mut connection = test.db().connection().unwrap();

    let intern = employee
        .find(Expr::is_eq(Expr::field("title"), "Intern"))
        .unwrap()
        .fetch_one(&mut connection)
        .unwrap();

    assert_eq!(assert_some!(intern.get("person")), &Value::Null);
    assert_eq!(assert_some!(intern.key()), &Value::I64(3));

    let unsaved = Instance::new(employee.clone(), Record::new().with("title", "Temp"));
    assert_none!(unsaved.key());
    assert!(assert_err!(unsaved.remove()).is_invalid_statement());
}

#[test]
fn order_limit_and_count() {
    let test = DbTest::new();
    seed(&test);

    let repository = documents();
    let employee = repository.entity("employee").unwrap();
    let mut connection = test.db().connection().unwrap();

    let query = employee
        .find(Expr::default())
        .unwrap()
        .order_by("employee.person/name desc");

    let names = query
        .clone()
        .limit(2)
        .fetch(&mut connection)
        .unwrap()
        .iter()
        .map(|instance| instance.to_json()["person"]["name"].clone())
        .collect::<Vec<_>>();
    assert_eq!(names, [json!("John Roe"), json!("Jane Doe")]);

    assert_eq!(query.fetch_count(&mut connection).unwrap(), 3);
    assert_eq!(
        employee
            .find(Expr::is_eq(Expr::field("employee.person/name"), "Nobody"))
            .unwrap()
            .fetch_count(&mut connection)
            .unwrap(),
        0
    );
}

#[test]
fn fetch_one_without_rows() {
    let test = DbTest::new();
    let repository = documents();
    let person = repository.entity("person").unwrap();
    let mut connection = test.db().connection().unwrap();

    let err = assert_err!(person
        .find(Expr::is_eq(Expr::field("name"), "Nobody"))
        .unwrap()
        .fetch_one(&mut connection));
    assert!(err.is_record_not_found());
}

#[test]
fn find_related_navigates_each_kind() {
    let test = DbTest::new();
    let repository = documents();
    let document = repository.entity("document").unwrap();
    let item = repository.entity("item").unwrap();
    let db = test.db();

    db.exec(
        document
            .create(json!({
                "status": "new",
                "owner": { "name": "Ann" },
                "items": [{ "qty": 10 }, { "qty": 20 }],
                "tags": [{ "label": "red" }, { "label": "blue" }],
            }))
            .unwrap(),
    )
    .unwrap();
    db.exec(
        document
            .create(json!({ "status": "done", "items": [{ "qty": 30 }] }))
            .unwrap(),
    )
    .unwrap();

    let mut connection = db.connection().unwrap();

    let items = document
        .find_related(
            "items",
            Expr::and(
                Expr::gt(Expr::field("qty"), 15),
                Expr::is_eq(Expr::field("document/status"), "new"),
            ),
        )
        .unwrap()
        .fetch(&mut connection)
        .unwrap();
    assert_eq!(items.len(), 1);
    assert_eq!(items[0].to_json()["qty"], json!(20));

    let owners = item
        .find_related("document", Expr::is_eq(Expr::field("item/qty"), 30))
        .unwrap()
        .fetch(&mut connection)
        .unwrap();
    assert_eq!(owners.len(), 1);
    assert_eq!(owners[0].to_json()["status"], json!("done"));

    let mut labels = document
        .find_related("tags", Expr::is_eq(Expr::field("document/status"), "new"))
        .unwrap()
        .fetch(&mut connection)
        .unwrap()
        .iter()
        .map(|tag| tag.to_json()["label"].clone())
        .collect::<Vec<_>>();
    labels.sort_by_key(|label| label.to_string());
    assert_eq!(labels, [json!("blue"), json!("red")]);
}

#[test]
fn instance_related_pins_its_key() {
    let test = DbTest::new();
    let repository = documents();
    let document = repository.entity("document").unwrap();
    let db = test.db();

    for qty in [1, 2] {
        db.exec(
            document
                .create(json!({ "status": "new", "items": [{ "qty": qty }] }))
                .unwrap(),
        )
        .unwrap();
    }

    let mut connection = db.connection().unwrap();
    let first = document
        .find(Expr::default())
        .unwrap()
        .order_by("id")
        .fetch_one(&mut connection)
        .unwrap();

    let items = first
        .related("items", Expr::default())
        .unwrap()
        .fetch(&mut connection)
        .unwrap();
    assert_eq!(items.len(), 1);
    assert_eq!(items[0].to_json()["qty"], json!(1));
}

const STAFF_DDL: &str = "
    CREATE TABLE teams (
        id INTEGER PRIMARY KEY,
        active BOOLEAN NOT NULL
    );
    CREATE TABLE people (
        id INTEGER PRIMARY KEY,
        name TEXT NOT NULL,
        team_id INTEGER REFERENCES teams (id)
    );
    CREATE TABLE employees (
        id INTEGER PRIMARY KEY,
        title TEXT,
        person_id INTEGER REFERENCES people (id),
        supervisor_id INTEGER REFERENCES employees (id)
    );
";

fn seed_staff(test: &DbTest) {
    let db = test.db();

    for (id, active) in [(1, true), (2, false)] {
        db.exec(Command::insert(
            "teams",
            Record::new().with("id", id).with("active", active),
        ))
        .unwrap();
    }
    for (id, name) in [(1, "Jane Doe"), (2, "John Roe")] {
        db.exec(Command::insert(
            "people",
            Record::new().with("id", id).with("name", name).with("team_id", id),
        ))
        .unwrap();
    }
    db.exec(Command::insert(
        "employees",
        Record::new().with("id", 1).with("title", "CTO").with("person_id", 1),
    ))
    .unwrap();
    db.exec(Command::insert(
        "employees",
        Record::new()
            .with("id", 2)
            .with("title", "Engineer")
            .with("person_id", 2)
            .with("supervisor_id", 1),
    ))
    .unwrap();
}

#[test]
fn eager_self_relation_nests_one_level() {
    let test = DbTest::with_builder(STAFF_DDL, |_| {});
    seed_staff(&test);

    // Only the entity is kept; the repository handle is dropped here.
    let employee = Repository::new([
        Entity::new("person", "people").fields(["name", "team_id"]),
        Entity::new("employee", "employees")
            .fields(["title", "person_id", "supervisor_id"])
            .relation(Relation::belongs_to("person", "person", "person_id").eager())
            .relation(Relation::belongs_to("supervisor", "employee", "supervisor_id").eager()),
    ])
    .unwrap()
    .entity("employee")
    .unwrap();

    let mut connection = test.db().connection().unwrap();
    let found = employee
        .find(true)
        .unwrap()
        .order_by("id")
        .fetch(&mut connection)
        .unwrap();

    assert_eq!(found.len(), 2);
    assert_eq!(found[0].to_json()["supervisor"], json!(null));

    let engineer = found[1].to_json();
    assert_eq!(engineer["person"]["name"], json!("John Roe"));
    assert_eq!(engineer["supervisor"]["title"], json!("CTO"));
    assert_eq!(engineer["supervisor"]["person"]["name"], json!("Jane Doe"));
    assert_none!(engineer["supervisor"].get("supervisor"));
}

#[test]
fn target_filter_through_a_relation_scopes_the_join() {
    let test = DbTest::with_builder(STAFF_DDL, |_| {});
    seed_staff(&test);

    let repository = Repository::new([
        Entity::new("team", "teams").fields(["active"]),
        Entity::new("person", "people")
            .fields(["name", "team_id"])
            .filter(Expr::is_eq(Expr::field("person.team/active"), true))
            .relation(Relation::belongs_to("team", "team", "team_id")),
        Entity::new("employee", "employees")
            .fields(["title", "person_id"])
            .relation(Relation::belongs_to("person", "person", "person_id").eager()),
    ])
    .unwrap();
    let employee = repository.entity("employee").unwrap();

    let mut connection = test.db().connection().unwrap();
    let found = employee
        .find(true)
        .unwrap()
        .order_by("id")
        .fetch(&mut connection)
        .unwrap();

    // The person on an inactive team is outside the entity, but the
    // employee row still comes back.
    assert_eq!(found.len(), 2);
    assert_eq!(
        found[0].to_json()["person"],
        json!({ "id": 1, "name": "Jane Doe", "team_id": 1 })
    );
    assert_eq!(found[1].to_json()["person"], json!(null));
    assert_eq!(found[1].to_json()["title"], json!("Engineer"));
}

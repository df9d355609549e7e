use tests::*;

use pretty_assertions::assert_eq;
use relata::{
    db::{Builder, Config, Registry},
    driver::{Driver, SqlFlavor},
    stmt::{Expr, Record},
    Db, Query,
};
use relata_driver_sqlite::Sqlite;
use std::time::{Duration, Instant};

#[test]
fn in_memory_pool_times_out_while_its_connection_is_held() {
    let test = DbTest::with_builder(DOCUMENTS_DDL, |builder| {
        builder.acquire_timeout(Duration::from_millis(50));
    });
    let db = test.db();
    assert_eq!(db.pool().max_size(), 1);

    let held = db.connection().unwrap();

    let started = Instant::now();
    let err = assert_err!(db.connection());
    assert!(err.is_connection_pool());
    assert!(started.elapsed() >= Duration::from_millis(50));

    drop(held);
    assert_ok!(db.connection());
    assert_eq!(db.pool().open(), 1);
}

#[test]
fn waiting_caller_gets_the_returned_connection() {
    let test = DbTest::new();
    let db = test.db().clone();

    let held = db.connection().unwrap();
    let waiter = std::thread::spawn({
        let db = db.clone();
        move || db.connection().map(|_| ())
    });

    std::thread::sleep(Duration::from_millis(20));
    drop(held);

    assert_ok!(waiter.join().unwrap());
}

#[test]
fn connect_resolves_the_url_scheme() {
    let db = Db::connect("sqlite::memory:").unwrap();
    assert_eq!(db.capability().sql_flavor, SqlFlavor::Sqlite);

    let mut connection = db.connection().unwrap();
    connection
        .execute_sql("CREATE TABLE notes (id INTEGER PRIMARY KEY, body TEXT)")
        .unwrap();
    drop(connection);

    db.exec(relata::Command::insert("notes", Record::new().with("body", "hi")))
        .unwrap();

    let mut connection = db.connection().unwrap();
    let rows = Query::new("notes")
        .select([Expr::field("body")])
        .fetch(&mut connection)
        .unwrap();
    assert_eq!(rows, [Record::new().with("body", "hi")]);
}

#[test]
fn unknown_scheme_is_rejected() {
    let err = assert_err!(Db::connect("mysql://localhost/app"));
    assert!(err.is_invalid_connection_url());

    let err = assert_err!(Db::connect("sqlite"));
    assert!(err.is_invalid_connection_url());
}

#[test]
fn builder_from_toml_config() {
    let config = Config::from_toml(
        r#"
        url = "sqlite::memory:"

        [pool]
        max-size = 8
        acquire-timeout-ms = 100
        "#,
    )
    .unwrap();

    let db = Builder::from_config(&config).build().unwrap();

    // The in-memory driver caps the pool below the configured size.
    assert_eq!(db.pool().max_size(), 1);
}

#[test]
fn custom_registry_scheme() {
    let mut registry = Registry::empty();
    registry.register("scratch", |_| Ok(Box::new(Sqlite::in_memory()) as Box<dyn Driver>));

    let db = Db::builder()
        .url("scratch:anything")
        .registry(registry)
        .build()
        .unwrap();
    assert_ok!(db.connection());

    let err = assert_err!(Db::builder().url("sqlite::memory:").registry(Registry::empty()).build());
    assert!(err.is_invalid_connection_url());
}

#[test]
fn builder_needs_a_url_or_driver() {
    assert_err!(Db::builder().build());
}

use crate::{logging_driver::DriverOp, ExecLog, LoggingDriver};

use parking_lot::Mutex;
use relata::{db::Builder, stmt::Record, Db, Entity, Query, Relation, Repository};
use relata_driver_sqlite::Sqlite;
use std::sync::Arc;

/// Tables backing [`documents`].
pub const DOCUMENTS_DDL: &str = "
    CREATE TABLE people (
        id INTEGER PRIMARY KEY,
        name TEXT NOT NULL
    );
    CREATE TABLE employees (
        id INTEGER PRIMARY KEY,
        title TEXT,
        person_id INTEGER REFERENCES people (id)
    );
    CREATE TABLE documents (
        id INTEGER PRIMARY KEY,
        status TEXT NOT NULL,
        owner_id INTEGER REFERENCES people (id)
    );
    CREATE TABLE doc_items (
        id INTEGER PRIMARY KEY,
        qty INTEGER NOT NULL,
        document_id INTEGER REFERENCES documents (id)
    );
    CREATE TABLE tags (
        id INTEGER PRIMARY KEY,
        label TEXT NOT NULL UNIQUE
    );
    CREATE TABLE document_tags (
        document_id INTEGER NOT NULL REFERENCES documents (id),
        tag_id INTEGER NOT NULL REFERENCES tags (id),
        PRIMARY KEY (document_id, tag_id)
    );
";

/// People, their employee records, and documents with items and tags.
pub fn documents() -> Repository {
    Repository::new([
        Entity::new("person", "people").fields(["name"]),
        Entity::new("employee", "employees")
            .fields(["title", "person_id"])
            .relation(Relation::belongs_to("person", "person", "person_id").eager()),
        Entity::new("document", "documents")
            .fields(["status", "owner_id"])
            .relation(Relation::belongs_to("owner", "person", "owner_id"))
            .relation(Relation::has_many("items", "item", "document_id"))
            .relation(Relation::many_to_many(
                "tags",
                "tag",
                "document_tags",
                "document_id",
                "tag_id",
            )),
        Entity::new("item", "doc_items")
            .fields(["qty", "document_id"])
            .relation(Relation::belongs_to("document", "document", "document_id")),
        Entity::new("tag", "tags").fields(["label"]),
    ])
    .unwrap()
}

/// An in-memory SQLite database with every driver operation logged.
pub struct DbTest {
    db: Db,
    ops_log: Arc<Mutex<Vec<DriverOp>>>,
}

impl DbTest {
    /// A database holding the [`documents`] tables.
    pub fn new() -> DbTest {
        DbTest::with_builder(DOCUMENTS_DDL, |_| {})
    }

    /// Creates the tables in `ddl` after `configure` has adjusted the
    /// builder. The log starts out empty.
    pub fn with_builder(ddl: &str, configure: impl FnOnce(&mut Builder)) -> DbTest {
        let driver = LoggingDriver::new(Sqlite::in_memory());
        let ops_log = driver.ops_log_handle();

        let mut builder = Db::builder();
        builder.driver(driver);
        configure(&mut builder);
        let db = builder.build().unwrap();

        {
            let mut connection = db.connection().unwrap();
            for statement in ddl.split(';').map(str::trim).filter(|s| !s.is_empty()) {
                connection.execute_sql(statement).unwrap();
            }
        }

        ops_log.lock().clear();
        DbTest { db, ops_log }
    }

    pub fn db(&self) -> &Db {
        &self.db
    }

    /// Get the operations log for assertions
    pub fn log(&self) -> ExecLog {
        ExecLog::new(self.ops_log.clone())
    }

    /// Runs `query` directly, bypassing the entity layer.
    pub fn rows(&self, query: Query) -> Vec<Record> {
        let mut connection = self.db.connection().unwrap();
        query.fetch(&mut connection).unwrap()
    }
}

impl Default for DbTest {
    fn default() -> DbTest {
        DbTest::new()
    }
}

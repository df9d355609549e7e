pub mod db;
pub use db::Db;

mod engine;
pub use engine::{EntityQuery, Instance, Materialize, NestedRecords};

pub mod schema;
pub use schema::{Entity, Relation, RelationKind, Repository};

pub mod stmt;
pub use stmt::{Command, Output, Query, Step, Transaction};

pub use relata_core::{bail, driver, err, Error, Result};
pub use relata_sql::{Compiled, Serializer};

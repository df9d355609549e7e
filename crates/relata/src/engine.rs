//! Entity-level operations.
//!
//! Reads are planned into a single joined `SELECT`. Aggregate writes become
//! a [`Transaction`](crate::Transaction) whose steps are ordered by the
//! direction of each relation: rows the root points at are written first,
//! then the root, then rows pointing at the root, then join-table links.

mod create;

mod find;
pub use find::EntityQuery;

mod instance;
pub use instance::{Instance, Materialize, NestedRecords};

mod link;

mod mutate;

mod plan;

use crate::{
    schema::Entity,
    stmt::{Command, Step},
    Result,
};

use relata_core::stmt::{Expr, Record, Value};

impl Entity {
    /// Builds a query over this entity. Eager relations are joined, and so
    /// is every relation the filter, ordering or projection refers to.
    ///
    /// Unqualified fields belong to the entity itself; related fields are
    /// qualified by their alias path, e.g. `employee.person/name`.
    pub fn find(&self, filter: impl Into<Expr>) -> Result<EntityQuery> {
        let query = EntityQuery::new(self.clone()).restrict(filter);
        query.build()?;
        Ok(query)
    }

    /// Builds a query over the target of `relation`, restricted to rows
    /// related to the rows of this entity that match `filter`.
    ///
    /// Unqualified fields belong to the related entity. Conjuncts that only
    /// reference the related entity filter it directly; the rest select the
    /// rows of this entity to navigate from.
    pub fn find_related(&self, relation: &str, filter: impl Into<Expr>) -> Result<EntityQuery> {
        find::find_related(self, relation, filter.into())
    }

    /// Inserts `payload`, together with any related rows embedded under a
    /// relation name.
    ///
    /// Without embedded relations this is a single insert. Otherwise the
    /// result is a transaction whose visible output is the root row's key.
    pub fn create(&self, payload: impl Into<Value>) -> Result<Step> {
        create::create(self, payload.into().into_record()?)
    }

    /// Updates every row matching `filter` with `payload`.
    ///
    /// Filters that reach into related entities, and payloads that embed
    /// related rows, first select the matching keys. The visible output is
    /// the number of updated rows.
    pub fn update(&self, payload: impl Into<Value>, filter: impl Into<Expr>) -> Result<Step> {
        mutate::update(self, payload.into().into_record()?, filter.into())
    }

    /// Deletes every row matching `filter`.
    pub fn delete(&self, filter: impl Into<Expr>) -> Result<Step> {
        mutate::delete(self, filter.into())
    }

    /// Links the row keyed `key` to the target row keyed `related`.
    pub fn create_relation(
        &self,
        relation: &str,
        key: impl Into<Value>,
        related: impl Into<Value>,
    ) -> Result<Command> {
        link::create_relation(self, relation, key.into(), related.into())
    }

    /// Removes the link between the row keyed `key` and the target row
    /// keyed `related`.
    pub fn delete_relation(
        &self,
        relation: &str,
        key: impl Into<Value>,
        related: impl Into<Value>,
    ) -> Result<Command> {
        link::delete_relation(self, relation, key.into(), related.into())
    }
}

/// The insert of one row, reporting its primary key.
fn insert(entity: &Entity, record: Record) -> Command {
    Command::insert(entity.table(), record).returning([entity.primary_key_column()])
}

/// A non-null primary key, when `record` holds nothing else.
fn key_only(record: &Record, primary_key: &str) -> Option<Value> {
    match record.get(primary_key) {
        Some(key) if !key.is_null() && record.len() == 1 => Some(key.clone()),
        _ => None,
    }
}

fn key_of(record: &Record, primary_key: &str) -> Option<Value> {
    record.get(primary_key).filter(|key| !key.is_null()).cloned()
}

/// Records embedded under a relation name: one record, a list of records, or
/// null for none.
fn embedded(value: Value) -> Result<Vec<Record>> {
    match value {
        Value::Null => Ok(vec![]),
        Value::List(items) => items.into_iter().map(Value::into_record).collect(),
        value => Ok(vec![value.into_record()?]),
    }
}

use super::find::EntityQuery;
use crate::{schema::Entity, stmt::Step, Result};

use relata_core::{
    stmt::{Expr, Namespace, Path, Record, Value},
    Error,
};

/// Turns a flat result row into an [`Instance`].
pub trait Materialize {
    fn materialize(&self, entity: &Entity, row: Record) -> Result<Instance>;
}

/// Nests relation columns under their relation name.
///
/// A column labeled `person/name` becomes field `name` of a nested record
/// `person`; `person.team/label` nests one level deeper. A nested record whose
/// columns are all null (an unmatched outer join) becomes null. Each record
/// is passed through its entity's transform.
#[derive(Debug, Default, Clone, Copy)]
pub struct NestedRecords;

impl Materialize for NestedRecords {
    fn materialize(&self, entity: &Entity, row: Record) -> Result<Instance> {
        let mut value = Record::new();

        for (label, column) in row {
            match label.split_once('/') {
                Some((namespace, name)) => {
                    let namespace = Namespace::parse(namespace);
                    nest(&mut value, namespace.segments(), name, column)?;
                }
                None => {
                    value.insert(label, column);
                }
            }
        }

        Ok(Instance::new(entity.clone(), finish(entity, value)))
    }
}

fn nest(record: &mut Record, segments: &[String], name: &str, column: Value) -> Result<()> {
    let Some((first, rest)) = segments.split_first() else {
        record.insert(name, column);
        return Ok(());
    };

    if !record.contains_key(first) {
        record.insert(first.as_str(), Record::new());
    }

    match record.get_mut(first).and_then(Value::as_record_mut) {
        Some(nested) => nest(nested, rest, name, column),
        None => Err(Error::type_conversion(
            record[first.as_str()].clone(),
            "Record",
        )),
    }
}

/// Collapses unmatched relations and applies transforms, innermost first.
fn finish(entity: &Entity, record: Record) -> Record {
    let record = record
        .into_iter()
        .map(|(name, value)| {
            let value = match value {
                Value::Record(nested) => {
                    let nested = match entity.get_relation(&name).and_then(|rel| entity.target(rel)) {
                        Ok(target) => finish(&target, nested),
                        Err(_) => nested,
                    };

                    if nested.values().all(Value::is_null) {
                        Value::Null
                    } else {
                        Value::Record(nested)
                    }
                }
                value => value,
            };
            (name, value)
        })
        .collect();

    entity.transform_row(record)
}

/// A row of an entity, together with the entity it was read from.
#[derive(Debug, Clone)]
pub struct Instance {
    value: Record,
    entity: Entity,
}

impl Instance {
    pub fn new(entity: Entity, value: Record) -> Instance {
        Instance { value, entity }
    }

    pub fn entity(&self) -> &Entity {
        &self.entity
    }

    pub fn value(&self) -> &Record {
        &self.value
    }

    pub fn into_value(self) -> Record {
        self.value
    }

    pub fn get(&self, name: &str) -> Option<&Value> {
        self.value.get(name)
    }

    /// The primary key, if the row has a non-null one.
    pub fn key(&self) -> Option<&Value> {
        self.value
            .get(self.entity.primary_key_column())
            .filter(|key| !key.is_null())
    }

    pub fn to_json(&self) -> serde_json::Value {
        Value::Record(self.value.clone()).into()
    }

    /// Writes the entity's own columns back: an update by primary key when
    /// the row has one, a create otherwise.
    pub fn persist(&self) -> Result<Step> {
        let columns = self
            .entity
            .columns()
            .filter(|column| self.value.contains_key(column));

        match self.key() {
            Some(key) => {
                let primary_key = self.entity.primary_key_column();
                let payload = self
                    .value
                    .project(columns.filter(|column| *column != primary_key));

                self.entity
                    .update(payload, Expr::is_eq(Expr::field(primary_key), key.clone()))
            }
            None => self.entity.create(self.value.project(columns)),
        }
    }

    pub fn remove(&self) -> Result<Step> {
        let key = self.require_key()?;
        self.entity.delete(Expr::is_eq(
            Expr::field(self.entity.primary_key_column()),
            key.clone(),
        ))
    }

    /// Rows of `relation` related to this row, further restricted by `filter`.
    pub fn related(&self, relation: &str, filter: impl Into<Expr>) -> Result<EntityQuery> {
        let key = self.require_key()?;
        let own = Path::new(
            Namespace::root(self.entity.name()),
            self.entity.primary_key_column(),
        );

        self.entity
            .find_related(relation, Expr::and(filter, Expr::is_eq(own, key.clone())))
    }

    fn require_key(&self) -> Result<&Value> {
        self.key().ok_or_else(|| {
            Error::invalid_statement(format!(
                "`{}` row has no `{}` key",
                self.entity.name(),
                self.entity.primary_key_column()
            ))
        })
    }
}

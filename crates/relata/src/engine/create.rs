use super::{embedded, insert, key_of, key_only, link};
use crate::{
    schema::{Entity, Relation, RelationKind},
    stmt::{Command, Output, Step, Transaction},
    Result,
};

use relata_core::{
    stmt::{Expr, Record, Value},
    Error,
};

/// A key that is either known up front or produced by an earlier step.
#[derive(Debug, Clone)]
pub(super) enum KeyRef {
    Known(Value),

    /// Column of the key reported by the step at this index.
    Output(usize, String),
}

impl KeyRef {
    pub(super) fn resolve(&self, outputs: &[Output]) -> Result<Value> {
        match self {
            KeyRef::Known(key) => Ok(key.clone()),
            KeyRef::Output(index, column) => match outputs.get(*index) {
                Some(output) => output.key_value(column),
                None => Err(relata_core::err!(
                    "step {index} has not run; {} outputs available",
                    outputs.len()
                )),
            },
        }
    }
}

pub(super) fn create(entity: &Entity, payload: Record) -> Result<Step> {
    let payload = entity.prepare_payload(payload)?;
    let (embeds, mut columns) = payload.partition(|name, _| entity.has_relation(name));

    if embeds.is_empty() {
        return Ok(insert(entity, columns).into());
    }

    let mut transaction = Transaction::new();
    transaction.propagate();

    // Rows the root points at are written before it, rows pointing at the
    // root after it, and join-table links last.
    let mut owners = vec![];
    let mut dependents = vec![];
    let mut cross = vec![];

    for (name, value) in embeds {
        let relation = entity.get_relation(&name)?.clone();
        let target = entity.target(&relation)?;

        if relation.join_table().is_some() {
            cross.push((relation, target, embedded(value)?));
            continue;
        }

        if !relation.is_belongs_to() {
            dependents.push((relation, target, embedded(value)?));
            continue;
        }

        match single(entity, &relation, value)? {
            None => {
                columns.insert(&relation.foreign_key, Value::Null);
            }
            Some(record) => match key_only(&record, target.primary_key_column()) {
                Some(key) => {
                    columns.insert(&relation.foreign_key, key);
                }
                None => {
                    let index = transaction.push(create(&target, record)?);
                    owners.push((
                        relation.foreign_key.clone(),
                        KeyRef::Output(index, target.primary_key_column().to_string()),
                    ));
                }
            },
        }
    }

    let primary_key = entity.primary_key_column().to_string();
    let known = key_of(&columns, &primary_key);

    let root = if owners.is_empty() {
        transaction.push_result(insert(entity, columns))
    } else {
        let entity = entity.clone();
        transaction.defer_result(move |outputs| {
            let mut columns = columns;
            for (foreign_key, key) in &owners {
                columns.insert(foreign_key, key.resolve(outputs)?);
            }
            Ok(insert(&entity, columns).into())
        })
    };

    let root_key = match known {
        Some(key) => KeyRef::Known(key),
        None => KeyRef::Output(root, primary_key),
    };

    for (relation, target, records) in dependents.into_iter().chain(cross) {
        for record in records {
            create_dependent(&mut transaction, &relation, &target, &root_key, record)?;
        }
    }

    tracing::debug!(
        entity = entity.name(),
        steps = transaction.len(),
        "planned aggregate create"
    );

    Ok(transaction.into())
}

/// Writes one row embedded under a has-one or has-many relation of a row
/// keyed `root_key`.
pub(super) fn create_dependent(
    transaction: &mut Transaction,
    relation: &Relation,
    target: &Entity,
    root_key: &KeyRef,
    record: Record,
) -> Result<()> {
    let target_key = target.primary_key_column();

    if let RelationKind::HasMany {
        through: Some(through),
    } = &relation.kind
    {
        let related = match key_only(&record, target_key) {
            Some(key) => KeyRef::Known(key),
            None => KeyRef::Output(transaction.push(create(target, record)?), target_key.to_string()),
        };

        let (relation, through, root_key) = (relation.clone(), through.clone(), root_key.clone());
        transaction.defer(move |outputs| {
            let key = root_key.resolve(outputs)?;
            let related = related.resolve(outputs)?;
            Ok(link::link(&relation, &through, key, related).into())
        });

        return Ok(());
    }

    // An existing row is re-pointed instead of inserted.
    if let Some(related) = key_only(&record, target_key) {
        let (foreign_key, table, target_key) = (
            relation.foreign_key.clone(),
            target.table().to_string(),
            target_key.to_string(),
        );

        return defer_with_key(transaction, root_key, move |key| {
            Ok(Command::update(
                table,
                Record::new().with(foreign_key, key),
                Expr::is_eq(Expr::field(target_key), related),
            )
            .into())
        });
    }

    let (foreign_key, target) = (relation.foreign_key.clone(), target.clone());
    defer_with_key(transaction, root_key, move |key| {
        let mut record = record;
        record.insert(foreign_key, key);
        create(&target, record)
    })
}

/// Pushes the step built by `f` from the resolved `key`, deferring it only
/// when the key comes from an earlier step.
pub(super) fn defer_with_key<F>(transaction: &mut Transaction, key: &KeyRef, f: F) -> Result<()>
where
    F: FnOnce(Value) -> Result<Step> + Send + 'static,
{
    match key {
        KeyRef::Known(key) => {
            transaction.push(f(key.clone())?);
        }
        KeyRef::Output(..) => {
            let key = key.clone();
            transaction.defer(move |outputs| f(key.resolve(outputs)?));
        }
    }

    Ok(())
}

/// The one record embedded under a belongs-to relation, or `None` for null.
pub(super) fn single(entity: &Entity, relation: &Relation, value: Value) -> Result<Option<Record>> {
    let mut records = embedded(value)?;

    if records.len() > 1 {
        return Err(Error::invalid_statement(format!(
            "relation `{}` of `{}` is belongs-to and takes a single record; got {}",
            relation.name,
            entity.name(),
            records.len()
        )));
    }

    Ok(records.pop())
}

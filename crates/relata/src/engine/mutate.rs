//! Updates and deletes.
//!
//! A mutation that can be expressed on the entity's table alone compiles to
//! a single statement. Otherwise the matching keys are selected first and the
//! mutation runs against `pk IN (..)` in a deferred step.

use super::{
    create::{create, create_dependent, defer_with_key, single, KeyRef},
    embedded, key_of, key_only, link,
    plan::{references_relations, where_clause},
    EntityQuery,
};
use crate::{
    schema::{Entity, Relation, RelationKind},
    stmt::{Command, Output, Step, Transaction},
    Result,
};

use relata_core::stmt::{Expr, Namespace, Path, Record, Value};

pub(super) fn update(entity: &Entity, payload: Record, filter: Expr) -> Result<Step> {
    let payload = entity.prepare_payload(payload)?;
    let (embeds, columns) = payload.partition(|name, _| entity.has_relation(name));

    let root = Namespace::root(entity.name());
    let full = where_clause(entity, &root, Some(filter.clone()));

    if embeds.is_empty() && !references_relations(full.as_ref(), &root) {
        let filter = full.map(|filter| filter.strip_namespace(&root));
        return Ok(Command::update(entity.table(), columns, filter).into());
    }

    // The pre-select reads the root keys, plus the foreign keys of embedded
    // belongs-to relations so their targets can be updated in place.
    let mut key_columns = vec![entity.primary_key_column().to_string()];
    for name in embeds.keys() {
        let relation = entity.get_relation(name)?;
        if relation.is_belongs_to() && !key_columns.contains(&relation.foreign_key) {
            key_columns.push(relation.foreign_key.clone());
        }
    }

    let keys = select_keys(entity, &root, filter, &key_columns)?;

    let mut transaction = Transaction::new();
    transaction.propagate();
    let select = transaction.push(keys);

    let entity = entity.clone();
    transaction.defer_result(move |outputs| {
        let rows = outputs[select].clone().into_rows()?;
        Ok(apply_update(&entity, columns, embeds, rows)?.into())
    });

    Ok(transaction.into())
}

pub(super) fn delete(entity: &Entity, filter: Expr) -> Result<Step> {
    let root = Namespace::root(entity.name());
    let full = where_clause(entity, &root, Some(filter.clone()));

    if !references_relations(full.as_ref(), &root) {
        let filter = full.map(|filter| filter.strip_namespace(&root));
        return Ok(Command::delete(entity.table(), filter).into());
    }

    let primary_key = entity.primary_key_column().to_string();
    let keys = select_keys(entity, &root, filter, [&primary_key])?;

    let mut transaction = Transaction::new();
    transaction.propagate();
    let select = transaction.push(keys);

    let table = entity.table().to_string();
    transaction.defer_result(move |outputs| {
        let rows = outputs[select].clone().into_rows()?;
        let keys = rows.iter().filter_map(|row| key_of(row, &primary_key));
        Ok(Command::delete(table, Expr::in_list(Expr::field(primary_key.as_str()), keys)).into())
    });

    Ok(transaction.into())
}

fn select_keys<'a>(
    entity: &Entity,
    root: &Namespace,
    filter: Expr,
    columns: impl IntoIterator<Item = &'a String>,
) -> Result<crate::Query> {
    let fields = columns
        .into_iter()
        .map(|column| Expr::field(Path::new(root, column.as_str())).alias(column.as_str()));

    tracing::debug!(entity = entity.name(), "pre-selecting keys for mutation");

    EntityQuery::new(entity.clone())
        .restrict(filter)
        .select(fields)
        .distinct()
        .build()
}

/// The mutation of the pre-selected `rows`.
fn apply_update(
    entity: &Entity,
    columns: Record,
    embeds: Record,
    rows: Vec<Record>,
) -> Result<Transaction> {
    let primary_key = entity.primary_key_column();
    let keys = rows
        .iter()
        .filter_map(|row| key_of(row, primary_key))
        .collect::<Vec<_>>();

    let mut transaction = Transaction::new();
    transaction.propagate();

    if columns.is_empty() {
        let matched = keys.len() as u64;
        transaction.combine(move |_| Ok(Output::Count(matched)));
    } else {
        transaction.push_result(Command::update(
            entity.table(),
            columns,
            Expr::in_list(Expr::field(primary_key), keys.iter().cloned()),
        ));
    }

    for (name, value) in embeds {
        let relation = entity.get_relation(&name)?.clone();
        let target = entity.target(&relation)?;

        for row in &rows {
            let Some(key) = key_of(row, primary_key) else {
                continue;
            };

            match &relation.kind {
                RelationKind::BelongsTo => {
                    update_owner(&mut transaction, entity, &relation, &target, row, key, value.clone())?
                }
                RelationKind::HasOne => {
                    update_owned(&mut transaction, &relation, &target, key, value.clone())?
                }
                RelationKind::HasMany { .. } => {
                    for item in embedded(value.clone())? {
                        update_item(&mut transaction, &relation, &target, &key, item)?;
                    }
                }
            }
        }
    }

    Ok(transaction)
}

/// A belongs-to embed on one matched row: null unlinks, a bare key links,
/// anything else updates the referenced row, or creates and links one when
/// the row references none.
fn update_owner(
    transaction: &mut Transaction,
    entity: &Entity,
    relation: &Relation,
    target: &Entity,
    row: &Record,
    key: Value,
    value: Value,
) -> Result<()> {
    let foreign_key = relation.foreign_key.as_str();
    let by_key = Expr::is_eq(Expr::field(entity.primary_key_column()), key);

    let Some(record) = single(entity, relation, value)? else {
        transaction.push(Command::update(
            entity.table(),
            Record::new().with(foreign_key, Value::Null),
            by_key,
        ));
        return Ok(());
    };

    if let Some(related) = key_only(&record, target.primary_key_column()) {
        transaction.push(Command::update(
            entity.table(),
            Record::new().with(foreign_key, related),
            by_key,
        ));
        return Ok(());
    }

    match key_of(row, foreign_key) {
        Some(owner) => {
            let mut record = record;
            record.remove(target.primary_key_column());

            if !record.is_empty() {
                let filter = Expr::is_eq(Expr::field(target.primary_key_column()), owner);
                transaction.push(target.update(record, filter)?);
            }
        }
        None => {
            let created = KeyRef::Output(
                transaction.push(create(target, record)?),
                target.primary_key_column().to_string(),
            );
            let (table, foreign_key) = (entity.table().to_string(), foreign_key.to_string());

            defer_with_key(transaction, &created, move |related| {
                Ok(Command::update(table, Record::new().with(foreign_key, related), by_key).into())
            })?;
        }
    }

    Ok(())
}

/// A has-one embed on one matched row: null detaches the owned row, a record
/// updates it.
fn update_owned(
    transaction: &mut Transaction,
    relation: &Relation,
    target: &Entity,
    key: Value,
    value: Value,
) -> Result<()> {
    let owned_by = Expr::is_eq(Expr::field(relation.foreign_key.as_str()), key);

    if value.is_null() {
        transaction.push(Command::update(
            target.table(),
            Record::new().with(&relation.foreign_key, Value::Null),
            owned_by,
        ));
        return Ok(());
    }

    let mut record = value.into_record()?;
    record.remove(target.primary_key_column());

    if !record.is_empty() {
        transaction.push(target.update(record, owned_by)?);
    }

    Ok(())
}

/// One has-many item of one matched row.
fn update_item(
    transaction: &mut Transaction,
    relation: &Relation,
    target: &Entity,
    key: &Value,
    item: Record,
) -> Result<()> {
    let target_key = target.primary_key_column();

    let Some(related) = key_of(&item, target_key) else {
        return create_dependent(transaction, relation, target, &KeyRef::Known(key.clone()), item);
    };

    let by_related = || Expr::is_eq(Expr::field(target_key), related.clone());

    if let RelationKind::HasMany {
        through: Some(join_table),
    } = &relation.kind
    {
        let mut fields = item;
        fields.remove(target_key);
        if !fields.is_empty() {
            transaction.push(target.update(fields, by_related())?);
        }

        // Replacing the link keeps repeated updates from duplicating it.
        transaction.push(Command::delete(
            &join_table.table,
            Expr::and(
                Expr::is_eq(Expr::field(relation.foreign_key.as_str()), key.clone()),
                Expr::is_eq(Expr::field(join_table.reverse_foreign_key.as_str()), related.clone()),
            ),
        ));
        transaction.push(link::link(relation, join_table, key.clone(), related));
        return Ok(());
    }

    let mut fields = item;
    fields.remove(target_key);
    fields.insert(&relation.foreign_key, key.clone());
    transaction.push(target.update(fields, by_related())?);

    Ok(())
}

#[cfg(test)]
mod tests {
    use crate::{
        schema::{Entity, Relation, Repository},
        stmt::Step,
    };
    use pretty_assertions::assert_eq;
    use relata_core::stmt::Expr;
    use serde_json::json;

    fn repository() -> Repository {
        Repository::new([
            Entity::new("person", "people").fields(["name"]),
            Entity::new("document", "documents")
                .fields(["status", "owner_id"])
                .relation(Relation::belongs_to("owner", "person", "owner_id"))
                .relation(Relation::has_many("items", "item", "document_id")),
            Entity::new("item", "doc_items").fields(["qty", "document_id"]),
        ])
        .unwrap()
    }

    fn single_command(step: Step) -> String {
        match step {
            Step::Command(command) => command.to_string(),
            step => panic!("expected a single command; got {step:?}"),
        }
    }

    #[test]
    fn plain_update_is_one_statement() {
        let document = repository().entity("document").unwrap();
        let step = document
            .update(json!({ "status": "done" }), Expr::is_eq(Expr::field("status"), "new"))
            .unwrap();

        assert_eq!(
            single_command(step),
            "UPDATE documents SET status = ? WHERE status = ?"
        );
    }

    #[test]
    fn relation_filter_preselects_keys() {
        let document = repository().entity("document").unwrap();
        let step = document
            .update(
                json!({ "status": "done" }),
                Expr::is_eq(Expr::field("document.owner/name"), "Ann"),
            )
            .unwrap();

        let Step::Transaction(transaction) = step else {
            panic!("expected a transaction");
        };
        let Step::Query(query) = &transaction.steps()[0] else {
            panic!("expected the pre-select first");
        };

        assert_eq!(
            query.to_string(),
            "SELECT DISTINCT document.id AS \"id\" FROM documents AS document \
             LEFT JOIN people AS \"document.owner\" ON document.owner_id = \"document.owner\".id \
             WHERE \"document.owner\".name = ?"
        );
        assert!(matches!(transaction.steps()[1], Step::Deferred(_)));
    }

    #[test]
    fn embedded_belongs_to_selects_its_key() {
        let document = repository().entity("document").unwrap();
        let step = document
            .update(json!({ "owner": { "name": "Bo" } }), Expr::is_eq(Expr::field("id"), 1))
            .unwrap();

        let Step::Transaction(transaction) = step else {
            panic!("expected a transaction");
        };
        let Step::Query(query) = &transaction.steps()[0] else {
            panic!("expected the pre-select first");
        };
        assert!(query
            .to_string()
            .starts_with("SELECT DISTINCT document.id AS \"id\", document.owner_id AS \"owner_id\""));
    }

    #[test]
    fn plain_delete() {
        let item = repository().entity("item").unwrap();
        assert_eq!(
            single_command(item.delete(Expr::gt(Expr::field("qty"), 3)).unwrap()),
            "DELETE FROM doc_items WHERE qty > ?"
        );
        assert_eq!(single_command(item.delete(true).unwrap()), "DELETE FROM doc_items");
    }

    #[test]
    fn relation_filtered_delete() {
        let document = repository().entity("document").unwrap();
        let Step::Transaction(transaction) = document
            .delete(Expr::is_eq(Expr::field("document.owner/name"), "Ann"))
            .unwrap()
        else {
            panic!("expected a transaction");
        };

        assert_eq!(transaction.len(), 2);
        assert!(transaction.is_propagating());
    }
}

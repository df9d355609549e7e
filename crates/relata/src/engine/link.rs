use crate::{
    schema::{Entity, JoinTable, Relation, RelationKind},
    stmt::Command,
    Result,
};

use relata_core::stmt::{Expr, Record, Value};

pub(super) fn create_relation(
    entity: &Entity,
    relation: &str,
    key: Value,
    related: Value,
) -> Result<Command> {
    let relation = entity.get_relation(relation)?;

    Ok(match &relation.kind {
        RelationKind::BelongsTo => Command::update(
            entity.table(),
            Record::new().with(&relation.foreign_key, related),
            Expr::is_eq(Expr::field(entity.primary_key_column()), key),
        ),
        RelationKind::HasOne | RelationKind::HasMany { through: None } => {
            let target = entity.target(relation)?;
            Command::update(
                target.table(),
                Record::new().with(&relation.foreign_key, key),
                Expr::is_eq(Expr::field(target.primary_key_column()), related),
            )
        }
        RelationKind::HasMany {
            through: Some(through),
        } => link(relation, through, key, related),
    })
}

pub(super) fn delete_relation(
    entity: &Entity,
    relation: &str,
    key: Value,
    related: Value,
) -> Result<Command> {
    let relation = entity.get_relation(relation)?;
    let foreign_key = || Expr::field(relation.foreign_key.as_str());

    Ok(match &relation.kind {
        RelationKind::BelongsTo => Command::update(
            entity.table(),
            Record::new().with(&relation.foreign_key, Value::Null),
            Expr::and(
                Expr::is_eq(Expr::field(entity.primary_key_column()), key),
                Expr::is_eq(foreign_key(), related),
            ),
        ),
        RelationKind::HasOne | RelationKind::HasMany { through: None } => {
            let target = entity.target(relation)?;
            Command::update(
                target.table(),
                Record::new().with(&relation.foreign_key, Value::Null),
                Expr::and(
                    Expr::is_eq(Expr::field(target.primary_key_column()), related),
                    Expr::is_eq(foreign_key(), key),
                ),
            )
        }
        RelationKind::HasMany {
            through: Some(through),
        } => Command::delete(
            &through.table,
            Expr::and(
                Expr::is_eq(foreign_key(), key),
                Expr::is_eq(Expr::field(through.reverse_foreign_key.as_str()), related),
            ),
        ),
    })
}

/// The join-table row linking `key` to `related`.
pub(super) fn link(relation: &Relation, through: &JoinTable, key: Value, related: Value) -> Command {
    Command::insert(
        &through.table,
        Record::new()
            .with(&relation.foreign_key, key)
            .with(&through.reverse_foreign_key, related),
    )
}

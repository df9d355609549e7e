mod def;
pub use def::{EntityDef, RelationDef, RelationKindDef, RepositoryDef};

mod entity;
pub use entity::{Entity, Prepare, Transform};

mod relation;
pub use relation::{JoinTable, Relation, RelationKind};

mod repository;
pub use repository::Repository;

use crate::Result;

use relata_core::Error;

/// Structural checks on a single relation.
fn validate_relation(owner: &str, relation: &Relation) -> Result<()> {
    if relation.foreign_key.is_empty() {
        return Err(Error::invalid_mapping(format!(
            "relation `{}` of `{owner}` has no foreign key",
            relation.name
        )));
    }

    if let Some(through) = relation.join_table() {
        if through.table.is_empty() || through.reverse_foreign_key.is_empty() {
            return Err(Error::invalid_mapping(format!(
                "relation `{}` of `{owner}` joins through `{}` without a reverse foreign key",
                relation.name, through.table
            )));
        }
    }

    if relation.eager && relation.is_has_many() {
        return Err(Error::invalid_mapping(format!(
            "relation `{}` of `{owner}` is has-many and cannot be eager; \
             only belongs-to and has-one relations are joined eagerly",
            relation.name
        )));
    }

    Ok(())
}

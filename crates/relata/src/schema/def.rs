//! Serializable mapping descriptors.
//!
//! ```toml
//! [[entities]]
//! name = "employee"
//! table = "employees"
//! fields = ["title", "person_id"]
//!
//! [entities.relations.person]
//! kind = "belongs-to"
//! entity = "person"
//! foreign-key = "person_id"
//! eager = true
//! ```

use super::{Entity, Relation};
use crate::Result;

use indexmap::IndexMap;
use relata_core::{stmt::Expr, Error};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case", deny_unknown_fields)]
pub struct RepositoryDef {
    #[serde(alias = "entity")]
    pub entities: Vec<EntityDef>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case", deny_unknown_fields)]
pub struct EntityDef {
    pub name: String,

    /// Defaults to the entity name.
    #[serde(default)]
    pub table: Option<String>,

    #[serde(default = "default_primary_key")]
    pub primary_key: String,

    #[serde(default)]
    pub fields: Vec<String>,

    /// A clause map, as accepted by `Expr::from_json`.
    #[serde(default)]
    pub filter: Option<serde_json::Value>,

    #[serde(default)]
    pub relations: IndexMap<String, RelationDef>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case", deny_unknown_fields)]
pub struct RelationDef {
    pub kind: RelationKindDef,

    pub entity: String,

    #[serde(default)]
    pub foreign_key: Option<String>,

    #[serde(default)]
    pub join_table: Option<String>,

    #[serde(default)]
    pub reverse_foreign_key: Option<String>,

    #[serde(default)]
    pub filter: Option<serde_json::Value>,

    #[serde(default)]
    pub eager: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum RelationKindDef {
    BelongsTo,
    HasOne,
    HasMany,
}

fn default_primary_key() -> String {
    "id".to_string()
}

impl RepositoryDef {
    pub fn build(self) -> Result<super::Repository> {
        let entities = self
            .entities
            .into_iter()
            .map(EntityDef::build)
            .collect::<Result<Vec<_>>>()?;

        super::Repository::new(entities)
    }
}

impl EntityDef {
    pub fn build(self) -> Result<Entity> {
        let table = self.table.unwrap_or_else(|| self.name.clone());
        let mut entity = Entity::new(&self.name, table)
            .primary_key(self.primary_key)
            .fields(self.fields);

        if let Some(filter) = &self.filter {
            entity = entity.filter(Expr::from_json(filter)?);
        }

        for (name, def) in self.relations {
            let relation = def.build(&self.name, name)?;
            entity = entity.relation(relation);
        }

        Ok(entity)
    }
}

impl RelationDef {
    pub fn build(self, owner: &str, name: String) -> Result<Relation> {
        let Some(foreign_key) = self.foreign_key else {
            return Err(Error::invalid_mapping(format!(
                "relation `{name}` of `{owner}` has no foreign key"
            )));
        };

        let mut relation = match (self.kind, self.join_table) {
            (RelationKindDef::HasMany, Some(table)) => {
                let Some(reverse) = self.reverse_foreign_key else {
                    return Err(Error::invalid_mapping(format!(
                        "relation `{name}` of `{owner}` joins through `{table}` without a reverse foreign key"
                    )));
                };
                Relation::many_to_many(name, self.entity, table, foreign_key, reverse)
            }
            (RelationKindDef::HasMany, None) => Relation::has_many(name, self.entity, foreign_key),
            (RelationKindDef::HasOne, None) => Relation::has_one(name, self.entity, foreign_key),
            (RelationKindDef::BelongsTo, None) => {
                Relation::belongs_to(name, self.entity, foreign_key)
            }
            (kind, Some(table)) => {
                return Err(Error::invalid_mapping(format!(
                    "relation `{name}` of `{owner}` is {kind:?} and cannot join through `{table}`"
                )));
            }
        };

        if let Some(filter) = &self.filter {
            relation = relation.with_filter(Expr::from_json(filter)?);
        }

        relation.eager = self.eager;
        super::validate_relation(owner, &relation)?;

        Ok(relation)
    }
}

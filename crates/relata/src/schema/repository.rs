use super::{def::RepositoryDef, Entity};
use crate::Result;

use indexmap::IndexMap;
use relata_core::Error;
use std::{fmt, sync::Arc};

/// A named set of entities that may refer to each other.
#[derive(Clone)]
pub struct Repository {
    inner: Arc<RepositoryInner>,
}

pub(crate) struct RepositoryInner {
    entities: IndexMap<String, Entity>,
}

impl Repository {
    /// Validates the set and binds every entity to the new repository.
    ///
    /// Every relation must name an entity of the set.
    pub fn new(entities: impl IntoIterator<Item = Entity>) -> Result<Repository> {
        let entities = entities
            .into_iter()
            .map(|entity| (entity.name().to_string(), entity))
            .collect::<IndexMap<_, _>>();

        for entity in entities.values() {
            for relation in entity.relations() {
                super::validate_relation(entity.name(), relation)?;

                if !entities.contains_key(&relation.entity) {
                    return Err(Error::invalid_mapping(format!(
                        "relation `{}` of `{}` targets unknown entity `{}`",
                        relation.name,
                        entity.name(),
                        relation.entity
                    )));
                }
            }
        }

        Ok(Repository::bind(entities))
    }

    fn bind(entities: IndexMap<String, Entity>) -> Repository {
        let inner = Arc::new_cyclic(|weak| {
            let entities = entities
                .into_iter()
                .map(|(name, entity)| (name, entity.in_arena(weak.clone())))
                .collect();

            RepositoryInner { entities }
        });

        Repository { inner }
    }

    pub(super) fn from_inner(inner: Arc<RepositoryInner>) -> Repository {
        Repository { inner }
    }

    pub fn from_json(src: &str) -> Result<Repository> {
        let def: RepositoryDef = serde_json::from_str(src)?;
        def.build()
    }

    pub fn from_toml(src: &str) -> Result<Repository> {
        let def: RepositoryDef = toml::from_str(src).map_err(anyhow::Error::from)?;
        def.build()
    }

    /// The named entity. The returned entity keeps this repository alive.
    pub fn entity(&self, name: &str) -> Result<Entity> {
        let entity = self.inner.entities.get(name).ok_or_else(|| {
            Error::invalid_mapping(format!(
                "unknown entity `{name}`; known entities: {}",
                self.names().collect::<Vec<_>>().join(", ")
            ))
        })?;

        Ok(entity.held_by(&self.inner))
    }

    pub fn entities(&self) -> impl Iterator<Item = Entity> + '_ {
        self.inner
            .entities
            .values()
            .map(|entity| entity.held_by(&self.inner))
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.inner.entities.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.inner.entities.len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.entities.is_empty()
    }

    /// A repository holding only the named entities. Relations pointing
    /// outside the subset are dropped.
    pub fn only<'a>(&self, names: impl IntoIterator<Item = &'a str>) -> Result<Repository> {
        let mut subset = IndexMap::new();

        for name in names {
            let entity = self.entity(name)?;
            subset.insert(name.to_string(), entity);
        }

        Ok(Repository::subset(subset))
    }

    /// A repository without the named entities. Relations pointing at them
    /// are dropped.
    pub fn except<'a>(&self, names: impl IntoIterator<Item = &'a str>) -> Result<Repository> {
        let mut subset = self.inner.entities.clone();

        for name in names {
            self.entity(name)?;
            subset.shift_remove(name);
        }

        Ok(Repository::subset(subset))
    }

    /// A repository with `entity` added, replacing any entity of the same
    /// name.
    pub fn add(&self, entity: Entity) -> Result<Repository> {
        let mut entities = self.inner.entities.clone();
        entities.insert(entity.name().to_string(), entity);
        Repository::new(entities.into_values())
    }

    fn subset(mut entities: IndexMap<String, Entity>) -> Repository {
        let names = entities.keys().cloned().collect::<Vec<_>>();

        for entity in entities.values_mut() {
            entity.retain_relations(|relation| {
                let kept = names.contains(&relation.entity);
                if !kept {
                    tracing::debug!(
                        relation = %relation.name,
                        target = %relation.entity,
                        "dropping relation outside of repository subset"
                    );
                }
                kept
            });
        }

        Repository::bind(entities)
    }
}

impl fmt::Debug for Repository {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.inner.entities.values()).finish()
    }
}

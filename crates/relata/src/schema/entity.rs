use super::{repository::RepositoryInner, Relation, Repository};
use crate::Result;

use indexmap::IndexMap;
use relata_core::{
    stmt::{conjoin, Expr, Record},
    Error,
};
use std::{
    fmt,
    sync::{Arc, Weak},
};

/// Rewrites a payload before it is written.
pub type Prepare = Arc<dyn Fn(Record) -> Result<Record> + Send + Sync>;

/// Rewrites a row after it is read.
pub type Transform = Arc<dyn Fn(Record) -> Record + Send + Sync>;

/// A persistent entity: a table, its columns and its relations.
///
/// Entities refer to each other by name. Once a [`Repository`] is built, every
/// entity it holds is bound to it, and relation targets are looked up there.
/// An entity obtained through [`Repository::entity`] keeps the repository
/// alive, as do entities derived from it (`with_filter`, `with_relation`,
/// `eager`).
#[derive(Clone)]
pub struct Entity {
    name: String,
    table: String,
    primary_key: String,
    fields: Vec<String>,
    relations: IndexMap<String, Relation>,
    filter: Option<Expr>,
    prepare: Option<Prepare>,
    transform: Option<Transform>,
    repository: Binding,
}

/// How an entity reaches its repository. Entities stored inside the
/// repository only hold a weak reference so the two do not keep each other
/// alive.
#[derive(Clone, Default)]
enum Binding {
    #[default]
    Unbound,
    Arena(Weak<RepositoryInner>),
    Held(Arc<RepositoryInner>),
}

impl Entity {
    pub fn new(name: impl Into<String>, table: impl Into<String>) -> Entity {
        Entity {
            name: name.into(),
            table: table.into(),
            primary_key: "id".to_string(),
            fields: vec![],
            relations: IndexMap::new(),
            filter: None,
            prepare: None,
            transform: None,
            repository: Binding::Unbound,
        }
    }

    pub fn primary_key(mut self, column: impl Into<String>) -> Entity {
        self.primary_key = column.into();
        self
    }

    /// Columns read by `find`, besides the primary key.
    pub fn fields(mut self, fields: impl IntoIterator<Item = impl Into<String>>) -> Entity {
        self.fields = fields.into_iter().map(Into::into).collect();
        self
    }

    /// Adds or replaces a relation.
    pub fn relation(mut self, relation: Relation) -> Entity {
        self.relations.insert(relation.name.clone(), relation);
        self
    }

    /// A persistent filter applied to every read and write of the entity.
    pub fn filter(mut self, filter: impl Into<Expr>) -> Entity {
        self.filter = Some(filter.into());
        self
    }

    pub fn prepare<F>(mut self, f: F) -> Entity
    where
        F: Fn(Record) -> Result<Record> + Send + Sync + 'static,
    {
        self.prepare = Some(Arc::new(f));
        self
    }

    pub fn transform<F>(mut self, f: F) -> Entity
    where
        F: Fn(Record) -> Record + Send + Sync + 'static,
    {
        self.transform = Some(Arc::new(f));
        self
    }

    /// A copy whose persistent filter also requires `filter`.
    pub fn with_filter(&self, filter: impl Into<Expr>) -> Entity {
        let mut entity = self.clone();
        entity.filter = conjoin([entity.filter.take(), Some(filter.into())]);
        entity
    }

    /// A copy with `relation` added, or replacing the one of the same name.
    pub fn with_relation(&self, relation: Relation) -> Result<Entity> {
        super::validate_relation(&self.name, &relation)?;

        if let Some(repository) = self.bound_repository() {
            repository.entity(&relation.entity)?;
        }

        Ok(self.clone().relation(relation))
    }

    /// A copy with the named relations joined into every `find`.
    pub fn eager<'a>(&self, relations: impl IntoIterator<Item = &'a str>) -> Result<Entity> {
        let mut entity = self.clone();

        for name in relations {
            let relation = entity.relation_mut(name)?;
            relation.eager = true;
            super::validate_relation(&self.name, relation)?;
        }

        Ok(entity)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn table(&self) -> &str {
        &self.table
    }

    pub fn primary_key_column(&self) -> &str {
        &self.primary_key
    }

    /// The primary key followed by the declared fields.
    pub fn columns(&self) -> impl Iterator<Item = &str> {
        std::iter::once(self.primary_key.as_str()).chain(
            self.fields
                .iter()
                .map(String::as_str)
                .filter(move |field| *field != self.primary_key),
        )
    }

    pub fn relations(&self) -> impl Iterator<Item = &Relation> {
        self.relations.values()
    }

    pub fn has_relation(&self, name: &str) -> bool {
        self.relations.contains_key(name)
    }

    /// Looks up a relation by name. An undeclared name lists the declared
    /// ones in the error.
    pub fn get_relation(&self, name: &str) -> Result<&Relation> {
        self.relations
            .get(name)
            .ok_or_else(|| Error::unknown_relation(&self.name, name, self.relations.keys()))
    }

    fn relation_mut(&mut self, name: &str) -> Result<&mut Relation> {
        let available = self.relations.keys().cloned().collect::<Vec<_>>();
        self.relations
            .get_mut(name)
            .ok_or_else(|| Error::unknown_relation(&self.name, name, available))
    }

    pub fn persistent_filter(&self) -> Option<&Expr> {
        self.filter.as_ref()
    }

    /// The repository this entity belongs to.
    pub fn repository(&self) -> Result<Repository> {
        self.bound_repository().ok_or_else(|| {
            Error::invalid_mapping(format!(
                "entity `{}` is not bound to a live repository",
                self.name
            ))
        })
    }

    fn bound_repository(&self) -> Option<Repository> {
        let inner = match &self.repository {
            Binding::Unbound => None,
            Binding::Arena(weak) => weak.upgrade(),
            Binding::Held(inner) => Some(inner.clone()),
        };
        inner.map(Repository::from_inner)
    }

    /// The target entity of `relation`.
    pub fn target(&self, relation: &Relation) -> Result<Entity> {
        self.repository()?.entity(&relation.entity)
    }

    pub(crate) fn prepare_payload(&self, payload: Record) -> Result<Record> {
        match &self.prepare {
            Some(prepare) => prepare(payload),
            None => Ok(payload),
        }
    }

    pub(crate) fn transform_row(&self, row: Record) -> Record {
        match &self.transform {
            Some(transform) => transform(row),
            None => row,
        }
    }

    /// Binds an entity stored inside `repository`.
    pub(super) fn in_arena(mut self, repository: Weak<RepositoryInner>) -> Entity {
        self.repository = Binding::Arena(repository);
        self
    }

    /// A copy that keeps `repository` alive for as long as it exists.
    pub(super) fn held_by(&self, repository: &Arc<RepositoryInner>) -> Entity {
        Entity {
            repository: Binding::Held(repository.clone()),
            ..self.clone()
        }
    }

    pub(super) fn retain_relations(&mut self, f: impl Fn(&Relation) -> bool) {
        self.relations.retain(|_, relation| f(relation));
    }
}

impl fmt::Debug for Entity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Entity")
            .field("name", &self.name)
            .field("table", &self.table)
            .field("primary_key", &self.primary_key)
            .field("fields", &self.fields)
            .field("relations", &self.relations.keys().collect::<Vec<_>>())
            .field("filter", &self.filter)
            .finish()
    }
}

use relata_core::stmt::Expr;

/// A declared link from one entity to another.
#[derive(Debug, Clone, PartialEq)]
pub struct Relation {
    /// Name the relation is referenced by, in payloads and field namespaces.
    pub name: String,

    pub kind: RelationKind,

    /// Name of the target entity.
    pub entity: String,

    /// For `BelongsTo`, the column on the owning entity's table that holds
    /// the target's key. For `HasOne` and `HasMany`, the column on the
    /// target's table that holds the owner's key. With a join table, the
    /// join-table column holding the owner's key.
    pub foreign_key: String,

    /// Extra condition on the target, written against its fields.
    pub filter: Option<Expr>,

    /// Joined into every `find` of the owner.
    pub eager: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RelationKind {
    BelongsTo,
    HasOne,
    HasMany { through: Option<JoinTable> },
}

/// The link table of a many-to-many relation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JoinTable {
    pub table: String,

    /// Join-table column holding the target's key.
    pub reverse_foreign_key: String,
}

impl Relation {
    pub fn belongs_to(
        name: impl Into<String>,
        entity: impl Into<String>,
        foreign_key: impl Into<String>,
    ) -> Relation {
        Relation::new(name, RelationKind::BelongsTo, entity, foreign_key)
    }

    pub fn has_one(
        name: impl Into<String>,
        entity: impl Into<String>,
        foreign_key: impl Into<String>,
    ) -> Relation {
        Relation::new(name, RelationKind::HasOne, entity, foreign_key)
    }

    pub fn has_many(
        name: impl Into<String>,
        entity: impl Into<String>,
        foreign_key: impl Into<String>,
    ) -> Relation {
        Relation::new(name, RelationKind::HasMany { through: None }, entity, foreign_key)
    }

    /// A many-to-many relation through `table`. `foreign_key` references
    /// the owner, `reverse_foreign_key` the target.
    pub fn many_to_many(
        name: impl Into<String>,
        entity: impl Into<String>,
        table: impl Into<String>,
        foreign_key: impl Into<String>,
        reverse_foreign_key: impl Into<String>,
    ) -> Relation {
        let through = JoinTable {
            table: table.into(),
            reverse_foreign_key: reverse_foreign_key.into(),
        };

        Relation::new(
            name,
            RelationKind::HasMany {
                through: Some(through),
            },
            entity,
            foreign_key,
        )
    }

    fn new(
        name: impl Into<String>,
        kind: RelationKind,
        entity: impl Into<String>,
        foreign_key: impl Into<String>,
    ) -> Relation {
        Relation {
            name: name.into(),
            kind,
            entity: entity.into(),
            foreign_key: foreign_key.into(),
            filter: None,
            eager: false,
        }
    }

    pub fn eager(mut self) -> Relation {
        self.eager = true;
        self
    }

    pub fn with_filter(mut self, filter: impl Into<Expr>) -> Relation {
        self.filter = relata_core::stmt::conjoin([self.filter.take(), Some(filter.into())]);
        self
    }

    pub fn is_belongs_to(&self) -> bool {
        matches!(self.kind, RelationKind::BelongsTo)
    }

    pub fn is_has_one(&self) -> bool {
        matches!(self.kind, RelationKind::HasOne)
    }

    pub fn is_has_many(&self) -> bool {
        matches!(self.kind, RelationKind::HasMany { .. })
    }

    pub fn join_table(&self) -> Option<&JoinTable> {
        match &self.kind {
            RelationKind::HasMany { through } => through.as_ref(),
            _ => None,
        }
    }

    /// Whether the relation can be flattened into a single joined row.
    pub fn is_single(&self) -> bool {
        !self.is_has_many()
    }
}

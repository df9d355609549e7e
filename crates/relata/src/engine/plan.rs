//! Join planning: which relations a query needs, and the source tree that
//! joins them.

use crate::{
    schema::{Entity, Relation, RelationKind},
    Result,
};

use indexmap::{IndexMap, IndexSet};
use relata_core::{
    stmt::{conjoin, Expr, Namespace, Path, Source},
    Error,
};

pub(super) struct Plan {
    pub(super) source: Source,

    /// Labeled projections of the eagerly joined relations.
    pub(super) eager_fields: Vec<Expr>,
}

struct Joined {
    parent: Namespace,
    parent_entity: Entity,
    relation: Relation,
    entity: Entity,
    eager: bool,
}

/// Plans the source of a query over `entity` aliased as `root`.
///
/// With `eager` set, eager relations are joined recursively; a relation is
/// not followed again below itself, so cyclic descriptors stay finite.
/// Every namespace in `referenced` below `root` is joined too, one relation
/// per segment, as is every namespace a joined target's filters refer to.
pub(super) fn plan(
    entity: &Entity,
    root: &Namespace,
    referenced: &IndexSet<Namespace>,
    eager: bool,
) -> Result<Plan> {
    let mut joins = IndexMap::new();

    if eager {
        join_eager(entity, root, &mut vec![], &mut joins)?;
    }

    for namespace in referenced {
        if namespace.len() > root.len() && namespace.starts_with(root) {
            join_path(entity, root, namespace, &mut joins)?;
        }
    }

    // Aliases used in a join's ON clause must be joined inside that join's
    // group. The deepest join needing an alias owns it.
    let mut owners = IndexMap::<Namespace, Namespace>::new();
    let mut next = 0;

    while let Some((namespace, joined)) = joins.get_index(next) {
        let namespace = namespace.clone();
        let needed = on_filters(joined, &namespace)
            .iter()
            .flatten()
            .flat_map(Expr::namespaces)
            .filter(|needed| needed.len() > namespace.len() && needed.starts_with(&namespace))
            .collect::<IndexSet<_>>();

        for needed in needed {
            join_path(entity, root, &needed, &mut joins)?;

            for member in needed.prefixes().skip(namespace.len()) {
                owners.insert(member, namespace.clone());
            }
        }

        next += 1;
    }

    let mut source = Source::aliased(entity.table(), root.alias());
    let mut eager_fields = vec![];

    for (namespace, joined) in &joins {
        if !owners.contains_key(namespace) {
            source = source.left_join(
                join_group(namespace, &joins, &owners)?,
                join_on(joined, namespace)?,
            );
        }

        if joined.eager {
            for column in joined.entity.columns() {
                let path = Path::new(namespace, column);
                let label = path.label_relative_to(root);
                eager_fields.push(Expr::field(path).alias(label));
            }
        }
    }

    Ok(Plan {
        source,
        eager_fields,
    })
}

/// The target table of the join at `namespace`, with the joins its ON
/// clause depends on nested inside it.
fn join_group(
    namespace: &Namespace,
    joins: &IndexMap<Namespace, Joined>,
    owners: &IndexMap<Namespace, Namespace>,
) -> Result<Source> {
    let mut source = Source::aliased(joins[namespace].entity.table(), namespace.alias());

    for (member, joined) in joins {
        if owners.get(member) == Some(namespace) {
            source = source.left_join(
                join_group(member, joins, owners)?,
                join_on(joined, member)?,
            );
        }
    }

    Ok(source)
}

/// `path` holds the `(entity, relation)` hops from the root down to
/// `namespace`.
fn join_eager(
    entity: &Entity,
    namespace: &Namespace,
    path: &mut Vec<(String, String)>,
    joins: &mut IndexMap<Namespace, Joined>,
) -> Result<()> {
    for relation in entity.relations().filter(|relation| relation.eager) {
        let hop = (entity.name().to_string(), relation.name.clone());

        if path.contains(&hop) {
            tracing::debug!(
                entity = entity.name(),
                relation = %relation.name,
                alias = %namespace,
                "not expanding eager relation below itself"
            );
            continue;
        }

        let target = entity.target(relation)?;
        let child = namespace.child(&relation.name);
        joins.insert(
            child.clone(),
            Joined {
                parent: namespace.clone(),
                parent_entity: entity.clone(),
                relation: relation.clone(),
                entity: target.clone(),
                eager: true,
            },
        );

        path.push(hop);
        join_eager(&target, &child, path, joins)?;
        path.pop();
    }

    Ok(())
}

/// Joins every relation along `namespace`, starting at `root`.
fn join_path(
    entity: &Entity,
    root: &Namespace,
    namespace: &Namespace,
    joins: &mut IndexMap<Namespace, Joined>,
) -> Result<()> {
    let mut current = entity.clone();
    let mut current_ns = root.clone();

    for segment in &namespace.segments()[root.len()..] {
        let child = current_ns.child(segment);

        if let Some(joined) = joins.get(&child) {
            current = joined.entity.clone();
            current_ns = child;
            continue;
        }

        let relation = current.get_relation(segment)?.clone();

        if relation.is_has_many() {
            return Err(Error::unsupported_query(format!(
                "cannot filter or order `{}` through has-many relation `{}`; \
                 only belongs-to and has-one relations can be joined, use find_related instead",
                current.name(),
                relation.name
            )));
        }

        let target = current.target(&relation)?;

        tracing::debug!(
            entity = current.name(),
            relation = %relation.name,
            alias = %child,
            "implicit join"
        );

        joins.insert(
            child.clone(),
            Joined {
                parent: current_ns.clone(),
                parent_entity: current.clone(),
                relation,
                entity: target.clone(),
                eager: false,
            },
        );

        current = target;
        current_ns = child;
    }

    Ok(())
}

/// The ON clause: the key equality in the relation's direction, then the
/// target's persistent filter and the relation's own filter.
fn join_on(joined: &Joined, namespace: &Namespace) -> Result<Expr> {
    let relation = &joined.relation;
    let target = &joined.entity;

    let keys = match &relation.kind {
        RelationKind::BelongsTo => Expr::eq(
            Path::new(&joined.parent, relation.foreign_key.as_str()),
            Path::new(namespace, target.primary_key_column()),
        ),
        RelationKind::HasOne => Expr::eq(
            Path::new(&joined.parent, joined.parent_entity.primary_key_column()),
            Path::new(namespace, relation.foreign_key.as_str()),
        ),
        RelationKind::HasMany { .. } => {
            return Err(Error::unsupported_query(format!(
                "has-many relation `{}` cannot be joined into a single row",
                relation.name
            )));
        }
    };

    let [target_filter, relation_filter] = on_filters(joined, namespace);

    Ok(conjoin([Some(keys), target_filter, relation_filter]).unwrap_or_default())
}

/// The target's persistent filter and the relation's filter, both scoped to
/// `namespace`.
fn on_filters(joined: &Joined, namespace: &Namespace) -> [Option<Expr>; 2] {
    [
        scoped_filter(&joined.entity, namespace),
        joined
            .relation
            .filter
            .clone()
            .map(|filter| filter.ensure_prefixed(namespace)),
    ]
}

/// The persistent filter of `entity`, moved from the entity's own alias to
/// `namespace`.
pub(super) fn scoped_filter(entity: &Entity, namespace: &Namespace) -> Option<Expr> {
    let own = Namespace::root(entity.name());

    entity
        .persistent_filter()
        .cloned()
        .map(|filter| filter.ensure_prefixed(&own).rebase(&own, namespace))
}

/// The WHERE clause of a query over `entity` aliased as `root`: the
/// persistent filter and the caller's filter.
pub(super) fn where_clause(entity: &Entity, root: &Namespace, filter: Option<Expr>) -> Option<Expr> {
    conjoin([
        scoped_filter(entity, root),
        filter.map(|filter| filter.ensure_prefixed(root)),
    ])
}

/// Whether `filter` refers to any alias other than `root`.
pub(super) fn references_relations(filter: Option<&Expr>, root: &Namespace) -> bool {
    filter.is_some_and(|filter| filter.namespaces().iter().any(|namespace| namespace != root))
}

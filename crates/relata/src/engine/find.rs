use super::{
    instance::{Instance, Materialize, NestedRecords},
    plan,
};
use crate::{
    db::Connection,
    schema::{Entity, RelationKind},
    stmt::Query,
    Result,
};

use indexmap::IndexSet;
use relata_core::stmt::{
    collect_namespaces, conjoin, Expr, JoinOp, Namespace, OrderByExpr, Path, Select, Source,
};
use relata_sql::Serializer;
use std::fmt;

/// A query over one entity, planned into SQL on demand.
///
/// Filters, orderings and projections are kept relative to the entity; the
/// joins they need are worked out by [`build`](Self::build).
#[derive(Debug, Clone)]
pub struct EntityQuery {
    entity: Entity,

    /// Alias of the entity's table.
    root: Namespace,

    filter: Option<Expr>,
    order_by: Vec<OrderByExpr>,
    fields: Option<Vec<Expr>>,
    limit: Option<u64>,
    offset: Option<u64>,
    distinct: bool,

    /// Join eager relations.
    eager: bool,

    /// Sources joined after the planned ones.
    anchors: Vec<Anchor>,
}

#[derive(Debug, Clone)]
struct Anchor {
    op: JoinOp,
    source: Source,
    on: Expr,
}

impl EntityQuery {
    pub fn new(entity: Entity) -> EntityQuery {
        let root = Namespace::root(entity.name());
        EntityQuery::with_root(entity, root)
    }

    fn with_root(entity: Entity, root: Namespace) -> EntityQuery {
        EntityQuery {
            entity,
            root,
            filter: None,
            order_by: vec![],
            fields: None,
            limit: None,
            offset: None,
            distinct: false,
            eager: true,
            anchors: vec![],
        }
    }

    pub fn entity(&self) -> &Entity {
        &self.entity
    }

    pub fn root(&self) -> &Namespace {
        &self.root
    }

    /// Conjoins `filter`. Unqualified fields belong to the entity.
    pub fn restrict(mut self, filter: impl Into<Expr>) -> EntityQuery {
        let filter = filter.into().ensure_prefixed(&self.root);
        self.filter = conjoin([self.filter.take(), Some(filter)]);
        self
    }

    pub fn order_by(mut self, order_by: impl Into<OrderByExpr>) -> EntityQuery {
        self.order_by
            .push(order_by.into().ensure_prefixed(&self.root));
        self
    }

    pub fn skip(mut self, offset: u64) -> EntityQuery {
        self.offset = Some(offset);
        self
    }

    pub fn limit(mut self, limit: u64) -> EntityQuery {
        self.limit = Some(limit);
        self
    }

    /// Projects `fields` instead of the entity's columns. Eager relations
    /// are no longer joined unless a field refers to them.
    pub fn select(mut self, fields: impl IntoIterator<Item = impl Into<Expr>>) -> EntityQuery {
        let fields = fields
            .into_iter()
            .map(|field| field.into().ensure_prefixed(&self.root))
            .collect();
        self.fields = Some(fields);
        self.eager = false;
        self
    }

    pub fn distinct(mut self) -> EntityQuery {
        self.distinct = true;
        self
    }

    fn anchor(mut self, op: JoinOp, source: Source, on: Expr) -> EntityQuery {
        self.anchors.push(Anchor { op, source, on });
        self
    }

    /// Plans the joins and produces the SQL-level query.
    pub fn build(&self) -> Result<Query> {
        let filter = plan::where_clause(&self.entity, &self.root, self.filter.clone());

        let mut referenced = IndexSet::new();
        collect_namespaces(filter.iter(), &mut referenced);
        collect_namespaces(self.order_by.iter().map(|order| &order.expr), &mut referenced);
        if let Some(fields) = &self.fields {
            collect_namespaces(fields, &mut referenced);
        }

        let plan = plan::plan(&self.entity, &self.root, &referenced, self.eager)?;

        let mut source = plan.source;
        for anchor in &self.anchors {
            source = source.join(anchor.op, anchor.source.clone(), anchor.on.clone());
        }

        let fields = match &self.fields {
            Some(fields) => fields.clone(),
            None => self
                .entity
                .columns()
                .map(|column| Expr::field(Path::new(&self.root, column)).alias(column))
                .chain(plan.eager_fields)
                .collect(),
        };

        let mut select = Select::new(source).fields(fields);
        select.filter = filter;
        select.order_by = self.order_by.clone();
        select.limit = self.limit;
        select.offset = self.offset;
        select.distinct = self.distinct;

        Ok(Query::from(select))
    }

    /// Runs the query and materializes each row with [`NestedRecords`].
    pub fn fetch(&self, connection: &mut Connection) -> Result<Vec<Instance>> {
        self.fetch_with(connection, &NestedRecords)
    }

    pub fn fetch_with(
        &self,
        connection: &mut Connection,
        materialize: &impl Materialize,
    ) -> Result<Vec<Instance>> {
        let rows = self.build()?.fetch(connection)?;

        rows.into_iter()
            .map(|row| materialize.materialize(&self.entity, row))
            .collect()
    }

    pub fn fetch_one(&self, connection: &mut Connection) -> Result<Instance> {
        let row = self.build()?.fetch_one(connection)?;
        NestedRecords.materialize(&self.entity, row)
    }

    pub fn fetch_count(&self, connection: &mut Connection) -> Result<u64> {
        self.build()?.fetch_count(connection)
    }
}

impl fmt::Display for EntityQuery {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let compiled = self
            .build()
            .and_then(|query| query.compile(&Serializer::default()));

        match compiled {
            Ok(compiled) => f.write_str(&compiled.sql),
            Err(err) => write!(f, "<{err}>"),
        }
    }
}

/// Rows of `relation`'s target that are related to rows of `entity` matching
/// `filter`.
///
/// The related entity is aliased `entity.relation`. The rows of `entity` to
/// navigate from become a `SELECT DISTINCT` key sub-query aliased `entity`,
/// joined to the related rows with `INNER JOIN`.
pub(super) fn find_related(entity: &Entity, relation: &str, filter: Expr) -> Result<EntityQuery> {
    let relation = entity.get_relation(relation)?.clone();
    let target = entity.target(&relation)?;

    let base_ns = Namespace::root(entity.name());
    let related_ns = base_ns.child(&relation.name);

    let (related_filter, base_filter) = filter
        .ensure_prefixed(&related_ns)
        .split_by_namespace(&related_ns);

    let base_key = match &relation.kind {
        RelationKind::BelongsTo => relation.foreign_key.as_str(),
        _ => entity.primary_key_column(),
    };

    let mut base = EntityQuery::new(entity.clone());
    base.eager = false;
    base.filter = base_filter;
    base.fields = Some(vec![
        Expr::field(Path::new(&base_ns, base_key)).alias(base_key)
    ]);
    base.distinct = true;
    let base = Source::subquery(base.build()?.into_select(), base_ns.alias());

    let mut query = EntityQuery::with_root(target.clone(), related_ns.clone());
    query.filter = related_filter;

    let base_field = Expr::field(Path::new(&base_ns, base_key));

    query = match &relation.kind {
        RelationKind::BelongsTo => query.anchor(
            JoinOp::Inner,
            base,
            Expr::eq(Path::new(&related_ns, target.primary_key_column()), base_field),
        ),
        RelationKind::HasOne | RelationKind::HasMany { through: None } => query.anchor(
            JoinOp::Inner,
            base,
            Expr::eq(Path::new(&related_ns, relation.foreign_key.as_str()), base_field),
        ),
        RelationKind::HasMany {
            through: Some(through),
        } => {
            let join_table = Namespace::root(&through.table);

            query
                .anchor(
                    JoinOp::Inner,
                    Source::table(&through.table),
                    Expr::eq(
                        Path::new(&join_table, through.reverse_foreign_key.as_str()),
                        Path::new(&related_ns, target.primary_key_column()),
                    ),
                )
                .anchor(
                    JoinOp::Inner,
                    base,
                    Expr::eq(
                        Path::new(&join_table, relation.foreign_key.as_str()),
                        base_field,
                    ),
                )
                .distinct()
        }
    };

    if let Some(filter) = relation.filter.clone() {
        query = query.restrict(filter);
    }

    Ok(query)
}

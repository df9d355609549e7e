use crate::{db::Connection, Result};

use relata_core::{
    stmt::{Expr, JoinOp, OrderByExpr, Record, Select, Source, Statement},
    Error,
};
use relata_sql::{Compiled, Serializer};
use std::fmt;

/// A `SELECT` as a value.
///
/// Every builder method consumes the query and returns a new one; nothing
/// is sent to the database until one of the `fetch` methods runs.
#[derive(Debug, Clone, PartialEq)]
pub struct Query {
    select: Select,
}

impl Query {
    pub fn new(source: impl Into<Source>) -> Query {
        Query {
            select: Select::new(source),
        }
    }

    /// Conjoins `expr` with the current filter.
    pub fn restrict(self, expr: impl Into<Expr>) -> Query {
        Query {
            select: self.select.filter(expr),
        }
    }

    /// Replaces the current filter.
    pub fn restrict_exact(mut self, expr: impl Into<Expr>) -> Query {
        let expr = expr.into();
        self.select.filter = (!expr.is_true()).then_some(expr);
        self
    }

    pub fn order_by(self, order_by: impl Into<OrderByExpr>) -> Query {
        Query {
            select: self.select.order_by(order_by),
        }
    }

    pub fn skip(mut self, offset: u64) -> Query {
        self.select.offset = Some(offset);
        self
    }

    pub fn limit(mut self, limit: u64) -> Query {
        self.select.limit = Some(limit);
        self
    }

    /// Projects `fields` instead of `*`.
    pub fn select(self, fields: impl IntoIterator<Item = impl Into<Expr>>) -> Query {
        Query {
            select: self.select.fields(fields),
        }
    }

    /// Joins `right` onto the current source.
    pub fn join(mut self, op: JoinOp, right: impl Into<Source>, on: impl Into<Expr>) -> Query {
        let left = std::mem::replace(&mut self.select.source, Source::table(""));
        self.select.source = left.join(op, right, on);
        self
    }

    pub fn distinct(self) -> Query {
        Query {
            select: self.select.distinct(),
        }
    }

    /// The `COUNT(*)` form of this query: ordering and pagination are
    /// dropped.
    pub fn count_query(&self) -> Query {
        let mut select = self.select.clone();
        select.fields = vec![Expr::count_star().alias("count")];
        select.order_by.clear();
        select.limit = None;
        select.offset = None;

        // A DISTINCT projection has to be counted from the outside.
        if select.distinct {
            let mut inner = self.select.clone();
            inner.order_by.clear();
            inner.limit = None;
            inner.offset = None;

            select = Select::new(Source::subquery(inner, "counted"))
                .fields([Expr::count_star().alias("count")]);
        }

        Query { select }
    }

    pub fn as_select(&self) -> &Select {
        &self.select
    }

    pub fn into_select(self) -> Select {
        self.select
    }

    pub fn compile(&self, serializer: &Serializer) -> Result<Compiled> {
        serializer.compile(&Statement::Query(self.select.clone()))
    }

    pub fn fetch(&self, connection: &mut Connection) -> Result<Vec<Record>> {
        connection
            .exec_statement(&Statement::Query(self.select.clone()))?
            .into_values()
    }

    /// The first row, or a record-not-found error.
    pub fn fetch_one(&self, connection: &mut Connection) -> Result<Record> {
        let query = self.clone().limit(1);

        match query.fetch(connection)?.into_iter().next() {
            Some(row) => Ok(row),
            None => Err(Error::record_not_found(format!(
                "query returned no rows; source={:?}",
                self.select.source.aliases()
            ))),
        }
    }

    pub fn fetch_count(&self, connection: &mut Connection) -> Result<u64> {
        let row = self.count_query().fetch_one(connection)?;

        let Some(value) = row.values().next() else {
            relata_core::bail!("COUNT(*) returned an empty row");
        };

        Ok(u64::try_from(value.to_i64()?).unwrap_or(0))
    }
}

impl From<Select> for Query {
    fn from(select: Select) -> Query {
        Query { select }
    }
}

impl fmt::Display for Query {
    /// The compiled SQL text.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.compile(&Serializer::default()) {
            Ok(compiled) => f.write_str(&compiled.sql),
            Err(err) => write!(f, "<{err}>"),
        }
    }
}

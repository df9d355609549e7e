use super::{conjoin, Expr, Source, Value};

/// A `SELECT` statement.
#[derive(Debug, Clone, PartialEq)]
pub struct Select {
    pub distinct: bool,

    /// Projected expressions. Empty projects `*`.
    pub fields: Vec<Expr>,

    pub source: Source,

    pub filter: Option<Expr>,

    pub order_by: Vec<OrderByExpr>,

    pub limit: Option<u64>,

    pub offset: Option<u64>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct OrderByExpr {
    pub expr: Expr,
    pub direction: Option<Direction>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Asc,
    Desc,
}

impl Select {
    pub fn new(source: impl Into<Source>) -> Select {
        Select {
            distinct: false,
            fields: vec![],
            source: source.into(),
            filter: None,
            order_by: vec![],
            limit: None,
            offset: None,
        }
    }

    pub fn fields(mut self, fields: impl IntoIterator<Item = impl Into<Expr>>) -> Select {
        self.fields = fields.into_iter().map(Into::into).collect();
        self
    }

    /// Conjoins `expr` with the current filter.
    pub fn filter(mut self, expr: impl Into<Expr>) -> Select {
        self.filter = conjoin([self.filter.take(), Some(expr.into())]);
        self
    }

    pub fn order_by(mut self, order_by: impl Into<OrderByExpr>) -> Select {
        self.order_by.push(order_by.into());
        self
    }

    pub fn distinct(mut self) -> Select {
        self.distinct = true;
        self
    }

    /// Values bound for `LIMIT` and `OFFSET`, in rendering order.
    pub fn pagination_values(&self) -> impl Iterator<Item = Value> {
        let limit = self.limit.map(to_value);
        let offset = self.offset.map(to_value);
        limit.into_iter().chain(offset)
    }
}

fn to_value(n: u64) -> Value {
    Value::I64(i64::try_from(n).unwrap_or(i64::MAX))
}

impl OrderByExpr {
    pub fn asc(expr: impl Into<Expr>) -> OrderByExpr {
        OrderByExpr {
            expr: expr.into(),
            direction: Some(Direction::Asc),
        }
    }

    pub fn desc(expr: impl Into<Expr>) -> OrderByExpr {
        OrderByExpr {
            expr: expr.into(),
            direction: Some(Direction::Desc),
        }
    }
}

impl Direction {
    /// Parses `asc` / `desc`, case-insensitively.
    pub fn parse(src: &str) -> Option<Direction> {
        match src.to_ascii_lowercase().as_str() {
            "asc" => Some(Direction::Asc),
            "desc" => Some(Direction::Desc),
            _ => None,
        }
    }
}

impl From<Expr> for OrderByExpr {
    fn from(expr: Expr) -> Self {
        OrderByExpr {
            expr,
            direction: None,
        }
    }
}

impl From<&str> for OrderByExpr {
    /// `"name"` or `"name desc"`.
    fn from(src: &str) -> Self {
        match src.trim().rsplit_once(' ') {
            Some((field, dir)) if Direction::parse(dir).is_some() => OrderByExpr {
                expr: Expr::field(field.trim()),
                direction: Direction::parse(dir),
            },
            _ => OrderByExpr {
                expr: Expr::field(src.trim()),
                direction: None,
            },
        }
    }
}

use super::{Expr, Select};

use std::fmt;

/// What a query reads from: a table, an aliased sub-query, or a join tree.
#[derive(Debug, Clone, PartialEq)]
pub enum Source {
    Table(TableRef),
    Subquery(SourceSubquery),
    Join(Box<Join>),
}

#[derive(Debug, Clone, PartialEq)]
pub struct TableRef {
    pub name: String,
    pub alias: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SourceSubquery {
    pub select: Box<Select>,
    pub alias: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Join {
    pub left: Source,
    pub op: JoinOp,
    pub right: Source,
    pub on: Expr,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JoinOp {
    Inner,
    Left,
    Right,
    Full,
}

impl Source {
    pub fn table(name: impl Into<String>) -> Source {
        Source::Table(TableRef {
            name: name.into(),
            alias: None,
        })
    }

    pub fn aliased(name: impl Into<String>, alias: impl Into<String>) -> Source {
        Source::Table(TableRef {
            name: name.into(),
            alias: Some(alias.into()),
        })
    }

    pub fn subquery(select: impl Into<Select>, alias: impl Into<String>) -> Source {
        Source::Subquery(SourceSubquery {
            select: Box::new(select.into()),
            alias: alias.into(),
        })
    }

    pub fn join(self, op: JoinOp, right: impl Into<Source>, on: impl Into<Expr>) -> Source {
        Source::Join(Box::new(Join {
            left: self,
            op,
            right: right.into(),
            on: on.into(),
        }))
    }

    pub fn left_join(self, right: impl Into<Source>, on: impl Into<Expr>) -> Source {
        self.join(JoinOp::Left, right, on)
    }

    pub fn inner_join(self, right: impl Into<Source>, on: impl Into<Expr>) -> Source {
        self.join(JoinOp::Inner, right, on)
    }

    /// The name the rest of the query uses to refer to this source, when it
    /// is not a join.
    pub fn alias(&self) -> Option<&str> {
        match self {
            Source::Table(table) => Some(table.alias.as_deref().unwrap_or(&table.name)),
            Source::Subquery(subquery) => Some(&subquery.alias),
            Source::Join(_) => None,
        }
    }

    /// Every alias bound by this source tree, left to right.
    pub fn aliases(&self) -> Vec<&str> {
        let mut aliases = vec![];
        self.collect_aliases(&mut aliases);
        aliases
    }

    fn collect_aliases<'a>(&'a self, dst: &mut Vec<&'a str>) {
        match self {
            Source::Join(join) => {
                join.left.collect_aliases(dst);
                join.right.collect_aliases(dst);
            }
            source => dst.extend(source.alias()),
        }
    }

    pub fn binds_alias(&self, alias: &str) -> bool {
        self.aliases().contains(&alias)
    }
}

impl JoinOp {
    /// Parses `left-join`, `inner`, `LEFT JOIN` and similar spellings.
    pub fn parse(src: &str) -> Option<JoinOp> {
        let normalized = src.to_ascii_lowercase().replace(['-', '_'], " ");

        Some(match normalized.trim_end_matches(" join").trim() {
            "inner" | "join" => JoinOp::Inner,
            "left" | "left outer" => JoinOp::Left,
            "right" | "right outer" => JoinOp::Right,
            "full" | "full outer" => JoinOp::Full,
            _ => return None,
        })
    }

    pub fn as_sql(self) -> &'static str {
        match self {
            JoinOp::Inner => "INNER JOIN",
            JoinOp::Left => "LEFT JOIN",
            JoinOp::Right => "RIGHT JOIN",
            JoinOp::Full => "FULL JOIN",
        }
    }
}

impl fmt::Display for JoinOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_sql())
    }
}

impl From<&str> for Source {
    fn from(value: &str) -> Self {
        Source::table(value)
    }
}

impl From<String> for Source {
    fn from(value: String) -> Self {
        Source::table(value)
    }
}

impl From<TableRef> for Source {
    fn from(value: TableRef) -> Self {
        Source::Table(value)
    }
}

use super::Operation;

use crate::stmt::Value;

#[derive(Debug, Clone)]
pub struct QuerySql {
    /// The compiled SQL text
    pub sql: String,

    /// Positional parameters, one per placeholder in `sql`
    pub params: Vec<Value>,

    /// What the caller expects back
    pub ret: Ret,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Ret {
    /// Result rows, keyed by column label
    Rows,

    /// Number of affected rows
    Count,
}

impl From<QuerySql> for Operation {
    fn from(value: QuerySql) -> Self {
        Self::QuerySql(value)
    }
}

use super::{Expr, Statement};

/// `DELETE FROM table WHERE filter`
#[derive(Debug, Clone, PartialEq)]
pub struct Delete {
    pub table: String,
    pub filter: Option<Expr>,
}

impl Delete {
    pub fn new(table: impl Into<String>, filter: Option<Expr>) -> Delete {
        Delete {
            table: table.into(),
            filter,
        }
    }
}

impl From<Delete> for Statement {
    fn from(value: Delete) -> Self {
        Statement::Delete(value)
    }
}

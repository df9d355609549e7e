use super::{Expr, Record, Statement};

/// `UPDATE table SET assignments WHERE filter`
#[derive(Debug, Clone, PartialEq)]
pub struct Update {
    pub table: String,
    pub assignments: Vec<(String, Expr)>,
    pub filter: Option<Expr>,
}

impl Update {
    pub fn new(table: impl Into<String>, record: Record, filter: Option<Expr>) -> Update {
        Update {
            table: table.into(),
            assignments: record
                .into_iter()
                .map(|(column, value)| (column, Expr::Value(value)))
                .collect(),
            filter,
        }
    }
}

impl From<Update> for Statement {
    fn from(value: Update) -> Self {
        Statement::Update(value)
    }
}

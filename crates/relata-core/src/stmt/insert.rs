use super::{Expr, Record, Statement};

/// `INSERT INTO table (columns) VALUES (values)`
#[derive(Debug, Clone, PartialEq)]
pub struct Insert {
    pub table: String,

    /// Column / value pairs, rendered in order.
    pub values: Vec<(String, Expr)>,

    /// Columns to return. Ignored by flavors without `RETURNING`.
    pub returning: Vec<String>,
}

impl Insert {
    pub fn new(table: impl Into<String>, record: Record) -> Insert {
        Insert {
            table: table.into(),
            values: record
                .into_iter()
                .map(|(column, value)| (column, Expr::Value(value)))
                .collect(),
            returning: vec![],
        }
    }

    pub fn returning(mut self, columns: impl IntoIterator<Item = impl Into<String>>) -> Insert {
        self.returning = columns.into_iter().map(Into::into).collect();
        self
    }

    pub fn columns(&self) -> impl Iterator<Item = &str> {
        self.values.iter().map(|(column, _)| column.as_str())
    }
}

impl From<Insert> for Statement {
    fn from(value: Insert) -> Self {
        Statement::Insert(value)
    }
}

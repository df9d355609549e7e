use super::{Delete, Insert, Select, Update};

#[derive(Debug, Clone, PartialEq)]
pub enum Statement {
    Query(Select),
    Insert(Insert),
    Update(Update),
    Delete(Delete),
}

impl Statement {
    pub fn is_query(&self) -> bool {
        matches!(self, Statement::Query(_))
    }

    pub fn is_insert(&self) -> bool {
        matches!(self, Statement::Insert(_))
    }

    /// True when executing the statement yields rows rather than a count.
    pub fn returns_rows(&self) -> bool {
        match self {
            Statement::Query(_) => true,
            Statement::Insert(insert) => !insert.returning.is_empty(),
            _ => false,
        }
    }
}

impl From<Select> for Statement {
    fn from(value: Select) -> Self {
        Statement::Query(value)
    }
}

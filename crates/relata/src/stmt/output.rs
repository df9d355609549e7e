use crate::Result;

use relata_core::{
    stmt::{Record, Value},
    Error,
};

/// The result of executing one step.
#[derive(Debug, Clone, PartialEq)]
pub enum Output {
    /// Rows returned by a query.
    Rows(Vec<Record>),

    /// Rows affected by an update or delete.
    Count(u64),

    /// Key columns of an inserted row.
    Key(Record),

    /// One output per step of a transaction.
    List(Vec<Output>),
}

impl Output {
    pub fn as_rows(&self) -> Option<&[Record]> {
        match self {
            Output::Rows(rows) => Some(rows),
            _ => None,
        }
    }

    pub fn as_key(&self) -> Option<&Record> {
        match self {
            Output::Key(key) => Some(key),
            _ => None,
        }
    }

    pub fn as_list(&self) -> Option<&[Output]> {
        match self {
            Output::List(outputs) => Some(outputs),
            _ => None,
        }
    }

    pub fn into_rows(self) -> Result<Vec<Record>> {
        match self {
            Output::Rows(rows) => Ok(rows),
            other => Err(other.unexpected("rows")),
        }
    }

    pub fn into_key(self) -> Result<Record> {
        match self {
            Output::Key(key) => Ok(key),
            other => Err(other.unexpected("a key")),
        }
    }

    pub fn into_list(self) -> Result<Vec<Output>> {
        match self {
            Output::List(outputs) => Ok(outputs),
            other => Err(other.unexpected("a list")),
        }
    }

    /// The affected-row count. A row set counts its rows.
    pub fn count(&self) -> Result<u64> {
        match self {
            Output::Count(count) => Ok(*count),
            Output::Rows(rows) => Ok(rows.len() as u64),
            other => Err(other.unexpected("a count")),
        }
    }

    /// One column of an insert's key.
    pub fn key_value(&self, column: &str) -> Result<Value> {
        let key = self
            .as_key()
            .ok_or_else(|| self.unexpected("a key"))?;

        match key.get(column) {
            Some(value) if !value.is_null() => Ok(value.clone()),
            _ => Err(Error::record_not_found(format!(
                "insert produced no `{column}` key; key={key:?}"
            ))),
        }
    }

    fn unexpected(&self, expected: &str) -> Error {
        relata_core::err!("expected {expected} from step; got {self:?}")
    }
}

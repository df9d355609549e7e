use crate::{stmt::Record, Error, Result};

#[derive(Debug)]
pub struct Response {
    pub rows: Rows,
}

#[derive(Debug)]
pub enum Rows {
    /// Number of rows impacted by the operation
    Count(u64),

    /// Result rows, each keyed by column label
    Values(Vec<Record>),
}

impl Response {
    pub fn count(count: u64) -> Self {
        Self {
            rows: Rows::Count(count),
        }
    }

    pub fn values(values: Vec<Record>) -> Self {
        Self {
            rows: Rows::Values(values),
        }
    }

    pub fn empty() -> Self {
        Self::count(0)
    }
}

impl Rows {
    pub fn is_count(&self) -> bool {
        matches!(self, Self::Count(_))
    }

    pub fn is_values(&self) -> bool {
        matches!(self, Self::Values(_))
    }

    /// The affected-row count. A row set counts its rows.
    pub fn into_count(self) -> u64 {
        match self {
            Rows::Count(count) => count,
            Rows::Values(values) => values.len() as u64,
        }
    }

    pub fn into_values(self) -> Result<Vec<Record>> {
        match self {
            Self::Values(values) => Ok(values),
            Self::Count(count) => Err(Error::from_args(format_args!(
                "expected result rows; driver returned a count of {count}"
            ))),
        }
    }
}

use crate::{db::Connection, Output, Result};

use relata_core::{
    driver::Rows,
    stmt::{Delete, Expr, Insert, Record, Statement, Update},
};
use relata_sql::{Compiled, Serializer};
use std::fmt;

/// A write, built up front and executed later.
#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    Insert(Insert),
    Update(Update),
    Delete(Delete),
}

impl Command {
    pub fn insert(table: impl Into<String>, record: Record) -> Command {
        Command::Insert(Insert::new(table, record))
    }

    pub fn update(table: impl Into<String>, record: Record, filter: impl Into<Option<Expr>>) -> Command {
        Command::Update(Update::new(table, record, filter.into()))
    }

    pub fn delete(table: impl Into<String>, filter: impl Into<Option<Expr>>) -> Command {
        Command::Delete(Delete::new(table, filter.into()))
    }

    /// Key columns an insert reports back. Has no effect on updates and
    /// deletes.
    pub fn returning(self, columns: impl IntoIterator<Item = impl Into<String>>) -> Command {
        match self {
            Command::Insert(insert) => Command::Insert(insert.returning(columns)),
            other => other,
        }
    }

    pub fn table(&self) -> &str {
        match self {
            Command::Insert(insert) => &insert.table,
            Command::Update(update) => &update.table,
            Command::Delete(delete) => &delete.table,
        }
    }

    pub fn to_statement(&self) -> Statement {
        match self {
            Command::Insert(insert) => Statement::Insert(insert.clone()),
            Command::Update(update) => Statement::Update(update.clone()),
            Command::Delete(delete) => Statement::Delete(delete.clone()),
        }
    }

    pub fn compile(&self, serializer: &Serializer) -> Result<Compiled> {
        serializer.compile(&self.to_statement())
    }

    /// Runs the command.
    ///
    /// An insert yields `Output::Key` holding the `returning` columns. When
    /// the driver reports none back, the submitted values of those columns
    /// are used. Updates and deletes yield `Output::Count`.
    pub fn execute(&self, connection: &mut Connection) -> Result<Output> {
        let rows = connection.exec_statement(&self.to_statement())?;

        match self {
            Command::Insert(insert) => Ok(Output::Key(insert_key(insert, rows)?)),
            _ => Ok(Output::Count(rows.into_count())),
        }
    }
}

fn insert_key(insert: &Insert, rows: Rows) -> Result<Record> {
    if let Rows::Values(rows) = rows {
        if let Some(row) = rows.into_iter().next() {
            return Ok(row);
        }
    }

    Ok(insert
        .values
        .iter()
        .filter(|(column, _)| insert.returning.contains(column))
        .filter_map(|(column, expr)| {
            expr.as_value()
                .map(|value| (column.clone(), value.clone()))
        })
        .collect())
}

impl From<Insert> for Command {
    fn from(value: Insert) -> Command {
        Command::Insert(value)
    }
}

impl From<Update> for Command {
    fn from(value: Update) -> Command {
        Command::Update(value)
    }
}

impl From<Delete> for Command {
    fn from(value: Delete) -> Command {
        Command::Delete(value)
    }
}

impl fmt::Display for Command {
    /// The compiled SQL text.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.compile(&Serializer::default()) {
            Ok(compiled) => f.write_str(&compiled.sql),
            Err(err) => write!(f, "<{err}>"),
        }
    }
}

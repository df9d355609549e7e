use super::{Command, Output, Query, Transaction};
use crate::{db::Connection, Result};

use std::fmt;

/// A step whose statement is only known once earlier steps have run. It
/// receives the outputs of every preceding step of its transaction.
pub type Deferred = Box<dyn FnOnce(&[Output]) -> Result<Step> + Send>;

/// One element of a transaction.
pub enum Step {
    Query(Query),
    Command(Command),
    Transaction(Transaction),
    Deferred(Deferred),
}

impl Step {
    pub fn deferred<F>(f: F) -> Step
    where
        F: FnOnce(&[Output]) -> Result<Step> + Send + 'static,
    {
        Step::Deferred(Box::new(f))
    }

    /// Runs the step. `prior` holds the outputs of the steps before it in
    /// the enclosing transaction.
    pub(crate) fn exec(self, connection: &mut Connection, prior: &[Output]) -> Result<Output> {
        match self {
            Step::Query(query) => Ok(Output::Rows(query.fetch(connection)?)),
            Step::Command(command) => command.execute(connection),
            Step::Transaction(transaction) => transaction.execute(connection),
            Step::Deferred(f) => f(prior)?.exec(connection, prior),
        }
    }
}

impl From<Query> for Step {
    fn from(value: Query) -> Step {
        Step::Query(value)
    }
}

impl From<Command> for Step {
    fn from(value: Command) -> Step {
        Step::Command(value)
    }
}

impl From<Transaction> for Step {
    fn from(value: Transaction) -> Step {
        Step::Transaction(value)
    }
}

impl fmt::Debug for Step {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Step::Query(query) => f.debug_tuple("Query").field(query).finish(),
            Step::Command(command) => f.debug_tuple("Command").field(command).finish(),
            Step::Transaction(transaction) => {
                f.debug_tuple("Transaction").field(transaction).finish()
            }
            Step::Deferred(_) => f.write_str("Deferred(..)"),
        }
    }
}

use super::{Output, Step};
use crate::{db::Connection, Result};

use std::fmt;

type Combine = Box<dyn FnOnce(Vec<Output>) -> Result<Output> + Send>;

/// An ordered, all-or-nothing sequence of steps.
///
/// Steps run strictly in order on one connection. Any failure rolls the
/// whole sequence back and is returned unchanged. The visible result is the
/// list of every step's output unless one step was pushed with
/// [`push_result`](Self::push_result) /
/// [`defer_result`](Self::defer_result), or a [`combine`](Self::combine)
/// function was set.
#[derive(Default)]
pub struct Transaction {
    steps: Vec<Step>,
    result: Visible,
    propagate: bool,
}

#[derive(Default)]
enum Visible {
    #[default]
    All,
    Step(usize),
    Combine(Combine),
}

impl Transaction {
    pub fn new() -> Transaction {
        Transaction::default()
    }

    pub fn len(&self) -> usize {
        self.steps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    pub fn steps(&self) -> &[Step] {
        &self.steps
    }

    /// Appends a step and returns its index.
    pub fn push(&mut self, step: impl Into<Step>) -> usize {
        self.steps.push(step.into());
        self.steps.len() - 1
    }

    /// Appends a step whose output becomes the transaction's result.
    pub fn push_result(&mut self, step: impl Into<Step>) -> usize {
        let index = self.push(step);
        self.result = Visible::Step(index);
        index
    }

    /// Appends a step built at execution time from the outputs of the steps
    /// before it.
    pub fn defer<F>(&mut self, f: F) -> usize
    where
        F: FnOnce(&[Output]) -> Result<Step> + Send + 'static,
    {
        self.push(Step::deferred(f))
    }

    pub fn defer_result<F>(&mut self, f: F) -> usize
    where
        F: FnOnce(&[Output]) -> Result<Step> + Send + 'static,
    {
        self.push_result(Step::deferred(f))
    }

    /// Derive the result from all step outputs.
    pub fn combine<F>(&mut self, f: F) -> &mut Self
    where
        F: FnOnce(Vec<Output>) -> Result<Output> + Send + 'static,
    {
        self.result = Visible::Combine(Box::new(f));
        self
    }

    /// Run inline when the connection already has a transaction open,
    /// instead of nesting a savepoint.
    pub fn propagate(&mut self) -> &mut Self {
        self.propagate = true;
        self
    }

    pub fn is_propagating(&self) -> bool {
        self.propagate
    }

    pub fn execute(self, connection: &mut Connection) -> Result<Output> {
        if self.propagate && connection.in_transaction() {
            tracing::debug!(
                depth = connection.depth(),
                steps = self.steps.len(),
                "joining enclosing transaction"
            );
            return self.run(connection);
        }

        connection.begin()?;
        let depth = connection.depth();
        tracing::info!(depth, steps = self.steps.len(), "transaction begin");

        match self.run(connection) {
            Ok(output) => {
                // A refused commit is rolled back by the connection itself.
                connection.commit()?;
                tracing::info!(depth, "transaction commit");
                Ok(output)
            }
            Err(err) => {
                tracing::info!(depth, error = %err, "transaction rollback");

                if let Err(rollback) = connection.rollback() {
                    tracing::warn!(depth, error = %rollback, "rollback failed");
                }

                Err(err)
            }
        }
    }

    fn run(self, connection: &mut Connection) -> Result<Output> {
        let mut outputs = Vec::with_capacity(self.steps.len());

        for step in self.steps {
            let output = step.exec(connection, &outputs)?;
            outputs.push(output);
        }

        match self.result {
            Visible::All => Ok(Output::List(outputs)),
            Visible::Step(index) => Ok(outputs.swap_remove(index)),
            Visible::Combine(f) => f(outputs),
        }
    }
}

impl fmt::Debug for Transaction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let result = match self.result {
            Visible::All => "all".to_string(),
            Visible::Step(index) => format!("step {index}"),
            Visible::Combine(_) => "combined".to_string(),
        };

        f.debug_struct("Transaction")
            .field("steps", &self.steps)
            .field("result", &result)
            .field("propagate", &self.propagate)
            .finish()
    }
}

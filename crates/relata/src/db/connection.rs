use crate::Result;

use relata_core::{
    driver::{
        self,
        operation::{QuerySql, Ret, Transaction},
        Capability, Operation, Rows, TransactionManager,
    },
    stmt::Statement,
};
use relata_sql::Serializer;

/// A driver connection paired with the serializer for its SQL flavor and
/// the transaction depth opened on it.
#[derive(Debug)]
pub struct Connection {
    inner: Box<dyn driver::Connection>,
    capability: &'static Capability,
    serializer: Serializer,
    transactions: TransactionManager,

    /// Set when the database may hold a transaction the manager no longer
    /// tracks. The pool closes such connections instead of reusing them.
    broken: bool,
}

impl Connection {
    pub fn new(inner: Box<dyn driver::Connection>, capability: &'static Capability) -> Connection {
        Connection {
            inner,
            capability,
            serializer: Serializer::new(capability.sql_flavor),
            transactions: TransactionManager::new(),
            broken: false,
        }
    }

    pub fn capability(&self) -> &'static Capability {
        self.capability
    }

    pub fn serializer(&self) -> &Serializer {
        &self.serializer
    }

    /// Compile and run a statement.
    pub fn exec_statement(&mut self, stmt: &Statement) -> Result<Rows> {
        let compiled = self.serializer.compile(stmt)?;
        let ret = if self.serializer.returns_rows(stmt) {
            Ret::Rows
        } else {
            Ret::Count
        };

        let response = self.inner.exec(Operation::QuerySql(QuerySql {
            sql: compiled.sql,
            params: compiled.params,
            ret,
        }))?;

        Ok(response.rows)
    }

    /// Run one SQL statement as written, e.g. schema DDL.
    pub fn execute_sql(&mut self, sql: impl Into<String>) -> Result<u64> {
        let response = self.inner.exec(Operation::QuerySql(QuerySql {
            sql: sql.into(),
            params: vec![],
            ret: Ret::Count,
        }))?;

        Ok(response.rows.into_count())
    }

    /// Nesting depth of open transactions; zero outside of any.
    pub fn depth(&self) -> u32 {
        self.transactions.depth()
    }

    pub fn in_transaction(&self) -> bool {
        self.transactions.in_transaction()
    }

    /// Open a transaction, or a savepoint when one is already open.
    pub fn begin(&mut self) -> Result<()> {
        let op = self.transactions.start();
        self.exec_transaction(op)
    }

    /// Commit the innermost transaction or release its savepoint.
    ///
    /// A refused commit (e.g. a deferred constraint) leaves the level open
    /// on the database; it is rolled back before the error is returned.
    pub fn commit(&mut self) -> Result<()> {
        let op = self.transactions.commit();
        let Err(err) = self.exec_transaction(op) else {
            return Ok(());
        };

        let undo = self.transactions.abandon_commit();
        tracing::info!(depth = self.depth(), error = %err, "commit refused; rolling back");

        if let Err(rollback) = self.exec_transaction(undo) {
            tracing::warn!(error = %rollback, "rollback after refused commit failed");
            self.broken = true;
        }

        Err(err)
    }

    /// Roll back the innermost transaction or savepoint.
    pub fn rollback(&mut self) -> Result<()> {
        let op = self.transactions.rollback();
        let result = self.exec_transaction(op);
        if result.is_err() {
            self.broken = true;
        }
        result
    }

    /// Whether the connection can no longer be trusted to be outside of a
    /// transaction.
    pub fn is_broken(&self) -> bool {
        self.broken || self.in_transaction()
    }

    fn exec_transaction(&mut self, op: Transaction) -> Result<()> {
        self.inner.exec(Operation::Transaction(op))?;
        Ok(())
    }
}

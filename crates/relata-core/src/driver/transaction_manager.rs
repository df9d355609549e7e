use super::operation::Transaction;

/// Tracks transaction nesting depth and picks the lifecycle operation for
/// each `start`/`commit`/`rollback`: a real transaction at depth zero, a
/// savepoint `sp_N` below it.
#[derive(Debug, Default)]
pub struct TransactionManager {
    depth: u32,
}

impl TransactionManager {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn depth(&self) -> u32 {
        self.depth
    }

    pub fn in_transaction(&self) -> bool {
        self.depth > 0
    }

    /// Begin a transaction or create a savepoint, and increment the depth.
    pub fn start(&mut self) -> Transaction {
        let op = if self.depth == 0 {
            Transaction::Start
        } else {
            Transaction::Savepoint(self.depth)
        };
        self.depth += 1;
        op
    }

    /// Commit the current transaction or release a savepoint, and decrement
    /// the depth.
    pub fn commit(&mut self) -> Transaction {
        self.depth = self.depth.saturating_sub(1);
        if self.depth == 0 {
            Transaction::Commit
        } else {
            Transaction::ReleaseSavepoint(self.depth)
        }
    }

    /// The operation that discards a level whose `commit` the database
    /// refused. The level is still open on the database side even though
    /// `commit` already left it here.
    pub fn abandon_commit(&self) -> Transaction {
        if self.depth == 0 {
            Transaction::Rollback
        } else {
            Transaction::RollbackToSavepoint(self.depth)
        }
    }

    /// Roll back the current transaction or savepoint, and decrement the
    /// depth.
    ///
    /// A rolled-back savepoint is left in place; the outer `COMMIT` or
    /// `ROLLBACK` cleans it up.
    pub fn rollback(&mut self) -> Transaction {
        self.depth = self.depth.saturating_sub(1);
        if self.depth == 0 {
            Transaction::Rollback
        } else {
            Transaction::RollbackToSavepoint(self.depth)
        }
    }
}

use super::Operation;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transaction {
    /// Start a transaction
    Start,

    /// Commit a transaction
    Commit,

    /// Rollback a transaction
    Rollback,

    /// Create a savepoint, named `sp_{n}`
    Savepoint(u32),

    /// Release a savepoint
    ReleaseSavepoint(u32),

    /// Roll back to a savepoint
    RollbackToSavepoint(u32),
}

impl From<Transaction> for Operation {
    fn from(value: Transaction) -> Operation {
        Operation::Transaction(value)
    }
}

mod capability;
pub use capability::{Capability, SqlFlavor};

mod response;
pub use response::{Response, Rows};

pub mod operation;
pub use operation::Operation;

mod transaction_manager;
pub use transaction_manager::TransactionManager;

use crate::Result;

use std::fmt::Debug;

/// A storage backend able to open connections.
pub trait Driver: Debug + Send + Sync + 'static {
    /// Describes the SQL dialect and features of the backend.
    fn capability(&self) -> &'static Capability;

    /// Open a new connection.
    fn connect(&self) -> Result<Box<dyn Connection>>;

    /// Upper bound on simultaneously open connections, if the backend
    /// imposes one (an in-memory database is only visible to the connection
    /// that created it).
    fn max_connections(&self) -> Option<usize> {
        None
    }
}

/// One open connection. Calls block until the backend answers.
pub trait Connection: Debug + Send + 'static {
    /// Execute a database operation
    fn exec(&mut self, op: Operation) -> Result<Response>;
}

use crate::logging_driver::DriverOp;
use parking_lot::{Mutex, MutexGuard};
use relata::driver::operation::Transaction;
use std::sync::Arc;

/// Read side of the operations recorded by [`LoggingDriver`](crate::LoggingDriver).
pub struct ExecLog {
    ops: Arc<Mutex<Vec<DriverOp>>>,
}

impl ExecLog {
    pub(crate) fn new(ops: Arc<Mutex<Vec<DriverOp>>>) -> Self {
        Self { ops }
    }

    fn ops(&self) -> MutexGuard<'_, Vec<DriverOp>> {
        self.ops.lock()
    }

    /// SQL text of every statement sent, in order. Transaction control is
    /// not included.
    pub fn sql(&self) -> Vec<String> {
        self.ops()
            .iter()
            .filter_map(|op| Some(op.operation.as_query_sql()?.sql.clone()))
            .collect()
    }

    /// Transaction control operations, in order.
    pub fn transactions(&self) -> Vec<Transaction> {
        self.ops()
            .iter()
            .filter_map(|op| op.operation.as_transaction().copied())
            .collect()
    }

    /// Operations the driver rejected.
    pub fn failures(&self) -> usize {
        self.ops().iter().filter(|op| op.response.is_none()).count()
    }

    pub fn clear(&mut self) {
        self.ops().clear();
    }
}

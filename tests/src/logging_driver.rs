use parking_lot::Mutex;
use relata::driver::{Capability, Connection, Driver, Operation, Response, Rows};
use relata_core::Result;
use std::sync::Arc;

#[derive(Debug)]
pub struct LoggingDriver {
    inner: Box<dyn Driver>,

    /// Log of all operations executed through connections of this driver
    ops_log: Arc<Mutex<Vec<DriverOp>>>,
}

impl LoggingDriver {
    pub fn new(driver: impl Driver) -> Self {
        Self {
            inner: Box::new(driver),
            ops_log: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Get a handle to access the operations log
    pub fn ops_log_handle(&self) -> Arc<Mutex<Vec<DriverOp>>> {
        self.ops_log.clone()
    }
}

impl Driver for LoggingDriver {
    fn capability(&self) -> &'static Capability {
        self.inner.capability()
    }

    fn connect(&self) -> Result<Box<dyn Connection>> {
        Ok(Box::new(LoggingConnection {
            inner: self.inner.connect()?,
            ops_log: self.ops_log_handle(),
        }))
    }

    fn max_connections(&self) -> Option<usize> {
        self.inner.max_connections()
    }
}

/// One operation and what the driver answered. Failed operations are logged
/// with `response` set to `None`.
#[derive(Debug)]
pub struct DriverOp {
    pub operation: Operation,
    pub response: Option<Response>,
}

/// A connection wrapper that logs all operations for testing purposes
#[derive(Debug)]
pub struct LoggingConnection {
    /// The underlying connection that actually executes operations
    inner: Box<dyn Connection>,

    ops_log: Arc<Mutex<Vec<DriverOp>>>,
}

impl Connection for LoggingConnection {
    fn exec(&mut self, operation: Operation) -> Result<Response> {
        let logged = operation.clone();
        let result = self.inner.exec(operation);

        self.ops_log.lock().push(DriverOp {
            operation: logged,
            response: result.as_ref().ok().map(duplicate_response),
        });

        result
    }
}

fn duplicate_response(response: &Response) -> Response {
    let rows = match &response.rows {
        Rows::Count(count) => Rows::Count(*count),
        Rows::Values(values) => Rows::Values(values.clone()),
    };

    Response { rows }
}

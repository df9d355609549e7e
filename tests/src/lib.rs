mod exec_log;
pub use exec_log::ExecLog;

mod logging_driver;
pub use logging_driver::{DriverOp, LoggingDriver};

mod setup;
pub use setup::{documents, DbTest, DOCUMENTS_DDL};

pub use std_util::*;

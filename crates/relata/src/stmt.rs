mod command;
pub use command::Command;

mod output;
pub use output::Output;

mod query;
pub use query::Query;

mod step;
pub use step::{Deferred, Step};

mod transaction;
pub use transaction::Transaction;

pub use relata_core::stmt::*;

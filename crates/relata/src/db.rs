mod builder;
pub use builder::Builder;

mod config;
pub use config::{Config, PoolConfig};

mod connection;
pub use connection::Connection;

mod pool;
pub use pool::{Pool, PoolConnection};

mod registry;
pub use registry::{DriverFactory, Registry};

use crate::{stmt::Step, Output, Result};

use relata_core::driver::Capability;

use std::sync::Arc;

/// A database handle. Cloning is cheap; every clone shares one connection
/// pool.
#[derive(Debug, Clone)]
pub struct Db {
    pool: Arc<Pool>,
}

impl Db {
    pub fn builder() -> Builder {
        Builder::default()
    }

    /// Connect with default pool settings and the compiled-in drivers.
    pub fn connect(url: &str) -> Result<Db> {
        Db::builder().url(url).build()
    }

    pub(crate) fn from_pool(pool: Pool) -> Db {
        Db {
            pool: Arc::new(pool),
        }
    }

    /// Check a connection out of the pool. It returns to the pool when
    /// dropped.
    pub fn connection(&self) -> Result<PoolConnection> {
        self.pool.get()
    }

    /// Run one step (a query, a command or a whole transaction) on a pooled
    /// connection.
    pub fn exec(&self, step: impl Into<Step>) -> Result<Output> {
        let mut connection = self.connection()?;
        step.into().exec(&mut connection, &[])
    }

    pub fn capability(&self) -> &'static Capability {
        self.pool.capability()
    }

    pub fn pool(&self) -> &Pool {
        &self.pool
    }
}

//! Connection pooling for database connections.

use super::{Connection, PoolConfig};
use crate::Result;

use relata_core::{
    driver::{Capability, Driver},
    Error,
};
use std::{
    fmt,
    ops::{Deref, DerefMut},
    time::Duration,
};

/// A blocking connection pool.
///
/// Connections are opened lazily, up to the configured maximum (or the
/// driver's own limit, whichever is lower). Callers beyond the limit wait
/// for a connection to be returned, up to the acquire timeout. Idle
/// connections are never closed by the pool, so an in-memory database
/// lives as long as the pool does.
pub struct Pool {
    inner: r2d2::Pool<Manager>,
    capability: &'static Capability,
}

impl Pool {
    /// Creates a new connection pool from the given driver.
    pub fn new(driver: Box<dyn Driver>, config: PoolConfig) -> Result<Pool> {
        let max_size = match driver.max_connections() {
            Some(limit) => config.max_size.min(limit),
            None => config.max_size,
        }
        .clamp(1, u32::MAX as usize);

        let capability = driver.capability();

        let inner = r2d2::Pool::builder()
            .max_size(max_size as u32)
            .min_idle(Some(0))
            .idle_timeout(None)
            .max_lifetime(None)
            .test_on_check_out(false)
            .connection_timeout(config.acquire_timeout.max(Duration::from_millis(1)))
            .build(Manager { driver, capability })
            .map_err(Error::connection_pool)?;

        Ok(Pool { inner, capability })
    }

    /// Retrieves a connection from the pool, opening one if the pool is
    /// below its limit.
    pub fn get(&self) -> Result<PoolConnection> {
        let inner = self.inner.get().map_err(Error::connection_pool)?;
        tracing::debug!(open = self.open(), "checked out connection");
        Ok(PoolConnection { inner })
    }

    /// Returns the database driver's capabilities.
    pub fn capability(&self) -> &'static Capability {
        self.capability
    }

    /// Effective maximum number of open connections.
    pub fn max_size(&self) -> usize {
        self.inner.max_size() as usize
    }

    /// Number of connections currently open, idle or checked out.
    pub fn open(&self) -> usize {
        self.inner.state().connections as usize
    }
}

impl fmt::Debug for Pool {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Pool")
            .field("max_size", &self.max_size())
            .field("open", &self.open())
            .finish()
    }
}

#[derive(Debug)]
struct Manager {
    driver: Box<dyn Driver>,
    capability: &'static Capability,
}

impl r2d2::ManageConnection for Manager {
    type Connection = Connection;
    type Error = Error;

    fn connect(&self) -> Result<Connection> {
        let connection = self.driver.connect()?;
        tracing::debug!("opened connection");
        Ok(Connection::new(connection, self.capability))
    }

    fn is_valid(&self, _connection: &mut Connection) -> Result<()> {
        Ok(())
    }

    /// A connection handed back with a transaction still open, or one whose
    /// rollback failed, is closed rather than reused.
    fn has_broken(&self, connection: &mut Connection) -> bool {
        let broken = connection.is_broken();
        if broken {
            tracing::debug!(
                depth = connection.depth(),
                "discarding connection that may hold an open transaction"
            );
        }
        broken
    }
}

/// A connection retrieved from a pool.
///
/// When dropped, the connection is returned to the pool for reuse.
pub struct PoolConnection {
    inner: r2d2::PooledConnection<Manager>,
}

impl Deref for PoolConnection {
    type Target = Connection;

    fn deref(&self) -> &Connection {
        &self.inner
    }
}

impl DerefMut for PoolConnection {
    fn deref_mut(&mut self) -> &mut Connection {
        &mut self.inner
    }
}

impl fmt::Debug for PoolConnection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("PoolConnection").field(&*self.inner).finish()
    }
}

use super::{Config, Db, Pool, PoolConfig, Registry};
use crate::Result;

use relata_core::{bail, driver::Driver};
use std::time::Duration;

#[derive(Debug, Default)]
pub struct Builder {
    url: Option<String>,

    /// A driver supplied directly, bypassing URL resolution.
    driver: Option<Box<dyn Driver>>,

    pool: PoolConfig,

    registry: Registry,
}

impl Builder {
    pub fn from_config(config: &Config) -> Builder {
        Builder {
            url: Some(config.url.clone()),
            pool: config.pool.clone(),
            ..Builder::default()
        }
    }

    pub fn url(&mut self, url: impl Into<String>) -> &mut Self {
        self.url = Some(url.into());
        self
    }

    /// Use `driver` instead of resolving one from the URL.
    pub fn driver(&mut self, driver: impl Driver) -> &mut Self {
        self.driver = Some(Box::new(driver));
        self
    }

    pub fn max_connections(&mut self, max: usize) -> &mut Self {
        self.pool.max_size = max;
        self
    }

    pub fn acquire_timeout(&mut self, timeout: Duration) -> &mut Self {
        self.pool.acquire_timeout = timeout;
        self
    }

    pub fn registry(&mut self, registry: Registry) -> &mut Self {
        self.registry = registry;
        self
    }

    pub fn build(&mut self) -> Result<Db> {
        let driver = match (self.driver.take(), &self.url) {
            (Some(driver), _) => driver,
            (None, Some(url)) => self.registry.resolve(url)?,
            (None, None) => bail!("database builder needs a url or a driver"),
        };

        let pool = Pool::new(driver, self.pool.clone())?;
        tracing::debug!(max_size = pool.max_size(), "built connection pool");

        Ok(Db::from_pool(pool))
    }
}

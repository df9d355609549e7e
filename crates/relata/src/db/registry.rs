use crate::Result;

use indexmap::IndexMap;
use relata_core::{driver::Driver, Error};
use std::{fmt, sync::Arc};
use url::Url;

/// Builds a driver for a parsed connection URL.
pub type DriverFactory = Arc<dyn Fn(&Url) -> Result<Box<dyn Driver>> + Send + Sync>;

/// Maps a connection URL scheme to the driver that serves it.
///
/// `Registry::default()` holds the drivers compiled into this build; more
/// can be registered before the registry is handed to a `Builder`.
#[derive(Clone)]
pub struct Registry {
    drivers: IndexMap<String, DriverFactory>,
}

impl Registry {
    /// A registry with no drivers.
    pub fn empty() -> Registry {
        Registry {
            drivers: IndexMap::new(),
        }
    }

    pub fn register<F>(&mut self, scheme: impl Into<String>, factory: F) -> &mut Self
    where
        F: Fn(&Url) -> Result<Box<dyn Driver>> + Send + Sync + 'static,
    {
        self.drivers.insert(scheme.into(), Arc::new(factory));
        self
    }

    pub fn schemes(&self) -> impl Iterator<Item = &str> {
        self.drivers.keys().map(String::as_str)
    }

    /// Parse `url` and build the driver registered for its scheme.
    pub fn resolve(&self, url: &str) -> Result<Box<dyn Driver>> {
        let parsed = Url::parse(url)
            .map_err(|err| Error::invalid_connection_url(url, err.to_string()))?;

        let Some(factory) = self.drivers.get(parsed.scheme()) else {
            let known = self.schemes().collect::<Vec<_>>().join(", ");
            return Err(Error::invalid_connection_url(
                url,
                format!(
                    "no driver registered for scheme `{}`; registered: [{known}]",
                    parsed.scheme()
                ),
            ));
        };

        tracing::debug!(scheme = parsed.scheme(), "resolved driver");
        factory(&parsed)
    }
}

impl Default for Registry {
    fn default() -> Registry {
        #[allow(unused_mut)]
        let mut registry = Registry::empty();

        #[cfg(feature = "sqlite")]
        registry.register("sqlite", |url| {
            let driver = relata_driver_sqlite::Sqlite::new(url.as_str())?;
            Ok(Box::new(driver) as Box<dyn Driver>)
        });

        registry
    }
}

impl fmt::Debug for Registry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Registry")
            .field("schemes", &self.drivers.keys().collect::<Vec<_>>())
            .finish()
    }
}

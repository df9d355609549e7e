use crate::Result;

use serde::Deserialize;
use std::time::Duration;

/// Connection settings, usually loaded from a TOML file:
///
/// ```toml
/// url = "sqlite:app.db"
///
/// [pool]
/// max-size = 4
/// acquire-timeout-ms = 5000
/// ```
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "kebab-case", deny_unknown_fields)]
pub struct Config {
    pub url: String,

    #[serde(default)]
    pub pool: PoolConfig,
}

/// Configuration for connection pool behavior.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "kebab-case", deny_unknown_fields)]
pub struct PoolConfig {
    #[serde(default = "default_max_size")]
    pub max_size: usize,

    #[serde(
        default = "default_acquire_timeout",
        rename = "acquire-timeout-ms",
        deserialize_with = "de_millis"
    )]
    pub acquire_timeout: Duration,
}

impl Config {
    pub fn from_toml(src: &str) -> Result<Config> {
        Ok(toml::from_str(src).map_err(anyhow::Error::from)?)
    }
}

impl Default for PoolConfig {
    fn default() -> PoolConfig {
        PoolConfig {
            max_size: default_max_size(),
            acquire_timeout: default_acquire_timeout(),
        }
    }
}

fn default_max_size() -> usize {
    std::thread::available_parallelism()
        .map(|n| n.get() * 2)
        .unwrap_or(4)
}

fn default_acquire_timeout() -> Duration {
    Duration::from_secs(30)
}

fn de_millis<'de, D>(deserializer: D) -> std::result::Result<Duration, D::Error>
where
    D: serde::Deserializer<'de>,
{
    u64::deserialize(deserializer).map(Duration::from_millis)
}

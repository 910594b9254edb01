//! Layered settings: defaults → TOML file → `MEMPOOL_*` env → CLI flags.

use std::path::Path;

use anyhow::{Context, Result, bail};
use figment::Figment;
use figment::providers::{Env, Format, Serialized, Toml};
use mempool_allocator::PoolConfig;
use serde::{Deserialize, Serialize};

/// Pool capacity used when nothing else sets one
pub const DEFAULT_SIZE: usize = 4096;

/// Prefix for environment overrides, e.g. `MEMPOOL_SIZE`, `MEMPOOL_POOL__NAME`
pub const ENV_PREFIX: &str = "MEMPOOL_";

/// Effective settings for one run
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Pool capacity in bytes
    pub size: usize,
    /// Pool configuration
    pub pool: PoolConfig,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            size: DEFAULT_SIZE,
            pool: PoolConfig::default(),
        }
    }
}

/// Values given on the command line; they win over every other layer
#[derive(Debug, Default)]
pub struct Overrides {
    pub size: Option<usize>,
    pub name: Option<String>,
}

pub fn load(file: Option<&Path>, overrides: Overrides) -> Result<Settings> {
    let mut figment = Figment::from(Serialized::defaults(Settings::default()));

    if let Some(path) = file {
        if !path.exists() {
            bail!("Config file not found: {}", path.display());
        }
        figment = figment.merge(Toml::file(path));
    }

    figment = figment.merge(Env::prefixed(ENV_PREFIX).split("__"));

    if let Some(size) = overrides.size {
        figment = figment.merge(Serialized::default("size", size));
    }
    if let Some(name) = overrides.name {
        figment = figment.merge(Serialized::default("pool.name", name));
    }

    let settings: Settings = figment.extract().context("Invalid configuration")?;
    if settings.size == 0 {
        bail!("Pool size must be greater than zero");
    }

    tracing::debug!(size = settings.size, pool = %settings.pool.name, "Loaded settings");
    Ok(settings)
}

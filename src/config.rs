//! Runtime configuration from environment variables (a `.env` file is honoured by the server).

use crate::error::ConfigError;
use serde::Serialize;
use std::str::FromStr;

/// Row limits applied to list endpoints.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub struct ListLimits {
    pub default: u32,
    pub max: u32,
}

impl Default for ListLimits {
    fn default() -> Self {
        ListLimits { default: 50, max: 1000 }
    }
}

impl ListLimits {
    /// Requested limit clamped to `1..=max`; missing or unparsable falls back to the default.
    pub fn apply(&self, requested: Option<&str>) -> u32 {
        requested
            .and_then(|s| s.trim().parse::<u32>().ok())
            .unwrap_or(self.default)
            .clamp(1, self.max.max(1))
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ModuleConfig {
    pub database_url: String,
    pub bind_addr: String,
    pub max_connections: u32,
    pub limits: ListLimits,
}

impl Default for ModuleConfig {
    fn default() -> Self {
        ModuleConfig {
            database_url: "postgres://localhost/erp".into(),
            bind_addr: "0.0.0.0:3000".into(),
            max_connections: 5,
            limits: ListLimits::default(),
        }
    }
}

impl ModuleConfig {
    /// Reads `DATABASE_URL`, `BIND_ADDR`, `DB_MAX_CONNECTIONS`, `CUSTOMER_LIST_LIMIT`, `MAX_LIST_LIMIT`.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = ModuleConfig::default();
        Ok(ModuleConfig {
            database_url: lookup("DATABASE_URL").unwrap_or(defaults.database_url),
            bind_addr: lookup("BIND_ADDR").unwrap_or(defaults.bind_addr),
            max_connections: parse(&lookup, "DB_MAX_CONNECTIONS", defaults.max_connections)?,
            limits: ListLimits {
                default: parse(&lookup, "CUSTOMER_LIST_LIMIT", defaults.limits.default)?,
                max: parse(&lookup, "MAX_LIST_LIMIT", defaults.limits.max)?,
            },
        })
    }
}

fn parse<F, T>(lookup: &F, key: &'static str, default: T) -> Result<T, ConfigError>
where
    F: Fn(&str) -> Option<String>,
    T: FromStr,
{
    match lookup(key) {
        None => Ok(default),
        Some(raw) => raw
            .trim()
            .parse()
            .map_err(|_| ConfigError::Invalid { key, value: raw }),
    }
}

use std::path::{Path, PathBuf};

use anyhow::Context;
use serde::de::DeserializeOwned;
use toml::{map::Map, Value};
use tracing::debug;

/// Directory holding `Config.toml` and `Secrets.toml`.
///
/// `DEVEVENT_CONFIG_DIR` wins, otherwise the current working directory.
pub fn config_dir() -> PathBuf {
    if let Some(dir) = std::env::var_os("DEVEVENT_CONFIG_DIR") {
        return PathBuf::from(dir);
    }

    std::env::current_dir().unwrap_or_else(|_| PathBuf::from("."))
}

/// Reads a typed config file. A missing file yields `T::default()`.
pub fn load_config<T>(config_name: &str) -> anyhow::Result<T>
where
    T: DeserializeOwned + Default,
{
    load_config_from(&config_dir().join(config_name))
}

pub fn load_config_from<T>(path: &Path) -> anyhow::Result<T>
where
    T: DeserializeOwned + Default,
{
    if !path.exists() {
        debug!(path = %path.display(), "config file not found, using defaults");
        return Ok(T::default());
    }

    let config = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read {}", path.display()))?;

    toml::from_str::<T>(&config)
        .with_context(|| format!("failed to parse {}", path.display()))
}

/// Secret values from `Secrets.toml`, overridden by process environment
/// variables of the same name.
#[derive(Clone, Debug, Default)]
pub struct Secrets {
    file: Map<String, Value>,
}

impl Secrets {
    pub fn load() -> anyhow::Result<Self> {
        let path = config_dir().join("Secrets.toml");
        if !path.exists() {
            return Ok(Self::default());
        }

        let secrets = std::fs::read_to_string(&path)
            .context("failed to read Secrets.toml")?;

        Self::from_toml(&secrets)
    }

    pub fn from_toml(secrets: &str) -> anyhow::Result<Self> {
        let file = toml::from_str::<Map<String, Value>>(secrets)
            .context("failed to parse Secrets.toml")?;

        Ok(Self { file })
    }

    pub fn get(&self, key: &str) -> Option<String> {
        if let Ok(value) = std::env::var(key) {
            if !value.trim().is_empty() {
                return Some(value);
            }
        }

        self.file
            .get(key)
            .and_then(Value::as_str)
            .map(str::trim)
            .filter(|value| !value.is_empty())
            .map(str::to_string)
    }

    pub fn require(&self, key: &str) -> anyhow::Result<String> {
        self.get(key).with_context(|| {
            format!("{key} must be set in the environment or Secrets.toml")
        })
    }
}

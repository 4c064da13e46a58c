use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("toml parse error: {0}")]
    TomlDe(#[from] toml::de::Error),
}

pub type ConfigResult<T> = Result<T, ConfigError>;

/// Shape of the mock cache built before every command.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FixtureConfig {
    /// Seed for relation picks and fake values. Unseeded runs differ.
    pub seed: Option<u64>,
    pub users: usize,
    pub posts: usize,
    pub comments: usize,
    pub demo_user: DemoUser,
}

/// The user that owns posts created through the CLI.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DemoUser {
    pub name: String,
    pub email: String,
}

impl Default for FixtureConfig {
    fn default() -> Self {
        Self {
            seed: None,
            users: 20,
            posts: 50,
            comments: 100,
            demo_user: DemoUser::default(),
        }
    }
}

impl Default for DemoUser {
    fn default() -> Self {
        Self {
            name: "Demo user".to_string(),
            email: "user@demo.com".to_string(),
        }
    }
}

impl FixtureConfig {
    pub fn from_toml(content: &str) -> ConfigResult<Self> {
        Ok(toml::from_str(content)?)
    }

    /// Command-line values win over file values.
    pub fn with_seed(mut self, seed: Option<u64>) -> Self {
        if seed.is_some() {
            self.seed = seed;
        }
        self
    }
}

/// Read the fixture file at `path`, or fall back to defaults when no path is
/// given.
pub fn load_config(path: Option<&Path>) -> ConfigResult<FixtureConfig> {
    match path {
        Some(path) => {
            let content = std::fs::read_to_string(path)?;
            FixtureConfig::from_toml(&content)
        }
        None => Ok(FixtureConfig::default()),
    }
}

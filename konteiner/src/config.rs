//! Container configuration is created with opinionated default values, which can then be
//! overwritten by a `konteiner.json` file and environment variables prefixed with `KONTEINER_`
//! (in that order).

use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;

const CONFIG_ENV_PREFIX: &str = "KONTEINER";

/// Name of the default config file.
pub const CONFIG_FILE: &str = "konteiner.json";

/// Container configuration.
#[non_exhaustive]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct ContainerConfig {
    /// Should registering an already registered creator from a different source location replace
    /// the existing registration. If disabled, such registration fails.
    pub allow_overriding: bool,
}

impl Default for ContainerConfig {
    fn default() -> Self {
        Self {
            allow_overriding: true,
        }
    }
}

impl From<OptionalContainerConfig> for ContainerConfig {
    fn from(value: OptionalContainerConfig) -> Self {
        let default = Self::default();
        Self {
            allow_overriding: value.allow_overriding.unwrap_or(default.allow_overriding),
        }
    }
}

impl ContainerConfig {
    /// Reads configuration from [CONFIG_FILE] and the environment.
    pub fn init_from_environment() -> Result<Self, ConfigError> {
        Self::init_from_file(CONFIG_FILE)
    }

    /// Reads configuration from given file and the environment. The file is optional.
    pub fn init_from_file(path: &str) -> Result<Self, ConfigError> {
        Config::builder()
            .add_source(File::with_name(path).required(false))
            .add_source(Environment::with_prefix(CONFIG_ENV_PREFIX))
            .build()
            .and_then(|config| config.try_deserialize::<OptionalContainerConfig>())
            .map(|config| config.into())
    }

    pub fn with_allow_overriding(mut self, allow_overriding: bool) -> Self {
        self.allow_overriding = allow_overriding;
        self
    }
}

#[derive(Deserialize)]
struct OptionalContainerConfig {
    allow_overriding: Option<bool>,
}

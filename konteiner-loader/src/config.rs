//! Loader configuration is created with opinionated default values, which can then be overwritten
//! by values from `konteiner.json` file under the `loader` key.

use config::{Config, ConfigError, File};
use konteiner::config::CONFIG_FILE;
use serde::Deserialize;

/// Default filesystem discovery settings, used when [RegisterPathOptions](crate::RegisterPathOptions)
/// don't say otherwise.
#[non_exhaustive]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct LoaderConfig {
    /// Regular expressions matched against full file paths. Matching files are skipped.
    pub exclude: Vec<String>,
    /// How deep to descend into directories: `1` means only the given directory, negative values
    /// mean no limit.
    pub dir_search_depth: i32,
    /// File name suffixes of files which should be considered.
    pub supported_extensions: Vec<String>,
}

impl Default for LoaderConfig {
    fn default() -> Self {
        Self {
            exclude: vec![],
            dir_search_depth: 1,
            supported_extensions: vec![".rs".to_string()],
        }
    }
}

impl From<OptionalLoaderConfig> for LoaderConfig {
    fn from(value: OptionalLoaderConfig) -> Self {
        let default = Self::default();
        Self {
            exclude: value.exclude.unwrap_or(default.exclude),
            dir_search_depth: value.dir_search_depth.unwrap_or(default.dir_search_depth),
            supported_extensions: value
                .supported_extensions
                .unwrap_or(default.supported_extensions),
        }
    }
}

impl LoaderConfig {
    /// Reads configuration from [CONFIG_FILE].
    pub fn init_from_environment() -> Result<Self, ConfigError> {
        Self::init_from_file(CONFIG_FILE)
    }

    /// Reads configuration from given optional file.
    pub fn init_from_file(path: &str) -> Result<Self, ConfigError> {
        Config::builder()
            .add_source(File::with_name(path).required(false))
            .build()
            .and_then(|config| config.try_deserialize::<OptionalLoaderConfigWrapper>())
            .map(|config| config.loader.map(|config| config.into()).unwrap_or_default())
    }

    pub fn with_exclude<I, T>(mut self, exclude: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: ToString,
    {
        self.exclude = exclude.into_iter().map(|entry| entry.to_string()).collect();
        self
    }

    pub fn with_dir_search_depth(mut self, dir_search_depth: i32) -> Self {
        self.dir_search_depth = dir_search_depth;
        self
    }

    pub fn with_supported_extensions<I, T>(mut self, supported_extensions: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: ToString,
    {
        self.supported_extensions = supported_extensions
            .into_iter()
            .map(|extension| extension.to_string())
            .collect();
        self
    }
}

#[derive(Deserialize)]
struct OptionalLoaderConfig {
    #[serde(alias = "skip_files")]
    exclude: Option<Vec<String>>,
    dir_search_depth: Option<i32>,
    supported_extensions: Option<Vec<String>>,
}

#[derive(Deserialize)]
struct OptionalLoaderConfigWrapper {
    loader: Option<OptionalLoaderConfig>,
}

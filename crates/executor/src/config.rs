use config::{Config as ConfigLoader, Environment, File};
use serde::Deserialize;
use std::env;
use std::path::{Path, PathBuf};

use super::error::Error;

#[derive(Debug, Deserialize, Clone)]
pub struct LoaderConfig {
    /// Edges per message sent from a streamer to the writer.
    pub batch_size: usize,
    pub channel_capacity: usize,
}

#[derive(Debug, Deserialize, Clone)]
pub struct RandomConfig {
    pub vertices: usize,
    pub edges: usize,
    pub seed: u64,
}

#[derive(Debug, Deserialize, Clone)]
pub struct SearchConfig {
    pub sources: Vec<usize>,
}

#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    pub loader: LoaderConfig,
    pub random: RandomConfig,
    pub search: SearchConfig,
}

/// Default location, relative to the workspace root.
pub fn default_config_path() -> Result<PathBuf, Error> {
    let base_path = env::current_dir().map_err(|e| {
        Error::ConfigLoadError(format!("Failed to determine current directory: {}", e))
    })?;

    Ok(base_path
        .join("crates")
        .join("executor")
        .join("Config.toml"))
}

/// Loads configuration from a file and `SPFA_`-prefixed environment variables,
/// e.g. `SPFA_LOADER__BATCH_SIZE=512` or `SPFA_SEARCH__SOURCES=0,3`.
pub fn load_config(path: Option<&Path>) -> Result<Config, Error> {
    let config_file_path = match path {
        Some(path) => path.to_path_buf(),
        None => default_config_path()?,
    };

    if !config_file_path.exists() {
        return Err(Error::ConfigLoadError(format!(
            "Configuration file not found at calculated path: {}",
            config_file_path.display()
        )));
    }

    let s = ConfigLoader::builder()
        .add_source(File::from(config_file_path.as_path()).required(true))
        .add_source(
            Environment::with_prefix("SPFA")
                .prefix_separator("_")
                .separator("__")
                .try_parsing(true)
                .list_separator(",")
                .with_list_parse_key("search.sources"),
        )
        .build()
        .map_err(|e| Error::ConfigLoadError(e.to_string()))?;

    let app_config: Config = s
        .try_deserialize()
        .map_err(|e| Error::ConfigLoadError(format!("Failed to deserialize config: {}", e)))?;

    Ok(app_config)
}

use anyhow::Result;
use config::{Config as ConfigLoader, Environment, File};
use serde::Deserialize;
use std::path::{Path, PathBuf};

/// Prefix of environment overrides, e.g. `LLM_EVAL_DATABASE_URL`.
pub const ENV_PREFIX: &str = "LLM_EVAL";

#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct Settings {
    #[serde(default)]
    pub database_url: Option<String>,
    #[serde(default = "default_max_concurrency")]
    pub max_concurrency: usize,
    #[serde(default)]
    pub output_dir: Option<PathBuf>,
    #[serde(default)]
    pub project_name: Option<String>,
    #[serde(default = "default_log_level")]
    pub log_level: String,
    #[serde(default)]
    pub log_json: bool,
}

fn default_max_concurrency() -> usize {
    10
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Settings {
    /// Load `config/default`, `config/local`, then `LLM_EVAL_*` variables.
    pub fn load() -> Result<Self> {
        Self::load_from(Path::new("config"))
    }

    pub fn load_from(dir: &Path) -> Result<Self> {
        let config = ConfigLoader::builder()
            .add_source(File::with_name(&dir.join("default").to_string_lossy()).required(false))
            .add_source(File::with_name(&dir.join("local").to_string_lossy()).required(false))
            .add_source(Environment::with_prefix(ENV_PREFIX).try_parsing(true))
            .build()?;

        Ok(config.try_deserialize()?)
    }
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            database_url: None,
            max_concurrency: default_max_concurrency(),
            output_dir: None,
            project_name: None,
            log_level: default_log_level(),
            log_json: false,
        }
    }
}

//! Configuration loading for the CLI
//!
//! Layers, lowest to highest priority: built-in defaults, the config file,
//! `GKE_ADVISOR_*` environment variables.

use std::path::{Path, PathBuf};

use advisor_lib::AdvisorConfig;
use anyhow::{Context, Result};
use config::{Config, Environment, File};

pub const ENV_PREFIX: &str = "GKE_ADVISOR";

/// Environment source: `GKE_ADVISOR_THRESHOLDS__SCALE_OUT=70`,
/// `GKE_ADVISOR_EXCLUDED_NAMESPACES=kube-system,monitoring`
pub fn environment() -> Environment {
    Environment::with_prefix(ENV_PREFIX)
        .prefix_separator("_")
        .separator("__")
        .list_separator(",")
        .with_list_parse_key("excluded_namespaces")
        .try_parsing(true)
}

/// Load and validate the effective configuration
pub fn load(path: Option<&Path>) -> Result<AdvisorConfig> {
    load_with_env(path, environment())
}

pub fn load_with_env(path: Option<&Path>, env: Environment) -> Result<AdvisorConfig> {
    let defaults = Config::try_from(&AdvisorConfig::default())
        .context("Failed to build default configuration")?;

    let mut builder = Config::builder().add_source(defaults);
    builder = match path {
        Some(path) => builder.add_source(File::from(path).required(true)),
        None => match default_config_path() {
            Some(path) => builder.add_source(File::from(path).required(false)),
            None => builder,
        },
    };

    let config: AdvisorConfig = builder
        .add_source(env)
        .build()
        .context("Failed to load configuration")?
        .try_deserialize()
        .context("Failed to parse configuration")?;

    config.validate()?;
    Ok(config)
}

/// `~/.config/gke-advisor/config.toml`
pub fn default_config_path() -> Option<PathBuf> {
    dirs_next::home_dir().map(|home| home.join(".config").join("gke-advisor").join("config.toml"))
}

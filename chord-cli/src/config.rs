use anyhow::{Context, Result};
use chord_core::PipelineConfig;
use serde::Deserialize;
use std::path::{Path, PathBuf};

/// Configuration file picked up from the working directory when no
/// `--config` is given.
pub const DEFAULT_CONFIG_FILE: &str = "chord-detect.toml";

#[derive(Debug, Default, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub pipeline: PipelineConfig,
}

pub fn parse_config(content: &str) -> Result<Config> {
    let config: Config = toml::from_str(content)?;
    config.pipeline.validate()?;
    Ok(config)
}

pub fn load_config(path: &Path) -> Result<Config> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config from {}", path.display()))?;
    parse_config(&content).with_context(|| format!("Invalid config in {}", path.display()))
}

/// Resolves the configuration: an explicit path must load, the implicit
/// local file is used if present, otherwise defaults apply.
pub fn resolve(explicit: Option<&PathBuf>) -> Result<Config> {
    if let Some(path) = explicit {
        let config = load_config(path)?;
        log::info!("Loaded config from {}", path.display());
        return Ok(config);
    }

    let local = PathBuf::from(DEFAULT_CONFIG_FILE);
    if local.exists() {
        let config = load_config(&local)?;
        log::info!("Loaded config from {}", local.display());
        return Ok(config);
    }

    Ok(Config::default())
}

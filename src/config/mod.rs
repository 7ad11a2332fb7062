pub mod persist;
mod types;

pub use types::*;

use anyhow::{Context, Result};
use std::path::{Path, PathBuf};

/// Locations searched when no config path is given, in order.
pub const DEFAULT_CONFIG_PATHS: [&str; 2] = ["./heicwatch.toml", "~/.config/heicwatch/config.toml"];

/// Load configuration from a TOML file
pub fn load_config(path: &Path) -> Result<Config> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file: {:?}", path))?;

    let config = parse_config(&content)
        .with_context(|| format!("Failed to load config file: {:?}", path))?;

    Ok(config)
}

/// Parse and validate configuration from a TOML string
pub fn parse_config(content: &str) -> Result<Config> {
    let config: Config = toml::from_str(content).context("Failed to parse config")?;

    validate_config(&config)?;

    Ok(config)
}

/// Find the first existing default config file.
pub fn find_default_config() -> Option<PathBuf> {
    DEFAULT_CONFIG_PATHS.iter().find_map(|path_str| {
        let path = PathBuf::from(shellexpand::tilde(path_str).into_owned());
        path.exists().then_some(path)
    })
}

/// Load config from default locations or return default config
pub fn load_config_or_default(custom_path: Option<&Path>) -> Result<Config> {
    if let Some(path) = custom_path {
        return load_config(path);
    }

    match find_default_config() {
        Some(path) => {
            tracing::debug!("Using config file {:?}", path);
            load_config(&path)
        }
        None => Ok(Config::default()),
    }
}

/// Validate configuration
pub fn validate_config(config: &Config) -> Result<()> {
    let source = &config.conversion.source_extension;
    let target = &config.conversion.target_extension;

    for (name, ext) in [("source_extension", source), ("target_extension", target)] {
        if ext.is_empty() {
            anyhow::bail!("conversion.{} cannot be empty", name);
        }
        if ext.starts_with('.') {
            anyhow::bail!("conversion.{} must not start with a dot: {:?}", name, ext);
        }
    }

    if source.eq_ignore_ascii_case(target) {
        anyhow::bail!(
            "conversion.source_extension and target_extension are both {:?}",
            source
        );
    }

    if config.tools.converter.trim().is_empty() {
        anyhow::bail!("tools.converter cannot be empty");
    }

    if config.trash.max_attempts == 0 {
        anyhow::bail!("trash.max_attempts must be at least 1");
    }

    let marker = &config.trash.marker;
    if marker.is_empty() || marker.contains('/') || marker.contains('\\') {
        anyhow::bail!("trash.marker must be a single path component: {:?}", marker);
    }

    if let Some(path) = &config.watch.path {
        if !path.exists() {
            tracing::warn!("Watch path does not exist: {:?}", path);
        }
    }

    Ok(())
}

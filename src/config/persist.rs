//! Configuration persistence using toml_edit to preserve formatting and comments.

use super::WatchConfig;
use anyhow::{Context, Result};
use std::path::Path;
use toml_edit::DocumentMut;

/// Save the entire config to a TOML file
pub fn save_config(path: &Path, config: &super::Config) -> Result<()> {
    let content = toml::to_string_pretty(config).with_context(|| "Failed to serialize config")?;

    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create config directory: {:?}", parent))?;
    }

    std::fs::write(path, content)
        .with_context(|| format!("Failed to write config file: {:?}", path))?;

    Ok(())
}

/// Update just the watch section of the config file, creating the file if needed
pub fn update_watch(path: &Path, watch: &WatchConfig) -> Result<()> {
    let content = if path.exists() {
        std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {:?}", path))?
    } else {
        String::new()
    };

    let mut doc: DocumentMut = content
        .parse()
        .with_context(|| format!("Failed to parse config file: {:?}", path))?;

    let watch_toml = toml::to_string(&WatchWrapper {
        watch: watch.clone(),
    })
    .with_context(|| "Failed to serialize watch settings")?;
    let watch_doc: DocumentMut = watch_toml
        .parse()
        .with_context(|| "Failed to parse serialized watch settings")?;

    match watch_doc.get("watch") {
        Some(watch_item) => doc["watch"] = watch_item.clone(),
        None => {
            doc.remove("watch");
        }
    }

    std::fs::write(path, doc.to_string())
        .with_context(|| format!("Failed to write config file: {:?}", path))?;

    Ok(())
}

#[derive(serde::Serialize)]
struct WatchWrapper {
    watch: WatchConfig,
}

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
pub struct Config {
    #[serde(default)]
    pub watch: WatchConfig,

    #[serde(default)]
    pub conversion: ConversionConfig,

    #[serde(default)]
    pub tools: ToolsConfig,

    #[serde(default)]
    pub trash: TrashConfig,
}

impl Config {
    /// Snapshot of the optional pipeline behaviours.
    pub fn policy(&self) -> ConversionPolicy {
        ConversionPolicy {
            auto_delete: self.watch.auto_delete,
            convert_existing: self.watch.convert_existing,
        }
    }
}

/// Optional behaviours of the pipeline, fixed at startup.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ConversionPolicy {
    /// Move the source file to the trash after a successful conversion.
    pub auto_delete: bool,
    /// Convert files already present under the root before watching.
    pub convert_existing: bool,
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct WatchConfig {
    /// Directory to watch when none is given on the command line.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub path: Option<PathBuf>,

    #[serde(default)]
    pub convert_existing: bool,

    #[serde(default)]
    pub auto_delete: bool,

    /// Drop repeated create events for the same path within this window.
    #[serde(default = "default_dedupe_window")]
    pub dedupe_window_ms: u64,
}

fn default_dedupe_window() -> u64 {
    2000
}

impl WatchConfig {
    pub fn dedupe_window(&self) -> Duration {
        Duration::from_millis(self.dedupe_window_ms)
    }
}

impl Default for WatchConfig {
    fn default() -> Self {
        Self {
            path: None,
            convert_existing: false,
            auto_delete: false,
            dedupe_window_ms: default_dedupe_window(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct ConversionConfig {
    #[serde(default = "default_source_extension")]
    pub source_extension: String,

    #[serde(default = "default_target_extension")]
    pub target_extension: String,
}

fn default_source_extension() -> String {
    "heic".to_string()
}

fn default_target_extension() -> String {
    "jpg".to_string()
}

impl Default for ConversionConfig {
    fn default() -> Self {
        Self {
            source_extension: default_source_extension(),
            target_extension: default_target_extension(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct ToolsConfig {
    /// Converter executable, either a name looked up on PATH or a path.
    #[serde(default = "default_converter")]
    pub converter: String,

    /// Kill the converter after this many seconds. Unset means no limit.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timeout_secs: Option<u64>,
}

fn default_converter() -> String {
    "magick".to_string()
}

impl Default for ToolsConfig {
    fn default() -> Self {
        Self {
            converter: default_converter(),
            timeout_secs: None,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum TrashMode {
    /// Platform recycle bin.
    #[default]
    System,
    /// `<watch root>/<marker>` directory.
    Directory,
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct TrashConfig {
    #[serde(default)]
    pub mode: TrashMode,

    /// Path component identifying the trash; events below it are ignored.
    #[serde(default = "default_marker")]
    pub marker: String,

    #[serde(default = "default_max_attempts")]
    pub max_attempts: u32,

    #[serde(default = "default_retry_delay")]
    pub retry_delay_ms: u64,
}

fn default_marker() -> String {
    ".Trash".to_string()
}

fn default_max_attempts() -> u32 {
    10
}

fn default_retry_delay() -> u64 {
    500
}

impl TrashConfig {
    pub fn retry_delay(&self) -> Duration {
        Duration::from_millis(self.retry_delay_ms)
    }
}

impl Default for TrashConfig {
    fn default() -> Self {
        Self {
            mode: TrashMode::default(),
            marker: default_marker(),
            max_attempts: default_max_attempts(),
            retry_delay_ms: default_retry_delay(),
        }
    }
}

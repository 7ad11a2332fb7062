use heicwatch_tools::{get_tool_path, ToolCommand};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::{info, warn};

use crate::config::Config;

/// Result of one conversion attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConversionOutcome {
    pub source: PathBuf,
    pub destination: PathBuf,
    pub succeeded: bool,
}

/// Runs the external converter as `<program> convert <source> <destination>`.
#[derive(Debug, Clone)]
pub struct Converter {
    program: PathBuf,
    target_extension: String,
    timeout: Option<Duration>,
}

impl Converter {
    pub fn new(program: impl Into<PathBuf>, target_extension: impl Into<String>) -> Self {
        Self {
            program: program.into(),
            target_extension: target_extension.into(),
            timeout: None,
        }
    }

    pub fn from_config(config: &Config) -> Self {
        let mut converter = Self::new(
            &config.tools.converter,
            &config.conversion.target_extension,
        );
        converter.timeout = config.tools.timeout_secs.map(Duration::from_secs);
        converter
    }

    /// Same directory and stem as `source`, with the target extension.
    pub fn destination_for(&self, source: &Path) -> PathBuf {
        source.with_extension(&self.target_extension)
    }

    /// Convert `source`, waiting for the converter to exit.
    ///
    /// Never fails: a converter that cannot be found, spawn errors, non-zero
    /// exits and sources that vanished before the converter ran are all
    /// logged and reported as `succeeded == false`.
    pub async fn convert(&self, source: &Path) -> ConversionOutcome {
        let destination = self.destination_for(source);
        let mut outcome = ConversionOutcome {
            source: source.to_path_buf(),
            destination,
            succeeded: false,
        };

        if !source.is_file() {
            warn!(path = %source.display(), "Source file disappeared before conversion");
            return outcome;
        }

        let program = match get_tool_path(&self.program) {
            Ok(program) => program,
            Err(e) => {
                warn!(path = %source.display(), error = %e, "Conversion failed");
                return outcome;
            }
        };

        info!(
            path = %source.display(),
            "Converting {} to {}...",
            source.display(),
            self.target_extension
        );

        let mut cmd = ToolCommand::new(program);
        cmd.arg("convert").arg(source).arg(&outcome.destination);
        if let Some(limit) = self.timeout {
            cmd.timeout(limit);
        }

        match cmd.execute().await {
            Ok(_) => {
                outcome.succeeded = true;
                info!(
                    path = %source.display(),
                    destination = %outcome.destination.display(),
                    "Conversion finished for {}",
                    source.display()
                );
            }
            Err(e) => {
                warn!(path = %source.display(), error = %e, "Conversion failed");
            }
        }

        outcome
    }
}

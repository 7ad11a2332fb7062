use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};
use walkdir::WalkDir;

use super::has_extension;
use crate::config::Config;
use crate::pipeline::ConversionPipeline;

/// Summary of a startup sweep.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BulkReport {
    pub found: usize,
    pub converted: usize,
    pub failed: usize,
}

/// Converts source files that already exist under the root before the
/// watcher starts.
#[derive(Debug, Clone)]
pub struct BulkConverter {
    pipeline: ConversionPipeline,
    source_extension: String,
    trash_marker: String,
}

impl BulkConverter {
    pub fn new(
        pipeline: ConversionPipeline,
        source_extension: impl Into<String>,
        trash_marker: impl Into<String>,
    ) -> Self {
        Self {
            pipeline,
            source_extension: source_extension.into(),
            trash_marker: trash_marker.into(),
        }
    }

    pub fn from_config(config: &Config, pipeline: ConversionPipeline) -> Self {
        Self::new(
            pipeline,
            &config.conversion.source_extension,
            &config.trash.marker,
        )
    }

    /// Every regular file under `root` with the source extension, in walk
    /// order. The trash directory is not descended into.
    pub fn find_sources(&self, root: &Path) -> Vec<PathBuf> {
        let marker = self.trash_marker.as_str();

        WalkDir::new(root)
            .into_iter()
            .filter_entry(|e| {
                !(e.depth() > 0 && e.file_type().is_dir() && e.file_name() == marker)
            })
            .filter_map(|e| match e {
                Ok(entry) => Some(entry),
                Err(err) => {
                    warn!(error = %err, "Error walking directory");
                    None
                }
            })
            .filter(|entry| entry.file_type().is_file())
            .filter(|entry| has_extension(entry.path(), &self.source_extension))
            .map(|entry| entry.into_path())
            .collect()
    }

    /// Run every existing source file through the pipeline, one at a time.
    pub async fn convert_existing(&self, root: &Path) -> BulkReport {
        let sources = self.find_sources(root);
        let mut report = BulkReport {
            found: sources.len(),
            ..BulkReport::default()
        };

        info!(
            root = %root.display(),
            "Converting {} existing .{} file(s)",
            report.found,
            self.source_extension
        );

        for source in sources {
            debug!(path = %source.display(), "Converting existing file");
            if self.pipeline.process(&source).await.succeeded {
                report.converted += 1;
            } else {
                report.failed += 1;
            }
        }

        info!(
            converted = report.converted,
            failed = report.failed,
            "Finished converting existing files"
        );

        report
    }
}

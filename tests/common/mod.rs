//! Shared test harness for integration tests.
//!
//! Provides a fake converter script (copies `<src>` to `<dst>`, fails for
//! sources whose name contains `fail`, and for names containing `slow` writes
//! `<dst>.started` then sleeps a second first), a [`TestHarness`] that wires
//! the pipeline against a temporary watch root, and a [`LogBuffer`] to
//! capture tracing output.

#![allow(dead_code)]

use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, OnceLock};
use std::time::Duration;

use heicwatch::config::{Config, TrashMode};
use heicwatch::pipeline::ConversionPipeline;
use heicwatch::watch::{FileWatcher, WatchTarget};
use tempfile::TempDir;
use tracing_subscriber::fmt::MakeWriter;

const FAKE_CONVERTER: &str = r#"#!/bin/sh
[ "$1" = "convert" ] || exit 2
case "$(basename "$2")" in
  *fail*) echo "cannot convert $2" >&2; exit 1 ;;
  *slow*) : > "$3.started"; sleep 1 ;;
esac
cp "$2" "$3"
"#;

/// Path to the fake converter, written once per test binary.
#[cfg(unix)]
pub fn fake_converter() -> &'static Path {
    static PATH: OnceLock<PathBuf> = OnceLock::new();
    PATH.get_or_init(|| {
        use std::os::unix::fs::PermissionsExt;

        let dir = PathBuf::from(env!("CARGO_TARGET_TMPDIR"));
        std::fs::create_dir_all(&dir).expect("failed to create target tmpdir");
        let path = dir.join(format!("fake-magick-{}.sh", std::process::id()));
        std::fs::write(&path, FAKE_CONVERTER).expect("failed to write fake converter");
        std::fs::set_permissions(&path, std::fs::Permissions::from_mode(0o755))
            .expect("failed to chmod fake converter");
        path
    })
}

/// Poll `check` every 50ms until it holds or `timeout` passes.
pub async fn wait_for(timeout: Duration, mut check: impl FnMut() -> bool) -> bool {
    let deadline = tokio::time::Instant::now() + timeout;
    loop {
        if check() {
            return true;
        }
        if tokio::time::Instant::now() >= deadline {
            return false;
        }
        tokio::time::sleep(Duration::from_millis(50)).await;
    }
}

/// A temporary watch root plus a config pointing at the fake converter.
pub struct TestHarness {
    pub dir: TempDir,
    pub config: Config,
}

impl TestHarness {
    #[cfg(unix)]
    pub fn new() -> Self {
        let dir = tempfile::tempdir().expect("failed to create watch root");

        let mut config = Config::default();
        config.tools.converter = fake_converter().display().to_string();
        config.trash.mode = TrashMode::Directory;
        config.watch.path = Some(dir.path().to_path_buf());

        Self { dir, config }
    }

    pub fn root(&self) -> &Path {
        self.dir.path()
    }

    pub fn target(&self) -> WatchTarget {
        WatchTarget::new(self.root()).expect("watch root should be valid")
    }

    pub fn pipeline(&self) -> ConversionPipeline {
        ConversionPipeline::from_config(&self.config, self.target().path())
    }

    /// A watcher that is already subscribed, so files created after this
    /// call are seen.
    pub fn started_watcher(&self) -> FileWatcher {
        let mut watcher = FileWatcher::from_config(&self.config, self.target(), self.pipeline());
        watcher.start().expect("watcher should start");
        watcher
    }

    pub fn write(&self, name: &str) -> PathBuf {
        let path = self.root().join(name);
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).expect("failed to create parent dir");
        }
        std::fs::write(&path, b"not really an image").expect("failed to write file");
        path
    }
}

/// In-memory sink for `tracing_subscriber::fmt` output.
#[derive(Clone, Default)]
pub struct LogBuffer(Arc<Mutex<Vec<u8>>>);

impl LogBuffer {
    pub fn contents(&self) -> String {
        String::from_utf8_lossy(&self.0.lock().unwrap()).to_string()
    }
}

impl std::io::Write for LogBuffer {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        self.0.lock().unwrap().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> std::io::Result<()> {
        Ok(())
    }
}

impl<'a> MakeWriter<'a> for LogBuffer {
    type Writer = LogBuffer;

    fn make_writer(&'a self) -> Self::Writer {
        self.clone()
    }
}

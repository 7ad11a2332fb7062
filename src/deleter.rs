//! Best-effort, retrying move-to-trash.

use heicwatch_tools::{DirectoryTrash, SystemTrash, Trash};
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;
use tracing::{error, info, warn};

use crate::config::{TrashConfig, TrashMode};

pub const DEFAULT_MAX_ATTEMPTS: u32 = 10;
pub const DEFAULT_RETRY_DELAY: Duration = Duration::from_millis(500);

/// What happened to a file handed to [`Deleter::delete`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DeleteOutcome {
    /// Number of move attempts made.
    pub attempts: u32,
    /// Whether the file ended up in the trash.
    pub trashed: bool,
}

/// Moves converted sources to the trash, retrying while the file is busy.
#[derive(Clone)]
pub struct Deleter {
    trash: Arc<dyn Trash>,
    max_attempts: u32,
    delay: Duration,
}

impl std::fmt::Debug for Deleter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Deleter")
            .field("max_attempts", &self.max_attempts)
            .field("delay", &self.delay)
            .finish_non_exhaustive()
    }
}

impl Deleter {
    pub fn new(trash: Arc<dyn Trash>) -> Self {
        Self {
            trash,
            max_attempts: DEFAULT_MAX_ATTEMPTS,
            delay: DEFAULT_RETRY_DELAY,
        }
    }

    /// Build the configured trash backend. The directory backend lives under `root`.
    pub fn from_config(config: &TrashConfig, root: &Path) -> Self {
        let trash: Arc<dyn Trash> = match config.mode {
            TrashMode::System => Arc::new(SystemTrash),
            TrashMode::Directory => Arc::new(DirectoryTrash::new(root, &config.marker)),
        };

        Self::new(trash).with_retry(config.max_attempts, config.retry_delay())
    }

    pub fn with_retry(mut self, max_attempts: u32, delay: Duration) -> Self {
        self.max_attempts = max_attempts.max(1);
        self.delay = delay;
        self
    }

    /// Move `path` to the trash.
    ///
    /// Waits before every attempt, including the first, so the converter has
    /// released the file. Failures are logged; after the last attempt the
    /// file is left where it is and nothing is returned to the caller but the
    /// outcome.
    pub async fn delete(&self, path: &Path) -> DeleteOutcome {
        for attempt in 1..=self.max_attempts {
            tokio::time::sleep(self.delay).await;

            match self.trash.move_to_trash(path) {
                Ok(()) => {
                    info!(path = %path.display(), attempt, "Moved source file to trash");
                    return DeleteOutcome {
                        attempts: attempt,
                        trashed: true,
                    };
                }
                Err(e) if attempt < self.max_attempts => {
                    warn!(
                        path = %path.display(),
                        attempt,
                        max_attempts = self.max_attempts,
                        error = %e,
                        "Failed to move file to trash, retrying"
                    );
                }
                Err(e) => {
                    error!(
                        path = %path.display(),
                        attempts = self.max_attempts,
                        error = %e,
                        "Giving up moving file to trash"
                    );
                }
            }
        }

        DeleteOutcome {
            attempts: self.max_attempts,
            trashed: false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use heicwatch_tools::Error;
    use std::sync::atomic::{AtomicU32, Ordering};
    use tokio::time::Instant;

    /// Fails the first `failures` calls, then succeeds.
    struct FlakyTrash {
        failures: u32,
        calls: AtomicU32,
    }

    impl FlakyTrash {
        fn new(failures: u32) -> Arc<Self> {
            Arc::new(Self {
                failures,
                calls: AtomicU32::new(0),
            })
        }
    }

    impl Trash for FlakyTrash {
        fn move_to_trash(&self, path: &Path) -> heicwatch_tools::Result<()> {
            let call = self.calls.fetch_add(1, Ordering::SeqCst) + 1;
            if call <= self.failures {
                Err(Error::trash(path, "resource busy"))
            } else {
                Ok(())
            }
        }
    }

    #[test]
    fn test_defaults() {
        let deleter = Deleter::new(FlakyTrash::new(0));
        assert_eq!(deleter.max_attempts, 10);
        assert_eq!(deleter.delay, Duration::from_millis(500));
    }

    #[tokio::test(start_paused = true)]
    async fn test_waits_before_first_attempt() {
        let trash = FlakyTrash::new(0);
        let deleter = Deleter::new(trash.clone());

        let start = Instant::now();
        let outcome = deleter.delete(Path::new("/photos/a.heic")).await;

        assert_eq!(
            outcome,
            DeleteOutcome {
                attempts: 1,
                trashed: true
            }
        );
        let elapsed = start.elapsed();
        assert!(elapsed >= Duration::from_millis(500), "{elapsed:?}");
        assert!(elapsed < Duration::from_millis(600), "{elapsed:?}");
        assert_eq!(trash.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_retries_until_success() {
        let trash = FlakyTrash::new(3);
        let deleter = Deleter::new(trash.clone());

        let outcome = deleter.delete(Path::new("/photos/a.heic")).await;

        assert!(outcome.trashed);
        assert_eq!(outcome.attempts, 4);
        assert_eq!(trash.calls.load(Ordering::SeqCst), 4);
    }

    #[tokio::test(start_paused = true)]
    async fn test_gives_up_after_ten_attempts() {
        let trash = FlakyTrash::new(u32::MAX);
        let deleter = Deleter::new(trash.clone());

        let start = Instant::now();
        let outcome = deleter.delete(Path::new("/photos/a.heic")).await;

        assert_eq!(
            outcome,
            DeleteOutcome {
                attempts: 10,
                trashed: false
            }
        );
        assert_eq!(trash.calls.load(Ordering::SeqCst), 10);
        let elapsed = start.elapsed();
        assert!(elapsed >= Duration::from_secs(5), "{elapsed:?}");
        assert!(elapsed < Duration::from_millis(5100), "{elapsed:?}");
    }

    #[tokio::test]
    async fn test_permanent_failure_leaves_file_in_place() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("a.heic");
        std::fs::write(&file, b"heic").unwrap();

        let deleter =
            Deleter::new(FlakyTrash::new(u32::MAX)).with_retry(3, Duration::from_millis(1));
        let outcome = deleter.delete(&file).await;

        assert!(!outcome.trashed);
        assert_eq!(std::fs::read(&file).unwrap(), b"heic");
    }

    #[tokio::test]
    async fn test_directory_backend_from_config() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("a.heic");
        std::fs::write(&file, b"heic").unwrap();

        let config = TrashConfig {
            mode: TrashMode::Directory,
            retry_delay_ms: 1,
            ..TrashConfig::default()
        };
        let outcome = Deleter::from_config(&config, dir.path()).delete(&file).await;

        assert!(outcome.trashed);
        assert!(!file.exists());
        assert!(dir.path().join(".Trash/a.heic").exists());
    }
}

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tokio::time::Instant;

/// Remembers recently dispatched paths so a creation reported twice by the
/// notification backend is only converted once.
#[derive(Debug)]
pub struct RecentPaths {
    /// Map of file path to when it was last dispatched or finished
    seen: HashMap<PathBuf, Instant>,
    /// How long a path stays suppressed
    window: Duration,
}

impl RecentPaths {
    pub fn new(window: Duration) -> Self {
        Self {
            seen: HashMap::new(),
            window,
        }
    }

    /// Record `path` at `now`. Returns false if it was already recorded
    /// within the window. A zero window never suppresses.
    pub fn first_seen_at(&mut self, path: &Path, now: Instant) -> bool {
        if self.window.is_zero() {
            return true;
        }

        let window = self.window;
        self.seen
            .retain(|_, last| now.saturating_duration_since(*last) < window);

        if self.seen.contains_key(path) {
            return false;
        }

        self.seen.insert(path.to_path_buf(), now);
        true
    }

    pub fn first_seen(&mut self, path: &Path) -> bool {
        self.first_seen_at(path, Instant::now())
    }

    /// Restart the window for `path` at `now`, once its conversion is done.
    ///
    /// A duplicate queued behind a slow conversion is then still suppressed.
    pub fn mark_done_at(&mut self, path: &Path, now: Instant) {
        if self.window.is_zero() {
            return;
        }
        self.seen.insert(path.to_path_buf(), now);
    }

    pub fn mark_done(&mut self, path: &Path) {
        self.mark_done_at(path, Instant::now())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_duplicate_within_window_is_suppressed() {
        let mut recent = RecentPaths::new(Duration::from_secs(2));
        let t0 = Instant::now();
        let path = Path::new("/photos/a.heic");

        assert!(recent.first_seen_at(path, t0));
        assert!(!recent.first_seen_at(path, t0 + Duration::from_millis(500)));
        assert!(recent.first_seen_at(Path::new("/photos/b.heic"), t0));
    }

    #[test]
    fn test_entries_expire() {
        let mut recent = RecentPaths::new(Duration::from_secs(2));
        let t0 = Instant::now();
        let path = Path::new("/photos/a.heic");

        assert!(recent.first_seen_at(path, t0));
        assert!(recent.first_seen_at(path, t0 + Duration::from_secs(3)));
        assert_eq!(recent.seen.len(), 1);
    }

    #[test]
    fn test_zero_window_disables() {
        let mut recent = RecentPaths::new(Duration::ZERO);
        let path = Path::new("/photos/a.heic");

        assert!(recent.first_seen(path));
        assert!(recent.first_seen(path));
        recent.mark_done(path);
        assert!(recent.seen.is_empty());
    }

    #[test]
    fn test_window_restarts_when_conversion_finishes() {
        let mut recent = RecentPaths::new(Duration::from_secs(2));
        let t0 = Instant::now();
        let path = Path::new("/photos/a.heic");

        assert!(recent.first_seen_at(path, t0));
        // Conversion took longer than the window
        recent.mark_done_at(path, t0 + Duration::from_millis(2500));
        assert!(!recent.first_seen_at(path, t0 + Duration::from_millis(2600)));
        assert!(recent.first_seen_at(path, t0 + Duration::from_millis(4600)));
    }
}

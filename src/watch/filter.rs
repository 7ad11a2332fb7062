use heicwatch_tools::SystemTrash;
use tracing::{debug, info};

use super::event::{FileEvent, FileEventKind};
use crate::config::{Config, TrashMode};
use crate::conversion::has_extension;

/// Decides which notifications are new source files worth converting.
#[derive(Debug, Clone)]
pub struct EventFilter {
    source_extension: String,
    trash_marker: String,
    /// Also ignore the platform recycle bin locations.
    system_trash: bool,
}

impl EventFilter {
    pub fn new(source_extension: impl Into<String>, trash_marker: impl Into<String>) -> Self {
        Self {
            source_extension: source_extension.into(),
            trash_marker: trash_marker.into(),
            system_trash: false,
        }
    }

    pub fn with_system_trash(mut self, enabled: bool) -> Self {
        self.system_trash = enabled;
        self
    }

    pub fn from_config(config: &Config) -> Self {
        Self::new(&config.conversion.source_extension, &config.trash.marker)
            .with_system_trash(config.trash.mode == TrashMode::System)
    }

    /// Whether `event` should trigger a conversion.
    ///
    /// Checked in order: anything under the trash is ignored, only
    /// creations count (modifications include the converter's own writes),
    /// and the extension must be the source extension in any case.
    pub fn should_convert(&self, event: &FileEvent) -> bool {
        let path = event.path.display();

        if self.is_in_trash(event) {
            debug!(
                path = %path,
                kind = %event.kind,
                "{} has been {}, ignored (trash)",
                path,
                event.kind
            );
            return false;
        }

        if event.kind != FileEventKind::Created {
            debug!(path = %path, kind = %event.kind, "{} has been {}", path, event.kind);
            return false;
        }

        if !has_extension(&event.path, &self.source_extension) {
            debug!(path = %path, kind = %event.kind, "{} has been {}", path, event.kind);
            return false;
        }

        info!(path = %path, kind = %event.kind, "{} has been {}", path, event.kind);
        true
    }

    fn is_in_trash(&self, event: &FileEvent) -> bool {
        let in_marker = event
            .path
            .components()
            .any(|c| c.as_os_str() == self.trash_marker.as_str());

        in_marker || (self.system_trash && SystemTrash::contains(&event.path))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn filter() -> EventFilter {
        EventFilter::new("heic", ".Trash")
    }

    #[test]
    fn test_trash_events_are_rejected() {
        let paths = [
            "/photos/.Trash/a.heic",
            "/photos/.Trash/sub/a.HEIC",
            "/home/me/.Trash/a.jpg",
            ".Trash/a.heic",
        ];
        for path in paths {
            assert!(!filter().should_convert(&FileEvent::created(path)), "{path}");
            assert!(!filter().should_convert(&FileEvent::modified(path)), "{path}");
        }
    }

    #[test]
    fn test_system_trash_is_rejected_in_system_mode() {
        let filter = EventFilter::from_config(&Config::default());
        for path in [
            "/home/u/.local/share/Trash/files/a.heic",
            "/media/usb/.Trash-1000/files/a.heic",
        ] {
            assert!(!filter.should_convert(&FileEvent::created(path)), "{path}");
        }
        assert!(filter.should_convert(&FileEvent::created("/photos/a.heic")));
    }

    #[test]
    fn test_system_trash_is_allowed_in_directory_mode() {
        let mut config = Config::default();
        config.trash.mode = TrashMode::Directory;
        let filter = EventFilter::from_config(&config);

        assert!(filter.should_convert(&FileEvent::created("/media/usb/.Trash-1000/files/a.heic")));
        assert!(!filter.should_convert(&FileEvent::created("/photos/.Trash/a.heic")));
    }

    #[test]
    fn test_marker_must_be_a_whole_segment() {
        assert!(filter().should_convert(&FileEvent::created("/photos/.Trashy/a.heic")));
        assert!(filter().should_convert(&FileEvent::created("/photos/my.Trash/a.heic")));
    }

    #[test]
    fn test_modified_events_are_rejected() {
        for path in ["/photos/a.heic", "/photos/a.HEIC", "/photos/a.jpg", "/photos/a"] {
            assert!(!filter().should_convert(&FileEvent::modified(path)), "{path}");
        }
    }

    #[test]
    fn test_created_source_in_any_case_is_accepted() {
        for path in [
            "/photos/a.heic",
            "/photos/a.HEIC",
            "/photos/a.HeIc",
            "/photos/deep/dir/IMG_0001.hEIc",
        ] {
            assert!(filter().should_convert(&FileEvent::created(path)), "{path}");
        }
    }

    #[test]
    fn test_other_extensions_are_rejected() {
        for path in ["/photos/note.txt", "/photos/a.jpg", "/photos/heic", "/photos/a.heic.tmp"] {
            assert!(!filter().should_convert(&FileEvent::created(path)), "{path}");
        }
    }

    #[test]
    fn test_from_config_uses_configured_values() {
        let mut config = Config::default();
        config.conversion.source_extension = "png".to_string();
        config.trash.marker = "Bin".to_string();
        let filter = EventFilter::from_config(&config);

        assert!(filter.should_convert(&FileEvent::created("/x/a.PNG")));
        assert!(!filter.should_convert(&FileEvent::created("/x/Bin/a.png")));
        assert!(!filter.should_convert(&FileEvent::created("/x/a.heic")));
    }
}

//! Recoverable deletion backends.
//!
//! Nothing here unlinks a file: every backend moves it somewhere the user
//! can restore it from.

use crate::{Error, Result};
use std::ffi::OsStr;
use std::path::{Path, PathBuf};

/// A place files can be moved to instead of being deleted.
pub trait Trash: Send + Sync {
    /// Move `path` into the trash.
    fn move_to_trash(&self, path: &Path) -> Result<()>;
}

/// The platform recycle bin (freedesktop trash, macOS Trash, Windows
/// Recycle Bin).
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemTrash;

impl SystemTrash {
    /// Whether `path` lies inside a platform trash location.
    ///
    /// Matches the freedesktop home trash (`.../Trash/files` and
    /// `.../Trash/info`), per-mount `.Trash-<uid>` and `.Trash` directories,
    /// and the Windows `$Recycle.Bin`.
    pub fn contains(path: &Path) -> bool {
        let names: Vec<&OsStr> = path.components().map(|c| c.as_os_str()).collect();

        names.iter().enumerate().any(|(i, name)| {
            let Some(name) = name.to_str() else {
                return false;
            };
            if name == ".Trash" || name.starts_with(".Trash-") {
                return true;
            }
            if name.eq_ignore_ascii_case("$Recycle.Bin") {
                return true;
            }
            name == "Trash"
                && matches!(
                    names.get(i + 1).and_then(|next| next.to_str()),
                    Some("files" | "info")
                )
        })
    }
}

impl Trash for SystemTrash {
    fn move_to_trash(&self, path: &Path) -> Result<()> {
        ::trash::delete(path).map_err(|e| Error::trash(path, e.to_string()))
    }
}

/// A trash directory inside the watched tree.
///
/// Files under `root` are moved to `root/<marker>/<path relative to root>`,
/// so the original layout is kept and restoring is a plain move back.
#[derive(Debug, Clone)]
pub struct DirectoryTrash {
    root: PathBuf,
    marker: String,
}

impl DirectoryTrash {
    /// Create a trash rooted at `root/marker`.
    pub fn new(root: impl Into<PathBuf>, marker: impl Into<String>) -> Self {
        Self {
            root: root.into(),
            marker: marker.into(),
        }
    }

    /// Directory that receives trashed files.
    pub fn dir(&self) -> PathBuf {
        self.root.join(&self.marker)
    }

    /// Where `path` would land if trashed now.
    pub fn destination_for(&self, path: &Path) -> Result<PathBuf> {
        let relative = match path.strip_prefix(&self.root) {
            Ok(rel) if !rel.as_os_str().is_empty() => rel.to_path_buf(),
            _ => path
                .file_name()
                .map(PathBuf::from)
                .ok_or_else(|| Error::InvalidInput(format!("not a file path: {:?}", path)))?,
        };

        Ok(unique_path(self.dir().join(relative)))
    }
}

impl Trash for DirectoryTrash {
    fn move_to_trash(&self, path: &Path) -> Result<()> {
        if !path.is_file() {
            return Err(Error::trash(path, "no such file"));
        }

        let dest = self.destination_for(path)?;
        if let Some(parent) = dest.parent() {
            std::fs::create_dir_all(parent).map_err(|e| Error::trash(path, e.to_string()))?;
        }

        std::fs::rename(path, &dest).map_err(|e| Error::trash(path, e.to_string()))?;
        tracing::debug!(from = %path.display(), to = %dest.display(), "Moved file to trash directory");
        Ok(())
    }
}

/// Pick `name (1).ext`, `name (2).ext`, ... when `candidate` is taken.
fn unique_path(candidate: PathBuf) -> PathBuf {
    if !candidate.exists() {
        return candidate;
    }

    let stem = candidate
        .file_stem()
        .map(|s| s.to_string_lossy().to_string())
        .unwrap_or_default();
    let ext = candidate
        .extension()
        .map(|e| format!(".{}", e.to_string_lossy()))
        .unwrap_or_default();

    let mut n = 1;
    loop {
        let next = candidate.with_file_name(format!("{stem} ({n}){ext}"));
        if !next.exists() {
            return next;
        }
        n += 1;
    }
}

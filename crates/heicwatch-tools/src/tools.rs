//! External tool detection.

use crate::{Error, Result};
use std::path::{Path, PathBuf};
use std::process::Command;

/// Information about an external tool.
#[derive(Debug, Clone)]
pub struct ToolInfo {
    /// Name of the tool.
    pub name: String,
    /// Whether the tool is available.
    pub available: bool,
    /// Version string if available.
    pub version: Option<String>,
    /// Path to the tool executable.
    pub path: Option<PathBuf>,
}

/// Resolve `name` and run it with `version_arg`.
///
/// The tool counts as available only if it resolves and the probe exits
/// successfully; the first stdout line is kept as the version.
pub fn check_tool_with_arg(name: &str, version_arg: &str) -> ToolInfo {
    let mut info = ToolInfo {
        name: name.to_string(),
        available: false,
        version: None,
        path: None,
    };

    let Ok(path) = get_tool_path(name) else {
        return info;
    };

    if let Ok(output) = Command::new(&path).arg(version_arg).output() {
        if output.status.success() {
            info.available = true;
            info.version = String::from_utf8_lossy(&output.stdout)
                .lines()
                .next()
                .map(str::to_string);
            info.path = Some(path);
        }
    }

    info
}

/// Resolve the program to run for `name`.
///
/// An explicit path (anything with a directory component) is used as-is when
/// it exists; a bare name is looked up on `PATH`.
///
/// # Errors
///
/// Returns [`Error::ToolNotFound`] if neither finds an executable.
pub fn get_tool_path(name: impl AsRef<Path>) -> Result<PathBuf> {
    let candidate = name.as_ref();
    if candidate.components().count() > 1 {
        if candidate.exists() {
            return Ok(candidate.to_path_buf());
        }
        return Err(Error::tool_not_found(candidate.display().to_string()));
    }

    which::which(candidate).map_err(|_| Error::tool_not_found(candidate.display().to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_check_tool_not_found() {
        let info = check_tool_with_arg("nonexistent_tool_12345", "-version");
        assert!(!info.available);
        assert!(info.version.is_none());
        assert!(info.path.is_none());
    }

    #[test]
    fn test_get_tool_path_missing_bare_name() {
        let err = get_tool_path("nonexistent_tool_12345").unwrap_err();
        assert!(matches!(err, Error::ToolNotFound { ref tool } if tool == "nonexistent_tool_12345"));
    }

    #[test]
    fn test_get_tool_path_missing_explicit_path() {
        let err = get_tool_path("/nonexistent/dir/magick").unwrap_err();
        assert!(matches!(err, Error::ToolNotFound { .. }));
    }

    #[test]
    fn test_get_tool_path_existing_explicit_path() {
        let dir = tempfile::tempdir().unwrap();
        let exe = dir.path().join("convert-tool");
        std::fs::write(&exe, b"").unwrap();

        let resolved = get_tool_path(&exe).unwrap();
        assert_eq!(resolved, exe);
    }
}

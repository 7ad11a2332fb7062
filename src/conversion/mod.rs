//! Source-to-target image conversion.

mod bulk;
mod converter;

pub use bulk::{BulkConverter, BulkReport};
pub use converter::{ConversionOutcome, Converter};

use std::path::Path;

/// Check if `path` ends in `extension`, ignoring ASCII case.
///
/// Filesystems and walkers may be case-sensitive, so `IMG.HEIC` and
/// `img.heic` both have to be matched here explicitly.
pub fn has_extension(path: &Path, extension: &str) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| e.eq_ignore_ascii_case(extension))
}

//! # heicwatch-tools
//!
//! Process and filesystem primitives used by the heicwatch pipeline.
//!
//! This crate provides:
//! - Detection of external tools on `PATH` (the image converter)
//! - An async [`ToolCommand`] builder for spawning a tool and collecting its output
//! - The [`Trash`] abstraction for recoverable deletion, with a platform
//!   recycle bin backend and an in-tree directory backend
//!
//! ## Example
//!
//! ```no_run
//! use heicwatch_tools::{DirectoryTrash, Trash};
//! use std::path::Path;
//!
//! let trash = DirectoryTrash::new("/photos", ".Trash");
//! trash.move_to_trash(Path::new("/photos/2024/IMG_0001.heic"))?;
//! # Ok::<(), heicwatch_tools::Error>(())
//! ```

mod error;
pub mod command;
pub mod tools;
pub mod recycle;

// Re-exports
pub use command::{ToolCommand, ToolOutput};
pub use error::{Error, Result};
pub use tools::{check_tool_with_arg, get_tool_path, ToolInfo};
pub use recycle::{DirectoryTrash, SystemTrash, Trash};

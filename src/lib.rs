//! heicwatch - converts new HEIC images under a directory tree
//!
//! This library crate exposes the core functionality for integration testing.

pub mod config;
pub mod conversion;
pub mod deleter;
pub mod pipeline;
pub mod watch;

use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "heicwatch")]
#[command(author, version, about = "Watch a directory and convert new HEIC images to JPEG")]
pub struct Cli {
    /// Path to config file
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Watch a directory and convert new files until interrupted
    Watch {
        /// Directory to watch (defaults to watch.path from the config)
        dir: Option<PathBuf>,

        /// Move source files to the trash after a successful conversion
        #[arg(long)]
        auto_delete: bool,

        /// Convert files already in the directory before watching
        #[arg(long)]
        convert_existing: bool,

        /// Save these watch settings to the config file
        #[arg(long)]
        save: bool,
    },

    /// Convert a single file
    Convert {
        /// File to convert
        #[arg(required = true)]
        file: PathBuf,

        /// Move the source file to the trash after a successful conversion
        #[arg(long)]
        delete: bool,
    },

    /// Check that the converter executable is available
    CheckTools,

    /// Validate configuration file
    Validate {
        /// Config file to validate (uses default if not specified)
        config: Option<PathBuf>,
    },

    /// Write a config file with default settings
    InitConfig {
        /// Where to write the file
        #[arg(default_value = "./heicwatch.toml")]
        path: PathBuf,

        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },

    /// Display version information
    Version,
}

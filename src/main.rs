mod cli;

use heicwatch::config::{self, ConversionPolicy};
use heicwatch::conversion::Converter;
use heicwatch::deleter::Deleter;
use heicwatch::pipeline::ConversionPipeline;
use heicwatch::watch::{self, WatchTarget};

use anyhow::{Context, Result};
use clap::Parser;
use cli::{Cli, Commands};
use std::path::{Path, PathBuf};
use tokio_util::sync::CancellationToken;

async fn start_watching(
    dir: Option<PathBuf>,
    auto_delete: bool,
    convert_existing: bool,
    save: bool,
    config_path: Option<&Path>,
) -> Result<()> {
    let mut config = config::load_config_or_default(config_path)?;

    // CLI flags can only switch behaviours on
    config.watch.auto_delete |= auto_delete;
    config.watch.convert_existing |= convert_existing;
    if let Some(dir) = dir {
        config.watch.path = Some(dir);
    }

    let root = config
        .watch
        .path
        .clone()
        .context("No directory to watch: pass DIR or set watch.path in the config file")?;
    let target = WatchTarget::new(&root)?;

    if save {
        let path = config_path
            .map(Path::to_path_buf)
            .or_else(config::find_default_config)
            .unwrap_or_else(|| PathBuf::from(config::DEFAULT_CONFIG_PATHS[0]));
        config::persist::update_watch(&path, &config.watch)?;
        tracing::info!("Saved watch settings to {:?}", path);
    }

    tracing::info!(
        auto_delete = config.watch.auto_delete,
        convert_existing = config.watch.convert_existing,
        "Script started. Watching directory: {}",
        target.path().display()
    );

    let cancel = CancellationToken::new();
    let signal_cancel = cancel.clone();
    tokio::spawn(async move {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!("Failed to listen for interrupt signal: {}", e);
            return;
        }
        tracing::info!("Interrupt received, finishing current file...");
        signal_cancel.cancel();
    });

    watch::run(&config, target, cancel).await
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Respect RUST_LOG env var if set, otherwise use defaults based on verbose flag
    let env_filter = std::env::var("RUST_LOG").unwrap_or_else(|_| {
        if cli.verbose {
            "heicwatch=debug,heicwatch_tools=debug".to_string()
        } else {
            "heicwatch=info,heicwatch_tools=info".to_string()
        }
    });

    tracing_subscriber::fmt()
        .with_env_filter(&env_filter)
        .init();

    match cli.command {
        Commands::Watch {
            dir,
            auto_delete,
            convert_existing,
            save,
        } => {
            let rt = tokio::runtime::Runtime::new()?;
            rt.block_on(start_watching(
                dir,
                auto_delete,
                convert_existing,
                save,
                cli.config.as_deref(),
            ))
        }
        Commands::Convert { file, delete } => {
            let rt = tokio::runtime::Runtime::new()?;
            rt.block_on(convert_file(&file, delete, cli.config.as_deref()))
        }
        Commands::CheckTools => check_tools(cli.config.as_deref()),
        Commands::Validate {
            config: config_path,
        } => {
            let path = config_path.or(cli.config);
            validate_config(path.as_deref())
        }
        Commands::InitConfig { path, force } => init_config(&path, force),
        Commands::Version => {
            println!("heicwatch {}", env!("CARGO_PKG_VERSION"));
            Ok(())
        }
    }
}

async fn convert_file(file: &Path, delete: bool, config_path: Option<&Path>) -> Result<()> {
    let config = config::load_config_or_default(config_path)?;

    if !file.is_file() {
        anyhow::bail!("Input file does not exist: {:?}", file);
    }

    // The directory trash lives under the watch root when the file is inside it
    let root = config
        .watch
        .path
        .as_deref()
        .filter(|root| file.starts_with(root))
        .or_else(|| file.parent())
        .unwrap_or_else(|| Path::new("."));

    let pipeline = ConversionPipeline::new(
        Converter::from_config(&config),
        Deleter::from_config(&config.trash, root),
        ConversionPolicy {
            auto_delete: delete,
            convert_existing: false,
        },
    );

    let outcome = pipeline.process(file).await;
    if !outcome.succeeded {
        anyhow::bail!("Conversion failed for {:?}", file);
    }

    println!("{}", outcome.destination.display());
    Ok(())
}

fn check_tools(config_path: Option<&Path>) -> Result<()> {
    let config = config::load_config_or_default(config_path)?;

    println!("Checking external tools...\n");

    let tool = heicwatch_tools::check_tool_with_arg(&config.tools.converter, "-version");
    let status = if tool.available { "✓" } else { "✗" };

    print!("{} {}", status, tool.name);
    if let Some(ref version) = tool.version {
        print!(" ({})", version);
    }
    if let Some(ref path) = tool.path {
        print!(" - {}", path.display());
    }
    println!();

    println!();
    if tool.available {
        println!("All required tools are available!");
    } else {
        println!(
            "The converter is missing. Install ImageMagick or set tools.converter in the config."
        );
    }

    Ok(())
}

fn validate_config(path: Option<&Path>) -> Result<()> {
    match path {
        Some(p) => {
            println!("Validating config: {:?}", p);
            let config = config::load_config(p)?;
            println!("✓ Configuration is valid");
            match config.watch.path {
                Some(ref dir) => println!("  Watch path: {}", dir.display()),
                None => println!("  Watch path: (none)"),
            }
            println!(
                "  Conversion: .{} -> .{}",
                config.conversion.source_extension, config.conversion.target_extension
            );
            println!("  Converter: {}", config.tools.converter);
            println!("  Auto delete: {}", config.watch.auto_delete);
            println!("  Convert existing: {}", config.watch.convert_existing);
            println!(
                "  Trash: {:?} ({} attempts, {}ms apart)",
                config.trash.mode, config.trash.max_attempts, config.trash.retry_delay_ms
            );
        }
        None => {
            println!("No config file specified, using defaults");
            let config = config::Config::default();
            println!("Default config:");
            println!(
                "  Conversion: .{} -> .{}",
                config.conversion.source_extension, config.conversion.target_extension
            );
        }
    }

    Ok(())
}

fn init_config(path: &Path, force: bool) -> Result<()> {
    if path.exists() && !force {
        anyhow::bail!(
            "Config file already exists: {:?} (use --force to overwrite)",
            path
        );
    }

    config::persist::save_config(path, &config::Config::default())?;
    println!("Wrote default config to {}", path.display());
    Ok(())
}

use std::fs::OpenOptions;
use std::path::PathBuf;
use std::sync::Mutex;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use folio_core::FolioConfig;

mod commands;

use commands::simulate::Target;

#[derive(Parser)]
#[command(name = "folio")]
#[command(author, version, about = "A scroll-driven flipbook in the terminal")]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    /// Config file (defaults to ~/.config/folio/config.toml)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Override the number of pages
    #[arg(short, long, global = true)]
    pages: Option<usize>,
}

#[derive(Subcommand)]
enum Commands {
    /// Open the flipbook in the terminal
    Run,
    /// Run one navigation headlessly and report each stage
    Simulate {
        #[command(subcommand)]
        target: Target,
        /// Page the reader is on when the navigation starts (1-based)
        #[arg(long, default_value_t = 1)]
        from_page: usize,
        /// Frames per second of the simulated render loop
        #[arg(long, default_value_t = 60)]
        fps: u32,
        /// Pace frames in real time instead of as fast as possible
        #[arg(long)]
        realtime: bool,
        /// Print one JSON frame report per line
        #[arg(long)]
        json: bool,
    },
    /// Print the segments built for the book
    Timeline {
        /// Use the shortened content reveal
        #[arg(long)]
        abbreviated: bool,
        #[arg(long)]
        json: bool,
    },
    /// Print the phase map and page slots, or map one progress value
    Phases {
        /// Progress value in [0, 1] to map
        #[arg(long)]
        at: Option<f64>,
    },
    /// Write the effective configuration to the config file
    InitConfig,
}

fn load_config(cli: &Cli) -> Result<FolioConfig> {
    let mut config = match &cli.config {
        Some(path) => FolioConfig::load_from(path)
            .with_context(|| format!("Failed to load config from {}", path.display()))?,
        None => FolioConfig::load()?,
    };
    if let Some(pages) = cli.pages {
        config.book.page_count = pages;
    }
    Ok(config)
}

/// Logs go to a file while the terminal UI owns the screen
fn init_logging(config: &FolioConfig, to_file: bool) -> Result<()> {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&config.general.log_level));

    if to_file {
        let path = config.log_path();
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&path)
            .with_context(|| format!("Failed to open log file {}", path.display()))?;
        tracing_subscriber::registry()
            .with(filter)
            .with(
                tracing_subscriber::fmt::layer()
                    .with_target(false)
                    .with_ansi(false)
                    .with_writer(Mutex::new(file)),
            )
            .init();
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(
                tracing_subscriber::fmt::layer()
                    .with_target(false)
                    .with_writer(std::io::stderr),
            )
            .init();
    }
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let config = load_config(&cli)?;

    let tui = matches!(cli.command, Some(Commands::Run) | None);
    init_logging(&config, tui)?;

    match cli.command {
        Some(Commands::Run) | None => commands::run::run(config).await,
        Some(Commands::Simulate {
            target,
            from_page,
            fps,
            realtime,
            json,
        }) => {
            let options = commands::simulate::Options {
                from_page,
                fps,
                realtime,
                json,
            };
            commands::simulate::run(&config, target, options).await
        }
        Some(Commands::Timeline { abbreviated, json }) => {
            commands::timeline::run(&config, abbreviated, json)
        }
        Some(Commands::Phases { at }) => commands::phases::run(&config, at),
        Some(Commands::InitConfig) => {
            config.save()?;
            println!("Wrote {}", FolioConfig::config_path().display());
            Ok(())
        }
    }
}

use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod commands;
mod config;
mod devdoc;
mod prompt;

use commands::{ConfigCommand, DownloadCommand, InitCommand, UploadCommand};
use config::Config;

#[derive(Parser)]
#[command(name = "cyber-elx")]
#[command(version)]
#[command(about = "Sync theme pages and SPA components with an el-x website", long_about = None)]
struct Cli {
    /// Working directory (default: current directory)
    #[arg(long, short, global = true)]
    dir: Option<PathBuf>,

    /// Path to config file
    #[arg(long, short, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Initialize configuration and download pages
    Init(InitCommand),

    /// Download pages from server
    Download(DownloadCommand),

    /// Upload pages to server
    Upload(UploadCommand),

    /// Manage configuration
    Config(ConfigCommand),
}

fn main() {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "warn".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    if let Err(e) = run() {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

fn run() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let workdir = match cli.dir {
        Some(dir) => dir,
        None => std::env::current_dir()?,
    };

    tracing::debug!("working directory: {}", workdir.display());

    // init only needs to know where the config goes, not what it holds
    if let Some(Commands::Init(cmd)) = &cli.command {
        let config_path = cli
            .config
            .clone()
            .unwrap_or_else(|| Config::default_path(&workdir));
        cmd.run(&config_path, &workdir)?;
        return Ok(());
    }

    // Load configuration
    let config = Config::load(cli.config, &workdir)?;

    match cli.command {
        Some(Commands::Init(_)) => {}
        Some(Commands::Download(cmd)) => {
            cmd.run(&config, &workdir)?;
        }
        Some(Commands::Upload(cmd)) => {
            cmd.run(&config, &workdir)?;
        }
        Some(Commands::Config(cmd)) => {
            cmd.run(&config)?;
        }
        None => {
            println!("Use --help to see available commands");
        }
    }

    Ok(())
}

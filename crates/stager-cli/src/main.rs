mod asset;
mod catalog;
mod clear_cache;
mod extract;
mod ls;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::process::ExitCode;

use stager_assets::{AssetManager, Config, ConfigLoader, ProgressManager};

#[derive(Parser, Debug)]
#[command(name = "stager")]
#[command(about = "Fetch, cache and stage deployment assets")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Configuration file path or http(s) URL
    #[arg(short, long, global = true, default_value = "config.json")]
    config: String,

    /// Disable progress bars
    #[arg(long, global = true)]
    no_progress: bool,

    /// Increase log verbosity (-v, -vv, -vvv)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Only print errors
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    quiet: bool,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Download an asset and install it into its destination
    Get(asset::GetArgs),

    /// Download an asset into the cache only
    Fetch(asset::FetchArgs),

    /// Install an already cached asset into its destination
    Process(asset::ProcessArgs),

    /// Extract a single member of a zip archive
    Extract(extract::ExtractArgs),

    /// List a directory on the configured FTP server
    Ls(ls::LsArgs),

    /// Remove assets from the cache and their destinations
    Purge(asset::PurgeArgs),

    /// Show the configured asset catalog
    Catalog(catalog::CatalogArgs),

    /// Remove every cached artifact
    ClearCache(clear_cache::ClearCacheArgs),
}

/// Shared state derived from the global flags
pub struct App {
    pub config_source: String,
    pub progress: bool,
}

impl App {
    pub fn load_config(&self) -> Result<Config> {
        ConfigLoader::new(true)
            .load(&self.config_source)
            .with_context(|| format!("Failed to load configuration from {}", self.config_source))
    }

    pub fn manager(&self) -> Result<AssetManager> {
        let config = self.load_config()?;
        let manager = AssetManager::new(config).context("Failed to initialize asset manager")?;
        Ok(manager.with_progress(Box::new(ProgressManager::new(self.progress))))
    }
}

fn init_logging(verbose: u8, quiet: bool) {
    let level = if quiet {
        "off"
    } else {
        match verbose {
            0 => "warn",
            1 => "info",
            2 => "debug",
            _ => "trace",
        }
    };

    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level))
        .format_timestamp(None)
        .init();
}

fn run() -> Result<i32> {
    let cli = Cli::parse();
    init_logging(cli.verbose, cli.quiet);

    let app = App {
        config_source: cli.config,
        progress: !cli.no_progress && !cli.quiet,
    };

    match cli.command {
        Commands::Get(args) => asset::get(args, &app),
        Commands::Fetch(args) => asset::fetch(args, &app),
        Commands::Process(args) => asset::process(args, &app),
        Commands::Extract(args) => extract::execute(args),
        Commands::Ls(args) => ls::execute(args, &app),
        Commands::Purge(args) => asset::purge(args, &app),
        Commands::Catalog(args) => catalog::execute(args, &app),
        Commands::ClearCache(args) => clear_cache::execute(args, &app),
    }
}

fn main() -> ExitCode {
    match run() {
        Ok(code) => ExitCode::from(code as u8),
        Err(e) => {
            eprintln!("{} {}", console::style("Error:").red().bold(), e);
            for cause in e.chain().skip(1) {
                eprintln!("  Caused by: {}", cause);
            }
            ExitCode::FAILURE
        }
    }
}

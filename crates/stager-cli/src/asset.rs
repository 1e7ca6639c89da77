//! Asset commands - get, fetch, process and purge catalog entries.

use anyhow::{Context, Result};
use clap::Args;
use console::style;
use std::path::PathBuf;

use stager_assets::AssetProvider;

use crate::App;

#[derive(Args, Debug)]
pub struct GetArgs {
    /// Asset name from the catalog
    pub name: String,
}

#[derive(Args, Debug)]
pub struct FetchArgs {
    /// Asset name from the catalog
    pub name: String,
}

#[derive(Args, Debug)]
pub struct ProcessArgs {
    /// Asset name from the catalog
    pub name: String,

    /// Cached artifact to install (default: the asset's cache file)
    #[arg(long)]
    pub cache_path: Option<PathBuf>,
}

#[derive(Args, Debug)]
pub struct PurgeArgs {
    /// Asset names from the catalog
    #[arg(required = true)]
    pub names: Vec<String>,
}

pub fn get(args: GetArgs, app: &App) -> Result<i32> {
    let manager = app.manager()?;

    let dest = manager
        .get(&args.name)
        .with_context(|| format!("Failed to get asset '{}'", args.name))?;

    println!("{} {} installed into {}",
        style("Success:").green().bold(),
        style(&args.name).cyan(),
        dest.display()
    );
    Ok(0)
}

pub fn fetch(args: FetchArgs, app: &App) -> Result<i32> {
    let manager = app.manager()?;

    let cache_path = manager
        .download_to_cache(&args.name)
        .with_context(|| format!("Failed to download asset '{}'", args.name))?;

    println!("{} {} cached at {}",
        style("Success:").green().bold(),
        style(&args.name).cyan(),
        cache_path.display()
    );
    Ok(0)
}

pub fn process(args: ProcessArgs, app: &App) -> Result<i32> {
    let manager = app.manager()?;

    let cache_path = match args.cache_path {
        Some(path) => path,
        None => {
            let descriptor = manager.config().asset_catalog.resolve(&args.name)?;
            manager.cache().path_for(descriptor)?
        }
    };

    if !cache_path.is_file() {
        anyhow::bail!(
            "No cached artifact at {} (run 'stager fetch {}' first)",
            cache_path.display(),
            args.name
        );
    }

    manager
        .process_from_cache(&args.name, &cache_path)
        .with_context(|| format!("Failed to process asset '{}'", args.name))?;

    println!("{} {} installed into {}",
        style("Success:").green().bold(),
        style(&args.name).cyan(),
        manager.destination_of(&args.name)?.display()
    );
    Ok(0)
}

pub fn purge(args: PurgeArgs, app: &App) -> Result<i32> {
    let manager = app.manager()?;

    for name in &args.names {
        manager
            .purge_asset(name)
            .with_context(|| format!("Failed to purge asset '{}'", name))?;
        println!("{} Purged {}", style("Info:").cyan(), name);
    }

    Ok(0)
}

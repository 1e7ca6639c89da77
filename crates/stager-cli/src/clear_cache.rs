//! Clear-cache command - remove downloaded artifacts.

use anyhow::{Context, Result};
use clap::Args;
use console::style;

use stager_assets::downloader::format_bytes;
use stager_assets::CacheStore;

use crate::App;

#[derive(Args, Debug)]
pub struct ClearCacheArgs {
    /// Only report the cache size
    #[arg(long)]
    pub dry_run: bool,
}

pub fn execute(args: ClearCacheArgs, app: &App) -> Result<i32> {
    let config = app.load_config()?;
    let cache = CacheStore::new(config.cache_path());

    if !cache.dir().exists() {
        println!("{} Cache directory does not exist: {}",
            style("Info:").cyan(),
            cache.dir().display()
        );
        return Ok(0);
    }

    if args.dry_run {
        let size = cache.size().context("Failed to measure cache")?;
        let count = cache.files().context("Failed to read cache")?.len();
        println!("{} {} files, {} in {}",
            style("Info:").cyan(),
            count,
            format_bytes(size),
            cache.dir().display()
        );
        return Ok(0);
    }

    let freed = cache
        .clear()
        .with_context(|| format!("Failed to clear cache at {}", cache.dir().display()))?;

    println!("{} Freed {}", style("Success:").green().bold(), format_bytes(freed));
    Ok(0)
}

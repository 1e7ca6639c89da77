//! Ls command - list a directory on the configured FTP server.

use anyhow::{Context, Result};
use clap::Args;
use console::style;

use stager_assets::AssetProvider;

use crate::App;

#[derive(Args, Debug)]
pub struct LsArgs {
    /// Remote directory
    #[arg(default_value = "/")]
    pub path: String,
}

pub fn execute(args: LsArgs, app: &App) -> Result<i32> {
    let manager = app.manager()?;

    let entries = manager
        .list_remote_directory(&args.path)
        .with_context(|| format!("Failed to list {}", args.path))?;

    for entry in &entries {
        if entry.is_directory {
            println!("{}/", style(&entry.name).blue().bold());
        } else {
            println!("{}", entry.name);
        }
    }

    Ok(0)
}

//! Catalog command - show the configured assets.

use anyhow::Result;
use clap::Args;
use console::style;

use crate::App;

#[derive(Args, Debug)]
pub struct CatalogArgs {
    /// Print names only
    #[arg(long)]
    pub names: bool,
}

pub fn execute(args: CatalogArgs, app: &App) -> Result<i32> {
    let config = app.load_config()?;
    let catalog = &config.asset_catalog;

    if catalog.is_empty() {
        println!("{} The asset catalog is empty", style("Info:").cyan());
        return Ok(0);
    }

    if args.names {
        for (name, _) in catalog.iter() {
            println!("{}", name);
        }
        return Ok(0);
    }

    let width = catalog.iter().map(|(name, _)| name.len()).max().unwrap_or(0);

    for (name, descriptor) in catalog.iter() {
        println!("{:width$}  {:4}  {:4}  {}",
            style(name).cyan(),
            descriptor.artifact_type.to_string(),
            descriptor.transport.to_string(),
            descriptor.url,
            width = width
        );
        if !descriptor.destination.is_empty() {
            println!("{:width$}  -> {}", "", config.root_path.join(&descriptor.destination).display(), width = width);
        }
    }

    Ok(0)
}

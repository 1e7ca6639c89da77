//! Extract command - pull a single file out of a zip archive.

use anyhow::{Context, Result};
use clap::Args;
use console::style;
use std::path::PathBuf;

use stager_assets::ArchiveExtractor;

#[derive(Args, Debug)]
pub struct ExtractArgs {
    /// Zip archive to read
    pub archive: PathBuf,

    /// Entry name inside the archive
    pub member: String,

    /// Output file
    pub dest: PathBuf,
}

pub fn execute(args: ExtractArgs) -> Result<i32> {
    ArchiveExtractor::extract_member(&args.archive, &args.member, &args.dest)
        .with_context(|| format!("Failed to extract '{}' from {}", args.member, args.archive.display()))?;

    println!("{} Extracted {} to {}",
        style("Success:").green().bold(),
        args.member,
        args.dest.display()
    );
    Ok(0)
}

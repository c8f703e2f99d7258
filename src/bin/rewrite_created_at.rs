//! Rewrites `created_at` column references in a generated source file.

use std::fs;
use std::path::PathBuf;

use anyhow::Context;
use clap::Parser;
use membership_sync_tools::logging::init_tracing;
use membership_sync_tools::patch::rewrite_created_at;

#[derive(Debug, Parser)]
#[command(about = "Rewrite created_at column references in a generated source file")]
struct Args {
    /// File to rewrite in place.
    file: PathBuf,

    /// Column that replaces `created_at`.
    #[arg(long, default_value = "claimed_at")]
    to: String,

    /// Report the number of replacements without writing.
    #[arg(long)]
    dry_run: bool,
}

fn main() -> anyhow::Result<()> {
    init_tracing();
    let args = Args::parse();

    let source = fs::read_to_string(&args.file)
        .with_context(|| format!("reading {}", args.file.display()))?;
    let rewrite = rewrite_created_at(&source, &args.to)?;

    if rewrite.replacements == 0 {
        println!("No created_at references in {}", args.file.display());
        return Ok(());
    }

    if args.dry_run {
        println!(
            "Would replace {} created_at reference(s) with {} in {}",
            rewrite.replacements,
            args.to,
            args.file.display()
        );
        return Ok(());
    }

    fs::write(&args.file, &rewrite.text)
        .with_context(|| format!("writing {}", args.file.display()))?;
    tracing::info!("Rewrote {}", args.file.display());
    println!(
        "Replaced {} created_at reference(s) with {} in {}",
        rewrite.replacements,
        args.to,
        args.file.display()
    );

    Ok(())
}

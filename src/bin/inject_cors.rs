//! Injects CORS boilerplate into generated serverless functions.

use std::path::PathBuf;

use clap::Parser;
use membership_sync_tools::logging::init_tracing;
use membership_sync_tools::patch::inject_cors_dir;

#[derive(Debug, Parser)]
#[command(about = "Add CORS headers and preflight handling to every index.ts under a directory")]
struct Args {
    /// Root of the functions directory.
    #[arg(default_value = "supabase/functions")]
    dir: PathBuf,

    /// List what would change without writing.
    #[arg(long)]
    dry_run: bool,
}

fn main() -> anyhow::Result<()> {
    init_tracing();
    let args = Args::parse();

    let summary = inject_cors_dir(&args.dir, args.dry_run)?;

    let verb = if args.dry_run { "Would patch" } else { "Patched" };
    println!("Scanned {} function file(s) under {}", summary.scanned, args.dir.display());
    println!("  {}: {}", verb, summary.patched);
    println!("  Already present: {}", summary.already_present);
    if summary.without_handler > 0 {
        println!(
            "  Without serve() handler (headers only): {}",
            summary.without_handler
        );
    }
    if !summary.failed.is_empty() {
        println!("  Failed: {}", summary.failed.len());
        for path in &summary.failed {
            println!("    {}", path.display());
        }
    }

    Ok(())
}

//! Prints deployment instructions for one serverless function. Deploys nothing.

use std::path::PathBuf;

use clap::Parser;
use membership_sync_tools::deploy::DeploymentPlan;
use membership_sync_tools::logging::init_tracing;

#[derive(Debug, Parser)]
#[command(about = "Print deployment instructions for a serverless function")]
struct Args {
    /// Function source file, e.g. supabase/functions/auth/index.ts
    file: PathBuf,

    /// Hosting project reference.
    #[arg(long, env = "SUPABASE_PROJECT_REF")]
    project_ref: Option<String>,

    /// Print the plan as JSON instead of text.
    #[arg(long)]
    json: bool,
}

fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    init_tracing();
    let args = Args::parse();

    let plan = DeploymentPlan::from_path(&args.file, args.project_ref)?;
    tracing::debug!("Built deployment plan for {}", plan.function_name);

    if args.json {
        println!("{}", serde_json::to_string_pretty(&plan)?);
    } else {
        print!("{}", plan.render());
    }

    Ok(())
}

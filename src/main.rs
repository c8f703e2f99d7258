use membership_sync_tools::config::Config;
use membership_sync_tools::db::Database;
use membership_sync_tools::logging::init_tracing;
use membership_sync_tools::report::Reporter;

/// Prints the membership sync report.
///
/// Takes no arguments. Configuration and query failures are reported inline
/// and the process still exits with status 0.
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_tracing();

    let config = match Config::from_env() {
        Ok(config) => config,
        Err(e) => {
            tracing::error!("{}", e);
            println!("❌ {}", e);
            return Ok(());
        }
    };
    tracing::info!("Configuration loaded successfully");

    let db = Database::connect_lazy(&config.database);
    let reporter = Reporter::new(db, config.report_limit);

    let stdout = std::io::stdout();
    let mut out = stdout.lock();
    match reporter.run(&mut out).await {
        Ok(summary) => tracing::info!(
            "Report finished: {} sections ok, {} failed, {} rows, {} skipped",
            summary.sections_ok,
            summary.sections_failed,
            summary.rows_rendered,
            summary.rows_skipped
        ),
        Err(e) => tracing::error!("Failed to write report: {}", e),
    }

    Ok(())
}

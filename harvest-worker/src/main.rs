use std::process::ExitCode;
use std::sync::Arc;

use harvest::SystemClock;
use harvest_worker::WorkerSettings;
use tracing_subscriber::EnvFilter;

fn main() -> ExitCode {
    // Logs go to stderr; stdout carries the report table.
    let _ = tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_target(false)
        .with_writer(std::io::stderr)
        .try_init();

    let settings = match WorkerSettings::from_env() {
        Ok(s) => s,
        Err(e) => {
            tracing::error!(error = %e, "invalid environment");
            return ExitCode::FAILURE;
        }
    };
    let runtime = match tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
    {
        Ok(rt) => rt,
        Err(e) => {
            tracing::error!(error = %e, "failed to start runtime");
            return ExitCode::FAILURE;
        }
    };

    match runtime.block_on(harvest_worker::run(&settings, Arc::new(SystemClock))) {
        Ok(report) => {
            print!("{}", report.card);
            ExitCode::SUCCESS
        }
        Err(e) => {
            tracing::error!(error = %e, "automation failed");
            ExitCode::FAILURE
        }
    }
}

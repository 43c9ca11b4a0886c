use std::process::ExitCode;

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use booklist_enricher::{config, services};

#[tokio::main]
async fn main() -> ExitCode {
    // Load configuration
    dotenvy::dotenv().ok();

    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "booklist_enricher=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let config = config::Config::from_env();

    match services::run_pipeline(&config).await {
        Ok(summary) => {
            if !summary.report.unresolved.is_empty() {
                tracing::warn!(
                    "{} books could not be resolved to an ISBN",
                    summary.report.unresolved.len()
                );
            }
            if !summary.output_written {
                tracing::warn!("No results were written to {}", config.output_path.display());
            }
            if !summary.skipped.is_empty() {
                tracing::warn!("{} input lines were skipped", summary.skipped.len());
            }
            ExitCode::SUCCESS
        }
        Err(e) => {
            tracing::error!("Batch failed: {}", e);
            ExitCode::FAILURE
        }
    }
}

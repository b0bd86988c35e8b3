//! Qogita Deals Export
//!
//! Logs in with `QOGITA_EMAIL` / `QOGITA_PASSWORD`, collects every variant
//! currently on deal and writes their GTINs to `output.csv`.

use std::process::ExitCode;

use anyhow::Context;
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

use qogita_deals_export::config::Settings;
use qogita_deals_export::export::DealsExporter;
use qogita_deals_export::qogita::{Credentials, QogitaClient};

#[tokio::main]
async fn main() -> ExitCode {
    // Load environment variables from .env file
    dotenvy::dotenv().ok();

    init_tracing();

    match run().await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!(error = %format!("{:#}", e), "Export failed");
            ExitCode::FAILURE
        }
    }
}

async fn run() -> anyhow::Result<()> {
    let settings = Settings::load().context("Failed to load configuration")?;
    let credentials = Credentials::from_env();
    if !credentials.is_configured() {
        warn!("QOGITA_EMAIL or QOGITA_PASSWORD is not set, login will be rejected by the API");
    }

    info!(
        "Starting qogita-deals-export v{} against {}",
        env!("CARGO_PKG_VERSION"),
        settings.api.base_url
    );

    let client = QogitaClient::new(&settings.api).context("Failed to create Qogita client")?;
    let exporter = DealsExporter::new(client, settings.output.max_pages);

    let summary = exporter
        .run(&credentials, &settings.output.path)
        .await
        .context("Deals export failed")?;

    info!(
        "Done. File is accessible with name {} ({} rows)",
        summary.path.display(),
        summary.rows
    );
    Ok(())
}

/// Structured logging; `RUST_LOG` overrides the default filter and
/// `LOG_FORMAT=json` switches to JSON lines.
fn init_tracing() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("qogita_deals_export=info"));

    let json = std::env::var("LOG_FORMAT").is_ok_and(|format| format.eq_ignore_ascii_case("json"));
    let builder = tracing_subscriber::fmt().with_env_filter(filter);
    if json {
        builder.json().init();
    } else {
        builder.init();
    }
}

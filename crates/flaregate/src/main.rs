use clap::Parser;
use flaregate::cli::Cli;
use flaregate::{AppState, build_gateway, router};
use flaregate_cloud::Session;
use std::sync::Arc;
use tracing::info;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_tracing();

    let settings = cli.settings()?;
    let gateway = build_gateway(&settings);

    let session = match cli.initial_credentials() {
        Some(credentials) => {
            info!(identity = %credentials.identity(), "Using credentials from environment (unverified)");
            Session::with_credentials(credentials)
        }
        None => Session::new(),
    };

    let app = router(AppState::new(gateway, Arc::new(session)));

    let addr = settings.bind_addr();
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    info!(addr = %addr, backend = %settings.backend, "Flaregate listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Flaregate stopped");
    Ok(())
}

fn init_tracing() {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        tracing_subscriber::EnvFilter::new("flaregate=info,flaregate_cloudflare=info,flaregate_cloud=info")
    });
    tracing_subscriber::fmt().with_env_filter(filter).init();
}

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %err, "Failed to listen for shutdown signal");
    }
}

use anyhow::Context;
use clap::Parser;
use std::sync::Arc;
use tombola_server::{Api, Hub};
use tombola_types::DEFAULT_CASHIER_PIN;
use tracing::info;

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    #[arg(short, long, env = "PORT", default_value_t = 9090)]
    port: u16,

    /// Shared secret required to join as the cashier.
    #[arg(long, env = "CASHIER_PIN", default_value = DEFAULT_CASHIER_PIN)]
    pin: String,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Parse args
    let args = Args::parse();

    // Create logger
    tracing_subscriber::fmt()
        .with_max_level(tracing::Level::INFO)
        .init();

    let hub = Arc::new(Hub::new(args.pin));
    let api = Api::new(hub);
    let app = api.router();

    // Start server
    let addr = format!("0.0.0.0:{}", args.port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("failed to bind {addr}"))?;
    info!("Listening on {}", addr);
    axum::serve(listener, app).await.context("axum server error")?;

    Ok(())
}

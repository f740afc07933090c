use std::sync::Arc;

use clap::Parser;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use workflow_ocr_backend::api::{create_router, AppState};
use workflow_ocr_backend::config::Config;
use workflow_ocr_backend::ocr::OcrMyPdfEngine;

#[derive(Parser)]
#[command(name = "workflow-ocr-backend")]
#[command(about = "OCR sidecar service backed by OCRmyPDF")]
struct Args {
    /// Interface to bind (overrides APP_HOST)
    #[arg(long)]
    host: Option<String>,

    /// Port to listen on (overrides APP_PORT)
    #[arg(long)]
    port: Option<u16>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "workflow_ocr_backend=info,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let mut config = Config::from_env();
    if let Some(host) = args.host {
        config.server.host = host;
    }
    if let Some(port) = args.port {
        config.server.port = port;
    }

    if config.app.app_secret.is_none() {
        tracing::warn!(
            "APP_SECRET is not set. All OCR endpoints reject requests until it is configured."
        );
    }

    let engine = OcrMyPdfEngine::new(&config.ocr);
    match engine.version().await {
        Ok(version) => tracing::info!("Using ocrmypdf {}", version),
        Err(e) => tracing::warn!("OCR engine unavailable - requests will fail: {}", e),
    }

    let addr = format!("{}:{}", config.server.host, config.server.port);
    let state = AppState::new(config, Arc::new(engine));
    let app = create_router(state);

    tracing::info!("Workflow OCR backend starting on http://{}", addr);
    tracing::info!("  Heartbeat:    http://{}/heartbeat", addr);
    tracing::info!("  API docs:     http://{}/docs", addr);
    tracing::info!("  OpenAPI JSON: http://{}/openapi.json", addr);

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!("Failed to install Ctrl+C handler: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    tracing::info!("Shutdown signal received, draining in-flight requests...");
}

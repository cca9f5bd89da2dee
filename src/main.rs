use std::sync::Arc;

use anyhow::Context;
use clap::Parser;
use tokio::net::TcpListener;
use tracing::{info, Level};
use tracing_subscriber::FmtSubscriber;

use leafscan::{Config, DiagnosisService, InferencePool, KnowledgeBase, ModelRegistry};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = Config::parse();

    FmtSubscriber::builder()
        .with_max_level(Level::INFO)
        .with_target(false)
        .compact()
        .init();

    let registry = ModelRegistry::load(&config);
    let pool = InferencePool::new(config.inference_workers, config.max_pending_requests);
    let service = Arc::new(DiagnosisService::new(
        registry,
        pool,
        KnowledgeBase::builtin(),
    ));

    let app = leafscan::server::router(service, &config);

    let addr = config.bind_addr();
    let listener = TcpListener::bind(&addr)
        .await
        .with_context(|| format!("failed to bind {addr}"))?;
    info!(%addr, "listening");
    axum::serve(listener, app).await.context("server error")?;

    Ok(())
}

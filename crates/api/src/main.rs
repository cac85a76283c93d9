//! Terra Fertilizer Service - Main Entry Point

use anyhow::Context;
use api::{init_logging, run_server, TerraConfig};
use tracing::info;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = TerraConfig::load().context("failed to load configuration")?;
    init_logging(&config.logging)?;

    info!("=== Terra Fertilizer Service v{} ===", env!("CARGO_PKG_VERSION"));
    info!(
        "Store backend: {:?}, model manifest: {}",
        config.store.backend,
        config.model.manifest_path.display()
    );

    run_server(config).await
}

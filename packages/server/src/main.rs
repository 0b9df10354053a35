use std::sync::Arc;

use anyhow::Context;
use common::storage::filesystem::FilesystemBlobStore;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use csvlens::config::AppConfig;
use csvlens::database::init_db;
use csvlens::state::AppState;
use csvlens::templates::Templates;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_target(false)
        .init();

    let config = AppConfig::load().context("Failed to load config")?;
    if config.uses_default_secret() {
        warn!("Using the built-in secret key; set CSVLENS__AUTH__SECRET_KEY in production");
    }

    let db = init_db(&config.database.url)
        .await
        .context("Failed to initialize database")?;
    info!(url = %config.database.url, "Database ready");

    let blob_store = FilesystemBlobStore::new(
        config.storage.upload_dir.clone(),
        config.storage.max_upload_size,
    )
    .await
    .context("Failed to initialize upload directory")?;
    info!(dir = %config.storage.upload_dir.display(), "Upload storage ready");

    let templates = Templates::new().context("Failed to compile templates")?;

    let addr = format!("{}:{}", config.server.host, config.server.port);
    let state = AppState {
        db,
        config,
        templates: Arc::new(templates),
        blob_store: Arc::new(blob_store),
    };

    let app = csvlens::build_router(state);

    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind {addr}"))?;
    info!("Server running at http://{}", addr);
    axum::serve(listener, app).await?;

    Ok(())
}

use std::sync::Arc;

use common::BlobStore;
use sea_orm::DatabaseConnection;

use crate::config::AppConfig;
use crate::templates::Templates;

#[derive(Clone)]
pub struct AppState {
    pub db: DatabaseConnection,
    pub config: AppConfig,
    pub templates: Arc<Templates>,
    pub blob_store: Arc<dyn BlobStore>,
}

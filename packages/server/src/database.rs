use std::path::Path;
use std::time::Duration;

use sea_orm::sea_query::{Index, SqliteQueryBuilder};
use sea_orm::{ConnectOptions, ConnectionTrait, Database, DatabaseConnection, DbErr};
use tracing::info;

use crate::entity::upload;

pub async fn init_db(db_url: &str) -> Result<DatabaseConnection, DbErr> {
    ensure_sqlite_parent_dir(db_url)?;

    let mut opt = ConnectOptions::new(db_url.to_owned());

    // Set connection pool options
    opt.max_connections(8)
        .min_connections(1)
        .connect_timeout(Duration::from_secs(8))
        .acquire_timeout(Duration::from_secs(8))
        .sqlx_logging(false);

    let db = Database::connect(opt).await?;
    db.get_schema_registry("csvlens::entity::*")
        .sync(&db)
        .await?;
    ensure_indexes(&db).await?;

    Ok(db)
}

/// Ensure required database indexes exist.
///
/// Schema-sync only creates unique indexes, so the composite index backing
/// "latest upload per account" lookups is created here.
pub async fn ensure_indexes(db: &DatabaseConnection) -> Result<(), DbErr> {
    let stmt = Index::create()
        .if_not_exists()
        .name("idx_upload_account_uploaded")
        .table(upload::Entity)
        .col(upload::Column::AccountId)
        .col(upload::Column::UploadedAt)
        .to_string(SqliteQueryBuilder);

    match db.execute_unprepared(&stmt).await {
        Ok(_) => info!("Ensured index idx_upload_account_uploaded exists"),
        Err(e) => tracing::warn!("Failed to create index idx_upload_account_uploaded: {}", e),
    }

    Ok(())
}

/// SQLite will not create missing directories for a file-backed database.
fn ensure_sqlite_parent_dir(db_url: &str) -> Result<(), DbErr> {
    let Some(rest) = db_url.strip_prefix("sqlite://") else {
        return Ok(());
    };
    let path = rest.split('?').next().unwrap_or_default();
    if path.is_empty() || path == ":memory:" {
        return Ok(());
    }

    if let Some(parent) = Path::new(path).parent()
        && !parent.as_os_str().is_empty()
    {
        std::fs::create_dir_all(parent)
            .map_err(|e| DbErr::Custom(format!("Failed to create {}: {e}", parent.display())))?;
    }
    Ok(())
}

use axum::extract::State;
use axum::response::Response;
use axum_extra::extract::cookie::CookieJar;
use common::{StorageError, StorageKey};
use sea_orm::{ColumnTrait, EntityTrait, QueryFilter, QueryOrder};
use serde::Serialize;
use tracing::instrument;

use crate::csv_table::CsvTable;
use crate::entity::upload;
use crate::error::AppError;
use crate::extractors::auth::CurrentAccount;
use crate::extractors::upload::OwnedUpload;
use crate::flash::Flash;
use crate::handlers::{Page, redirect_with, render};
use crate::models::upload::{PREVIEW_ROWS, TablePreview, UploadListItem};
use crate::state::AppState;

#[derive(Serialize)]
struct ListBody {
    uploads: Vec<UploadListItem>,
}

#[derive(Serialize)]
struct ViewBody {
    filename: String,
    table: TablePreview,
}

/// List the current account's uploads, newest first.
pub async fn preview_data(
    CurrentAccount(account): CurrentAccount,
    State(state): State<AppState>,
    jar: CookieJar,
) -> Result<Response, AppError> {
    let uploads = upload::Entity::find()
        .filter(upload::Column::AccountId.eq(account.id))
        .order_by_desc(upload::Column::UploadedAt)
        .order_by_desc(upload::Column::Id)
        .all(&state.db)
        .await?
        .into_iter()
        .map(UploadListItem::from)
        .collect();

    render(
        &state,
        jar,
        Page::new("preview_data", "Preview Data", Some(&account)),
        ListBody { uploads },
    )
}

/// Show the first rows of one upload as a table.
#[instrument(skip_all, fields(upload_id = owned.upload.id))]
pub async fn view_file(
    owned: OwnedUpload,
    State(state): State<AppState>,
    jar: CookieJar,
) -> Result<Response, AppError> {
    let OwnedUpload { account, upload } = owned;

    let key = StorageKey::parse(upload.storage_key.as_str())?;
    let bytes = match state.blob_store.get(&key).await {
        Ok(bytes) => bytes,
        Err(StorageError::NotFound(_)) => {
            tracing::warn!(key = %key, "Upload row has no blob");
            return Ok(redirect_with(
                jar,
                Flash::danger("File not found on server."),
                "/preview_data",
            ));
        }
        Err(e) => return Err(e.into()),
    };

    let table = match CsvTable::parse(&bytes) {
        Ok(table) => table,
        Err(e) => {
            tracing::warn!(error = %e, "Failed to parse uploaded CSV");
            return Ok(redirect_with(
                jar,
                Flash::danger(format!("Error reading CSV file: {e}")),
                "/preview_data",
            ));
        }
    };

    let title = format!("View {}", upload.filename);
    render(
        &state,
        jar,
        Page::new("view_file", title, Some(&account)),
        ViewBody {
            filename: upload.filename,
            table: TablePreview::from_table(&table, PREVIEW_ROWS),
        },
    )
}

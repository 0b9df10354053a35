use axum::body::Bytes;
use axum::extract::multipart::{Multipart, MultipartError, MultipartRejection};
use axum::extract::{DefaultBodyLimit, State};
use axum::http::StatusCode;
use axum::response::Response;
use axum_extra::extract::cookie::CookieJar;
use chrono::Utc;
use common::{StorageError, StorageKey};
use sea_orm::{ActiveModelTrait, DatabaseConnection, DbErr, Set, TransactionTrait};
use serde::Serialize;
use tracing::instrument;

use crate::config::StorageConfig;
use crate::csrf::{self, CSRF_FIELD};
use crate::entity::{account, upload};
use crate::error::AppError;
use crate::extractors::auth::CurrentAccount;
use crate::flash::Flash;
use crate::handlers::{Page, redirect_with, render};
use crate::state::AppState;
use crate::utils::filename::{display_filename, extension, secure_filename};

/// Room for multipart boundaries and headers on top of the file itself.
const MULTIPART_OVERHEAD: u64 = 64 * 1024;

const NO_FILE_PART: &str = "No file part";
const NO_SELECTED_FILE: &str = "No selected file";
const NOT_ALLOWED: &str = "Allowed file types are CSV only!";
const INVALID_FILENAME: &str = "Invalid filename";
const EMPTY_FILE: &str = "The selected file is empty";
const TOO_LARGE: &str = "File exceeds the maximum upload size";

pub fn upload_body_limit(storage: &StorageConfig) -> DefaultBodyLimit {
    let limit = storage.max_upload_size.saturating_add(MULTIPART_OVERHEAD);
    DefaultBodyLimit::max(usize::try_from(limit).unwrap_or(usize::MAX))
}

#[derive(Serialize)]
struct UploadBody {
    accept: String,
}

impl UploadBody {
    fn new(storage: &StorageConfig) -> Self {
        let accept = storage
            .allowed_extensions
            .iter()
            .map(|ext| format!(".{ext}"))
            .collect::<Vec<_>>()
            .join(",");
        Self { accept }
    }
}

fn upload_page(
    state: &AppState,
    jar: CookieJar,
    account: &account::Model,
    rejection: Option<&str>,
) -> Result<Response, AppError> {
    let mut page = Page::new("upload_csv", "Upload CSV", Some(account));
    if let Some(message) = rejection {
        page = page.status(StatusCode::BAD_REQUEST).flash(Flash::danger(message));
    }
    render(state, jar, page, UploadBody::new(&state.config.storage))
}

pub async fn upload_form(
    CurrentAccount(account): CurrentAccount,
    State(state): State<AppState>,
    jar: CookieJar,
) -> Result<Response, AppError> {
    upload_page(&state, jar, &account, None)
}

struct FilePart {
    filename: String,
    data: Bytes,
}

#[derive(Default)]
struct UploadFields {
    csrf_token: String,
    file: Option<FilePart>,
}

/// Read the form token and the first `file` field, skipping anything else.
async fn read_upload_fields(multipart: &mut Multipart) -> Result<UploadFields, MultipartError> {
    let mut fields = UploadFields::default();
    while let Some(field) = multipart.next_field().await? {
        let name = field.name().map(str::to_string);
        match name.as_deref() {
            Some(CSRF_FIELD) => fields.csrf_token = field.text().await?,
            Some("file") if fields.file.is_none() => {
                let filename = field.file_name().unwrap_or_default().to_string();
                let data = field.bytes().await?;
                fields.file = Some(FilePart { filename, data });
            }
            _ => {}
        }
    }
    Ok(fields)
}

/// Insert the metadata row inside a transaction.
async fn record_upload(
    db: &DatabaseConnection,
    account_id: i32,
    filename: &str,
    key: &StorageKey,
) -> Result<upload::Model, DbErr> {
    let txn = db.begin().await?;
    let model = upload::ActiveModel {
        filename: Set(filename.to_string()),
        storage_key: Set(key.as_str().to_string()),
        uploaded_at: Set(Utc::now()),
        account_id: Set(account_id),
        ..Default::default()
    }
    .insert(&txn)
    .await?;
    txn.commit().await?;
    Ok(model)
}

/// Accept a CSV upload, store it, and record it for the current account.
#[instrument(skip_all, fields(account_id = account.id))]
pub async fn upload_csv(
    CurrentAccount(account): CurrentAccount,
    State(state): State<AppState>,
    jar: CookieJar,
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<Response, AppError> {
    let reject = |jar: CookieJar, message: &str| {
        upload_page(&state, jar, &account, Some(message))
    };
    let storage = &state.config.storage;

    let mut multipart = match multipart {
        Ok(m) => m,
        Err(e) => {
            tracing::debug!(error = %e, "Not a multipart request");
            return reject(jar, NO_FILE_PART);
        }
    };

    let fields = match read_upload_fields(&mut multipart).await {
        Ok(fields) => fields,
        Err(e) if e.status() == StatusCode::PAYLOAD_TOO_LARGE => return reject(jar, TOO_LARGE),
        Err(e) => {
            tracing::debug!(error = %e, "Malformed multipart body");
            return reject(jar, NO_FILE_PART);
        }
    };

    if let Err(e) = csrf::verify(&jar, &fields.csrf_token) {
        tracing::warn!(error = %e, "Rejected upload without a valid form token");
        return reject(jar, &e.to_string());
    }

    let Some(part) = fields.file else {
        return reject(jar, NO_FILE_PART);
    };

    let original = display_filename(&part.filename);
    if original.is_empty() {
        return reject(jar, NO_SELECTED_FILE);
    }
    if !extension(original).is_some_and(|ext| storage.is_allowed_extension(&ext)) {
        return reject(jar, NOT_ALLOWED);
    }

    let sanitized = secure_filename(original);
    if sanitized.is_empty() {
        return reject(jar, INVALID_FILENAME);
    }
    if !extension(&sanitized).is_some_and(|ext| storage.is_allowed_extension(&ext)) {
        return reject(jar, NOT_ALLOWED);
    }

    if part.data.is_empty() {
        return reject(jar, EMPTY_FILE);
    }
    if part.data.len() as u64 > storage.max_upload_size {
        return reject(jar, TOO_LARGE);
    }

    let key = StorageKey::generate(account.id, &sanitized)?;
    match state.blob_store.put(&key, &part.data).await {
        Ok(()) => {}
        Err(StorageError::SizeLimitExceeded { .. }) => return reject(jar, TOO_LARGE),
        Err(e) => return Err(e.into()),
    }

    let recorded = match record_upload(&state.db, account.id, original, &key).await {
        Ok(recorded) => recorded,
        Err(e) => {
            if let Err(cleanup) = state.blob_store.delete(&key).await {
                tracing::warn!(key = %key, error = %cleanup, "Failed to remove orphaned blob");
            }
            return Err(e.into());
        }
    };

    tracing::info!(
        upload_id = recorded.id,
        key = %key,
        size = part.data.len(),
        "Stored upload"
    );
    Ok(redirect_with(
        jar,
        Flash::success("File successfully uploaded and saved!"),
        "/preview_data",
    ))
}

use axum::{
    extract::{FromRequestParts, Path},
    http::request::Parts,
};
use axum_extra::extract::cookie::CookieJar;
use sea_orm::EntityTrait;

use crate::entity::{account, upload};
use crate::error::AppError;
use crate::extractors::auth::CurrentAccount;
use crate::state::AppState;

/// An upload addressed by the `{id}` path segment that belongs to the
/// logged-in account.
///
/// Unknown ids are a 404. Uploads owned by someone else redirect back to the
/// upload list with a flash message.
pub struct OwnedUpload {
    pub account: account::Model,
    pub upload: upload::Model,
}

impl FromRequestParts<AppState> for OwnedUpload {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let CurrentAccount(account) = CurrentAccount::from_request_parts(parts, state).await?;

        let Path(id) = Path::<i32>::from_request_parts(parts, state)
            .await
            .map_err(|_| AppError::NotFound("File not found".into()))?;

        let upload = upload::Entity::find_by_id(id)
            .one(&state.db)
            .await?
            .ok_or_else(|| AppError::NotFound("File not found".into()))?;

        if upload.account_id != account.id {
            tracing::warn!(
                upload_id = upload.id,
                account_id = account.id,
                "Refused access to another account's upload"
            );
            return Err(AppError::AccessDenied {
                message: "You do not have permission to view this file.".into(),
                redirect_to: "/preview_data",
                jar: CookieJar::from_headers(&parts.headers),
            });
        }

        Ok(Self { account, upload })
    }
}

use axum::{
    extract::{FromRequestParts, OptionalFromRequestParts},
    http::request::Parts,
};
use axum_extra::extract::cookie::CookieJar;
use sea_orm::EntityTrait;

use crate::entity::account;
use crate::error::AppError;
use crate::session;
use crate::state::AppState;

/// The account behind a valid session cookie.
///
/// Add this as a handler parameter to require login. Requests without a
/// usable session are redirected to `/login?next=<path>`. Use
/// `Option<CurrentAccount>` on public pages.
pub struct CurrentAccount(pub account::Model);

async fn load(parts: &Parts, state: &AppState) -> Result<Option<CurrentAccount>, AppError> {
    let jar = CookieJar::from_headers(&parts.headers);
    let Some(identity) = session::identity(&jar, &state.config.auth) else {
        return Ok(None);
    };

    let account = account::Entity::find_by_id(identity.account_id)
        .one(&state.db)
        .await?
        .filter(|a| a.username == identity.username);

    if account.is_none() {
        tracing::debug!(account_id = identity.account_id, "Session refers to a missing account");
    }
    Ok(account.map(CurrentAccount))
}

impl FromRequestParts<AppState> for CurrentAccount {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        load(parts, state).await?.ok_or_else(|| AppError::LoginRequired {
            next: parts
                .uri
                .path_and_query()
                .map(|pq| pq.as_str().to_string())
                .unwrap_or_else(|| "/".into()),
            jar: CookieJar::from_headers(&parts.headers),
        })
    }
}

impl OptionalFromRequestParts<AppState> for CurrentAccount {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Option<Self>, Self::Rejection> {
        load(parts, state).await
    }
}

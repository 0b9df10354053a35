use axum::extract::State;
use axum::response::Response;
use axum_extra::extract::cookie::CookieJar;

use crate::error::AppError;
use crate::extractors::auth::CurrentAccount;
use crate::handlers::{Page, render};
use crate::state::AppState;

pub async fn home(
    CurrentAccount(account): CurrentAccount,
    State(state): State<AppState>,
    jar: CookieJar,
) -> Result<Response, AppError> {
    render(&state, jar, Page::new("home", "Home", Some(&account)), ())
}

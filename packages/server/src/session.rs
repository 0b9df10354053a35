use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};

use crate::config::AuthConfig;
use crate::entity::account;
use crate::utils::jwt;

pub const SESSION_COOKIE: &str = "session";

/// The part of an account the session layer needs to know about.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionIdentity {
    pub account_id: i32,
    pub username: String,
}

impl From<&account::Model> for SessionIdentity {
    fn from(account: &account::Model) -> Self {
        Self {
            account_id: account.id,
            username: account.username.clone(),
        }
    }
}

/// Add a freshly signed session cookie to the jar.
pub fn start(
    jar: CookieJar,
    identity: &SessionIdentity,
    auth: &AuthConfig,
) -> anyhow::Result<CookieJar> {
    let token = jwt::sign(identity, &auth.secret_key, auth.session_hours)?;
    let cookie = Cookie::build((SESSION_COOKIE, token))
        .path("/")
        .http_only(true)
        .same_site(SameSite::Lax)
        .max_age(time::Duration::hours(auth.session_hours));
    Ok(jar.add(cookie))
}

/// Remove the session cookie.
pub fn end(jar: CookieJar) -> CookieJar {
    jar.remove(Cookie::build(SESSION_COOKIE).path("/"))
}

/// Read and verify the session cookie, if present.
pub fn identity(jar: &CookieJar, auth: &AuthConfig) -> Option<SessionIdentity> {
    let token = jar.get(SESSION_COOKIE)?.value();
    match jwt::verify(token, &auth.secret_key) {
        Ok(identity) => Some(identity),
        Err(e) => {
            tracing::debug!(error = %e, "Ignoring invalid session cookie");
            None
        }
    }
}

/// Accept a post-login redirect target only if it stays on this site.
pub fn safe_next(next: Option<&str>) -> Option<&str> {
    let next = next?.trim();
    let is_local = next.starts_with('/')
        && !next.starts_with("//")
        && !next.contains('\\')
        && !next.chars().any(|c| c.is_ascii_control());
    is_local.then_some(next)
}

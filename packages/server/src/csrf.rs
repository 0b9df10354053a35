use argon2::password_hash::rand_core::{OsRng, RngCore};
use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use base64::Engine;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use thiserror::Error;

pub const CSRF_COOKIE: &str = "csrf_token";

/// Name of the hidden form field that echoes the cookie.
pub const CSRF_FIELD: &str = "csrf_token";

const TOKEN_BYTES: usize = 32;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum CsrfError {
    #[error("The CSRF token is missing.")]
    Missing,

    #[error("The CSRF session token is missing.")]
    NoCookie,

    #[error("The CSRF tokens do not match.")]
    Mismatch,
}

/// Return the browser's form token, minting a cookie for it if needed.
pub fn issue(jar: CookieJar) -> (CookieJar, String) {
    let existing = jar
        .get(CSRF_COOKIE)
        .map(|c| c.value().to_string())
        .filter(|v| is_well_formed(v));
    if let Some(token) = existing {
        return (jar, token);
    }

    let token = generate();
    let jar = jar.add(
        Cookie::build((CSRF_COOKIE, token.clone()))
            .path("/")
            .http_only(true)
            .same_site(SameSite::Lax),
    );
    (jar, token)
}

/// Check a submitted form token against the cookie.
pub fn verify(jar: &CookieJar, submitted: &str) -> Result<(), CsrfError> {
    let submitted = submitted.trim();
    if submitted.is_empty() {
        return Err(CsrfError::Missing);
    }
    let expected = jar.get(CSRF_COOKIE).ok_or(CsrfError::NoCookie)?;
    if !constant_time_eq(expected.value().as_bytes(), submitted.as_bytes()) {
        return Err(CsrfError::Mismatch);
    }
    Ok(())
}

fn generate() -> String {
    let mut bytes = [0u8; TOKEN_BYTES];
    OsRng.fill_bytes(&mut bytes);
    URL_SAFE_NO_PAD.encode(bytes)
}

fn is_well_formed(token: &str) -> bool {
    URL_SAFE_NO_PAD
        .decode(token)
        .is_ok_and(|bytes| bytes.len() == TOKEN_BYTES)
}

fn constant_time_eq(a: &[u8], b: &[u8]) -> bool {
    a.len() == b.len() && a.iter().zip(b).fold(0u8, |acc, (x, y)| acc | (x ^ y)) == 0
}

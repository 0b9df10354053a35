use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use base64::Engine;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use serde::{Deserialize, Serialize};

pub const FLASH_COOKIE: &str = "flash";

/// Flash message severity, used directly as a CSS class suffix.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Level {
    Success,
    Info,
    Warning,
    Danger,
}

/// A one-shot message shown on the next rendered page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Flash {
    pub level: Level,
    pub message: String,
}

impl Flash {
    pub fn new(level: Level, message: impl Into<String>) -> Self {
        Self {
            level,
            message: message.into(),
        }
    }

    pub fn success(message: impl Into<String>) -> Self {
        Self::new(Level::Success, message)
    }

    pub fn info(message: impl Into<String>) -> Self {
        Self::new(Level::Info, message)
    }

    pub fn warning(message: impl Into<String>) -> Self {
        Self::new(Level::Warning, message)
    }

    pub fn danger(message: impl Into<String>) -> Self {
        Self::new(Level::Danger, message)
    }
}

/// Queue a message for the next page the browser renders.
pub fn push(jar: CookieJar, flash: Flash) -> CookieJar {
    let mut pending = peek(&jar);
    pending.push(flash);
    jar.add(
        Cookie::build((FLASH_COOKIE, encode(&pending)))
            .path("/")
            .http_only(true)
            .same_site(SameSite::Lax),
    )
}

/// Consume all queued messages, clearing the cookie.
pub fn take(jar: CookieJar) -> (CookieJar, Vec<Flash>) {
    let pending = peek(&jar);
    if jar.get(FLASH_COOKIE).is_none() {
        return (jar, pending);
    }
    (jar.remove(Cookie::build(FLASH_COOKIE).path("/")), pending)
}

fn peek(jar: &CookieJar) -> Vec<Flash> {
    jar.get(FLASH_COOKIE)
        .map(|c| decode(c.value()))
        .unwrap_or_default()
}

fn encode(messages: &[Flash]) -> String {
    // Serializing plain structs of strings cannot fail.
    let json = serde_json::to_vec(messages).unwrap_or_default();
    URL_SAFE_NO_PAD.encode(json)
}

/// Malformed cookies decode to no messages.
fn decode(value: &str) -> Vec<Flash> {
    URL_SAFE_NO_PAD
        .decode(value)
        .ok()
        .and_then(|bytes| serde_json::from_slice(&bytes).ok())
        .unwrap_or_default()
}

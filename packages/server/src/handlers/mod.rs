pub mod analysis;
pub mod auth;
pub mod home;
pub mod preview;
pub mod upload;

use axum::http::StatusCode;
use axum::response::{IntoResponse, Redirect, Response};
use axum_extra::extract::cookie::CookieJar;
use serde::Serialize;

use crate::csrf;
use crate::entity::account;
use crate::error::AppError;
use crate::flash::{self, Flash};
use crate::state::AppState;
use crate::templates::PageContext;

/// A page about to be rendered.
pub struct Page<'a> {
    template: &'static str,
    title: String,
    account: Option<&'a account::Model>,
    status: StatusCode,
    messages: Vec<Flash>,
}

impl<'a> Page<'a> {
    pub fn new(
        template: &'static str,
        title: impl Into<String>,
        account: Option<&'a account::Model>,
    ) -> Self {
        Self {
            template,
            title: title.into(),
            account,
            status: StatusCode::OK,
            messages: Vec::new(),
        }
    }

    pub fn status(mut self, status: StatusCode) -> Self {
        self.status = status;
        self
    }

    /// Show `flash` on this page, after any carried over from earlier requests.
    pub fn flash(mut self, flash: Flash) -> Self {
        self.messages.push(flash);
        self
    }
}

#[derive(Serialize)]
struct Rendered<T: Serialize> {
    #[serde(flatten)]
    context: PageContext,
    #[serde(flatten)]
    body: T,
}

/// Render `page` with `body`, consuming pending flash messages from `jar` and
/// making sure the browser holds a form token.
pub fn render<T: Serialize>(
    state: &AppState,
    jar: CookieJar,
    page: Page<'_>,
    body: T,
) -> Result<Response, AppError> {
    let (jar, mut messages) = flash::take(jar);
    messages.extend(page.messages);
    let (jar, csrf_token) = csrf::issue(jar);

    let rendered = Rendered {
        context: PageContext::new(page.title, page.account, messages, csrf_token),
        body,
    };
    let html = state.templates.render(page.template, &rendered)?;
    Ok((page.status, jar, html).into_response())
}

/// Queue `flash` and send the browser to `to`.
pub fn redirect_with(jar: CookieJar, flash: Flash, to: &str) -> Response {
    (flash::push(jar, flash), Redirect::to(to)).into_response()
}

use axum::response::Html;
use handlebars::{Handlebars, TemplateError};
use serde::Serialize;

use crate::entity::account;
use crate::error::AppError;
use crate::flash::Flash;

/// Page templates compiled into the binary. Each `(name, source)` pair is
/// registered once at startup.
const PARTIALS: &[(&str, &str)] = &[
    ("header", include_str!("../templates/partials/header.hbs")),
    ("footer", include_str!("../templates/partials/footer.hbs")),
];

const PAGES: &[(&str, &str)] = &[
    ("home", include_str!("../templates/home.hbs")),
    ("signup", include_str!("../templates/signup.hbs")),
    ("login", include_str!("../templates/login.hbs")),
    ("upload_csv", include_str!("../templates/upload_csv.hbs")),
    ("preview_data", include_str!("../templates/preview_data.hbs")),
    ("view_file", include_str!("../templates/view_file.hbs")),
    ("visuals_analysis", include_str!("../templates/visuals_analysis.hbs")),
];

/// The handlebars registry used to render every page.
pub struct Templates {
    registry: Handlebars<'static>,
}

impl Templates {
    pub fn new() -> Result<Self, TemplateError> {
        let mut registry = Handlebars::new();
        registry.set_dev_mode(false);

        for (name, source) in PARTIALS {
            registry.register_partial(name, *source)?;
        }
        for (name, source) in PAGES {
            registry.register_template_string(name, *source)?;
        }

        Ok(Self { registry })
    }

    pub fn render<T: Serialize>(&self, name: &str, context: &T) -> Result<Html<String>, AppError> {
        Ok(Html(self.registry.render(name, context)?))
    }
}

/// Logged-in account as shown in the navigation bar.
#[derive(Serialize)]
pub struct NavAccount {
    pub username: String,
    pub full_name: String,
}

impl From<&account::Model> for NavAccount {
    fn from(account: &account::Model) -> Self {
        Self {
            username: account.username.clone(),
            full_name: account.full_name.clone(),
        }
    }
}

/// Fields every page template expects.
#[derive(Serialize)]
pub struct PageContext {
    pub title: String,
    pub account: Option<NavAccount>,
    pub messages: Vec<Flash>,
    /// Echoed by every form as a hidden `csrf_token` field.
    pub csrf_token: String,
}

impl PageContext {
    pub fn new(
        title: impl Into<String>,
        account: Option<&account::Model>,
        messages: Vec<Flash>,
        csrf_token: String,
    ) -> Self {
        Self {
            title: title.into(),
            account: account.map(NavAccount::from),
            messages,
            csrf_token,
        }
    }
}

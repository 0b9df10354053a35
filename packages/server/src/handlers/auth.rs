use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Redirect, Response};
use axum::Form;
use axum_extra::extract::cookie::CookieJar;
use chrono::Utc;
use sea_orm::*;
use serde::Serialize;
use tracing::instrument;

use crate::csrf;
use crate::entity::account;
use crate::error::AppError;
use crate::extractors::auth::CurrentAccount;
use crate::flash::{self, Flash};
use crate::handlers::{Page, render};
use crate::models::auth::{
    LoginErrors, LoginForm, NextQuery, SignupErrors, SignupForm, SignupValues, validate_login,
    validate_signup,
};
use crate::session::{self, SessionIdentity};
use crate::state::AppState;
use crate::utils::hash;

const LOGIN_FAILED: &str = "Login Unsuccessful. Please check username/email and password";

#[derive(Serialize)]
struct SignupBody {
    form: SignupValues,
    errors: SignupErrors,
}

#[derive(Serialize)]
struct LoginValues<'a> {
    username_or_email: &'a str,
    next: Option<&'a str>,
}

#[derive(Serialize)]
struct LoginBody<'a> {
    form: LoginValues<'a>,
    errors: LoginErrors,
}

fn signup_rejected(
    state: &AppState,
    jar: CookieJar,
    body: SignupBody,
) -> Result<Response, AppError> {
    let page = Page::new("signup", "Sign Up", None).status(StatusCode::BAD_REQUEST);
    render(state, jar, page, body)
}

pub async fn signup_form(
    current: Option<CurrentAccount>,
    State(state): State<AppState>,
    jar: CookieJar,
) -> Result<Response, AppError> {
    if current.is_some() {
        return Ok(Redirect::to("/home").into_response());
    }
    render(
        &state,
        jar,
        Page::new("signup", "Sign Up", None),
        SignupBody {
            form: SignupValues::default(),
            errors: SignupErrors::default(),
        },
    )
}

async fn taken(
    db: &DatabaseConnection,
    column: account::Column,
    value: &str,
) -> Result<bool, DbErr> {
    Ok(account::Entity::find()
        .filter(column.eq(value))
        .one(db)
        .await?
        .is_some())
}

/// Handle account registration.
#[instrument(skip(state, jar, current, form), fields(username = %form.username()))]
pub async fn signup(
    current: Option<CurrentAccount>,
    State(state): State<AppState>,
    jar: CookieJar,
    Form(form): Form<SignupForm>,
) -> Result<Response, AppError> {
    if current.is_some() {
        return Ok(Redirect::to("/home").into_response());
    }

    if let Err(e) = csrf::verify(&jar, &form.csrf_token) {
        tracing::warn!(error = %e, "Rejected signup without a valid form token");
        let page = Page::new("signup", "Sign Up", None)
            .status(StatusCode::BAD_REQUEST)
            .flash(Flash::danger(e.to_string()));
        let body = SignupBody {
            form: SignupValues::from(&form),
            errors: SignupErrors::default(),
        };
        return render(&state, jar, page, body);
    }

    let mut errors = validate_signup(&form);
    if errors.username.is_empty()
        && taken(&state.db, account::Column::Username, form.username()).await?
    {
        errors.username = SignupErrors::username_taken().username;
    }
    if errors.email.is_empty() && taken(&state.db, account::Column::Email, form.email()).await? {
        errors.email = SignupErrors::email_taken().email;
    }
    if !errors.is_empty() {
        let body = SignupBody {
            form: SignupValues::from(&form),
            errors,
        };
        return signup_rejected(&state, jar, body);
    }

    let hash = hash::hash_password(&form.password)
        .map_err(|e| AppError::Internal(format!("Password hash error: {e}")))?;

    let new_account = account::ActiveModel {
        full_name: Set(form.full_name().to_string()),
        username: Set(form.username().to_string()),
        email: Set(form.email().to_string()),
        password_hash: Set(hash),
        created_at: Set(Utc::now()),
        ..Default::default()
    };

    match new_account.insert(&state.db).await {
        Ok(created) => {
            tracing::info!(account_id = created.id, "Account created");
            let jar = flash::push(
                jar,
                Flash::success("Your account has been created! You can now log in."),
            );
            Ok((jar, Redirect::to("/login")).into_response())
        }
        Err(e) => match e.sql_err() {
            Some(SqlErr::UniqueConstraintViolation(detail)) => {
                tracing::debug!("Registration race condition: unique constraint caught on insert");
                let errors = if detail.contains("email") {
                    SignupErrors::email_taken()
                } else {
                    SignupErrors::username_taken()
                };
                let body = SignupBody {
                    form: SignupValues::from(&form),
                    errors,
                };
                signup_rejected(&state, jar, body)
            }
            _ => Err(AppError::from(e)),
        },
    }
}

fn login_page(
    state: &AppState,
    jar: CookieJar,
    page: Page<'_>,
    form: LoginValues<'_>,
    errors: LoginErrors,
) -> Result<Response, AppError> {
    render(state, jar, page, LoginBody { form, errors })
}

pub async fn login_form(
    current: Option<CurrentAccount>,
    State(state): State<AppState>,
    jar: CookieJar,
    Query(query): Query<NextQuery>,
) -> Result<Response, AppError> {
    if current.is_some() {
        return Ok(Redirect::to("/home").into_response());
    }
    let form = LoginValues {
        username_or_email: "",
        next: query.next.as_deref(),
    };
    login_page(
        &state,
        jar,
        Page::new("login", "Login", None),
        form,
        LoginErrors::default(),
    )
}

/// Handle login by username or email.
#[instrument(skip(state, jar, current, form), fields(login = %form.username_or_email.trim()))]
pub async fn login(
    current: Option<CurrentAccount>,
    State(state): State<AppState>,
    jar: CookieJar,
    Form(form): Form<LoginForm>,
) -> Result<Response, AppError> {
    if current.is_some() {
        return Ok(Redirect::to("/home").into_response());
    }

    let needle = form.username_or_email.trim();
    let values = LoginValues {
        username_or_email: needle,
        next: form.next.as_deref(),
    };

    if let Err(e) = csrf::verify(&jar, &form.csrf_token) {
        tracing::warn!(error = %e, "Rejected login without a valid form token");
        let page = Page::new("login", "Login", None)
            .status(StatusCode::BAD_REQUEST)
            .flash(Flash::danger(e.to_string()));
        return login_page(&state, jar, page, values, LoginErrors::default());
    }

    let errors = validate_login(&form);
    if !errors.is_empty() {
        let page = Page::new("login", "Login", None).status(StatusCode::BAD_REQUEST);
        return login_page(&state, jar, page, values, errors);
    }

    let found = account::Entity::find()
        .filter(
            Condition::any()
                .add(account::Column::Username.eq(needle))
                .add(account::Column::Email.eq(needle)),
        )
        .one(&state.db)
        .await?;

    let verified = match &found {
        Some(a) => hash::verify_password(&form.password, &a.password_hash)
            .map_err(|e| AppError::Internal(format!("Password verify error: {e}")))?,
        None => hash::verify_without_account(&form.password),
    };

    let Some(account) = found.filter(|_| verified) else {
        tracing::info!("Login rejected");
        let page = Page::new("login", "Login", None)
            .status(StatusCode::UNAUTHORIZED)
            .flash(Flash::danger(LOGIN_FAILED));
        return login_page(&state, jar, page, values, LoginErrors::default());
    };

    let jar = session::start(jar, &SessionIdentity::from(&account), &state.config.auth)
        .map_err(|e| AppError::Internal(format!("Session signing error: {e}")))?;
    let jar = flash::push(
        jar,
        Flash::success(format!("Welcome back, {}!", account.full_name)),
    );

    let target = session::safe_next(form.next.as_deref()).unwrap_or("/home");
    tracing::info!(account_id = account.id, "Logged in");
    Ok((jar, Redirect::to(target)).into_response())
}

pub async fn logout(CurrentAccount(account): CurrentAccount, jar: CookieJar) -> Response {
    tracing::info!(account_id = account.id, "Logged out");
    let jar = session::end(jar);
    let jar = flash::push(jar, Flash::info("You have been logged out."));
    (jar, Redirect::to("/login")).into_response()
}

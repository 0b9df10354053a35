use serde::{Deserialize, Serialize};

const REQUIRED: &str = "This field is required.";

/// Submitted `/signup` form.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct SignupForm {
    pub full_name: String,
    pub username: String,
    pub email: String,
    pub password: String,
    pub confirm_password: String,
    pub csrf_token: String,
}

impl SignupForm {
    pub fn full_name(&self) -> &str {
        self.full_name.trim()
    }

    pub fn username(&self) -> &str {
        self.username.trim()
    }

    pub fn email(&self) -> &str {
        self.email.trim()
    }
}

/// Per-field messages shown under each signup input.
#[derive(Debug, Default, Serialize)]
pub struct SignupErrors {
    pub full_name: Vec<String>,
    pub username: Vec<String>,
    pub email: Vec<String>,
    pub password: Vec<String>,
    pub confirm_password: Vec<String>,
}

impl SignupErrors {
    pub fn is_empty(&self) -> bool {
        self.full_name.is_empty()
            && self.username.is_empty()
            && self.email.is_empty()
            && self.password.is_empty()
            && self.confirm_password.is_empty()
    }

    pub fn username_taken() -> Self {
        Self {
            username: vec!["That username is taken. Please choose a different one.".into()],
            ..Default::default()
        }
    }

    pub fn email_taken() -> Self {
        Self {
            email: vec!["That email is taken. Please choose a different one.".into()],
            ..Default::default()
        }
    }
}

/// Values echoed back into a re-rendered signup form. Passwords are never
/// included.
#[derive(Debug, Default, Serialize)]
pub struct SignupValues {
    pub full_name: String,
    pub username: String,
    pub email: String,
}

impl From<&SignupForm> for SignupValues {
    fn from(form: &SignupForm) -> Self {
        Self {
            full_name: form.full_name().to_string(),
            username: form.username().to_string(),
            email: form.email().to_string(),
        }
    }
}

fn check_length(errors: &mut Vec<String>, value: &str, min: usize, max: Option<usize>) {
    if value.is_empty() {
        errors.push(REQUIRED.into());
        return;
    }
    let len = value.chars().count();
    match max {
        Some(max) if len < min || len > max => {
            errors.push(format!("Field must be between {min} and {max} characters long."))
        }
        None if len < min => errors.push(format!("Field must be at least {min} characters long.")),
        _ => {}
    }
}

/// Loose address check: one `@`, a non-empty local part and a dotted domain.
pub fn is_valid_email(email: &str) -> bool {
    if email.chars().any(char::is_whitespace) {
        return false;
    }
    let Some((local, domain)) = email.split_once('@') else {
        return false;
    };
    !local.is_empty()
        && !domain.contains('@')
        && domain.contains('.')
        && !domain.starts_with('.')
        && !domain.ends_with('.')
        && !domain.contains("..")
}

/// Field-level checks that don't need the database.
pub fn validate_signup(form: &SignupForm) -> SignupErrors {
    let mut errors = SignupErrors::default();

    check_length(&mut errors.full_name, form.full_name(), 2, Some(100));
    check_length(&mut errors.username, form.username(), 4, Some(80));

    if form.email().is_empty() {
        errors.email.push(REQUIRED.into());
    } else if !is_valid_email(form.email()) {
        errors.email.push("Invalid email address.".into());
    }

    check_length(&mut errors.password, &form.password, 6, None);

    if form.confirm_password.is_empty() {
        errors.confirm_password.push(REQUIRED.into());
    } else if form.confirm_password != form.password {
        errors
            .confirm_password
            .push("Field must be equal to password.".into());
    }

    errors
}

/// Submitted `/login` form.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct LoginForm {
    pub username_or_email: String,
    pub password: String,
    /// Page to return to, carried over from `?next=`.
    pub next: Option<String>,
    pub csrf_token: String,
}

#[derive(Debug, Default, Serialize)]
pub struct LoginErrors {
    pub username_or_email: Vec<String>,
    pub password: Vec<String>,
}

impl LoginErrors {
    pub fn is_empty(&self) -> bool {
        self.username_or_email.is_empty() && self.password.is_empty()
    }
}

pub fn validate_login(form: &LoginForm) -> LoginErrors {
    let mut errors = LoginErrors::default();
    if form.username_or_email.trim().is_empty() {
        errors.username_or_email.push(REQUIRED.into());
    }
    if form.password.is_empty() {
        errors.password.push(REQUIRED.into());
    }
    errors
}

#[derive(Debug, Deserialize)]
pub struct NextQuery {
    pub next: Option<String>,
}

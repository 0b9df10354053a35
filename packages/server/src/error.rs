use axum::{
    http::StatusCode,
    response::{Html, IntoResponse, Redirect, Response},
};
use axum_extra::extract::cookie::CookieJar;
use common::StorageError;
use handlebars::{RenderError, html_escape};
use sea_orm::DbErr;

use crate::flash::{self, Flash};

/// Application-level error type.
#[derive(Debug)]
pub enum AppError {
    /// Missing database row or route parameter that names nothing.
    NotFound(String),
    /// No valid session. `next` is the path to return to after login.
    /// `jar` holds the request's cookies so pending flashes survive.
    LoginRequired { next: String, jar: CookieJar },
    /// The resource belongs to someone else.
    AccessDenied {
        message: String,
        redirect_to: &'static str,
        jar: CookieJar,
    },
    Internal(String),
}

impl AppError {
    fn error_page(status: StatusCode, message: &str) -> Response {
        let body = format!(
            "<!doctype html>\n<html><head><title>{code}</title></head>\
             <body><h1>{code}</h1><p>{message}</p><p><a href=\"/home\">Back to home</a></p>\
             </body></html>",
            code = status,
            message = html_escape(message),
        );
        (status, Html(body)).into_response()
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        match self {
            AppError::NotFound(message) => Self::error_page(StatusCode::NOT_FOUND, &message),
            AppError::LoginRequired { next, jar } => {
                let jar = flash::push(jar, Flash::info("Please log in to access this page."));
                let location = format!("/login?next={}", urlencoding::encode(&next));
                (jar, Redirect::to(&location)).into_response()
            }
            AppError::AccessDenied {
                message,
                redirect_to,
                jar,
            } => {
                let jar = flash::push(jar, Flash::danger(message));
                (jar, Redirect::to(redirect_to)).into_response()
            }
            AppError::Internal(detail) => {
                tracing::error!("Internal error: {}", detail);
                Self::error_page(
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "An unexpected error occurred",
                )
            }
        }
    }
}

impl From<DbErr> for AppError {
    fn from(err: DbErr) -> Self {
        AppError::Internal(err.to_string())
    }
}

impl From<StorageError> for AppError {
    fn from(err: StorageError) -> Self {
        AppError::Internal(err.to_string())
    }
}

impl From<RenderError> for AppError {
    fn from(err: RenderError) -> Self {
        AppError::Internal(format!("Template render error: {err}"))
    }
}

use axum::{Router, routing::get};

use crate::config::AppConfig;
use crate::handlers;
use crate::state::AppState;

pub fn routes(config: &AppConfig) -> Router<AppState> {
    Router::new()
        .merge(auth_routes())
        .merge(page_routes())
        .merge(upload_routes(config))
}

fn auth_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/signup",
            get(handlers::auth::signup_form).post(handlers::auth::signup),
        )
        .route(
            "/login",
            get(handlers::auth::login_form).post(handlers::auth::login),
        )
        .route("/logout", get(handlers::auth::logout))
}

fn page_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(handlers::home::home))
        .route("/home", get(handlers::home::home))
        .route("/preview_data", get(handlers::preview::preview_data))
        .route("/view_file/{id}", get(handlers::preview::view_file))
        .route(
            "/visuals_analysis",
            get(handlers::analysis::visuals_analysis),
        )
}

fn upload_routes(config: &AppConfig) -> Router<AppState> {
    Router::new()
        .route(
            "/upload_csv",
            get(handlers::upload::upload_form).post(handlers::upload::upload_csv),
        )
        .layer(handlers::upload::upload_body_limit(&config.storage))
}

pub mod chart;
pub mod config;
pub mod csrf;
pub mod csv_table;
pub mod database;
pub mod entity;
pub mod error;
pub mod extractors;
pub mod flash;
pub mod handlers;
pub mod models;
pub mod routes;
pub mod session;
pub mod state;
pub mod templates;
pub mod utils;

use tower_http::trace::TraceLayer;

use crate::state::AppState;

/// Build the application router.
pub fn build_router(state: AppState) -> axum::Router {
    routes::routes(&state.config)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

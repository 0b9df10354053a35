pub mod auth;
pub mod upload;

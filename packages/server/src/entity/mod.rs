pub mod account;
pub mod upload;

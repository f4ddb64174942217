pub mod app;
pub mod auth;
pub mod config;
pub mod error;
pub mod handlers;
pub mod media;
pub mod middleware;
pub mod rate_limit;
pub mod service_token;

pub use app::{router, AppState};

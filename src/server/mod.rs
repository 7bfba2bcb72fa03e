pub mod config;
pub mod error;
pub mod handlers;
pub mod services;
pub mod session;

pub use config::{configure_app, configure_app_with_gateway, AppState};
pub use error::ApiError;

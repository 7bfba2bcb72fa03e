pub mod configuration;
pub mod dataset;
pub mod message;
pub mod sampler;
pub mod server;
pub mod telemetry;
pub mod transcript;

pub use message::{Message, Role};
pub use server::{configure_app, configure_app_with_gateway};

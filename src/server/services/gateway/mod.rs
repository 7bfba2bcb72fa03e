pub mod types;

use async_trait::async_trait;
use thiserror::Error;

use crate::message::Message;

pub use self::types::{CompletionParams, GatewayMetadata};

#[derive(Debug, Error)]
pub enum CompletionError {
    #[error("request to completion service failed: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("completion service returned {status}: {message}")]
    Api { status: u16, message: String },
    #[error("completion service returned no message")]
    EmptyResponse,
}

/// A chat-completion backend: an ordered message list in, one assistant
/// message out.
#[async_trait]
pub trait CompletionGateway: Send + Sync {
    fn metadata(&self) -> GatewayMetadata;

    async fn complete(
        &self,
        messages: &[Message],
        params: &CompletionParams,
    ) -> Result<String, CompletionError>;
}

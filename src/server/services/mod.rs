pub mod conversation;
pub mod gateway;
pub mod openai;

pub use conversation::{ConversationService, Turn};
pub use gateway::{CompletionError, CompletionGateway, CompletionParams};
pub use openai::OpenAiService;

use std::sync::Arc;
use tracing::{error, info};

use super::gateway::{CompletionError, CompletionGateway, CompletionParams};
use crate::message::{Message, Role};
use crate::server::session::{SessionId, SessionStore};

#[derive(Debug, Clone, PartialEq)]
pub struct Turn {
    pub response: String,
    pub messages: Vec<Message>,
}

/// Message list sent for one turn: the system instruction (unless the history
/// already carries one), the history, then the new user message.
pub fn outbound_messages(system_prompt: &str, history: &[Message], user_prompt: &str) -> Vec<Message> {
    let mut messages = Vec::with_capacity(history.len() + 2);

    let has_system = history.iter().any(|message| message.role == Role::System);
    if !system_prompt.is_empty() && !has_system {
        messages.push(Message::system(system_prompt));
    }
    messages.extend_from_slice(history);
    if !user_prompt.is_empty() {
        messages.push(Message::user(user_prompt));
    }

    messages
}

/// Chat turns against the completion service, logged into the caller's session.
pub struct ConversationService {
    sessions: Arc<SessionStore>,
    gateway: Arc<dyn CompletionGateway>,
    params: CompletionParams,
}

impl ConversationService {
    pub fn new(
        sessions: Arc<SessionStore>,
        gateway: Arc<dyn CompletionGateway>,
        params: CompletionParams,
    ) -> Self {
        Self {
            sessions,
            gateway,
            params,
        }
    }

    /// One round trip. The user message is logged before the call and stays
    /// logged if the call fails.
    pub async fn append_turn(
        &self,
        session: SessionId,
        system_prompt: &str,
        user_prompt: &str,
    ) -> Result<Turn, CompletionError> {
        let history = self.sessions.messages(session).await;
        let outbound = outbound_messages(system_prompt, &history, user_prompt);

        if !user_prompt.is_empty() {
            self.sessions.push(session, Message::user(user_prompt)).await;
        }

        let response = match self.gateway.complete(&outbound, &self.params).await {
            Ok(response) => response,
            Err(e) => {
                error!("Error calling completion API: {}", e);
                return Err(e);
            }
        };

        self.sessions
            .push(session, Message::assistant(response.clone()))
            .await;
        let messages = self.sessions.messages(session).await;
        info!("Session {} now holds {} messages", session, messages.len());

        Ok(Turn { response, messages })
    }

    pub async fn clear(&self, session: SessionId) {
        self.sessions.clear(session).await;
    }

    pub async fn history(&self, session: SessionId) -> Vec<Message> {
        self.sessions.messages(session).await
    }
}

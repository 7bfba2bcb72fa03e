use axum::extract::{Json, State};
use axum_extra::extract::cookie::SignedCookieJar;
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::message::Message;
use crate::server::config::AppState;
use crate::server::error::ApiError;
use crate::server::session::session_from_jar;

#[derive(Debug, Deserialize)]
pub struct ChatRequest {
    #[serde(default)]
    pub system_prompt: String,
    #[serde(default)]
    pub user_prompt: String,
}

#[derive(Debug, Serialize)]
pub struct ChatResponse {
    pub response: String,
    pub messages: Vec<Message>,
}

#[derive(Debug, Serialize)]
pub struct ClearHistoryResponse {
    pub status: &'static str,
    pub messages: Vec<Message>,
}

pub async fn chat(
    State(state): State<AppState>,
    jar: SignedCookieJar,
    Json(request): Json<ChatRequest>,
) -> (SignedCookieJar, Result<Json<ChatResponse>, ApiError>) {
    let (jar, session) = session_from_jar(jar);
    info!("Chat turn for session {}", session);

    let result = state
        .conversation
        .append_turn(session, &request.system_prompt, &request.user_prompt)
        .await
        .map(|turn| {
            Json(ChatResponse {
                response: turn.response,
                messages: turn.messages,
            })
        })
        .map_err(ApiError::from);

    (jar, result)
}

pub async fn clear_history(
    State(state): State<AppState>,
    jar: SignedCookieJar,
) -> (SignedCookieJar, Json<ClearHistoryResponse>) {
    let (jar, session) = session_from_jar(jar);
    state.conversation.clear(session).await;
    info!("Cleared history for session {}", session);

    (
        jar,
        Json(ClearHistoryResponse {
            status: "success",
            messages: Vec::new(),
        }),
    )
}

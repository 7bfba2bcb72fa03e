use axum::extract::{Json, State};
use axum_extra::extract::cookie::SignedCookieJar;
use serde::{Deserialize, Serialize};

use crate::server::config::AppState;
use crate::server::error::ApiError;
use crate::server::session::session_from_jar;

#[derive(Debug, Deserialize)]
pub struct SaveHistoryRequest {
    #[serde(default)]
    pub dialogue_id: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct SaveHistoryResponse {
    pub status: &'static str,
    pub message: String,
    pub file: String,
}

/// Write the session log into the dataset file holding `dialogue_id`.
pub async fn save_history(
    State(state): State<AppState>,
    jar: SignedCookieJar,
    Json(request): Json<SaveHistoryRequest>,
) -> (SignedCookieJar, Result<Json<SaveHistoryResponse>, ApiError>) {
    let (jar, session) = session_from_jar(jar);
    let history = state.conversation.history(session).await;
    let dialogue_id = request.dialogue_id.unwrap_or_default();

    let result = state
        .history_writer
        .save(&dialogue_id, &state.settings.candidate_files(), &history)
        .await
        .map(|saved| {
            Json(SaveHistoryResponse {
                status: "success",
                message: format!(
                    "Saved {} messages for {} to {}",
                    saved.messages,
                    saved.key,
                    saved.file_name()
                ),
                file: saved.file_name(),
            })
        })
        .map_err(ApiError::from);

    (jar, result)
}

use askama::Template;
use axum::extract::{Query, State};
use axum::response::Html;
use axum_extra::extract::cookie::SignedCookieJar;
use serde::Deserialize;
use tracing::info;

use crate::dataset::{self, DialogueEntry, Resolution};
use crate::message::Message;
use crate::server::config::AppState;
use crate::server::error::ApiError;
use crate::server::session::session_from_jar;
use crate::transcript::{preview_turns, PreviewTurn};

pub const NO_VALID_DATA: &str = "No valid data";

#[derive(Debug, Deserialize)]
pub struct IndexQuery {
    pub dialogue_id: Option<String>,
}

#[derive(Template)]
#[template(path = "pages/index.html")]
struct IndexTemplate<'a> {
    messages: &'a [Message],
    guideline: &'a str,
    sample_dialogs: Vec<PreviewTurn<'a>>,
    dialogue_ids: &'a [DialogueEntry],
    selected_id: &'a str,
    data_source: &'a str,
}

/// Page showing the selected record, its preview turns and the session log.
/// Dataset files are re-read on every render.
pub async fn index(
    State(state): State<AppState>,
    jar: SignedCookieJar,
    Query(query): Query<IndexQuery>,
) -> (SignedCookieJar, Result<Html<String>, ApiError>) {
    let (jar, session) = session_from_jar(jar);
    let messages = state.conversation.history(session).await;
    (jar, render_index(&state, query.dialogue_id, &messages))
}

fn render_index(
    state: &AppState,
    requested: Option<String>,
    messages: &[Message],
) -> Result<Html<String>, ApiError> {
    let settings = &state.settings;
    let datasets = dataset::load_all(&settings.candidate_files());
    let sample = dataset::load_sample(&settings.sample_data_file);
    let dialogue_ids = dataset::dialogue_index(datasets.first(), sample.as_ref());

    let selected_id = requested
        .filter(|id| !id.trim().is_empty())
        .or_else(|| dialogue_ids.first().map(|entry| entry.id.clone()))
        .unwrap_or_default();

    let mut searched = datasets;
    searched.extend(sample.clone());
    let fallback = sample.as_ref().map(|sample| &sample.records);
    let resolution = dataset::resolve(&selected_id, &searched, fallback);

    let data_source = match &resolution {
        Resolution::Found(found) => format!("{} - {}", found.source.label, selected_id),
        Resolution::NotFound(_) => {
            info!("No valid data for dialogue {:?}", selected_id);
            NO_VALID_DATA.to_string()
        }
    };

    let record = resolution.record();
    let template = IndexTemplate {
        messages,
        guideline: record.guideline(),
        sample_dialogs: preview_turns(record.generated_data(), settings.max_sample_turns).collect(),
        dialogue_ids: &dialogue_ids,
        selected_id: &selected_id,
        data_source: &data_source,
    };

    template.render().map(Html).map_err(ApiError::internal)
}

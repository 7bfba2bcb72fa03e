use axum::{
    extract::{FromRef, Request},
    middleware::{self, Next},
    response::Response,
    routing::{get, post},
    Router,
};
use axum_extra::extract::cookie::Key;
use secrecy::ExposeSecret;
use std::sync::Arc;
use tower_http::services::ServeDir;
use tracing::info;

use crate::configuration::Settings;
use crate::dataset::HistoryWriter;
use crate::server::{
    handlers::{
        chat::{chat, clear_history},
        health_check,
        history::save_history,
        index::index,
    },
    services::{CompletionGateway, ConversationService, OpenAiService},
    session::{cookie_key, SessionStore},
};

#[derive(Clone)]
pub struct AppState {
    pub settings: Arc<Settings>,
    pub conversation: Arc<ConversationService>,
    pub history_writer: Arc<HistoryWriter>,
    pub cookie_key: Key,
}

impl FromRef<AppState> for Key {
    fn from_ref(state: &AppState) -> Self {
        state.cookie_key.clone()
    }
}

impl AppState {
    pub fn new(settings: Settings, gateway: Arc<dyn CompletionGateway>) -> Self {
        let sessions = Arc::new(SessionStore::new());
        let conversation = Arc::new(ConversationService::new(
            sessions,
            gateway,
            settings.completion_params(),
        ));
        let cookie_key = cookie_key(settings.secret_key.expose_secret());

        Self {
            settings: Arc::new(settings),
            conversation,
            history_writer: Arc::new(HistoryWriter::new()),
            cookie_key,
        }
    }
}

/// Router talking to the OpenAI-compatible endpoint from `settings`.
pub fn configure_app(settings: Settings) -> Router {
    let gateway = Arc::new(OpenAiService::new(
        settings.openai_api_key.clone(),
        settings.openai_base_url.clone(),
    ));
    configure_app_with_gateway(settings, gateway)
}

pub fn configure_app_with_gateway(settings: Settings, gateway: Arc<dyn CompletionGateway>) -> Router {
    let metadata = gateway.metadata();
    info!(
        "Using completion gateway {} at {}",
        metadata.name, metadata.base_url
    );
    app_router(AppState::new(settings, gateway))
}

async fn log_request(request: Request, next: Next) -> Response {
    info!("{} {}", request.method(), request.uri().path());
    next.run(request).await
}

fn app_router(state: AppState) -> Router {
    Router::new()
        .route("/", get(index))
        .route("/health", get(health_check))
        .route("/api/chat", post(chat))
        .route("/api/clear-history", post(clear_history))
        .route("/api/save-history", post(save_history))
        .nest_service("/static", ServeDir::new("./static"))
        .layer(middleware::from_fn(log_request))
        .with_state(state)
}

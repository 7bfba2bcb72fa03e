//! Cookie-bound chat sessions.
//!
//! The browser holds a signed cookie with a random session id; the messages
//! themselves stay in memory on the server.

use axum_extra::extract::cookie::{Cookie, Key, SameSite, SignedCookieJar};
use bitcoin_hashes::{sha512, Hash};
use std::collections::HashMap;
use tokio::sync::RwLock;
use tracing::debug;
use uuid::Uuid;

use crate::message::Message;

pub const SESSION_COOKIE_NAME: &str = "session";

pub type SessionId = Uuid;

/// Signing key for session cookies, derived from the configured secret.
pub fn cookie_key(secret: &str) -> Key {
    let digest = sha512::Hash::hash(secret.as_bytes());
    Key::from(&digest[..])
}

pub fn create_session_cookie(session_id: SessionId) -> Cookie<'static> {
    Cookie::build((SESSION_COOKIE_NAME, session_id.to_string()))
        .path("/")
        .http_only(true)
        .same_site(SameSite::Lax)
        .build()
}

/// The session the request belongs to. A missing or tampered cookie starts a
/// new session and the returned jar carries its cookie.
pub fn session_from_jar(jar: SignedCookieJar) -> (SignedCookieJar, SessionId) {
    let existing = jar
        .get(SESSION_COOKIE_NAME)
        .and_then(|cookie| Uuid::parse_str(cookie.value()).ok());

    match existing {
        Some(id) => (jar, id),
        None => {
            let id = Uuid::new_v4();
            debug!("Starting session {}", id);
            (jar.add(create_session_cookie(id)), id)
        }
    }
}

/// In-memory message logs keyed by session. Each call is atomic on its own;
/// nothing serializes a sequence of calls for one session.
#[derive(Debug, Default)]
pub struct SessionStore {
    sessions: RwLock<HashMap<SessionId, Vec<Message>>>,
}

impl SessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn messages(&self, id: SessionId) -> Vec<Message> {
        self.sessions
            .read()
            .await
            .get(&id)
            .cloned()
            .unwrap_or_default()
    }

    pub async fn push(&self, id: SessionId, message: Message) {
        self.sessions
            .write()
            .await
            .entry(id)
            .or_default()
            .push(message);
    }

    /// Empty the log of a known session; unknown sessions stay unknown.
    pub async fn clear(&self, id: SessionId) {
        if let Some(messages) = self.sessions.write().await.get_mut(&id) {
            messages.clear();
        }
    }
}

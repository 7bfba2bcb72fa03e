#![allow(dead_code)]

use axum::{
    body::{to_bytes, Body},
    http::{header, Request, StatusCode},
    Router,
};
use dialogue_viewer::configuration::Settings;
use secrecy::Secret;
use serde_json::{json, Value};
use std::path::{Path, PathBuf};
use tempfile::TempDir;
use tower::ServiceExt;

const MAX_SIZE: usize = 1024 * 1024;

pub const MAIN_FILE: &str = "main.json";
pub const ALT_FILE: &str = "alt.json";

/// Two-turn MultiWOZ-style transcript.
pub fn transcript(city: &str) -> String {
    format!(
        "0 [USER] [inform] I need a train to {city}.\n\
         1 [SYSTEM] [request] What day are you travelling?\n\
         2 [USER] [inform] Saturday, please.\n\
         3 [SYSTEM] [offer] TR1234 leaves at 09:00."
    )
}

pub fn record(city: &str) -> Value {
    json!({
        "guideline": format!("Guide for {city}"),
        "generated_data": transcript(city),
    })
}

/// Data directory with a main file and an alternative file.
pub struct TestData {
    pub dir: TempDir,
}

impl TestData {
    pub fn new(main: Value, alt: Value) -> Self {
        let dir = tempfile::tempdir().unwrap();
        write_json(&dir.path().join(MAIN_FILE), &main);
        write_json(&dir.path().join(ALT_FILE), &alt);
        Self { dir }
    }

    pub fn path(&self, name: &str) -> PathBuf {
        self.dir.path().join(name)
    }

    pub fn read(&self, name: &str) -> Value {
        let raw = std::fs::read_to_string(self.path(name)).unwrap();
        serde_json::from_str(raw.trim_start_matches('\u{feff}')).unwrap()
    }

    pub fn settings(&self, base_url: &str) -> Settings {
        Settings {
            openai_api_key: Secret::new("sk-test-0123456789abcdef".to_string()),
            openai_base_url: base_url.to_string(),
            openai_model: "gpt-test".to_string(),
            data_dir: self.dir.path().to_path_buf(),
            main_data_file: MAIN_FILE.to_string(),
            alt_data_files: ALT_FILE.to_string(),
            sample_data_file: self.dir.path().join("missing_sample.json"),
            secret_key: Secret::new("integration-test-secret".to_string()),
            ..Settings::default()
        }
    }
}

pub fn write_json(path: &Path, value: &Value) {
    std::fs::write(path, serde_json::to_string_pretty(value).unwrap()).unwrap();
}

/// A router's response split into the parts tests look at.
pub struct Reply {
    pub status: StatusCode,
    pub cookie: Option<String>,
    pub body: Value,
}

/// Send a JSON POST, replaying `cookie` when given.
pub async fn post_json(app: &Router, uri: &str, body: Value, cookie: Option<&str>) -> Reply {
    let mut builder = Request::builder()
        .method("POST")
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json");
    if let Some(cookie) = cookie {
        builder = builder.header(header::COOKIE, cookie);
    }
    let request = builder.body(Body::from(body.to_string())).unwrap();

    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let cookie = response
        .headers()
        .get(header::SET_COOKIE)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.split(';').next())
        .map(str::to_string);
    let bytes = to_bytes(response.into_body(), MAX_SIZE).await.unwrap();
    let body = serde_json::from_slice(&bytes).unwrap_or(Value::Null);

    Reply {
        status,
        cookie,
        body,
    }
}

pub fn completion_body(content: &str) -> Value {
    json!({
        "id": "chatcmpl-test",
        "object": "chat.completion",
        "choices": [{
            "index": 0,
            "message": { "role": "assistant", "content": content },
            "finish_reason": "stop"
        }]
    })
}

use config::{Config, ConfigError, Environment, File};
use secrecy::{ExposeSecret, Secret};
use serde::{de, Deserialize, Deserializer};
use serde_aux::field_attributes::deserialize_number_from_string;
use std::path::PathBuf;
use tracing::info;

use crate::server::services::gateway::CompletionParams;

/// Process-wide settings, read once at start-up from `configuration/base.yaml`
/// (optional) and the environment. Environment keys are unprefixed, e.g.
/// `OPENAI_MODEL` or `MAX_SAMPLE_TURNS`.
#[derive(Deserialize, Clone)]
pub struct Settings {
    #[serde(default = "empty_secret")]
    pub openai_api_key: Secret<String>,
    #[serde(default = "default_base_url")]
    pub openai_base_url: String,
    #[serde(default = "default_model")]
    pub openai_model: String,
    #[serde(
        default = "default_max_tokens",
        deserialize_with = "deserialize_number_from_string"
    )]
    pub max_tokens: u32,
    #[serde(default, deserialize_with = "deserialize_number_from_string")]
    pub temperature: f32,
    #[serde(default, deserialize_with = "deserialize_number_from_string")]
    pub top_p: f32,
    #[serde(default = "default_data_dir")]
    pub data_dir: PathBuf,
    #[serde(default = "default_main_data_file")]
    pub main_data_file: String,
    /// Comma-separated file names tried after the main file.
    #[serde(default)]
    pub alt_data_files: String,
    #[serde(default = "default_sample_data_file")]
    pub sample_data_file: PathBuf,
    #[serde(
        default = "default_max_sample_turns",
        deserialize_with = "deserialize_number_from_string"
    )]
    pub max_sample_turns: usize,
    #[serde(default = "default_secret_key")]
    pub secret_key: Secret<String>,
    #[serde(default = "default_host")]
    pub server_host: String,
    #[serde(
        default = "default_server_port",
        deserialize_with = "deserialize_number_from_string"
    )]
    pub server_port: u16,
    #[serde(default = "default_true", deserialize_with = "deserialize_flag")]
    pub debug: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            openai_api_key: empty_secret(),
            openai_base_url: default_base_url(),
            openai_model: default_model(),
            max_tokens: default_max_tokens(),
            temperature: 0.0,
            top_p: 0.0,
            data_dir: default_data_dir(),
            main_data_file: default_main_data_file(),
            alt_data_files: String::new(),
            sample_data_file: default_sample_data_file(),
            max_sample_turns: default_max_sample_turns(),
            secret_key: default_secret_key(),
            server_host: default_host(),
            server_port: default_server_port(),
            debug: true,
        }
    }
}

impl Settings {
    /// Dataset files in the order they are tried.
    pub fn candidate_files(&self) -> Vec<PathBuf> {
        std::iter::once(self.main_data_file.as_str())
            .chain(self.alt_data_files.split(','))
            .map(str::trim)
            .filter(|name| !name.is_empty())
            .map(|name| self.data_dir.join(name))
            .collect()
    }

    pub fn completion_params(&self) -> CompletionParams {
        CompletionParams {
            model: self.openai_model.clone(),
            temperature: self.temperature,
            top_p: self.top_p,
            max_tokens: self.max_tokens,
        }
    }

    pub fn log_summary(&self) {
        info!("Configuration loaded:");
        info!("  Model: {}", self.openai_model);
        info!("  Data dir: {}", self.data_dir.display());
        info!("  Candidate files: {:?}", self.candidate_files());
        info!("  Listening on {}:{}", self.server_host, self.server_port);
    }

    /// First 8 and last 4 characters of the API key, for logs.
    pub fn masked_api_key(&self) -> Option<String> {
        let key = self.openai_api_key.expose_secret();
        if key.is_empty() {
            return None;
        }

        let chars: Vec<char> = key.chars().collect();
        if chars.len() <= 12 {
            return Some("*".repeat(chars.len()));
        }
        let head: String = chars[..8].iter().collect();
        let tail: String = chars[chars.len() - 4..].iter().collect();
        Some(format!("{head}...{tail}"))
    }
}

fn empty_secret() -> Secret<String> {
    Secret::new(String::new())
}

fn default_base_url() -> String {
    "https://api.openai.com/v1".to_string()
}

fn default_model() -> String {
    "gpt-4o-mini".to_string()
}

fn default_max_tokens() -> u32 {
    1000
}

fn default_data_dir() -> PathBuf {
    PathBuf::from("TACT_interraction_datas/multiwoz")
}

fn default_main_data_file() -> String {
    "TACT_MultiWOZ_yjyoon_guide.json.json".to_string()
}

fn default_sample_data_file() -> PathBuf {
    PathBuf::from("sample_data.json")
}

fn default_max_sample_turns() -> usize {
    crate::transcript::DEFAULT_PREVIEW_TURNS
}

fn default_secret_key() -> Secret<String> {
    Secret::new("default-secret-key".to_string())
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_server_port() -> u16 {
    5000
}

fn default_true() -> bool {
    true
}

/// Accepts booleans and the strings `true`/`1`/`yes` (any case); anything else
/// is false.
fn deserialize_flag<'de, D>(deserializer: D) -> Result<bool, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Flag {
        Bool(bool),
        Int(i64),
        Text(String),
    }

    match Flag::deserialize(deserializer) {
        Ok(Flag::Bool(value)) => Ok(value),
        Ok(Flag::Int(value)) => Ok(value == 1),
        Ok(Flag::Text(value)) => Ok(matches!(
            value.trim().to_lowercase().as_str(),
            "true" | "1" | "yes"
        )),
        Err(_) => Err(de::Error::custom("expected a boolean flag")),
    }
}

pub fn get_configuration() -> Result<Settings, ConfigError> {
    let base_path = std::env::current_dir()
        .map_err(|e| ConfigError::Message(format!("Failed to determine current directory: {e}")))?
        .join("configuration");

    let settings = Config::builder()
        .add_source(File::from(base_path.join("base.yaml")).required(false))
        .add_source(Environment::default())
        .build()?
        .try_deserialize::<Settings>()?;

    Ok(settings)
}

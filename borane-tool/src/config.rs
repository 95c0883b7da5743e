use std::path::PathBuf;
use std::time::Duration;

use borane_openrouter::ClientConfig;
use serde::Deserialize;
use tracing::debug;

use crate::error::BorError;

pub const API_KEY_ENV: &str = "OPENROUTER_API_KEY";
pub const MODEL_ENV: &str = "OPENROUTER_MODEL";
pub const DEFAULT_MODEL: &str = "tngtech/tng-r1t-chimera:free";
const DEFAULT_TITLE: &str = "Borane CLI Chat";

#[derive(Debug, Deserialize, Default)]
pub struct Config {
    pub openrouter_api_key: Option<String>,
    pub model: Option<String>,
    pub base_url: Option<String>,
    pub http_referer: Option<String>,
    pub x_title: Option<String>,
    pub timeout_secs: Option<u64>,
}

fn config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|p| p.join("borane").join("config.toml"))
}

/// Loads `.env` from the working directory into the process environment.
pub fn load_env_file() {
    if let Ok(path) = dotenv::dotenv() {
        debug!(path = %path.display(), "Loaded .env");
    }
}

/// Reads the config file. A missing file yields the defaults.
pub fn load_config() -> Result<Config, BorError> {
    let Some(path) = config_path() else {
        return Ok(Config::default());
    };

    let content = match std::fs::read_to_string(&path) {
        Ok(content) => content,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Config::default()),
        Err(e) => return Err(e.into()),
    };

    debug!(path = %path.display(), "Loaded config file");
    parse_config(&content)
}

pub fn parse_config(content: &str) -> Result<Config, BorError> {
    Ok(toml::from_str(content)?)
}

pub fn load_api_key(config: &Config) -> Result<String, BorError> {
    resolve_api_key(std::env::var(API_KEY_ENV).ok(), config)
}

/// Environment first, then config file. Empty values count as unset.
pub fn resolve_api_key(env_key: Option<String>, config: &Config) -> Result<String, BorError> {
    env_key
        .filter(|k| !k.is_empty())
        .or_else(|| config.openrouter_api_key.clone().filter(|k| !k.is_empty()))
        .ok_or(BorError::ApiKeyNotFound)
}

/// Flag, then environment, then config file, then the built-in default.
pub fn resolve_model(
    cli_model: Option<String>,
    env_model: Option<String>,
    config: &Config,
) -> String {
    [cli_model, env_model, config.model.clone()]
        .into_iter()
        .flatten()
        .find(|m| !m.is_empty())
        .unwrap_or_else(|| DEFAULT_MODEL.to_string())
}

pub fn client_config(config: &Config) -> ClientConfig {
    let mut client = ClientConfig::default()
        .with_title(config.x_title.as_deref().unwrap_or(DEFAULT_TITLE));

    if let Some(url) = &config.base_url {
        client = client.with_base_url(url.as_str());
    }
    if let Some(referer) = &config.http_referer {
        client = client.with_referer(referer.as_str());
    }
    if let Some(secs) = config.timeout_secs {
        client = client.with_timeout(Duration::from_secs(secs));
    }

    client
}

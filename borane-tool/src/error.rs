use thiserror::Error;

#[derive(Debug, Error)]
pub enum BorError {
    #[error("API key not found. Set OPENROUTER_API_KEY or configure ~/.config/borane/config.toml")]
    ApiKeyNotFound,

    #[error("Config error: {0}")]
    Config(#[from] toml::de::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("OpenRouter error: {0}")]
    OpenRouter(#[from] borane_openrouter::OpenRouterError),

    #[error("Interrupted")]
    Interrupted,
}

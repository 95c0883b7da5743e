use std::time::Duration;

pub const DEFAULT_BASE_URL: &str = "https://openrouter.ai/api/v1";

/// Ceiling on a whole non-streaming request, and on connecting for any request.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(15);

/// Settings for an [`OpenRouterClient`](crate::OpenRouterClient).
///
/// All fields are independent; start from `ClientConfig::default()` and
/// override what you need.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// API root, without a trailing slash.
    pub base_url: String,
    pub timeout: Duration,
    /// Sent as `HTTP-Referer` for OpenRouter app rankings.
    pub http_referer: Option<String>,
    /// Sent as `X-Title` for OpenRouter app rankings.
    pub x_title: Option<String>,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            timeout: DEFAULT_TIMEOUT,
            http_referer: None,
            x_title: None,
        }
    }
}

impl ClientConfig {
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn with_referer(mut self, referer: impl Into<String>) -> Self {
        self.http_referer = Some(referer.into());
        self
    }

    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.x_title = Some(title.into());
        self
    }
}

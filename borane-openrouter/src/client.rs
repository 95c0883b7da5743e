use reqwest::header::{ACCEPT, AUTHORIZATION, CONTENT_TYPE};
use reqwest::{Method, RequestBuilder};
use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::{debug, instrument, warn};

use crate::config::ClientConfig;
use crate::error::{OpenRouterError, classify_error_body};
use crate::response::{ChatCompletionResponse, ListModelsResponse};
use crate::stream::ChatCompletionStream;
use crate::types::ChatCompletionRequest;

/// Client for the OpenRouter API.
///
/// Holds one connection pool; create it once and reuse it for every call.
pub struct OpenRouterClient {
    http: reqwest::Client,
    api_key: String,
    config: ClientConfig,
}

impl OpenRouterClient {
    /// Creates a new client with the given API key and default settings.
    pub fn new(api_key: impl Into<String>) -> Result<Self, OpenRouterError> {
        Self::with_config(api_key, ClientConfig::default())
    }

    /// Creates a new client with a custom base URL.
    pub fn with_base_url(
        api_key: impl Into<String>,
        base_url: impl Into<String>,
    ) -> Result<Self, OpenRouterError> {
        Self::with_config(api_key, ClientConfig::default().with_base_url(base_url))
    }

    pub fn with_config(
        api_key: impl Into<String>,
        config: ClientConfig,
    ) -> Result<Self, OpenRouterError> {
        let http = reqwest::Client::builder()
            .connect_timeout(config.timeout)
            .build()?;
        Ok(Self::with_http_client(api_key, config, http))
    }

    /// Uses a caller-provided `reqwest::Client`.
    pub fn with_http_client(
        api_key: impl Into<String>,
        config: ClientConfig,
        http: reqwest::Client,
    ) -> Self {
        Self {
            http,
            api_key: api_key.into(),
            config,
        }
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    fn request(&self, method: Method, path: &str) -> RequestBuilder {
        let mut builder = self
            .http
            .request(method, format!("{}{}", self.config.base_url, path))
            .header(AUTHORIZATION, format!("Bearer {}", self.api_key))
            .header(CONTENT_TYPE, "application/json");

        if let Some(referer) = &self.config.http_referer {
            builder = builder.header("HTTP-Referer", referer);
        }
        if let Some(title) = &self.config.x_title {
            builder = builder.header("X-Title", title);
        }

        builder
    }

    /// Sends a request and decodes a 2xx body into `T`.
    ///
    /// The configured timeout bounds the whole exchange, body included.
    #[instrument(skip(self, body))]
    pub async fn send<B, T>(
        &self,
        method: Method,
        path: &str,
        body: Option<&B>,
    ) -> Result<T, OpenRouterError>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let mut builder = self.request(method, path).timeout(self.config.timeout);
        if let Some(body) = body {
            builder = builder.body(serde_json::to_vec(body)?);
        }

        debug!("Sending request to OpenRouter");
        let response = builder.send().await?;
        let status = response.status();
        let bytes = response.bytes().await?;

        if !status.is_success() {
            let err = classify_error_body(status.as_u16(), &bytes);
            warn!(status = status.as_u16(), "OpenRouter returned an error: {}", err);
            return Err(err);
        }

        debug!(status = status.as_u16(), "Received successful response");
        Ok(serde_json::from_slice(&bytes)?)
    }

    /// Executes a non-streaming completion request.
    ///
    /// `request.stream` is forced to `false`.
    #[instrument(skip(self, request), fields(model = %request.model))]
    pub async fn create_chat_completion(
        &self,
        mut request: ChatCompletionRequest,
    ) -> Result<ChatCompletionResponse, OpenRouterError> {
        request.stream = false;
        self.send(Method::POST, "/chat/completions", Some(&request)).await
    }

    /// Opens a streaming completion.
    ///
    /// `request.stream` is forced to `true`. Response headers must arrive
    /// within the configured timeout. A non-2xx status is decoded as an
    /// error and never yields a stream.
    #[instrument(skip(self, request), fields(model = %request.model))]
    pub async fn create_chat_completion_stream(
        &self,
        mut request: ChatCompletionRequest,
    ) -> Result<ChatCompletionStream, OpenRouterError> {
        request.stream = true;
        let body = serde_json::to_vec(&request)?;

        debug!("Opening stream");
        let pending = self
            .request(Method::POST, "/chat/completions")
            .header(ACCEPT, "text/event-stream")
            .body(body)
            .send();

        // Only the header phase is bounded; the body may stream for longer.
        let response = tokio::time::timeout(self.config.timeout, pending)
            .await
            .map_err(|_| OpenRouterError::Timeout(self.config.timeout))??;

        let status = response.status();
        if !status.is_success() {
            let bytes = tokio::time::timeout(self.config.timeout, response.bytes())
                .await
                .map_err(|_| OpenRouterError::Timeout(self.config.timeout))??;
            let err = classify_error_body(status.as_u16(), &bytes);
            warn!(status = status.as_u16(), "OpenRouter refused stream: {}", err);
            return Err(err);
        }

        debug!(status = status.as_u16(), "Stream opened");
        Ok(ChatCompletionStream::new(response))
    }

    /// Lists the models available to this key.
    #[instrument(skip(self))]
    pub async fn list_models(&self) -> Result<ListModelsResponse, OpenRouterError> {
        self.send::<(), _>(Method::GET, "/models", None).await
    }
}

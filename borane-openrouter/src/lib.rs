//! OpenRouter chat-completion client.
//!
//! This crate builds chat-completion requests, sends them to the OpenRouter
//! API and decodes either a single JSON response or a server-sent-event
//! stream of incremental deltas.
//!
//! # Example
//!
//! ```ignore
//! use borane_openrouter::{
//!     ChatCompletionRequest, ChatMessage, OpenRouterClient, StreamAccumulator,
//! };
//!
//! #[tokio::main]
//! async fn main() -> Result<(), borane_openrouter::OpenRouterError> {
//!     let client = OpenRouterClient::new("your-api-key")?;
//!     let request = ChatCompletionRequest::new(
//!         "openai/gpt-4o-mini",
//!         vec![ChatMessage::user("Hello!")],
//!     );
//!
//!     let mut stream = client.create_chat_completion_stream(request).await?;
//!     let mut acc = StreamAccumulator::new();
//!     while let Some(chunk) = stream.next().await? {
//!         if let Some(text) = acc.push(&chunk) {
//!             print!("{text}");
//!         }
//!     }
//!     stream.close();
//!
//!     let reply = acc.into_message();
//!     Ok(())
//! }
//! ```

mod accumulate;
mod client;
mod config;
mod error;
mod response;
mod stream;
mod types;

pub use accumulate::StreamAccumulator;
pub use client::OpenRouterClient;
pub use config::{ClientConfig, DEFAULT_BASE_URL, DEFAULT_TIMEOUT};
pub use error::{OpenRouterError, classify_error_body};
pub use response::{
    ApiError, ApiErrorResponse, ChatCompletionResponse, Choice, Delta, FunctionCallDelta,
    ListModelsResponse, ModelInfo, ModelPricing, ToolCallDelta, Usage,
};
pub use stream::ChatCompletionStream;
pub use types::{
    ChatCompletionRequest, ChatMessage, ContentPart, FunctionCall, FunctionDefinition,
    GenerationParams, ImageUrl, MessageContent, ProviderPreferences, ReasoningConfig, Role,
    ToolCall, ToolChoice, ToolDefinition,
};

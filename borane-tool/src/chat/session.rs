use std::future::Future;
use std::io::Write;

use borane_openrouter::{
    ChatCompletionRequest, ChatCompletionStream, ChatMessage, GenerationParams, OpenRouterClient,
    StreamAccumulator,
};
use tracing::{debug, info};

use crate::error::BorError;

/// One conversation: the client, the model settings and the history.
///
/// The history only ever grows by whole turns; a turn that fails before
/// any reply text arrives leaves it untouched.
pub struct ChatSession {
    client: OpenRouterClient,
    model: String,
    params: GenerationParams,
    history: Vec<ChatMessage>,
}

impl ChatSession {
    pub fn new(client: OpenRouterClient, model: String, params: GenerationParams) -> Self {
        Self {
            client,
            model,
            params,
            history: Vec::new(),
        }
    }

    pub fn with_system_prompt(mut self, prompt: impl Into<String>) -> Self {
        let prompt: String = prompt.into();
        self.history.push(ChatMessage::system(prompt));
        self
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    pub fn history(&self) -> &[ChatMessage] {
        &self.history
    }

    /// Sends `text` with the whole history and streams the reply into `out`.
    ///
    /// Resolving `cancel` abandons the turn, whether the stream is still
    /// opening or already flowing. On success, or on failure after some text
    /// arrived, the reply is appended to the history. Otherwise the user
    /// message is rolled back.
    pub async fn send_turn<W, C>(
        &mut self,
        text: &str,
        out: &mut W,
        cancel: C,
    ) -> Result<(), BorError>
    where
        W: Write,
        C: Future<Output = ()>,
    {
        self.history.push(ChatMessage::user(text));

        let request = ChatCompletionRequest::new(self.model.clone(), self.history.clone())
            .with_params(self.params.clone());

        let mut acc = StreamAccumulator::new();
        let mut stream = None;
        let result = tokio::select! {
            biased;
            _ = cancel => Err(BorError::Interrupted),
            r = stream_reply(&self.client, request, &mut stream, &mut acc, out) => r,
        };
        if let Some(mut stream) = stream {
            stream.close();
        }

        if !acc.content().is_empty() {
            debug!(chars = acc.content().len(), "Turn complete");
            if let Some(usage) = acc.usage() {
                info!(
                    prompt_tokens = usage.prompt_tokens,
                    completion_tokens = usage.completion_tokens,
                    "Token usage"
                );
            }
            self.history.push(acc.into_message());
        } else if result.is_err() {
            self.history.pop();
        }

        result
    }
}

/// Opens the stream into `slot` and prints each fragment as it arrives
/// until the stream ends.
async fn stream_reply<W: Write>(
    client: &OpenRouterClient,
    request: ChatCompletionRequest,
    slot: &mut Option<ChatCompletionStream>,
    acc: &mut StreamAccumulator,
    out: &mut W,
) -> Result<(), BorError> {
    let stream = slot.insert(client.create_chat_completion_stream(request).await?);
    while let Some(chunk) = stream.next().await? {
        if let Some(text) = acc.push(&chunk) {
            write!(out, "{}", text)?;
            out.flush()?;
        }
    }
    Ok(())
}

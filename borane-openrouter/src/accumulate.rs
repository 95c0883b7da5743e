use std::collections::BTreeMap;

use crate::response::{ChatCompletionResponse, Usage};
use crate::types::{ChatMessage, FunctionCall, MessageContent, Role, ToolCall};

/// Reassembles stream deltas into one assistant message.
///
/// Chunks must be pushed in arrival order; fragments are concatenated as-is.
#[derive(Debug, Default)]
pub struct StreamAccumulator {
    content: String,
    reasoning: String,
    // Keyed by the provider-assigned index, which need not be dense.
    tool_calls: BTreeMap<usize, ToolCall>,
    finish_reason: Option<String>,
    model: Option<String>,
    usage: Option<Usage>,
}

impl StreamAccumulator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Folds one chunk in and returns its content fragment, if non-empty.
    pub fn push<'a>(&mut self, chunk: &'a ChatCompletionResponse) -> Option<&'a str> {
        if self.model.is_none() && !chunk.model.is_empty() {
            self.model = Some(chunk.model.clone());
        }
        if chunk.usage.is_some() {
            self.usage = chunk.usage;
        }

        let choice = chunk.choices.first()?;
        if let Some(reason) = &choice.finish_reason {
            self.finish_reason = Some(reason.clone());
        }

        let delta = choice.delta.as_ref()?;
        if let Some(reasoning) = &delta.reasoning {
            self.reasoning.push_str(reasoning);
        }

        for call in &delta.tool_calls {
            let slot = self.tool_calls.entry(call.index).or_insert_with(|| ToolCall {
                id: String::new(),
                kind: "function".to_string(),
                function: FunctionCall {
                    name: String::new(),
                    arguments: String::new(),
                },
            });
            if let Some(id) = &call.id {
                slot.id = id.clone();
            }
            if let Some(function) = &call.function {
                if let Some(name) = &function.name {
                    slot.function.name = name.clone();
                }
                if let Some(args) = &function.arguments {
                    slot.function.arguments.push_str(args);
                }
            }
        }

        let content = delta.content.as_deref().filter(|c| !c.is_empty())?;
        self.content.push_str(content);
        Some(content)
    }

    pub fn content(&self) -> &str {
        &self.content
    }

    pub fn reasoning(&self) -> &str {
        &self.reasoning
    }

    /// Tool calls assembled so far, in index order.
    pub fn tool_calls(&self) -> impl Iterator<Item = &ToolCall> {
        self.tool_calls.values()
    }

    pub fn finish_reason(&self) -> Option<&str> {
        self.finish_reason.as_deref()
    }

    pub fn model(&self) -> Option<&str> {
        self.model.as_deref()
    }

    pub fn usage(&self) -> Option<Usage> {
        self.usage
    }

    /// True when neither text nor tool calls have arrived.
    pub fn is_empty(&self) -> bool {
        self.content.is_empty() && self.tool_calls.is_empty()
    }

    pub fn into_message(self) -> ChatMessage {
        ChatMessage {
            role: Role::Assistant,
            content: if self.content.is_empty() && !self.tool_calls.is_empty() {
                None
            } else {
                Some(MessageContent::Text(self.content))
            },
            name: None,
            tool_calls: self.tool_calls.into_values().collect(),
            tool_call_id: None,
        }
    }
}

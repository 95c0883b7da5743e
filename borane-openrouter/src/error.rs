use std::time::Duration;

use thiserror::Error;

use crate::response::{ApiError, ApiErrorResponse};

#[derive(Debug, Error)]
pub enum OpenRouterError {
    /// Network, TLS or timeout failure, including a connection dropped mid-stream.
    #[error("request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// No response headers arrived within the configured timeout.
    #[error("request timed out after {0:?}")]
    Timeout(Duration),

    #[error("API error (status {status}): {} - {}", .error.kind(), .error.message)]
    Api { status: u16, error: ApiError },

    /// Non-2xx status whose body was not a structured error.
    #[error("API error (status {status})")]
    Status { status: u16, body: Vec<u8> },

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// The provider reported an error inside an otherwise successful stream.
    #[error("stream error: {}", .0.message)]
    StreamApi(ApiError),

    #[error("stream ended before [DONE]")]
    UnexpectedEof,

    #[error("stream already failed")]
    StreamFailed,
}

impl OpenRouterError {
    /// HTTP status for errors that carry one.
    pub fn status(&self) -> Option<u16> {
        match self {
            OpenRouterError::Api { status, .. } | OpenRouterError::Status { status, .. } => {
                Some(*status)
            }
            OpenRouterError::Request(e) => e.status().map(|s| s.as_u16()),
            _ => None,
        }
    }

    /// Whether the failure happened below the API layer.
    pub fn is_transport(&self) -> bool {
        matches!(self, OpenRouterError::Request(_) | OpenRouterError::Timeout(_))
    }

    pub fn is_timeout(&self) -> bool {
        match self {
            OpenRouterError::Timeout(_) => true,
            OpenRouterError::Request(e) => e.is_timeout(),
            _ => false,
        }
    }
}

/// Turns a non-2xx response body into an error.
///
/// A body of the form `{"error": {"message": ..., "type": ...}}` with a
/// non-empty message becomes [`OpenRouterError::Api`]; anything else keeps
/// the raw bytes in [`OpenRouterError::Status`].
pub fn classify_error_body(status: u16, body: &[u8]) -> OpenRouterError {
    match serde_json::from_slice::<ApiErrorResponse>(body) {
        Ok(resp) if !resp.error.message.is_empty() => OpenRouterError::Api {
            status,
            error: resp.error,
        },
        _ => OpenRouterError::Status {
            status,
            body: body.to_vec(),
        },
    }
}

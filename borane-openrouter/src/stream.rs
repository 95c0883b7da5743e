use tracing::{debug, trace};

use crate::error::OpenRouterError;
use crate::response::ChatCompletionResponse;

const DONE_SENTINEL: &[u8] = b"[DONE]";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum StreamState {
    Open,
    Done,
    Failed,
    Closed,
}

/// One classified SSE line.
#[derive(Debug, PartialEq, Eq)]
enum SseLine<'a> {
    /// Blank lines, comments and non-data fields.
    Skip,
    Done,
    Data(&'a [u8]),
}

fn classify_line(line: &[u8]) -> SseLine<'_> {
    let line = line.trim_ascii();
    let Some(payload) = line.strip_prefix(b"data:") else {
        return SseLine::Skip;
    };
    let payload = payload.trim_ascii_start();
    if payload.is_empty() {
        SseLine::Skip
    } else if payload == DONE_SENTINEL {
        SseLine::Done
    } else {
        SseLine::Data(payload)
    }
}

/// Pull-based decoder over a streaming chat completion.
///
/// Call [`next`](Self::next) until it returns `Ok(None)`. The body is
/// released on [`close`](Self::close) or when the stream is dropped.
pub struct ChatCompletionStream {
    response: Option<reqwest::Response>,
    buf: Vec<u8>,
    /// Bytes of `buf` already searched for a newline.
    scanned: usize,
    eof: bool,
    state: StreamState,
}

impl ChatCompletionStream {
    pub(crate) fn new(response: reqwest::Response) -> Self {
        Self {
            response: Some(response),
            buf: Vec::new(),
            scanned: 0,
            eof: false,
            state: StreamState::Open,
        }
    }

    /// Returns the next chunk, or `Ok(None)` once `[DONE]` has been seen.
    ///
    /// A body that ends without `[DONE]` is [`OpenRouterError::UnexpectedEof`];
    /// a dropped connection is [`OpenRouterError::Request`]. After any error
    /// the stream stays failed.
    pub async fn next(&mut self) -> Result<Option<ChatCompletionResponse>, OpenRouterError> {
        match self.state {
            StreamState::Open => {}
            StreamState::Done | StreamState::Closed => return Ok(None),
            StreamState::Failed => return Err(OpenRouterError::StreamFailed),
        }

        match self.next_chunk().await {
            Ok(Some(chunk)) => Ok(Some(chunk)),
            Ok(None) => {
                debug!("Stream finished");
                self.state = StreamState::Done;
                Ok(None)
            }
            Err(e) => {
                debug!("Stream failed: {}", e);
                self.state = StreamState::Failed;
                Err(e)
            }
        }
    }

    async fn next_chunk(&mut self) -> Result<Option<ChatCompletionResponse>, OpenRouterError> {
        loop {
            let Some(line) = self.read_line().await? else {
                return Err(OpenRouterError::UnexpectedEof);
            };

            match classify_line(&line) {
                SseLine::Skip => {
                    trace!(line = %String::from_utf8_lossy(&line), "Skipping SSE line");
                }
                SseLine::Done => return Ok(None),
                SseLine::Data(payload) => {
                    let mut chunk: ChatCompletionResponse = serde_json::from_slice(payload)?;
                    if let Some(error) = chunk.error.take() {
                        return Err(OpenRouterError::StreamApi(error));
                    }
                    return Ok(Some(chunk));
                }
            }
        }
    }

    /// Reads one line without its terminator. A final unterminated line is
    /// still returned; `None` means the body is exhausted.
    async fn read_line(&mut self) -> Result<Option<Vec<u8>>, OpenRouterError> {
        loop {
            if let Some(pos) = self.buf[self.scanned..].iter().position(|&b| b == b'\n') {
                let end = self.scanned + pos;
                let mut line: Vec<u8> = self.buf.drain(..=end).collect();
                line.pop();
                self.scanned = 0;
                return Ok(Some(line));
            }
            self.scanned = self.buf.len();

            if self.eof {
                if self.buf.is_empty() {
                    return Ok(None);
                }
                self.scanned = 0;
                return Ok(Some(std::mem::take(&mut self.buf)));
            }

            let Some(response) = self.response.as_mut() else {
                return Ok(None);
            };
            match response.chunk().await? {
                Some(bytes) => self.buf.extend_from_slice(&bytes),
                None => self.eof = true,
            }
        }
    }

    /// Releases the response body. Safe to call repeatedly and in any state.
    pub fn close(&mut self) {
        if self.response.take().is_some() {
            debug!("Stream closed");
        }
        self.buf.clear();
        self.scanned = 0;
        self.state = StreamState::Closed;
    }

    /// Whether `[DONE]` has been seen.
    pub fn is_done(&self) -> bool {
        self.state == StreamState::Done
    }

    pub fn is_closed(&self) -> bool {
        self.state == StreamState::Closed
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn data_lines() {
        assert_eq!(
            classify_line(br#"data: {"choices":[]}"#),
            SseLine::Data(br#"{"choices":[]}"#)
        );
        assert_eq!(classify_line(b"data:{}\r"), SseLine::Data(b"{}"));
    }

    #[test]
    fn sentinel() {
        assert_eq!(classify_line(b"data: [DONE]"), SseLine::Done);
        assert_eq!(classify_line(b"data: [DONE]\r"), SseLine::Done);
    }

    #[test]
    fn noise_is_skipped() {
        assert_eq!(classify_line(b""), SseLine::Skip);
        assert_eq!(classify_line(b"   \r"), SseLine::Skip);
        assert_eq!(classify_line(b": OPENROUTER PROCESSING"), SseLine::Skip);
        assert_eq!(classify_line(b"event: message"), SseLine::Skip);
        assert_eq!(classify_line(b"id: 7"), SseLine::Skip);
        assert_eq!(classify_line(b"data:"), SseLine::Skip);
    }
}

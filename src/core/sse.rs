//! Server-sent event framing for streaming completions.
//!
//! Azure streams completions as `data: {json}` lines terminated by a
//! `data: [DONE]` sentinel. The parser is incremental: byte chunks may split
//! events (or UTF-8 sequences) at arbitrary points.

use std::collections::VecDeque;
use std::pin::Pin;
use std::task::{Context, Poll};

use bytes::Bytes;
use futures::StreamExt;
use futures::stream::{BoxStream, Stream};
use serde::de::DeserializeOwned;

use super::error::LlmError;

const DONE_SENTINEL: &str = "[DONE]";

/// Incremental SSE line parser. Collects `data:` payloads, ignores comments
/// and other fields, and flags the `[DONE]` sentinel.
pub(crate) struct SseParser {
    buffer: Vec<u8>,
    done: bool,
}

impl SseParser {
    pub(crate) fn new() -> Self {
        Self {
            buffer: Vec::new(),
            done: false,
        }
    }

    pub(crate) fn is_done(&self) -> bool {
        self.done
    }

    /// Feed raw bytes and return the complete `data:` payloads they unlock.
    /// Payloads after the sentinel are dropped.
    pub(crate) fn feed(&mut self, chunk: &[u8]) -> Result<Vec<String>, LlmError> {
        self.buffer.extend_from_slice(chunk);

        let mut payloads = Vec::new();
        while let Some(pos) = self.buffer.iter().position(|&b| b == b'\n') {
            let line: Vec<u8> = self.buffer.drain(..=pos).collect();
            if self.done {
                continue;
            }

            let line = std::str::from_utf8(&line).map_err(|e| LlmError::Parse {
                message: "Event stream is not valid UTF-8".to_string(),
                source: Box::new(e),
            })?;
            let line = line.trim_end_matches(['\n', '\r']);

            let Some(payload) = line.strip_prefix("data:") else {
                continue;
            };
            let payload = payload.trim_start();

            if payload == DONE_SENTINEL {
                self.done = true;
            } else if !payload.is_empty() {
                payloads.push(payload.to_string());
            }
        }

        Ok(payloads)
    }
}

/// Typed stream of SSE chunks decoded from a streaming HTTP response.
pub struct SseStream<T> {
    inner: BoxStream<'static, Result<Bytes, reqwest::Error>>,
    parser: SseParser,
    pending: VecDeque<T>,
    finished: bool,
}

impl<T: DeserializeOwned> SseStream<T> {
    pub(crate) fn new(response: reqwest::Response) -> Self {
        Self {
            inner: response.bytes_stream().boxed(),
            parser: SseParser::new(),
            pending: VecDeque::new(),
            finished: false,
        }
    }

    fn decode(&mut self, payloads: Vec<String>) -> Result<(), LlmError> {
        for payload in payloads {
            let chunk: T = serde_json::from_str(&payload).map_err(|e| LlmError::Parse {
                message: format!("Failed to parse stream event: {payload}"),
                source: Box::new(e),
            })?;
            self.pending.push_back(chunk);
        }
        Ok(())
    }
}

impl<T: DeserializeOwned + Unpin> Stream for SseStream<T> {
    type Item = Result<T, LlmError>;

    fn poll_next(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        let this = self.get_mut();

        loop {
            if let Some(chunk) = this.pending.pop_front() {
                return Poll::Ready(Some(Ok(chunk)));
            }
            if this.finished {
                return Poll::Ready(None);
            }

            match Pin::new(&mut this.inner).poll_next(cx) {
                Poll::Pending => return Poll::Pending,
                Poll::Ready(None) => {
                    this.finished = true;
                    // Without the sentinel a truncated response would be
                    // indistinguishable from a complete one.
                    if !this.parser.is_done() {
                        return Poll::Ready(Some(Err(LlmError::Parse {
                            message: "Event stream ended before the [DONE] sentinel".to_string(),
                            source: Box::new(std::io::Error::new(
                                std::io::ErrorKind::UnexpectedEof,
                                "truncated event stream",
                            )),
                        })));
                    }
                }
                Poll::Ready(Some(Err(e))) => {
                    this.finished = true;
                    return Poll::Ready(Some(Err(LlmError::Network {
                        message: "Event stream interrupted".to_string(),
                        source: Box::new(e),
                    })));
                }
                Poll::Ready(Some(Ok(bytes))) => {
                    let payloads = match this.parser.feed(&bytes) {
                        Ok(payloads) => payloads,
                        Err(e) => {
                            this.finished = true;
                            return Poll::Ready(Some(Err(e)));
                        }
                    };
                    if let Err(e) = this.decode(payloads) {
                        this.finished = true;
                        return Poll::Ready(Some(Err(e)));
                    }
                    if this.parser.is_done() {
                        this.finished = true;
                    }
                }
            }
        }
    }
}

//! Streaming client for OpenAI-compatible chat completion endpoints
//! (OpenAI, Ollama, vLLM, ...)

use super::sse::{SseEvent, SseLineParser};
use super::transport::{ChatTransport, ChunkStream};
use super::types::{ChatCompletionChunk, ChatRequest};
use crate::config::{
    Credentials, InferenceSettings, INFERENCE_API_KEY_VAR, LOCAL_INFERENCE_API_KEY,
};
use crate::error::{Error, Result};
use crate::network::HttpClient;
use crate::providers::ProviderRequest;
use async_trait::async_trait;
use bytes::Bytes;
use futures::{Stream, StreamExt};
use std::collections::VecDeque;
use std::pin::Pin;
use std::time::Duration;
use tracing::{debug, error};

/// Posts to `{base_url}/chat/completions` with `stream: true`
pub struct OpenAiClient {
    client: HttpClient,
    base_url: String,
    api_key: String,
    timeout: Duration,
}

impl OpenAiClient {
    pub fn new(client: HttpClient, base_url: impl Into<String>, api_key: impl Into<String>) -> Self {
        Self {
            client,
            base_url: base_url.into(),
            api_key: api_key.into(),
            timeout: InferenceSettings::default().timeout(),
        }
    }

    /// Local Ollama or the remote endpoint, depending on `use_local`
    pub fn from_settings(
        client: HttpClient,
        inference: &InferenceSettings,
        credentials: &Credentials,
    ) -> Result<Self> {
        let api_key = if inference.use_local {
            LOCAL_INFERENCE_API_KEY.to_string()
        } else {
            credentials
                .inference_api_key
                .clone()
                .ok_or(Error::MissingCredential(INFERENCE_API_KEY_VAR))?
        };

        Ok(Self::new(client, inference.effective_base_url(), api_key).with_timeout(inference.timeout()))
    }

    /// Deadline for the whole streamed response
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn completions_url(&self) -> String {
        format!("{}/chat/completions", self.base_url.trim_end_matches('/'))
    }
}

#[async_trait]
impl ChatTransport for OpenAiClient {
    async fn stream_chat(&self, request: ChatRequest) -> Result<ChunkStream> {
        let url = self.completions_url();
        debug!("Streaming completion from {} with model {}", url, request.model);

        let req = ProviderRequest::post(url)
            .header("Authorization", format!("Bearer {}", self.api_key))
            .header("Accept", "text/event-stream")
            .json(serde_json::to_value(&request)?)
            .timeout(self.timeout);

        let response = self.client.send(req).await?;
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            error!(status = status.as_u16(), details = %body, "Chat completion request failed");
            return Err(Error::Http {
                status: status.as_u16(),
                body,
            });
        }

        Ok(chunk_stream(response.bytes_stream()))
    }
}

/// Decode an SSE byte stream into completion chunks
pub fn chunk_stream<S>(bytes: S) -> ChunkStream
where
    S: Stream<Item = reqwest::Result<Bytes>> + Send + 'static,
{
    let state = ChunkState {
        bytes: Box::pin(bytes),
        parser: SseLineParser::new(),
        pending: VecDeque::new(),
        saw_done: false,
        exhausted: false,
    };

    Box::pin(futures::stream::unfold(state, |mut state| async move {
        loop {
            if let Some(item) = state.pending.pop_front() {
                return Some((item, state));
            }
            if state.exhausted || state.saw_done {
                return None;
            }

            match state.bytes.next().await {
                Some(Ok(chunk)) => {
                    for event in state.parser.push(&chunk) {
                        state.enqueue(event);
                    }
                }
                Some(Err(e)) => {
                    state.exhausted = true;
                    return Some((Err(Error::Transport(e)), state));
                }
                None => {
                    state.exhausted = true;
                    if let Some(event) = state.parser.flush() {
                        state.enqueue(event);
                    }
                }
            }
        }
    }))
}

struct ChunkState {
    bytes: Pin<Box<dyn Stream<Item = reqwest::Result<Bytes>> + Send>>,
    parser: SseLineParser,
    pending: VecDeque<Result<ChatCompletionChunk>>,
    saw_done: bool,
    exhausted: bool,
}

impl ChunkState {
    fn enqueue(&mut self, event: SseEvent) {
        if self.saw_done {
            return;
        }
        if event.is_done() {
            self.saw_done = true;
            return;
        }

        let chunk = serde_json::from_str::<ChatCompletionChunk>(&event.data).map_err(|e| {
            Error::InvalidResponseFormat(format!("malformed completion chunk: {}", e))
        });
        let failed = chunk.is_err();
        self.pending.push_back(chunk);
        if failed {
            // nothing after a malformed chunk is trusted
            self.saw_done = true;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::LOCAL_INFERENCE_BASE_URL;

    fn byte_stream(parts: &[&'static str]) -> impl Stream<Item = reqwest::Result<Bytes>> + Send + 'static {
        let parts: Vec<reqwest::Result<Bytes>> =
            parts.iter().map(|p| Ok(Bytes::from_static(p.as_bytes()))).collect();
        futures::stream::iter(parts)
    }

    #[tokio::test]
    async fn test_chunks_until_done() {
        let stream = chunk_stream(byte_stream(&[
            "data: {\"choices\":[{\"delta\":{\"content\":\"Hel\"}}]}\n\n",
            "data: {\"choices\":[{\"delta\":{\"content\":\"lo\"}}]}\n",
            "\ndata: [DONE]\n\ndata: {\"choices\":[]}\n\n",
        ]));
        let chunks: Vec<_> = stream.collect().await;

        assert_eq!(chunks.len(), 2);
        let first = chunks[0].as_ref().unwrap();
        assert_eq!(first.choices[0].content(), Some("Hel"));
    }

    #[tokio::test]
    async fn test_trailing_event_without_separator() {
        let stream = chunk_stream(byte_stream(&[
            "data: {\"choices\":[{\"delta\":{},\"finish_reason\":\"stop\"}]}",
        ]));
        let chunks: Vec<_> = stream.collect().await;
        assert_eq!(chunks.len(), 1);
        assert!(chunks[0].as_ref().unwrap().choices[0].is_stop());
    }

    #[tokio::test]
    async fn test_malformed_chunk_ends_stream_with_error() {
        let stream = chunk_stream(byte_stream(&[
            "data: {not json}\n\n",
            "data: {\"choices\":[]}\n\n",
        ]));
        let chunks: Vec<_> = stream.collect().await;
        assert_eq!(chunks.len(), 1);
        assert!(matches!(chunks[0], Err(Error::InvalidResponseFormat(_))));
    }

    #[test]
    fn test_local_inference_needs_no_credential() {
        let inference = InferenceSettings {
            use_local: true,
            ..Default::default()
        };
        let client =
            OpenAiClient::from_settings(HttpClient::new().unwrap(), &inference, &Credentials::default())
                .unwrap();
        assert_eq!(client.base_url(), LOCAL_INFERENCE_BASE_URL);
        assert_eq!(client.completions_url(), "http://localhost:11434/v1/chat/completions");
    }

    #[test]
    fn test_remote_inference_requires_key() {
        let inference = InferenceSettings::default();
        assert!(matches!(
            OpenAiClient::from_settings(HttpClient::new().unwrap(), &inference, &Credentials::default()),
            Err(Error::MissingCredential(INFERENCE_API_KEY_VAR))
        ));
    }
}

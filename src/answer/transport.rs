//! Seam between the streamer and whatever produces completion chunks

use super::types::{ChatCompletionChunk, ChatRequest};
use crate::error::Result;
use async_trait::async_trait;
use futures::Stream;
use std::pin::Pin;

/// Chunks in arrival order; an `Err` item ends the answer
pub type ChunkStream = Pin<Box<dyn Stream<Item = Result<ChatCompletionChunk>> + Send>>;

/// Starts a streamed chat completion.
///
/// Implementations hold only read-only configuration and may be shared
/// across concurrent answers.
#[async_trait]
pub trait ChatTransport: Send + Sync {
    async fn stream_chat(&self, request: ChatRequest) -> Result<ChunkStream>;
}

//! Destinations for incremental answer updates

use serde_json::{json, Value};
use tokio::sync::mpsc::UnboundedSender;
use tracing::debug;

/// What the streamer pushes to its sink
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StreamUpdate {
    /// Newly generated text
    Delta(String),
    /// The model finished; sent once per answer, after every delta
    End,
}

impl StreamUpdate {
    /// JSON payload the UI layer consumes
    pub fn to_payload(&self) -> Value {
        match self {
            Self::Delta(text) => json!({ "llmResponse": text }),
            Self::End => json!({ "llmResponseEnd": true }),
        }
    }
}

/// Receives updates synchronously from inside the chunk loop.
///
/// A slow sink slows consumption of the model stream.
pub trait StreamSink: Send {
    fn update(&mut self, update: StreamUpdate);
}

impl<F> StreamSink for F
where
    F: FnMut(StreamUpdate) + Send,
{
    fn update(&mut self, update: StreamUpdate) {
        self(update)
    }
}

/// Keeps every update in memory
#[derive(Debug, Default)]
pub struct CollectSink {
    pub updates: Vec<StreamUpdate>,
}

impl CollectSink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Concatenated delta text
    pub fn text(&self) -> String {
        self.updates
            .iter()
            .filter_map(|u| match u {
                StreamUpdate::Delta(text) => Some(text.as_str()),
                StreamUpdate::End => None,
            })
            .collect()
    }

    pub fn end_count(&self) -> usize {
        self.updates
            .iter()
            .filter(|u| matches!(u, StreamUpdate::End))
            .count()
    }
}

impl StreamSink for CollectSink {
    fn update(&mut self, update: StreamUpdate) {
        self.updates.push(update);
    }
}

/// Forwards updates to an async consumer over a channel
#[derive(Debug, Clone)]
pub struct ChannelSink {
    tx: UnboundedSender<StreamUpdate>,
}

impl ChannelSink {
    pub fn new(tx: UnboundedSender<StreamUpdate>) -> Self {
        Self { tx }
    }
}

impl StreamSink for ChannelSink {
    fn update(&mut self, update: StreamUpdate) {
        if self.tx.send(update).is_err() {
            debug!("Stream consumer dropped; update discarded");
        }
    }
}

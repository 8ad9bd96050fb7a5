//! Answer streaming module
//!
//! Builds a citation prompt from vector snippets and search results, streams
//! the completion from an OpenAI-compatible endpoint and forwards each delta
//! to a caller-supplied sink.

mod openai;
mod prompt;
mod sink;
mod streamer;
mod transport;
mod types;

pub mod sse;

pub use openai::{chunk_stream, OpenAiClient};
pub use prompt::*;
pub use sink::{ChannelSink, CollectSink, StreamSink, StreamUpdate};
pub use streamer::AnswerStreamer;
pub use transport::{ChatTransport, ChunkStream};
pub use types::*;

//! answer-engine: web search aggregation and cited, streaming LLM answers
//!
//! Queries one of several web search APIs (Brave, Google Custom Search,
//! Serper) and normalizes the hits, looks up images and videos with live link
//! validation, and streams a cited Markdown answer from an OpenAI-compatible
//! model.

pub mod answer;
pub mod config;
pub mod error;
pub mod media;
pub mod network;
pub mod providers;
pub mod results;
pub mod search;

pub use answer::{AnswerStreamer, OpenAiClient, StreamSink, StreamUpdate, VectorSnippet};
pub use config::{Credentials, Settings};
pub use error::{Error, Result};
pub use media::MediaFetcher;
pub use providers::{ProviderKind, SearchProvider};
pub use results::{ImageResult, SearchResult, VideoResult};
pub use search::Dispatcher;

/// Application version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

//! HTTP networking module
//!
//! Provides the HTTP client shared by the search providers, the media
//! fetchers and the inference transport.

mod cancel;
mod client;
mod user_agent;

pub use cancel::with_cancellation;
pub use client::HttpClient;
pub use user_agent::generate_user_agent;

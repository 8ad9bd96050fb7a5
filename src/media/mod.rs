//! Media lookups
//!
//! Image and video search through Serper. Each candidate link is probed with
//! a HEAD request and kept only when it serves an image.

mod fetcher;
mod validator;

pub use fetcher::MediaFetcher;
pub use validator::LinkValidator;

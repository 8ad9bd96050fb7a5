//! Result types returned by the search providers and media fetchers

mod types;

pub use types::*;

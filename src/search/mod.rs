//! Search dispatch module
//!
//! Selects the configured provider adapter and forwards the query to it.

mod dispatcher;

pub use dispatcher::Dispatcher;

//! Configuration module for answer-engine
//!
//! Settings come from a YAML file merged with environment variables;
//! provider and inference secrets are read from the environment only.

mod credentials;
mod settings;

pub use credentials::*;
pub use settings::*;

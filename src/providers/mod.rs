//! Search provider module
//!
//! Defines the `SearchProvider` trait, the Brave, Google and Serper
//! adapters, and a registry keyed by provider kind.

mod extract;
mod registry;
mod traits;

pub mod brave;
pub mod google;
pub mod serper;

pub use registry::ProviderRegistry;
pub use traits::*;

pub(crate) use extract::{results_array, str_at};
pub(crate) use serper::{serper_post, SERPER_BASE_URL};

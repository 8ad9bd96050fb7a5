//! API credentials sourced from the environment

use std::fmt;

pub const BRAVE_API_KEY_VAR: &str = "BRAVE_SEARCH_API_KEY";
pub const GOOGLE_API_KEY_VAR: &str = "GOOGLE_SEARCH_API_KEY";
pub const GOOGLE_CX_VAR: &str = "GOOGLE_CX";
pub const SERPER_API_KEY_VAR: &str = "SERPER_API";
pub const INFERENCE_API_KEY_VAR: &str = "INFERENCE_API_KEY";

/// Secrets for the search providers and the inference endpoint.
///
/// There are no built-in fallbacks: an absent variable stays `None` and the
/// adapter needing it fails with
/// [`Error::MissingCredential`](crate::error::Error::MissingCredential).
#[derive(Clone, Default)]
pub struct Credentials {
    pub brave_api_key: Option<String>,
    pub google_api_key: Option<String>,
    pub google_cx: Option<String>,
    pub serper_api_key: Option<String>,
    pub inference_api_key: Option<String>,
}

impl Credentials {
    /// Read every credential from the process environment
    pub fn from_env() -> Self {
        Self::from_vars(|key| std::env::var(key).ok())
    }

    /// Read credentials through an arbitrary lookup; empty values count as unset
    pub fn from_vars(var: impl Fn(&str) -> Option<String>) -> Self {
        let get = |key: &str| var(key).filter(|v| !v.trim().is_empty());
        Self {
            brave_api_key: get(BRAVE_API_KEY_VAR),
            google_api_key: get(GOOGLE_API_KEY_VAR),
            google_cx: get(GOOGLE_CX_VAR),
            serper_api_key: get(SERPER_API_KEY_VAR),
            inference_api_key: get(INFERENCE_API_KEY_VAR),
        }
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mask = |v: &Option<String>| if v.is_some() { "<set>" } else { "<unset>" };
        f.debug_struct("Credentials")
            .field("brave_api_key", &mask(&self.brave_api_key))
            .field("google_api_key", &mask(&self.google_api_key))
            .field("google_cx", &mask(&self.google_cx))
            .field("serper_api_key", &mask(&self.serper_api_key))
            .field("inference_api_key", &mask(&self.inference_api_key))
            .finish()
    }
}

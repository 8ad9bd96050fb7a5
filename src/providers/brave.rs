//! Brave Search API provider

use super::extract::{results_array, str_at};
use super::traits::*;
use crate::config::{Credentials, BRAVE_API_KEY_VAR};
use crate::error::{Error, Result};
use crate::results::SearchResult;
use tracing::warn;

const BRAVE_API_URL: &str = "https://api.search.brave.com/res/v1/web/search";

/// Brave web search through the official API
pub struct Brave {
    base_url: String,
    api_key: Option<String>,
}

impl Brave {
    pub fn new(api_key: Option<String>) -> Self {
        Self {
            base_url: BRAVE_API_URL.to_string(),
            api_key,
        }
    }

    pub fn from_credentials(credentials: &Credentials) -> Self {
        Self::new(credentials.brave_api_key.clone())
    }

    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into();
        self
    }
}

impl SearchProvider for Brave {
    fn kind(&self) -> ProviderKind {
        ProviderKind::Brave
    }

    fn request(&self, params: &SearchParams) -> Result<ProviderRequest> {
        let api_key = self
            .api_key
            .as_deref()
            .ok_or(Error::MissingCredential(BRAVE_API_KEY_VAR))?;

        Ok(ProviderRequest::get(&self.base_url)
            .header("Accept", "application/json")
            .header("X-Subscription-Token", api_key)
            .param("q", &params.query)
            .param("count", params.page_count.to_string()))
    }

    fn response(&self, response: ProviderResponse) -> Result<Vec<SearchResult>> {
        // Brave error bodies are still parsed; a missing results field is
        // what fails the call.
        if !response.is_success() {
            warn!(
                "Issue with response from Brave Search API: status {}",
                response.status
            );
        }

        let body = response.json_value()?;
        let hits = results_array(&body, "/web/results")?;

        Ok(hits
            .iter()
            .map(|hit| {
                SearchResult::new(
                    str_at(hit, "/title"),
                    str_at(hit, "/url"),
                    str_at(hit, "/profile/img"),
                )
            })
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn response(status: u16, body: serde_json::Value) -> ProviderResponse {
        ProviderResponse {
            status,
            headers: HashMap::new(),
            text: body.to_string(),
            url: BRAVE_API_URL.to_string(),
        }
    }

    #[test]
    fn test_brave_request() {
        let brave = Brave::new(Some("brave-key".to_string()));
        let request = brave
            .request(&SearchParams::new("rust programming", 7))
            .unwrap();

        assert_eq!(request.method, HttpMethod::Get);
        assert!(request.url.contains("api.search.brave.com"));
        assert_eq!(request.param_value("q"), Some("rust programming"));
        assert_eq!(request.param_value("count"), Some("7"));
        assert_eq!(request.header_value("X-Subscription-Token"), Some("brave-key"));
    }

    #[test]
    fn test_brave_request_without_key() {
        let brave = Brave::new(None);
        assert!(matches!(
            brave.request(&SearchParams::new("rust", 10)),
            Err(Error::MissingCredential(BRAVE_API_KEY_VAR))
        ));
    }

    #[test]
    fn test_brave_response_mapping() {
        let brave = Brave::new(None);
        let body = serde_json::json!({
            "web": {"results": [
                {"title": "The Rust Book", "url": "https://doc.rust-lang.org/book/",
                 "profile": {"img": "https://imgs.search.brave.com/a.png"}},
                {"title": "No profile", "url": "https://example.com/"}
            ]}
        });

        let results = brave.response(response(200, body)).unwrap();
        assert_eq!(results.len(), 2);
        assert_eq!(results[0].link, "https://doc.rust-lang.org/book/");
        assert_eq!(results[0].favicon, "https://imgs.search.brave.com/a.png");
        assert_eq!(results[1].favicon, "");
    }

    #[test]
    fn test_brave_error_status_still_parsed() {
        let brave = Brave::new(None);
        let body = serde_json::json!({"web": {"results": [{"title": "t", "url": "https://u/"}]}});
        let results = brave.response(response(503, body)).unwrap();
        assert_eq!(results.len(), 1);
    }

    #[test]
    fn test_brave_missing_results_field() {
        let brave = Brave::new(None);
        let body = serde_json::json!({"type": "ErrorResponse", "error": {"code": "RATE_LIMITED"}});
        assert!(matches!(
            brave.response(response(429, body)),
            Err(Error::InvalidResponseFormat(_))
        ));
    }
}

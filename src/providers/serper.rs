//! Serper (google.serper.dev) provider

use super::extract::{results_array, str_at};
use super::traits::*;
use crate::config::{Credentials, SERPER_API_KEY_VAR};
use crate::error::{Error, Result};
use crate::results::SearchResult;
use serde_json::json;

pub(crate) const SERPER_BASE_URL: &str = "https://google.serper.dev";

/// Build the authenticated `{"q": query}` POST every Serper endpoint takes
pub(crate) fn serper_post(url: &str, api_key: Option<&str>, query: &str) -> Result<ProviderRequest> {
    let api_key = api_key.ok_or(Error::MissingCredential(SERPER_API_KEY_VAR))?;
    Ok(ProviderRequest::post(url)
        .header("X-API-KEY", api_key)
        .header("Content-Type", "application/json")
        .json(json!({ "q": query })))
}

/// Serper web search
pub struct Serper {
    base_url: String,
    api_key: Option<String>,
}

impl Serper {
    pub fn new(api_key: Option<String>) -> Self {
        Self {
            base_url: SERPER_BASE_URL.to_string(),
            api_key,
        }
    }

    pub fn from_credentials(credentials: &Credentials) -> Self {
        Self::new(credentials.serper_api_key.clone())
    }

    /// Point at another host; `/search` is appended
    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into();
        self
    }
}

impl SearchProvider for Serper {
    fn kind(&self) -> ProviderKind {
        ProviderKind::Serper
    }

    /// Serper picks its own result count; `page_count` is not sent.
    fn request(&self, params: &SearchParams) -> Result<ProviderRequest> {
        let url = format!("{}/search", self.base_url.trim_end_matches('/'));
        serper_post(&url, self.api_key.as_deref(), &params.query)
    }

    fn response(&self, response: ProviderResponse) -> Result<Vec<SearchResult>> {
        let response = response.error_for_status()?;
        let body = response.json_value()?;
        let organic = results_array(&body, "/organic")?;

        Ok(organic
            .iter()
            .map(|hit| {
                SearchResult::new(
                    str_at(hit, "/title"),
                    str_at(hit, "/link"),
                    str_at(hit, "/favicons/0"),
                )
            })
            .collect())
    }
}

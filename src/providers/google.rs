//! Google Custom Search JSON API provider

use super::extract::{redact_url, results_array, str_at};
use super::traits::*;
use crate::config::{Credentials, GOOGLE_API_KEY_VAR, GOOGLE_CX_VAR};
use crate::error::{Error, Result};
use crate::results::SearchResult;
use tracing::{debug, error};

const GOOGLE_API_URL: &str = "https://www.googleapis.com/customsearch/v1";

/// Google web search through a Programmable Search Engine
pub struct Google {
    base_url: String,
    api_key: Option<String>,
    cx: Option<String>,
}

impl Google {
    pub fn new(api_key: Option<String>, cx: Option<String>) -> Self {
        Self {
            base_url: GOOGLE_API_URL.to_string(),
            api_key,
            cx,
        }
    }

    pub fn from_credentials(credentials: &Credentials) -> Self {
        Self::new(
            credentials.google_api_key.clone(),
            credentials.google_cx.clone(),
        )
    }

    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into();
        self
    }
}

impl SearchProvider for Google {
    fn kind(&self) -> ProviderKind {
        ProviderKind::Google
    }

    fn request(&self, params: &SearchParams) -> Result<ProviderRequest> {
        debug!(
            has_api_key = self.api_key.is_some(),
            has_cx = self.cx.is_some(),
            query = %params.query,
            page_count = params.page_count,
            "Google search environment check"
        );

        let api_key = self
            .api_key
            .as_deref()
            .ok_or(Error::MissingCredential(GOOGLE_API_KEY_VAR))?;
        let cx = self
            .cx
            .as_deref()
            .ok_or(Error::MissingCredential(GOOGLE_CX_VAR))?;

        Ok(ProviderRequest::get(&self.base_url)
            .param("key", api_key)
            .param("cx", cx)
            .param("q", &params.query)
            .param("num", params.page_count.to_string()))
    }

    fn response(&self, response: ProviderResponse) -> Result<Vec<SearchResult>> {
        if !response.is_success() {
            error!(
                status = response.status,
                details = %response.text,
                url = %redact_url(&response.url, &["key"]),
                "Google Search API error"
            );
            return Err(Error::Http {
                status: response.status,
                body: response.text,
            });
        }

        let body = response.json_value()?;
        debug!(
            kind = body.get("kind").and_then(|k| k.as_str()).unwrap_or_default(),
            total_results = %str_at(&body, "/searchInformation/totalResults"),
            item_count = body.get("items").and_then(|i| i.as_array()).map(Vec::len),
            "Google search response"
        );

        let items = results_array(&body, "/items")?;

        Ok(items
            .iter()
            .map(|item| {
                SearchResult::new(
                    str_at(item, "/title"),
                    str_at(item, "/link"),
                    str_at(item, "/pagemap/cse_thumbnail/0/src"),
                )
            })
            .collect())
    }
}

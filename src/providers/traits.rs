//! Provider traits and types

use crate::error::{Error, Result};
use crate::results::SearchResult;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;
use std::time::Duration;

/// Parameters for building a search request
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchParams {
    /// Search query string, passed through unvalidated
    pub query: String,
    /// Number of results to ask the provider for
    pub page_count: u32,
}

impl SearchParams {
    pub fn new(query: impl Into<String>, page_count: u32) -> Self {
        Self {
            query: query.into(),
            page_count,
        }
    }
}

/// HTTP request to be made on behalf of a provider
#[derive(Debug, Clone)]
pub struct ProviderRequest {
    /// URL to request
    pub url: String,
    /// HTTP method
    pub method: HttpMethod,
    /// Request headers
    pub headers: Vec<(String, String)>,
    /// Query parameters, URL-encoded by the client
    pub params: Vec<(String, String)>,
    /// Request body
    pub data: Option<RequestBody>,
    /// Overrides the client-wide deadline
    pub timeout: Option<Duration>,
}

impl ProviderRequest {
    fn with_method(url: impl Into<String>, method: HttpMethod) -> Self {
        Self {
            url: url.into(),
            method,
            headers: Vec::new(),
            params: Vec::new(),
            data: None,
            timeout: None,
        }
    }

    /// Create a GET request
    pub fn get(url: impl Into<String>) -> Self {
        Self::with_method(url, HttpMethod::Get)
    }

    /// Create a POST request
    pub fn post(url: impl Into<String>) -> Self {
        Self::with_method(url, HttpMethod::Post)
    }

    /// Create a HEAD request
    pub fn head(url: impl Into<String>) -> Self {
        Self::with_method(url, HttpMethod::Head)
    }

    /// Add a header
    pub fn header(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((key.into(), value.into()));
        self
    }

    /// Add a query parameter
    pub fn param(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.params.push((key.into(), value.into()));
        self
    }

    /// Add JSON body
    pub fn json(mut self, data: serde_json::Value) -> Self {
        self.data = Some(RequestBody::Json(data));
        self
    }

    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Look up a header value by case-insensitive name
    pub fn header_value(&self, key: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(key))
            .map(|(_, v)| v.as_str())
    }

    /// Look up a query parameter value
    pub fn param_value(&self, key: &str) -> Option<&str> {
        self.params
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }
}

/// HTTP method
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HttpMethod {
    Get,
    Post,
    Head,
}

/// Request body types
#[derive(Debug, Clone)]
pub enum RequestBody {
    Json(serde_json::Value),
}

/// Buffered HTTP response handed back to a provider
#[derive(Debug, Clone)]
pub struct ProviderResponse {
    /// HTTP status code
    pub status: u16,
    /// Response headers, lowercase names
    pub headers: HashMap<String, String>,
    /// Response body as text
    pub text: String,
    /// Response URL (after redirects)
    pub url: String,
}

impl ProviderResponse {
    /// Check if response is successful (2xx)
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    /// Look up a header by case-insensitive name
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }

    pub fn content_type(&self) -> Option<&str> {
        self.header("content-type")
    }

    /// Parse the body as JSON; a body that is not JSON has the wrong format
    pub fn json_value(&self) -> Result<serde_json::Value> {
        serde_json::from_str(&self.text)
            .map_err(|e| Error::InvalidResponseFormat(format!("body is not valid JSON: {}", e)))
    }

    /// Turn a non-2xx response into [`Error::Http`] carrying the body
    pub fn error_for_status(self) -> Result<Self> {
        if self.is_success() {
            Ok(self)
        } else {
            Err(Error::Http {
                status: self.status,
                body: self.text,
            })
        }
    }
}

/// The web search providers this crate knows how to talk to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProviderKind {
    Brave,
    Serper,
    Google,
}

impl ProviderKind {
    pub const ALL: [ProviderKind; 3] = [Self::Brave, Self::Serper, Self::Google];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Brave => "brave",
            Self::Serper => "serper",
            Self::Google => "google",
        }
    }
}

impl fmt::Display for ProviderKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ProviderKind {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::ALL
            .into_iter()
            .find(|kind| kind.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| Error::UnsupportedProvider(s.to_string()))
    }
}

/// A web search backend.
///
/// Implementations only build requests and normalize responses; the shared
/// [`HttpClient`](crate::network::HttpClient) performs the I/O.
pub trait SearchProvider: Send + Sync {
    /// Which provider this is
    fn kind(&self) -> ProviderKind;

    /// Provider name for logs
    fn name(&self) -> &str {
        self.kind().as_str()
    }

    /// Build the HTTP request for a search
    fn request(&self, params: &SearchParams) -> Result<ProviderRequest>;

    /// Normalize the HTTP response into results, in provider order
    fn response(&self, response: ProviderResponse) -> Result<Vec<SearchResult>>;
}

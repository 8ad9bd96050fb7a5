//! HTTP client for provider, media and inference requests

use super::user_agent::generate_user_agent;
use crate::config::OutgoingSettings;
use crate::error::Result;
use crate::providers::{HttpMethod, ProviderRequest, ProviderResponse, RequestBody};
use reqwest::{Client, Response};
use std::collections::HashMap;
use std::time::Duration;
use tracing::debug;

/// HTTP client wrapper carrying the configured deadline and user agent
#[derive(Clone)]
pub struct HttpClient {
    client: Client,
    default_timeout: Duration,
    user_agent: String,
}

impl HttpClient {
    /// Create a new HTTP client with default settings
    pub fn new() -> Result<Self> {
        Self::with_settings(&OutgoingSettings::default())
    }

    /// Create a new HTTP client with custom settings
    pub fn with_settings(settings: &OutgoingSettings) -> Result<Self> {
        let mut builder = Client::builder()
            .timeout(settings.timeout())
            .gzip(true)
            .brotli(true);

        if let Some(ref proxy_url) = settings.proxy {
            builder = builder.proxy(reqwest::Proxy::all(proxy_url)?);
        }

        let client = builder.build()?;

        Ok(Self {
            client,
            default_timeout: settings.timeout(),
            user_agent: settings
                .user_agent
                .clone()
                .unwrap_or_else(generate_user_agent),
        })
    }

    /// Execute a provider request and buffer the whole body
    pub async fn execute(&self, request: ProviderRequest) -> Result<ProviderResponse> {
        let response = self.send(request).await?;
        Self::parse_response(response).await
    }

    /// Execute a request and hand back the raw response for streaming reads
    pub async fn send(&self, request: ProviderRequest) -> Result<Response> {
        debug!("{:?} {}", request.method, request.url);

        let mut req_builder = match request.method {
            HttpMethod::Get => self.client.get(&request.url),
            HttpMethod::Post => self.client.post(&request.url),
            HttpMethod::Head => self.client.head(&request.url),
        };

        req_builder = req_builder
            .timeout(request.timeout.unwrap_or(self.default_timeout))
            .header("User-Agent", &self.user_agent);

        for (key, value) in &request.headers {
            req_builder = req_builder.header(key, value);
        }

        if !request.params.is_empty() {
            req_builder = req_builder.query(&request.params);
        }

        if let Some(RequestBody::Json(json)) = request.data {
            req_builder = req_builder.json(&json);
        }

        Ok(req_builder.send().await?)
    }

    /// HEAD request with its own deadline; the body is never read
    pub async fn head(&self, url: &str, timeout: Duration) -> Result<ProviderResponse> {
        let request = ProviderRequest::head(url).timeout(timeout);
        let response = self.send(request).await?;
        Ok(ProviderResponse {
            status: response.status().as_u16(),
            headers: Self::collect_headers(&response),
            text: String::new(),
            url: response.url().to_string(),
        })
    }

    /// Parse response into ProviderResponse
    async fn parse_response(response: Response) -> Result<ProviderResponse> {
        let status = response.status().as_u16();
        let url = response.url().to_string();
        let headers = Self::collect_headers(&response);
        let text = response.text().await?;

        Ok(ProviderResponse {
            status,
            headers,
            text,
            url,
        })
    }

    fn collect_headers(response: &Response) -> HashMap<String, String> {
        let mut headers = HashMap::new();
        for (key, value) in response.headers() {
            if let Ok(v) = value.to_str() {
                headers.insert(key.to_string(), v.to_string());
            }
        }
        headers
    }

    /// Get current user agent
    pub fn user_agent(&self) -> &str {
        &self.user_agent
    }

    pub fn default_timeout(&self) -> Duration {
        self.default_timeout
    }
}

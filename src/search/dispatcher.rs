//! Routes a query to the configured search provider

use crate::config::{Credentials, SearchSettings, Settings};
use crate::error::{Error, Result};
use crate::network::{with_cancellation, HttpClient};
use crate::providers::{ProviderKind, ProviderRegistry, SearchParams, SearchProvider};
use crate::results::SearchResult;
use std::sync::Arc;
use std::time::Instant;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info};

/// Search front door: one configured provider per call, no fan-in
pub struct Dispatcher {
    /// HTTP client for making requests
    client: HttpClient,
    /// Available provider adapters
    registry: Arc<ProviderRegistry>,
    /// Configured provider name, resolved on every call
    provider: String,
    /// Default result count
    page_count: u32,
}

impl Dispatcher {
    /// Create a new dispatcher
    pub fn new(client: HttpClient, registry: Arc<ProviderRegistry>, search: &SearchSettings) -> Self {
        Self {
            client,
            registry,
            provider: search.provider.clone(),
            page_count: search.page_count,
        }
    }

    /// Dispatcher with every built-in provider wired to `credentials`
    pub fn from_settings(client: HttpClient, settings: &Settings, credentials: &Credentials) -> Self {
        let registry = Arc::new(ProviderRegistry::with_credentials(credentials));
        Self::new(client, registry, &settings.search)
    }

    /// Configured provider name
    pub fn provider_name(&self) -> &str {
        &self.provider
    }

    pub fn page_count(&self) -> u32 {
        self.page_count
    }

    /// Search with the configured provider and default page count
    pub async fn get_search_results(&self, query: &str) -> Result<Vec<SearchResult>> {
        let kind = self.configured_kind()?;
        self.search_with(kind, query, self.page_count).await
    }

    /// Like [`get_search_results`](Self::get_search_results), aborting when `cancel` fires
    pub async fn get_search_results_cancellable(
        &self,
        query: &str,
        cancel: &CancellationToken,
    ) -> Result<Vec<SearchResult>> {
        with_cancellation(cancel, self.get_search_results(query)).await
    }

    /// Search with a specific provider
    pub async fn search_with(
        &self,
        kind: ProviderKind,
        query: &str,
        page_count: u32,
    ) -> Result<Vec<SearchResult>> {
        let provider = self
            .registry
            .get(kind)
            .ok_or_else(|| Error::UnsupportedProvider(kind.to_string()))?;

        let start = Instant::now();
        let params = SearchParams::new(query, page_count);

        match self.run(provider.as_ref(), &params).await {
            Ok(results) => {
                info!(
                    "Provider {} returned {} results in {:?}",
                    provider.name(),
                    results.len(),
                    start.elapsed()
                );
                Ok(results)
            }
            Err(e) => {
                error!("Error fetching search results from {}: {}", provider.name(), e);
                Err(e)
            }
        }
    }

    async fn run(
        &self,
        provider: &dyn SearchProvider,
        params: &SearchParams,
    ) -> Result<Vec<SearchResult>> {
        let request = provider.request(params)?;
        debug!("Searching {} for '{}'", provider.name(), params.query);
        let response = self.client.execute(request).await?;
        provider.response(response)
    }

    fn configured_kind(&self) -> Result<ProviderKind> {
        self.provider.parse().map_err(|e| {
            error!("{}", e);
            e
        })
    }
}

//! Registry of the configured search providers

use super::traits::{ProviderKind, SearchProvider};
use super::{brave::Brave, google::Google, serper::Serper};
use crate::config::Credentials;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::debug;

/// Providers by kind; at most one adapter per kind
#[derive(Clone, Default)]
pub struct ProviderRegistry {
    providers: HashMap<ProviderKind, Arc<dyn SearchProvider>>,
}

impl ProviderRegistry {
    /// Create a new empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry with every built-in provider wired to `credentials`
    pub fn with_credentials(credentials: &Credentials) -> Self {
        let mut registry = Self::new();
        registry.register(Arc::new(Brave::from_credentials(credentials)));
        registry.register(Arc::new(Google::from_credentials(credentials)));
        registry.register(Arc::new(Serper::from_credentials(credentials)));
        registry
    }

    /// Register a provider, replacing any earlier one of the same kind
    pub fn register(&mut self, provider: Arc<dyn SearchProvider>) {
        debug!("Registered search provider: {}", provider.name());
        self.providers.insert(provider.kind(), provider);
    }

    /// Get a provider by kind
    pub fn get(&self, kind: ProviderKind) -> Option<&Arc<dyn SearchProvider>> {
        self.providers.get(&kind)
    }

    pub fn contains(&self, kind: ProviderKind) -> bool {
        self.providers.contains_key(&kind)
    }

    pub fn len(&self) -> usize {
        self.providers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.providers.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_registry_with_credentials() {
        let registry = ProviderRegistry::with_credentials(&Credentials::default());
        assert_eq!(registry.len(), 3);
        for kind in ProviderKind::ALL {
            assert_eq!(registry.get(kind).map(|p| p.kind()), Some(kind));
        }
    }

    #[test]
    fn test_register_replaces_same_kind() {
        let mut registry = ProviderRegistry::new();
        assert!(registry.is_empty());

        registry.register(Arc::new(Serper::new(None)));
        registry.register(Arc::new(Serper::new(Some("k".to_string()))));

        assert_eq!(registry.len(), 1);
        assert!(registry.contains(ProviderKind::Serper));
        assert!(!registry.contains(ProviderKind::Brave));
    }
}

//! Result type definitions

use serde::{Deserialize, Serialize};
use url::Url;

/// Cap applied to both media result lists
pub const MAX_MEDIA_RESULTS: usize = 9;

/// A normalized web search hit, identical in shape for every provider
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchResult {
    pub title: String,
    pub link: String,
    /// Favicon or thumbnail URL, empty when the provider has none
    #[serde(default)]
    pub favicon: String,
}

impl SearchResult {
    pub fn new(
        title: impl Into<String>,
        link: impl Into<String>,
        favicon: impl Into<String>,
    ) -> Self {
        Self {
            title: title.into(),
            link: link.into(),
            favicon: favicon.into(),
        }
    }

    /// Get the hostname from the link
    pub fn hostname(&self) -> Option<String> {
        Url::parse(&self.link)
            .ok()
            .and_then(|u| u.host_str().map(str::to_string))
    }

    pub fn has_favicon(&self) -> bool {
        !self.favicon.is_empty()
    }
}

/// An image whose URL answered a HEAD probe with an `image/*` body
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImageResult {
    pub title: String,
    pub link: String,
}

/// A video whose thumbnail passed the same probe
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VideoResult {
    /// Thumbnail URL
    pub image_url: String,
    /// Video page URL
    pub link: String,
}

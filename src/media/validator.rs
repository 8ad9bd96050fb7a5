//! Live-image validation for media candidates

use crate::network::HttpClient;
use futures::future::join_all;
use std::time::Duration;
use tracing::debug;

/// Probes candidate links with HEAD requests
#[derive(Clone)]
pub struct LinkValidator {
    client: HttpClient,
    timeout: Duration,
}

impl LinkValidator {
    pub fn new(client: HttpClient, timeout: Duration) -> Self {
        Self { client, timeout }
    }

    /// Whether `url` answers HEAD with a 2xx and an `image/*` content type.
    ///
    /// Errors of any kind count as "not an image".
    pub async fn is_live_image(&self, url: &str) -> bool {
        match self.client.head(url, self.timeout).await {
            Ok(response) if !response.is_success() => {
                debug!("Dropping {}: status {}", url, response.status);
                false
            }
            Ok(response) => {
                let is_image = response
                    .content_type()
                    .map(|ct| ct.trim_start().to_ascii_lowercase().starts_with("image/"))
                    .unwrap_or(false);
                if !is_image {
                    debug!(
                        "Dropping {}: content-type {:?}",
                        url,
                        response.content_type()
                    );
                }
                is_image
            }
            Err(e) => {
                debug!("Error fetching image link {}: {}", url, e);
                false
            }
        }
    }

    /// Probe every `(url, item)` pair concurrently and keep the items whose
    /// URL is a live image, in input order, at most `limit` of them.
    pub async fn retain_live_images<T>(&self, candidates: Vec<(String, T)>, limit: usize) -> Vec<T> {
        let checks = join_all(
            candidates
                .iter()
                .map(|(url, _)| self.is_live_image(url)),
        )
        .await;

        candidates
            .into_iter()
            .zip(checks)
            .filter_map(|((_, item), live)| live.then_some(item))
            .take(limit)
            .collect()
    }
}

//! Image and video lookups through Serper

use super::validator::LinkValidator;
use crate::config::{Credentials, Settings};
use crate::error::Result;
use crate::network::{with_cancellation, HttpClient};
use crate::providers::{results_array, serper_post, str_at, SERPER_BASE_URL};
use crate::results::{ImageResult, VideoResult, MAX_MEDIA_RESULTS};
use serde_json::Value;
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use tracing::{error, info};

/// Fetches media for a query and keeps only links that serve images
pub struct MediaFetcher {
    client: HttpClient,
    validator: LinkValidator,
    api_key: Option<String>,
    base_url: String,
}

impl MediaFetcher {
    pub fn new(client: HttpClient, api_key: Option<String>, validation_timeout: Duration) -> Self {
        Self {
            validator: LinkValidator::new(client.clone(), validation_timeout),
            client,
            api_key,
            base_url: SERPER_BASE_URL.to_string(),
        }
    }

    /// Fetcher using the Serper key and the configured probe deadline
    pub fn from_settings(client: HttpClient, settings: &Settings, credentials: &Credentials) -> Self {
        Self::new(
            client,
            credentials.serper_api_key.clone(),
            settings.media.validation_timeout(),
        )
    }

    /// Point at another host; `/images` and `/videos` are appended
    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into();
        self
    }

    /// Images for `query` whose links are live `image/*` resources, at most 9
    pub async fn get_images(&self, query: &str) -> Result<Vec<ImageResult>> {
        self.images(query).await.map_err(|e| {
            error!("Error fetching images: {}", e);
            e
        })
    }

    pub async fn get_images_cancellable(
        &self,
        query: &str,
        cancel: &CancellationToken,
    ) -> Result<Vec<ImageResult>> {
        with_cancellation(cancel, self.get_images(query)).await
    }

    /// Videos whose thumbnails are live images, at most 9.
    ///
    /// `None` when the provider response carries no video list at all.
    pub async fn get_videos(&self, query: &str) -> Result<Option<Vec<VideoResult>>> {
        self.videos(query).await.map_err(|e| {
            error!("Error fetching videos: {}", e);
            e
        })
    }

    pub async fn get_videos_cancellable(
        &self,
        query: &str,
        cancel: &CancellationToken,
    ) -> Result<Option<Vec<VideoResult>>> {
        with_cancellation(cancel, self.get_videos(query)).await
    }

    async fn images(&self, query: &str) -> Result<Vec<ImageResult>> {
        let body = self.search_media("images", query).await?;
        let raw = results_array(&body, "/images")?;

        let candidates = raw
            .iter()
            .filter_map(|image| {
                let link = image.get("imageUrl")?.as_str()?.to_string();
                let item = ImageResult {
                    title: str_at(image, "/title"),
                    link: link.clone(),
                };
                Some((link, item))
            })
            .collect();

        let images = self
            .validator
            .retain_live_images(candidates, MAX_MEDIA_RESULTS)
            .await;
        info!("Kept {} of {} image candidates", images.len(), raw.len());
        Ok(images)
    }

    async fn videos(&self, query: &str) -> Result<Option<Vec<VideoResult>>> {
        let body = self.search_media("videos", query).await?;
        let Some(raw) = body.get("videos").and_then(Value::as_array) else {
            return Ok(None);
        };

        let candidates = raw
            .iter()
            .filter_map(|video| {
                let image_url = video.get("imageUrl")?.as_str()?.to_string();
                let item = VideoResult {
                    image_url: image_url.clone(),
                    link: str_at(video, "/link"),
                };
                Some((image_url, item))
            })
            .collect();

        let videos = self
            .validator
            .retain_live_images(candidates, MAX_MEDIA_RESULTS)
            .await;
        info!("Kept {} of {} video candidates", videos.len(), raw.len());
        Ok(Some(videos))
    }

    /// POST the query to a Serper media endpoint and parse the JSON body
    async fn search_media(&self, endpoint: &str, query: &str) -> Result<Value> {
        let url = format!("{}/{}", self.base_url.trim_end_matches('/'), endpoint);
        let request = serper_post(&url, self.api_key.as_deref(), query)?;
        let response = self.client.execute(request).await?.error_for_status()?;
        response.json_value()
    }
}

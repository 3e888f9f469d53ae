use async_trait::async_trait;
use immersion_models::VideoMetadata;
use reqwest::Client;
use std::sync::Arc;
use tracing::info;
use crate::error::SourceError;
use crate::traits::MetadataProvider;
use crate::youtube::api;

#[derive(Clone)]
pub struct YoutubeClient {
    client: Arc<Client>,
    api_key: String,
}

impl YoutubeClient {
    pub fn new(api_key: String) -> Self {
        Self {
            client: Arc::new(Client::new()),
            api_key,
        }
    }
}

#[async_trait]
impl MetadataProvider for YoutubeClient {
    fn provider_name(&self) -> &str {
        "youtube"
    }

    async fn fetch(&self, video_id: &str) -> Result<VideoMetadata, SourceError> {
        let metadata = api::get_video(&self.client, &self.api_key, video_id).await?;
        info!(
            video_id = %video_id,
            duration_seconds = metadata.duration_seconds,
            "Fetched video metadata"
        );
        Ok(metadata)
    }
}

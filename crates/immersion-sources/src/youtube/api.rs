use immersion_models::VideoMetadata;
use reqwest::Client;
use serde::Deserialize;
use tracing::debug;
use crate::error::SourceError;
use crate::youtube::parse::parse_iso8601_duration;

pub const VIDEOS_ENDPOINT: &str = "https://www.googleapis.com/youtube/v3/videos";

#[derive(Debug, Deserialize)]
pub(crate) struct VideoListResponse {
    #[serde(default)]
    pub items: Vec<VideoItem>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct VideoItem {
    pub id: String,
    pub snippet: Snippet,
    #[serde(rename = "contentDetails")]
    pub content_details: ContentDetails,
}

#[derive(Debug, Deserialize)]
pub(crate) struct Snippet {
    pub title: String,
    #[serde(default)]
    pub thumbnails: Thumbnails,
}

#[derive(Debug, Default, Deserialize)]
pub(crate) struct Thumbnails {
    pub maxres: Option<Thumbnail>,
    pub high: Option<Thumbnail>,
    pub standard: Option<Thumbnail>,
    pub medium: Option<Thumbnail>,
    #[serde(rename = "default")]
    pub fallback: Option<Thumbnail>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct Thumbnail {
    pub url: String,
}

#[derive(Debug, Deserialize)]
pub(crate) struct ContentDetails {
    pub duration: String,
}

#[derive(Debug, Deserialize)]
struct ApiErrorResponse {
    error: ApiErrorBody,
}

#[derive(Debug, Deserialize)]
struct ApiErrorBody {
    message: String,
}

impl Thumbnails {
    /// Highest available resolution: maxres, high, standard, medium, then default
    pub fn best_url(&self) -> Option<&str> {
        [&self.maxres, &self.high, &self.standard, &self.medium, &self.fallback]
            .into_iter()
            .flatten()
            .map(|thumb| thumb.url.as_str())
            .next()
    }
}

impl VideoItem {
    pub fn into_metadata(self) -> Result<VideoMetadata, SourceError> {
        let duration_seconds = parse_iso8601_duration(&self.content_details.duration)?;
        let thumbnail_url = self.snippet.thumbnails.best_url().unwrap_or_default().to_string();
        Ok(VideoMetadata {
            external_id: self.id,
            title: self.snippet.title,
            thumbnail_url,
            duration_seconds,
        })
    }
}

pub async fn get_video(client: &Client, api_key: &str, video_id: &str) -> Result<VideoMetadata, SourceError> {
    debug!(video_id = %video_id, "Fetching video metadata");

    let response = client
        .get(VIDEOS_ENDPOINT)
        .query(&[("part", "snippet,contentDetails"), ("id", video_id), ("key", api_key)])
        .send()
        .await?;

    let status = response.status();
    if !status.is_success() {
        let body = response.text().await.unwrap_or_default();
        let message = serde_json::from_str::<ApiErrorResponse>(&body)
            .map(|e| e.error.message)
            .unwrap_or(body);
        return Err(SourceError::Api {
            service: "youtube",
            status: status.as_u16(),
            message,
        });
    }

    let list: VideoListResponse = response.json().await?;
    parse_video_list(list, video_id)
}

pub(crate) fn parse_video_list(list: VideoListResponse, video_id: &str) -> Result<VideoMetadata, SourceError> {
    list.items
        .into_iter()
        .next()
        .ok_or_else(|| SourceError::VideoNotFound(video_id.to_string()))?
        .into_metadata()
}

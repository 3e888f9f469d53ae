use async_trait::async_trait;
use immersion_models::{Identity, RemoteCollection, VideoMetadata, VideoRecord};
use crate::error::SourceError;

/// Per-user keyed collection in a cloud document store
///
/// Writes touch only the collection field of the user's document; any other
/// top-level fields on the same document are left alone.
#[async_trait]
pub trait RemoteStore: Send + Sync {
    fn store_name(&self) -> &str;

    /// Missing documents read as an empty collection
    async fn fetch_collection(&self, user: &Identity) -> Result<RemoteCollection, SourceError>;

    /// Full replace of the collection field
    async fn overwrite_collection(&self, user: &Identity, videos: &RemoteCollection) -> Result<(), SourceError>;

    async fn upsert_field(&self, user: &Identity, key: &str, record: &VideoRecord) -> Result<(), SourceError>;

    async fn delete_field(&self, user: &Identity, key: &str) -> Result<(), SourceError>;
}

/// Looks up display metadata and duration for a platform video id
#[async_trait]
pub trait MetadataProvider: Send + Sync {
    fn provider_name(&self) -> &str;

    async fn fetch(&self, video_id: &str) -> Result<VideoMetadata, SourceError>;
}

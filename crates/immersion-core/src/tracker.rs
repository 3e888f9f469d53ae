use chrono::{SecondsFormat, Utc};
use immersion_models::{Identity, SyncStatus, VideoRecord};
use immersion_sources::{extract_video_id, MetadataProvider, RemoteStore};
use serde::Serialize;
use std::sync::Arc;
use tracing::{error, info, warn};
use crate::error::TrackerError;
use crate::level::LevelProgress;
use crate::reconcile::{self, ReconcileOutcome};
use crate::session::Session;
use crate::store::{CollectionStore, LocalMirror};

#[derive(Debug, Clone, Serialize)]
pub struct AddOutcome {
    pub record: VideoRecord,
    /// Set when the local add succeeded but the cloud write did not
    #[serde(skip_serializing_if = "Option::is_none")]
    pub remote_error: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct DeleteOutcome {
    pub removed: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub remote_error: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct Dashboard {
    pub total_seconds: u64,
    pub video_count: usize,
    pub progress: LevelProgress,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sync_status: Option<SyncStatus>,
}

/// Collection, session and collaborators behind every user action
pub struct Tracker<M: LocalMirror> {
    store: CollectionStore<M>,
    session: Session,
    remote: Option<Arc<dyn RemoteStore>>,
    metadata: Option<Arc<dyn MetadataProvider>>,
}

impl<M: LocalMirror> Tracker<M> {
    pub fn new(store: CollectionStore<M>, session: Session) -> Self {
        Self {
            store,
            session,
            remote: None,
            metadata: None,
        }
    }

    pub fn with_remote(mut self, remote: Arc<dyn RemoteStore>) -> Self {
        self.remote = Some(remote);
        self
    }

    pub fn with_metadata(mut self, metadata: Arc<dyn MetadataProvider>) -> Self {
        self.metadata = Some(metadata);
        self
    }

    pub fn store(&self) -> &CollectionStore<M> {
        &self.store
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    pub fn session_mut(&mut self) -> &mut Session {
        &mut self.session
    }

    pub fn has_remote(&self) -> bool {
        self.remote.is_some()
    }

    /// Remote store and user, when signed in with cloud sync available
    fn cloud(&self) -> Option<(Arc<dyn RemoteStore>, Identity)> {
        let remote = self.remote.clone()?;
        let user = self.session.identity()?.clone();
        Some((remote, user))
    }

    /// Validate the link, look up the video, record it locally, then mirror it to the cloud
    pub async fn add_video(&mut self, url: &str) -> Result<AddOutcome, TrackerError> {
        let video_id =
            extract_video_id(url).ok_or_else(|| TrackerError::InvalidVideoReference(url.to_string()))?;
        let metadata = self
            .metadata
            .clone()
            .ok_or(TrackerError::NotConfigured("video metadata provider"))?;
        let details = metadata.fetch(&video_id).await?;

        let now = Utc::now();
        let record = VideoRecord {
            external_id: details.external_id,
            unique_id: self.store.next_unique_id(now.timestamp_millis()),
            title: details.title,
            thumbnail_url: details.thumbnail_url,
            duration_seconds: details.duration_seconds,
            source_url: Some(url.to_string()),
            created_at_iso: Some(now.to_rfc3339_opts(SecondsFormat::Millis, true)),
            sort_timestamp: Some(now.timestamp_millis()),
        };
        self.store.add(record.clone())?;
        info!(unique_id = %record.unique_id, video_id = %record.external_id, "Added video");

        let mut remote_error = None;
        if let Some((remote, user)) = self.cloud() {
            if let Err(e) = remote.upsert_field(&user, &record.unique_id, &record).await {
                warn!(unique_id = %record.unique_id, "Saved locally but cloud write failed: {}", e);
                remote_error = Some(e.to_string());
            }
        }
        Ok(AddOutcome { record, remote_error })
    }

    pub async fn delete_video(&mut self, unique_id: &str) -> Result<DeleteOutcome, TrackerError> {
        let removed = self.store.remove(unique_id)?;

        let mut remote_error = None;
        if let Some((remote, user)) = self.cloud() {
            if let Err(e) = remote.delete_field(&user, unique_id).await {
                warn!(unique_id = %unique_id, "Removed locally but cloud delete failed: {}", e);
                remote_error = Some(e.to_string());
            }
        }
        Ok(DeleteOutcome { removed, remote_error })
    }

    /// Sign in and, on a real transition with cloud sync available, reconcile once
    pub async fn sign_in(&mut self, identity: Identity) -> Option<Result<ReconcileOutcome, TrackerError>> {
        let transition = self.session.sign_in(identity);
        if !transition || self.remote.is_none() {
            return None;
        }
        Some(self.reconcile_on_sign_in().await)
    }

    pub fn sign_out(&mut self) {
        self.session.sign_out();
    }

    pub async fn reconcile_on_sign_in(&mut self) -> Result<ReconcileOutcome, TrackerError> {
        let (remote, user) = self.cloud().ok_or(TrackerError::NotSignedIn)?;
        self.session.set_status(SyncStatus::InProgress);
        let result = reconcile::reconcile(&mut self.store, &*remote, &user, Utc::now().timestamp_millis()).await;
        self.finish_sync("reconcile", result)
    }

    /// Merge with the cloud copy and push the result back
    pub async fn sync_to_cloud(&mut self) -> Result<ReconcileOutcome, TrackerError> {
        let (remote, user) = self.cloud().ok_or(TrackerError::NotSignedIn)?;
        self.session.set_status(SyncStatus::InProgress);
        let result = reconcile::sync_to_cloud(&mut self.store, &*remote, &user, Utc::now().timestamp_millis()).await;
        self.finish_sync("sync to cloud", result)
    }

    fn finish_sync(
        &mut self,
        operation: &str,
        result: Result<ReconcileOutcome, TrackerError>,
    ) -> Result<ReconcileOutcome, TrackerError> {
        match &result {
            Ok(_) => self.session.set_status(SyncStatus::Succeeded),
            Err(e) => {
                error!("{} failed: {}", operation, e);
                self.session.set_status(SyncStatus::Failed);
            }
        }
        result
    }

    pub fn dashboard(&self) -> Dashboard {
        let total_seconds = self.store.total();
        Dashboard {
            total_seconds,
            video_count: self.store.len(),
            progress: LevelProgress::from_seconds(total_seconds),
            sync_status: self.session.indicator().status(),
        }
    }
}

//! Merging the local collection with the signed-in user's cloud copy.
//!
//! Remote content wins for ids present on both sides. Records that only exist
//! locally survive the merge and are pushed back up. There is no locking: two
//! overlapping reconciliations for one account race and the last overwrite wins.

use immersion_models::{Identity, RemoteCollection, VideoRecord};
use immersion_sources::RemoteStore;
use serde::Serialize;
use std::collections::HashSet;
use tracing::{debug, info, instrument};
use crate::backfill::{backfill_by_position, backfill_from_unique_ids, stamp_for_upload};
use crate::error::TrackerError;
use crate::ordering::sort_by_recency;
use crate::store::{CollectionStore, LocalMirror};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SyncPath {
    /// Remote had data; it was merged with local-only records
    RemoteWins,
    /// Remote was empty; the local collection was uploaded
    UploadedLocal,
    /// Manual push of the local collection
    PushedLocal,
    /// Nothing on either side
    Noop,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReconcileOutcome {
    pub path: SyncPath,
    pub remote_count: usize,
    pub local_only: usize,
    pub pushed: bool,
    pub total: usize,
}

impl ReconcileOutcome {
    fn noop() -> Self {
        Self {
            path: SyncPath::Noop,
            remote_count: 0,
            local_only: 0,
            pushed: false,
            total: 0,
        }
    }
}

/// Keyed form of an ordered collection, as stored remotely
pub fn to_keyed(videos: &[VideoRecord]) -> RemoteCollection {
    videos
        .iter()
        .map(|v| (v.unique_id.clone(), v.clone()))
        .collect()
}

/// Remote records plus local-only records, newest first.
///
/// Returns the merged list and how many local-only records it contains.
pub fn merge_collections(remote: &RemoteCollection, local: &[VideoRecord]) -> (Vec<VideoRecord>, usize) {
    let mut seen: HashSet<&str> = remote.keys().map(String::as_str).collect();
    let local_only: Vec<VideoRecord> = local
        .iter()
        .filter(|v| seen.insert(v.unique_id.as_str()))
        .cloned()
        .collect();
    let local_only_count = local_only.len();

    let mut merged: Vec<VideoRecord> = remote.values().cloned().collect();
    merged.extend(local_only);
    sort_by_recency(&mut merged);
    (merged, local_only_count)
}

/// One-time merge run when a user signs in.
///
/// On success the local and remote id sets are equal. A failed push after the
/// local adoption leaves the sides diverged until the next run.
#[instrument(skip_all, fields(user_id = %user.user_id, store = remote.store_name()))]
pub async fn reconcile<M: LocalMirror>(
    store: &mut CollectionStore<M>,
    remote: &dyn RemoteStore,
    user: &Identity,
    now_millis: i64,
) -> Result<ReconcileOutcome, TrackerError> {
    let remote_videos = remote.fetch_collection(user).await?;
    let remote_count = remote_videos.len();

    if !remote_videos.is_empty() {
        let (mut merged, local_only) = merge_collections(&remote_videos, store.videos());
        let pushed = local_only > 0;

        if pushed {
            let stamped = stamp_for_upload(&mut merged, now_millis);
            if stamped > 0 {
                debug!(stamped, "Stamped untimestamped records before upload");
            }
        }
        if merged.as_slice() != store.videos() {
            store.replace_all(merged.clone())?;
        }
        if pushed {
            remote.overwrite_collection(user, &to_keyed(&merged)).await?;
        }

        info!(remote_count, local_only, pushed, total = merged.len(), "Merged with remote collection");
        return Ok(ReconcileOutcome {
            path: SyncPath::RemoteWins,
            remote_count,
            local_only,
            pushed,
            total: merged.len(),
        });
    }

    if store.is_empty() {
        debug!("Local and remote collections are both empty");
        return Ok(ReconcileOutcome::noop());
    }

    let mut videos = store.videos().to_vec();
    let backfilled = backfill_from_unique_ids(&mut videos, now_millis);
    sort_by_recency(&mut videos);
    remote.overwrite_collection(user, &to_keyed(&videos)).await?;
    let total = videos.len();
    store.replace_all(videos)?;

    info!(total, backfilled, "Uploaded local collection to empty remote");
    Ok(ReconcileOutcome {
        path: SyncPath::UploadedLocal,
        remote_count: 0,
        local_only: total,
        pushed: true,
        total,
    })
}

/// Pull in anything only the cloud has, then push the whole collection back
///
/// The fetch comes first so a push never drops records added on another device
/// or left behind by a failed sign-in merge.
#[instrument(skip_all, fields(user_id = %user.user_id, store = remote.store_name()))]
pub async fn sync_to_cloud<M: LocalMirror>(
    store: &mut CollectionStore<M>,
    remote: &dyn RemoteStore,
    user: &Identity,
    now_millis: i64,
) -> Result<ReconcileOutcome, TrackerError> {
    let remote_videos = remote.fetch_collection(user).await?;
    let remote_count = remote_videos.len();
    let (mut videos, local_only) = merge_collections(&remote_videos, store.videos());

    if videos.is_empty() {
        debug!("Nothing to push");
        return Ok(ReconcileOutcome::noop());
    }

    let backfilled = backfill_by_position(&mut videos, now_millis);
    sort_by_recency(&mut videos);
    if videos.as_slice() != store.videos() {
        store.replace_all(videos.clone())?;
    }
    remote.overwrite_collection(user, &to_keyed(&videos)).await?;

    info!(remote_count, local_only, backfilled, total = videos.len(), "Pushed merged collection");
    Ok(ReconcileOutcome {
        path: SyncPath::PushedLocal,
        remote_count,
        local_only,
        pushed: true,
        total: videos.len(),
    })
}

#[cfg(test)]
mod tests;

use super::*;
use crate::store::MemoryMirror;
use async_trait::async_trait;
use chrono::{Duration, Utc};
use immersion_sources::SourceError;
use std::sync::Mutex;

const NOW: i64 = 1_720_000_000_000;

#[derive(Default)]
struct FakeRemote {
    videos: Mutex<RemoteCollection>,
    overwrites: Mutex<usize>,
    fail_fetch: bool,
    fail_overwrite: bool,
}

impl FakeRemote {
    fn with(videos: Vec<VideoRecord>) -> Self {
        Self {
            videos: Mutex::new(to_keyed(&videos)),
            ..Default::default()
        }
    }

    fn overwrites(&self) -> usize {
        *self.overwrites.lock().unwrap()
    }

    fn snapshot(&self) -> RemoteCollection {
        self.videos.lock().unwrap().clone()
    }
}

#[async_trait]
impl RemoteStore for FakeRemote {
    fn store_name(&self) -> &str {
        "fake"
    }

    async fn fetch_collection(&self, _user: &Identity) -> Result<RemoteCollection, SourceError> {
        if self.fail_fetch {
            return Err(SourceError::Api {
                service: "fake",
                status: 503,
                message: "unavailable".to_string(),
            });
        }
        Ok(self.snapshot())
    }

    async fn overwrite_collection(&self, _user: &Identity, videos: &RemoteCollection) -> Result<(), SourceError> {
        if self.fail_overwrite {
            return Err(SourceError::Api {
                service: "fake",
                status: 500,
                message: "write failed".to_string(),
            });
        }
        *self.videos.lock().unwrap() = videos.clone();
        *self.overwrites.lock().unwrap() += 1;
        Ok(())
    }

    async fn upsert_field(&self, _user: &Identity, key: &str, record: &VideoRecord) -> Result<(), SourceError> {
        self.videos.lock().unwrap().insert(key.to_string(), record.clone());
        Ok(())
    }

    async fn delete_field(&self, _user: &Identity, key: &str) -> Result<(), SourceError> {
        self.videos.lock().unwrap().remove(key);
        Ok(())
    }
}

fn user() -> Identity {
    Identity {
        user_id: "uid-1".to_string(),
        email: "learner@example.com".to_string(),
        display_name: None,
        id_token: "token".to_string(),
        refresh_token: "refresh".to_string(),
        expires_at: Utc::now() + Duration::hours(1),
    }
}

fn record(unique_id: &str, title: &str, timestamp: Option<i64>) -> VideoRecord {
    VideoRecord {
        external_id: "dQw4w9WgXcQ".to_string(),
        unique_id: unique_id.to_string(),
        title: title.to_string(),
        thumbnail_url: String::new(),
        duration_seconds: 600,
        source_url: None,
        created_at_iso: None,
        sort_timestamp: timestamp,
    }
}

fn store_with(videos: Vec<VideoRecord>) -> CollectionStore<MemoryMirror> {
    CollectionStore::load(MemoryMirror::with_videos(videos)).unwrap()
}

fn ids(videos: &[VideoRecord]) -> Vec<&str> {
    videos.iter().map(|v| v.unique_id.as_str()).collect()
}

#[test]
fn test_merge_orders_newest_first_with_untimestamped_last() {
    let remote = to_keyed(&[record("A", "a", Some(100)), record("B", "b", None)]);
    let local = vec![record("C", "c", Some(200))];

    let (merged, local_only) = merge_collections(&remote, &local);
    assert_eq!(ids(&merged), vec!["C", "A", "B"]);
    assert_eq!(local_only, 1);
}

#[test]
fn test_merge_prefers_remote_content_and_skips_duplicates() {
    let remote = to_keyed(&[record("A", "remote title", Some(100))]);
    let local = vec![
        record("A", "local title", Some(100)),
        record("L", "local", Some(50)),
        record("L", "local again", Some(50)),
    ];

    let (merged, local_only) = merge_collections(&remote, &local);
    assert_eq!(ids(&merged), vec!["A", "L"]);
    assert_eq!(merged[0].title, "remote title");
    assert_eq!(local_only, 1);
}

#[tokio::test]
async fn test_remote_wins_and_pushes_back_local_only_records() {
    let remote = FakeRemote::with(vec![record("R1", "r1", Some(300)), record("R2", "r2", Some(100))]);
    let mut store = store_with(vec![record("L1", "l1", Some(200))]);

    let outcome = reconcile(&mut store, &remote, &user(), NOW).await.unwrap();

    assert_eq!(outcome.path, SyncPath::RemoteWins);
    assert_eq!(outcome.local_only, 1);
    assert!(outcome.pushed);
    assert_eq!(ids(store.videos()), vec!["R1", "L1", "R2"]);
    assert_eq!(remote.overwrites(), 1);

    let remote_ids: Vec<String> = remote.snapshot().into_keys().collect();
    assert_eq!(remote_ids, vec!["L1", "R1", "R2"]);
}

#[tokio::test]
async fn test_remote_superset_adopts_without_push() {
    let remote = FakeRemote::with(vec![record("A", "edited remotely", Some(2)), record("B", "b", Some(1))]);
    let mut store = store_with(vec![record("A", "a", Some(2))]);

    let outcome = reconcile(&mut store, &remote, &user(), NOW).await.unwrap();

    assert!(!outcome.pushed);
    assert_eq!(remote.overwrites(), 0);
    assert_eq!(ids(store.videos()), vec!["A", "B"]);
    assert_eq!(store.videos()[0].title, "edited remotely");
}

#[tokio::test]
async fn test_reconcile_is_idempotent() {
    let remote = FakeRemote::with(vec![record("R", "r", Some(10))]);
    let mut store = store_with(vec![record("L", "l", Some(20))]);

    reconcile(&mut store, &remote, &user(), NOW).await.unwrap();
    let after_first = store.videos().to_vec();

    let second = reconcile(&mut store, &remote, &user(), NOW).await.unwrap();
    assert!(!second.pushed);
    assert_eq!(second.local_only, 0);
    assert_eq!(remote.overwrites(), 1);
    assert_eq!(store.videos(), after_first.as_slice());
}

#[tokio::test]
async fn test_pushed_untimestamped_records_are_stamped_on_both_sides() {
    let remote = FakeRemote::with(vec![record("R", "r", Some(NOW - 5))]);
    let mut store = store_with(vec![record("L", "l", None)]);

    reconcile(&mut store, &remote, &user(), NOW).await.unwrap();

    let local_stamp = store.videos().iter().find(|v| v.unique_id == "L").unwrap().sort_timestamp;
    assert!(local_stamp.is_some());
    assert_eq!(remote.snapshot()["L"].sort_timestamp, local_stamp);
    // Order is not recomputed after stamping
    assert_eq!(ids(store.videos()), vec!["R", "L"]);
}

#[tokio::test]
async fn test_empty_remote_receives_backfilled_local_collection() {
    let created = 1_700_000_000_000;
    let generated = crate::ids::generate_unique_id(created);
    let remote = FakeRemote::default();
    let mut store = store_with(vec![record("old", "old", Some(1)), record(&generated, "g", None)]);

    let outcome = reconcile(&mut store, &remote, &user(), NOW).await.unwrap();

    assert_eq!(outcome.path, SyncPath::UploadedLocal);
    assert_eq!(outcome.total, 2);
    assert_eq!(ids(store.videos()), vec![generated.as_str(), "old"]);
    assert_eq!(store.videos()[0].sort_timestamp, Some(created));
    assert_eq!(remote.snapshot().len(), 2);
    assert_eq!(remote.snapshot()[&generated].sort_timestamp, Some(created));
}

#[tokio::test]
async fn test_both_empty_is_noop() {
    let remote = FakeRemote::default();
    let mirror = MemoryMirror::new();
    let mut store = CollectionStore::load(mirror.clone()).unwrap();

    let outcome = reconcile(&mut store, &remote, &user(), NOW).await.unwrap();

    assert_eq!(outcome.path, SyncPath::Noop);
    assert_eq!(remote.overwrites(), 0);
    assert_eq!(mirror.write_count(), 0);
}

#[tokio::test]
async fn test_fetch_failure_leaves_local_untouched() {
    let remote = FakeRemote {
        fail_fetch: true,
        ..Default::default()
    };
    let mut store = store_with(vec![record("L", "l", Some(1))]);

    let result = reconcile(&mut store, &remote, &user(), NOW).await;

    assert!(matches!(result, Err(TrackerError::Source(SourceError::Api { status: 503, .. }))));
    assert_eq!(ids(store.videos()), vec!["L"]);
}

#[tokio::test]
async fn test_push_failure_after_adoption_diverges() {
    let remote = FakeRemote {
        videos: Mutex::new(to_keyed(&[record("R", "r", Some(5))])),
        fail_overwrite: true,
        ..Default::default()
    };
    let mut store = store_with(vec![record("L", "l", Some(9))]);

    assert!(reconcile(&mut store, &remote, &user(), NOW).await.is_err());
    assert_eq!(ids(store.videos()), vec!["L", "R"]);
    assert_eq!(remote.snapshot().len(), 1);
}

#[tokio::test]
async fn test_sync_to_cloud_backfills_by_position() {
    let remote = FakeRemote::with(vec![record("stale", "s", Some(1))]);
    let mut store = store_with(vec![
        record("a", "a", None),
        record("b", "b", Some(NOW + 10)),
        record("c", "c", None),
    ]);

    let outcome = sync_to_cloud(&mut store, &remote, &user(), NOW).await.unwrap();

    assert_eq!(outcome.path, SyncPath::PushedLocal);
    assert_eq!(outcome.remote_count, 1);
    assert_eq!(outcome.local_only, 3);
    assert_eq!(ids(store.videos()), vec!["b", "a", "c", "stale"]);
    assert_eq!(store.videos()[1].sort_timestamp, Some(NOW - 2000));
    assert_eq!(store.videos()[2].sort_timestamp, Some(NOW - 3000));

    let remote_ids: Vec<String> = remote.snapshot().into_keys().collect();
    assert_eq!(remote_ids, vec!["a", "b", "c", "stale"]);
}

#[tokio::test]
async fn test_sync_to_cloud_keeps_cloud_only_records() {
    let remote = FakeRemote::with(vec![record("R", "from another device", Some(NOW - 50))]);
    let mut store = store_with(vec![record("L", "local", Some(NOW))]);

    let outcome = sync_to_cloud(&mut store, &remote, &user(), NOW).await.unwrap();

    assert_eq!(outcome.total, 2);
    assert_eq!(ids(store.videos()), vec!["L", "R"]);
    let remote_ids: Vec<String> = remote.snapshot().into_keys().collect();
    assert_eq!(remote_ids, vec!["L", "R"]);
}

#[tokio::test]
async fn test_sync_to_cloud_with_empty_local_adopts_remote() {
    let remote = FakeRemote::with(vec![record("R", "r", Some(1))]);
    let mut store = store_with(Vec::new());

    let outcome = sync_to_cloud(&mut store, &remote, &user(), NOW).await.unwrap();

    assert_eq!(outcome.local_only, 0);
    assert_eq!(ids(store.videos()), vec!["R"]);
    assert_eq!(remote.snapshot().len(), 1);
}

#[tokio::test]
async fn test_sync_to_cloud_with_both_sides_empty_does_nothing() {
    let remote = FakeRemote::default();
    let mut store = store_with(Vec::new());

    let outcome = sync_to_cloud(&mut store, &remote, &user(), NOW).await.unwrap();

    assert_eq!(outcome.path, SyncPath::Noop);
    assert_eq!(remote.overwrites(), 0);
}

#[tokio::test]
async fn test_sync_to_cloud_does_not_push_when_fetch_fails() {
    let remote = FakeRemote {
        fail_fetch: true,
        ..FakeRemote::with(vec![record("R", "r", Some(1))])
    };
    let mut store = store_with(vec![record("L", "l", Some(NOW))]);

    let result = sync_to_cloud(&mut store, &remote, &user(), NOW).await;

    assert!(result.is_err());
    assert_eq!(remote.overwrites(), 0);
    assert_eq!(remote.snapshot().len(), 1);
    assert_eq!(ids(store.videos()), vec!["L"]);
}

use anyhow::{anyhow, Context, Result};
use chrono::Utc;
use immersion_config::PathManager;
use immersion_models::VideoRecord;
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use tracing::{debug, info, warn};
use crate::ids::generate_unique_id_avoiding;

/// Durable local copy of the collection, always replaced as a whole
pub trait LocalMirror {
    fn read_all(&self) -> Result<Vec<VideoRecord>>;
    fn write_all(&self, videos: &[VideoRecord]) -> Result<()>;
}

/// Pretty JSON array on disk (`data/videos.json`)
#[derive(Clone)]
pub struct JsonFileMirror {
    path: PathBuf,
}

impl JsonFileMirror {
    pub fn new(path_manager: &PathManager) -> Result<Self> {
        std::fs::create_dir_all(path_manager.data_dir())?;
        Ok(Self::at(path_manager.videos_file()))
    }

    pub fn at(path: PathBuf) -> Self {
        Self { path }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn backup_path(&self) -> PathBuf {
        let mut name = self.path.file_name().unwrap_or_default().to_os_string();
        name.push(".bak");
        self.path.with_file_name(name)
    }
}

impl LocalMirror for JsonFileMirror {
    fn read_all(&self) -> Result<Vec<VideoRecord>> {
        if !self.path.exists() {
            debug!("No local mirror at {}", self.path.display());
            return Ok(Vec::new());
        }

        let content = std::fs::read_to_string(&self.path)
            .with_context(|| format!("Failed to read {}", self.path.display()))?;
        match serde_json::from_str::<Vec<VideoRecord>>(&content) {
            Ok(videos) => {
                debug!("Loaded {} videos from {}", videos.len(), self.path.display());
                Ok(videos)
            }
            Err(e) => {
                let backup = self.backup_path();
                warn!(
                    "Local mirror {} is corrupt: {}. Moving it to {} and starting empty.",
                    self.path.display(),
                    e,
                    backup.display()
                );
                if let Err(mv_err) = std::fs::rename(&self.path, &backup) {
                    warn!("Failed to back up corrupt mirror: {}", mv_err);
                }
                Ok(Vec::new())
            }
        }
    }

    fn write_all(&self, videos: &[VideoRecord]) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let json = serde_json::to_string_pretty(videos)
            .map_err(|e| anyhow!("Failed to serialize videos: {}", e))?;

        // Write beside the target and rename so a crash never leaves half a file
        let tmp = self.path.with_extension("json.tmp");
        std::fs::write(&tmp, json).with_context(|| format!("Failed to write {}", tmp.display()))?;
        std::fs::rename(&tmp, &self.path)
            .with_context(|| format!("Failed to replace {}", self.path.display()))?;
        debug!("Saved {} videos to {}", videos.len(), self.path.display());
        Ok(())
    }
}

/// In-memory mirror; clones share the same contents
#[derive(Clone, Default)]
pub struct MemoryMirror {
    videos: Arc<Mutex<Vec<VideoRecord>>>,
    writes: Arc<Mutex<usize>>,
}

impl MemoryMirror {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_videos(videos: Vec<VideoRecord>) -> Self {
        Self {
            videos: Arc::new(Mutex::new(videos)),
            writes: Arc::default(),
        }
    }

    /// Number of `write_all` calls so far
    pub fn write_count(&self) -> usize {
        self.writes.lock().map(|count| *count).unwrap_or_default()
    }
}

impl LocalMirror for MemoryMirror {
    fn read_all(&self) -> Result<Vec<VideoRecord>> {
        let videos = self.videos.lock().map_err(|_| anyhow!("memory mirror lock poisoned"))?;
        Ok(videos.clone())
    }

    fn write_all(&self, videos: &[VideoRecord]) -> Result<()> {
        let mut stored = self.videos.lock().map_err(|_| anyhow!("memory mirror lock poisoned"))?;
        *stored = videos.to_vec();
        let mut writes = self.writes.lock().map_err(|_| anyhow!("memory mirror lock poisoned"))?;
        *writes += 1;
        Ok(())
    }
}

/// The authoritative ordered collection, mirrored after every mutation
pub struct CollectionStore<M: LocalMirror> {
    mirror: M,
    videos: Vec<VideoRecord>,
}

impl<M: LocalMirror> CollectionStore<M> {
    /// Read the mirror, giving any record without a `unique_id` a fresh one
    pub fn load(mirror: M) -> Result<Self> {
        let mut videos = mirror.read_all()?;
        let now = Utc::now().timestamp_millis();

        let mut seen: HashSet<String> = videos
            .iter()
            .filter(|v| !v.unique_id.is_empty())
            .map(|v| v.unique_id.clone())
            .collect();
        let mut repaired = 0;
        for video in videos.iter_mut().filter(|v| v.unique_id.is_empty()) {
            let id = {
                let existing: HashSet<&str> = seen.iter().map(String::as_str).collect();
                generate_unique_id_avoiding(now, &existing)
            };
            seen.insert(id.clone());
            video.unique_id = id;
            repaired += 1;
        }

        let store = Self { mirror, videos };
        if repaired > 0 {
            info!("Assigned ids to {} legacy videos", repaired);
            store.persist()?;
        }
        Ok(store)
    }

    fn persist(&self) -> Result<()> {
        self.mirror.write_all(&self.videos)
    }

    pub fn videos(&self) -> &[VideoRecord] {
        &self.videos
    }

    pub fn len(&self) -> usize {
        self.videos.len()
    }

    pub fn is_empty(&self) -> bool {
        self.videos.is_empty()
    }

    pub fn mirror(&self) -> &M {
        &self.mirror
    }

    pub fn contains(&self, unique_id: &str) -> bool {
        self.videos.iter().any(|v| v.unique_id == unique_id)
    }

    /// Fresh id that no record in the collection uses
    pub fn next_unique_id(&self, now_millis: i64) -> String {
        let existing: HashSet<&str> = self.videos.iter().map(|v| v.unique_id.as_str()).collect();
        generate_unique_id_avoiding(now_millis, &existing)
    }

    /// Total watch time in seconds
    pub fn total(&self) -> u64 {
        self.videos.iter().map(|v| v.duration_seconds).sum()
    }

    /// Newest records go first
    pub fn add(&mut self, record: VideoRecord) -> Result<()> {
        self.videos.insert(0, record);
        self.persist()
    }

    /// Returns false when no record has this id
    pub fn remove(&mut self, unique_id: &str) -> Result<bool> {
        let before = self.videos.len();
        self.videos.retain(|v| v.unique_id != unique_id);
        let removed = self.videos.len() != before;
        if !removed {
            debug!(unique_id = %unique_id, "Nothing to remove");
        }
        self.persist()?;
        Ok(removed)
    }

    pub fn replace_all(&mut self, videos: Vec<VideoRecord>) -> Result<()> {
        self.videos = videos;
        self.persist()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn record(unique_id: &str, duration: u64) -> VideoRecord {
        VideoRecord {
            external_id: "dQw4w9WgXcQ".to_string(),
            unique_id: unique_id.to_string(),
            title: format!("Video {}", unique_id),
            thumbnail_url: "https://i.ytimg.com/vi/dQw4w9WgXcQ/hqdefault.jpg".to_string(),
            duration_seconds: duration,
            source_url: None,
            created_at_iso: None,
            sort_timestamp: Some(1_700_000_000_000),
        }
    }

    #[test]
    fn test_total_tracks_adds_and_removes() {
        let mut store = CollectionStore::load(MemoryMirror::new()).unwrap();
        assert_eq!(store.total(), 0);

        store.add(record("a", 100)).unwrap();
        store.add(record("b", 250)).unwrap();
        assert_eq!(store.total(), 350);
        assert_eq!(store.videos()[0].unique_id, "b");

        assert!(store.remove("a").unwrap());
        assert_eq!(store.total(), 250);
    }

    #[test]
    fn test_remove_absent_id_is_noop() {
        let mirror = MemoryMirror::with_videos(vec![record("a", 10)]);
        let mut store = CollectionStore::load(mirror.clone()).unwrap();

        assert!(!store.remove("missing").unwrap());
        assert_eq!(store.len(), 1);
        assert_eq!(mirror.read_all().unwrap().len(), 1);
    }

    #[test]
    fn test_every_mutation_rewrites_mirror() {
        let mirror = MemoryMirror::new();
        let mut store = CollectionStore::load(mirror.clone()).unwrap();
        assert_eq!(mirror.write_count(), 0);

        store.add(record("a", 1)).unwrap();
        store.replace_all(vec![record("b", 2), record("c", 3)]).unwrap();
        assert_eq!(mirror.write_count(), 2);

        let ids: Vec<String> = mirror.read_all().unwrap().into_iter().map(|v| v.unique_id).collect();
        assert_eq!(ids, vec!["b", "c"]);
    }

    #[test]
    fn test_load_assigns_missing_ids() {
        let mirror = MemoryMirror::with_videos(vec![record("", 1), record("kept", 2), record("", 3)]);
        let store = CollectionStore::load(mirror.clone()).unwrap();

        let ids: Vec<&str> = store.videos().iter().map(|v| v.unique_id.as_str()).collect();
        assert_eq!(ids[1], "kept");
        assert!(!ids[0].is_empty() && !ids[2].is_empty());
        assert_ne!(ids[0], ids[2]);
        // Repaired ids are written back
        assert_eq!(mirror.write_count(), 1);
        assert_eq!(mirror.read_all().unwrap()[0].unique_id, ids[0]);
    }

    #[test]
    fn test_json_mirror_round_trip_preserves_order() {
        let dir = TempDir::new().unwrap();
        let path_manager = PathManager::from_base(dir.path().to_path_buf());
        let mirror = JsonFileMirror::new(&path_manager).unwrap();

        let mut store = CollectionStore::load(mirror.clone()).unwrap();
        store.add(record("first", 1)).unwrap();
        store.add(record("second", 2)).unwrap();

        let reloaded = CollectionStore::load(JsonFileMirror::new(&path_manager).unwrap()).unwrap();
        let ids: Vec<&str> = reloaded.videos().iter().map(|v| v.unique_id.as_str()).collect();
        assert_eq!(ids, vec!["second", "first"]);
        assert!(!mirror.path().with_extension("json.tmp").exists());
    }

    #[test]
    fn test_json_mirror_missing_file_reads_empty() {
        let dir = TempDir::new().unwrap();
        let mirror = JsonFileMirror::at(dir.path().join("videos.json"));
        assert!(mirror.read_all().unwrap().is_empty());
    }

    #[test]
    fn test_json_mirror_backs_up_corrupt_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("videos.json");
        std::fs::write(&path, "{ not json").unwrap();

        let mirror = JsonFileMirror::at(path.clone());
        assert!(mirror.read_all().unwrap().is_empty());
        assert!(!path.exists());
        assert_eq!(
            std::fs::read_to_string(dir.path().join("videos.json.bak")).unwrap(),
            "{ not json"
        );
    }

    #[test]
    fn test_json_mirror_reads_legacy_browser_data() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("videos.json");
        std::fs::write(
            &path,
            r#"[{"id":"dQw4w9WgXcQ","title":"Old","thumbnail":"t","duration":212,"addedAt":"2023-05-01T10:00:00.000Z"}]"#,
        )
        .unwrap();

        let store = CollectionStore::load(JsonFileMirror::at(path)).unwrap();
        assert_eq!(store.len(), 1);
        assert!(!store.videos()[0].unique_id.is_empty());
        assert_eq!(store.total(), 212);
    }
}

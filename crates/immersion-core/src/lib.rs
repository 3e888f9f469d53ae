pub mod backfill;
pub mod error;
pub mod format;
pub mod ids;
pub mod level;
pub mod ordering;
pub mod reconcile;
pub mod session;
pub mod store;
pub mod tracker;

pub use error::TrackerError;
pub use format::format_duration;
pub use level::{level_for_hours, level_for_seconds, LevelProgress};
pub use ordering::sort_by_recency;
pub use reconcile::{reconcile, sync_to_cloud, ReconcileOutcome, SyncPath};
pub use session::{Session, SyncIndicator};
pub use store::{CollectionStore, JsonFileMirror, LocalMirror, MemoryMirror};
pub use tracker::{AddOutcome, Dashboard, DeleteOutcome, Tracker};

pub mod identity;
pub mod level;
pub mod status;
pub mod video;

pub use identity::Identity;
pub use level::{ImmersionLevel, IMMERSION_LEVELS};
pub use status::SyncStatus;
pub use video::{RemoteCollection, VideoMetadata, VideoRecord};

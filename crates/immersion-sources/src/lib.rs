pub mod traits;
pub mod factory;
pub mod youtube;
pub mod firebase;
pub mod error;

pub use traits::{MetadataProvider, RemoteStore};
pub use factory::{create_auth_client, create_metadata_provider, create_remote_store};
pub use error::SourceError;
pub use youtube::{extract_video_id, parse_iso8601_duration, YoutubeClient};
pub use firebase::{FirebaseAuthClient, FirestoreClient};

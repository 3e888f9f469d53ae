pub mod config;
pub mod credentials;
pub mod paths;

pub use config::{Config, FirebaseConfig, SyncOptions, YoutubeConfig, default_firebase_config};
pub use credentials::CredentialStore;
pub use paths::{PathManager, container_base_path};

use crate::output::Output;
use chrono::Utc;
use color_eyre::eyre::eyre;
use color_eyre::Result;
use immersion_config::{Config, CredentialStore, PathManager};
use immersion_core::{CollectionStore, JsonFileMirror, Session, Tracker};
use immersion_models::Identity;
use immersion_sources::{create_auth_client, create_metadata_provider, create_remote_store};
use std::time::Duration;
use tracing::{debug, warn};

/// Everything a command loads from disk before it runs
pub struct AppContext {
    pub path_manager: PathManager,
    pub config: Config,
    pub credentials: CredentialStore,
}

impl AppContext {
    pub fn load() -> Result<Self> {
        let path_manager = PathManager::default();
        path_manager
            .ensure_directories()
            .map_err(|e| eyre!("Failed to create data directories: {}", e))?;

        let config_file = path_manager.config_file();
        let config = Config::load_or_default(&config_file)
            .map_err(|e| eyre!("Failed to load config from {}: {}", config_file.display(), e))?;

        let credentials_file = path_manager.credentials_file();
        let mut credentials = CredentialStore::new(credentials_file.clone());
        credentials
            .load()
            .map_err(|e| eyre!("Failed to load credentials from {}: {}", credentials_file.display(), e))?;

        Ok(Self {
            path_manager,
            config,
            credentials,
        })
    }

    pub fn save_credentials(&self) -> Result<()> {
        self.credentials
            .save()
            .map_err(|e| eyre!("Failed to save credentials: {}", e))
    }

    /// The saved sign-in, with tokens refreshed when they are about to expire
    ///
    /// A refresh that fails signs the user out locally.
    pub async fn restore_identity(&mut self, output: &Output) -> Result<Option<Identity>> {
        let Some(identity) = self.credentials.get_identity() else {
            return Ok(None);
        };
        if !identity.needs_refresh(Utc::now()) {
            return Ok(Some(identity));
        }

        let auth = create_auth_client(&self.config).map_err(|e| eyre!("{}", e))?;
        match auth.refresh(&identity).await {
            Ok(refreshed) => {
                debug!(user_id = %refreshed.user_id, "Refreshed id token");
                self.credentials.set_identity(&refreshed);
                self.save_credentials()?;
                Ok(Some(refreshed))
            }
            Err(e) => {
                warn!("Could not refresh session: {}", e);
                output.warn("Your session has expired. Please log in again.");
                self.credentials.clear_identity();
                self.save_credentials()?;
                Ok(None)
            }
        }
    }

    /// Tracker over the local mirror, with whichever cloud and lookup services are configured
    pub fn tracker(&self) -> Result<Tracker<JsonFileMirror>> {
        let mirror = JsonFileMirror::new(&self.path_manager)
            .map_err(|e| eyre!("Failed to open local video store: {}", e))?;
        let store = CollectionStore::load(mirror).map_err(|e| eyre!("Failed to load videos: {}", e))?;
        let session = Session::new(Duration::from_secs(self.config.sync.status_clear_seconds));

        let mut tracker = Tracker::new(store, session);
        if let Ok(provider) = create_metadata_provider(&self.config) {
            tracker = tracker.with_metadata(provider);
        }
        if self.config.sync.enabled {
            if let Some(remote) = create_remote_store(&self.config) {
                tracker = tracker.with_remote(remote);
            }
        }
        Ok(tracker)
    }

    /// Tracker with the saved session restored (no reconciliation)
    pub async fn signed_in_tracker(&mut self, output: &Output) -> Result<Tracker<JsonFileMirror>> {
        let mut tracker = self.tracker()?;
        if tracker.has_remote() {
            if let Some(identity) = self.restore_identity(output).await? {
                tracker.session_mut().update_identity(identity);
            }
        }
        Ok(tracker)
    }

    pub fn record_sync(&mut self) -> Result<()> {
        self.credentials.set_last_sync(Utc::now());
        self.save_credentials()
    }
}

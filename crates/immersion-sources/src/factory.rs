//! Builds the concrete collaborators from configuration.

use anyhow::Result;
use immersion_config::Config;
use std::sync::Arc;
use crate::firebase::{FirebaseAuthClient, FirestoreClient};
use crate::traits::{MetadataProvider, RemoteStore};
use crate::youtube::YoutubeClient;

pub fn create_metadata_provider(config: &Config) -> Result<Arc<dyn MetadataProvider>> {
    if !config.is_youtube_configured() {
        return Err(anyhow::anyhow!(
            "YouTube API key is not configured. Run: immersion config set youtube.api_key <KEY>"
        ));
    }
    Ok(Arc::new(YoutubeClient::new(config.youtube.api_key.clone())))
}

/// None when cloud sync is disabled or Firebase is not configured
pub fn create_remote_store(config: &Config) -> Option<Arc<dyn RemoteStore>> {
    let firebase = config.configured_firebase()?;
    Some(Arc::new(FirestoreClient::new(
        firebase.project_id.clone(),
        firebase.collection.clone(),
    )))
}

pub fn create_auth_client(config: &Config) -> Result<FirebaseAuthClient> {
    let firebase = config.configured_firebase().ok_or_else(|| {
        anyhow::anyhow!(
            "Firebase is not configured. Run: immersion config set firebase.api_key <KEY> and firebase.project_id <ID>"
        )
    })?;
    Ok(FirebaseAuthClient::new(firebase.api_key.clone()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use immersion_config::{FirebaseConfig, YoutubeConfig};

    #[test]
    fn test_factories_respect_configuration() {
        let mut config = Config::default();
        assert!(create_metadata_provider(&config).is_err());
        assert!(create_remote_store(&config).is_none());
        assert!(create_auth_client(&config).is_err());

        config.youtube = YoutubeConfig { api_key: "key".to_string() };
        config.firebase = Some(FirebaseConfig {
            enabled: true,
            api_key: "fb".to_string(),
            project_id: "proj".to_string(),
            collection: "users".to_string(),
        });
        assert_eq!(create_metadata_provider(&config).unwrap().provider_name(), "youtube");
        assert_eq!(create_remote_store(&config).unwrap().store_name(), "firestore");
        assert!(create_auth_client(&config).is_ok());
    }
}

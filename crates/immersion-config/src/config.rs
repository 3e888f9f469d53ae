use serde::{Deserialize, Serialize};
use std::path::PathBuf;

const PLACEHOLDER_API_KEY: &str = "YOUR_API_KEY";
const PLACEHOLDER_PROJECT_ID: &str = "YOUR_PROJECT_ID";

#[derive(Debug, Serialize, Deserialize, Default)]
pub struct Config {
    #[serde(default)]
    pub youtube: YoutubeConfig,
    #[serde(default)]
    pub firebase: Option<FirebaseConfig>,
    #[serde(default)]
    pub sync: SyncOptions,
}

/// YouTube Data API v3 access (video metadata lookups)
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct YoutubeConfig {
    pub api_key: String,
}

impl Default for YoutubeConfig {
    fn default() -> Self {
        Self {
            api_key: PLACEHOLDER_API_KEY.to_string(),
        }
    }
}

/// Firebase project used for sign-in (Auth) and cloud storage (Firestore)
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct FirebaseConfig {
    pub enabled: bool,
    pub api_key: String,
    pub project_id: String,
    #[serde(default = "default_collection")]
    pub collection: String,
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct SyncOptions {
    /// Use the cloud copy while signed in (reconcile on sign-in, mirror adds and removals)
    #[serde(default = "default_true")]
    pub enabled: bool,
    /// How long a finished sync status stays visible
    #[serde(default = "default_status_clear_seconds")]
    pub status_clear_seconds: u64,
}

impl Default for SyncOptions {
    fn default() -> Self {
        Self {
            enabled: default_true(),
            status_clear_seconds: default_status_clear_seconds(),
        }
    }
}

fn default_true() -> bool {
    true
}

fn default_status_clear_seconds() -> u64 {
    3
}

fn default_collection() -> String {
    "users".to_string()
}

pub fn default_firebase_config() -> FirebaseConfig {
    FirebaseConfig {
        enabled: true,
        api_key: PLACEHOLDER_API_KEY.to_string(),
        project_id: PLACEHOLDER_PROJECT_ID.to_string(),
        collection: default_collection(),
    }
}

impl Config {
    pub fn load_from_file(path: &PathBuf) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: Config = toml::from_str(&content)?;
        Ok(config)
    }

    /// Load the config file, falling back to defaults when it does not exist yet
    pub fn load_or_default(path: &PathBuf) -> anyhow::Result<Self> {
        if path.exists() {
            Self::load_from_file(path)
        } else {
            Ok(Self::default())
        }
    }

    pub fn save_to_file(&self, path: &PathBuf) -> anyhow::Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content = toml::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }

    pub fn validate(&self) -> anyhow::Result<()> {
        if !self.is_youtube_configured() {
            return Err(anyhow::anyhow!("youtube.api_key is not configured"));
        }

        if let Some(firebase) = &self.firebase {
            if firebase.enabled {
                if firebase.api_key.is_empty() || firebase.api_key == PLACEHOLDER_API_KEY {
                    return Err(anyhow::anyhow!("Firebase is enabled but api_key is not configured"));
                }
                if firebase.project_id.is_empty() || firebase.project_id == PLACEHOLDER_PROJECT_ID {
                    return Err(anyhow::anyhow!("Firebase is enabled but project_id is not configured"));
                }
                if firebase.collection.is_empty() {
                    return Err(anyhow::anyhow!("firebase.collection cannot be empty"));
                }
            }
        }

        Ok(())
    }

    pub fn is_youtube_configured(&self) -> bool {
        !self.youtube.api_key.is_empty() && self.youtube.api_key != PLACEHOLDER_API_KEY
    }

    /// Enabled Firebase settings with real keys, if any
    pub fn configured_firebase(&self) -> Option<&FirebaseConfig> {
        self.firebase.as_ref().filter(|firebase| {
            firebase.enabled
                && !firebase.api_key.is_empty()
                && firebase.api_key != PLACEHOLDER_API_KEY
                && !firebase.project_id.is_empty()
                && firebase.project_id != PLACEHOLDER_PROJECT_ID
        })
    }

    /// Set a single value by dotted key, e.g. `firebase.project_id`
    pub fn set_value(&mut self, key: &str, value: &str) -> anyhow::Result<()> {
        match key {
            "youtube.api_key" => self.youtube.api_key = value.to_string(),
            "firebase.enabled" => self.firebase_mut().enabled = parse_bool(key, value)?,
            "firebase.api_key" => self.firebase_mut().api_key = value.to_string(),
            "firebase.project_id" => self.firebase_mut().project_id = value.to_string(),
            "firebase.collection" => self.firebase_mut().collection = value.to_string(),
            "sync.enabled" => self.sync.enabled = parse_bool(key, value)?,
            "sync.status_clear_seconds" => {
                self.sync.status_clear_seconds = value
                    .parse()
                    .map_err(|_| anyhow::anyhow!("{} must be a whole number of seconds", key))?;
            }
            _ => return Err(anyhow::anyhow!("Unknown configuration key: {}", key)),
        }
        Ok(())
    }

    fn firebase_mut(&mut self) -> &mut FirebaseConfig {
        self.firebase.get_or_insert_with(default_firebase_config)
    }
}

fn parse_bool(key: &str, value: &str) -> anyhow::Result<bool> {
    match value.to_lowercase().as_str() {
        "true" | "yes" | "on" | "1" => Ok(true),
        "false" | "no" | "off" | "0" => Ok(false),
        _ => Err(anyhow::anyhow!("{} must be true or false", key)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::NamedTempFile;

    fn configured() -> Config {
        Config {
            youtube: YoutubeConfig {
                api_key: "yt_key".to_string(),
            },
            firebase: Some(FirebaseConfig {
                enabled: true,
                api_key: "fb_key".to_string(),
                project_id: "immersion-test".to_string(),
                collection: "users".to_string(),
            }),
            sync: SyncOptions::default(),
        }
    }

    #[test]
    fn test_config_load_and_save() {
        let file = NamedTempFile::new().unwrap();
        let path = file.path().to_path_buf();
        configured().save_to_file(&path).unwrap();

        let loaded = Config::load_from_file(&path).unwrap();
        assert_eq!(loaded.youtube.api_key, "yt_key");
        assert_eq!(loaded.firebase.as_ref().unwrap().project_id, "immersion-test");
        assert_eq!(loaded.sync.status_clear_seconds, 3);
        assert!(loaded.sync.enabled);
    }

    #[test]
    fn test_config_sections_default_when_missing() {
        let config: Config = toml::from_str("[youtube]\napi_key = \"abc\"\n").unwrap();
        assert!(config.firebase.is_none());
        assert!(config.sync.enabled);
        assert_eq!(config.sync.status_clear_seconds, 3);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_config_validate() {
        let mut config = Config::default();
        assert!(config.validate().is_err());
        assert!(!config.is_youtube_configured());

        config.youtube.api_key = "real".to_string();
        config.firebase = Some(default_firebase_config());
        assert!(config.validate().is_err());
        assert!(config.configured_firebase().is_none());

        let config = configured();
        assert!(config.validate().is_ok());
        assert!(config.configured_firebase().is_some());
    }

    #[test]
    fn test_disabled_firebase_is_not_validated() {
        let mut config = configured();
        config.firebase.as_mut().unwrap().api_key = String::new();
        config.firebase.as_mut().unwrap().enabled = false;
        assert!(config.validate().is_ok());
        assert!(config.configured_firebase().is_none());
    }

    #[test]
    fn test_set_value() {
        let mut config = Config::default();
        config.set_value("firebase.project_id", "proj").unwrap();
        config.set_value("sync.status_clear_seconds", "10").unwrap();
        config.set_value("sync.enabled", "no").unwrap();

        assert_eq!(config.firebase.as_ref().unwrap().project_id, "proj");
        assert_eq!(config.sync.status_clear_seconds, 10);
        assert!(!config.sync.enabled);
        assert!(config.set_value("sync.status_clear_seconds", "soon").is_err());
        assert!(config.set_value("nope", "x").is_err());
    }
}

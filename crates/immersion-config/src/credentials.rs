use anyhow::Result;
use chrono::{DateTime, Utc};
use immersion_models::Identity;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::PathBuf;

const USER_ID: &str = "firebase_user_id";
const EMAIL: &str = "firebase_email";
const DISPLAY_NAME: &str = "firebase_display_name";
const ID_TOKEN: &str = "firebase_id_token";
const REFRESH_TOKEN: &str = "firebase_refresh_token";
const TOKEN_EXPIRES: &str = "firebase_token_expires";
const LAST_SYNC: &str = "last_sync";

#[derive(Debug, Serialize, Deserialize, Default)]
struct CredentialsData {
    #[serde(flatten)]
    data: HashMap<String, String>,
}

pub struct CredentialStore {
    path: PathBuf,
    credentials: HashMap<String, String>,
}

impl CredentialStore {
    pub fn new(path: PathBuf) -> Self {
        Self {
            path,
            credentials: HashMap::new(),
        }
    }

    pub fn load(&mut self) -> Result<()> {
        if self.path.exists() {
            let content = std::fs::read_to_string(&self.path)?;
            let creds_data: CredentialsData = toml::from_str(&content)?;
            self.credentials = creds_data.data;
        }
        Ok(())
    }

    pub fn save(&self) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let creds_data = CredentialsData {
            data: self.credentials.clone(),
        };
        let content = toml::to_string_pretty(&creds_data)?;
        std::fs::write(&self.path, content)?;
        Ok(())
    }

    pub fn get(&self, key: &str) -> Option<&String> {
        self.credentials.get(key)
    }

    pub fn set(&mut self, key: String, value: String) {
        self.credentials.insert(key, value);
    }

    pub fn remove(&mut self, key: &str) {
        self.credentials.remove(key);
    }

    /// The persisted signed-in account, if every required field is present
    pub fn get_identity(&self) -> Option<Identity> {
        let expires_at = self
            .get(TOKEN_EXPIRES)
            .and_then(|s| DateTime::parse_from_rfc3339(s).ok())
            .map(|dt| dt.with_timezone(&Utc))?;

        Some(Identity {
            user_id: self.get(USER_ID)?.clone(),
            email: self.get(EMAIL)?.clone(),
            display_name: self.get(DISPLAY_NAME).cloned(),
            id_token: self.get(ID_TOKEN)?.clone(),
            refresh_token: self.get(REFRESH_TOKEN)?.clone(),
            expires_at,
        })
    }

    pub fn set_identity(&mut self, identity: &Identity) {
        self.set(USER_ID.to_string(), identity.user_id.clone());
        self.set(EMAIL.to_string(), identity.email.clone());
        match &identity.display_name {
            Some(name) => self.set(DISPLAY_NAME.to_string(), name.clone()),
            None => self.remove(DISPLAY_NAME),
        }
        self.set(ID_TOKEN.to_string(), identity.id_token.clone());
        self.set(REFRESH_TOKEN.to_string(), identity.refresh_token.clone());
        self.set(TOKEN_EXPIRES.to_string(), identity.expires_at.to_rfc3339());
    }

    pub fn clear_identity(&mut self) {
        for key in [USER_ID, EMAIL, DISPLAY_NAME, ID_TOKEN, REFRESH_TOKEN, TOKEN_EXPIRES, LAST_SYNC] {
            self.remove(key);
        }
    }

    pub fn get_last_sync(&self) -> Option<DateTime<Utc>> {
        self.get(LAST_SYNC)
            .and_then(|s| DateTime::parse_from_rfc3339(s).ok())
            .map(|dt| dt.with_timezone(&Utc))
    }

    pub fn set_last_sync(&mut self, timestamp: DateTime<Utc>) {
        self.set(LAST_SYNC.to_string(), timestamp.to_rfc3339());
    }
}

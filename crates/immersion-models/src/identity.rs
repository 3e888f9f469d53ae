use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// The signed-in account
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Identity {
    pub user_id: String,
    pub email: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub display_name: Option<String>,
    pub id_token: String,
    pub refresh_token: String,
    pub expires_at: DateTime<Utc>,
}

impl Identity {
    /// Tokens expiring within five minutes are treated as expired
    pub fn needs_refresh(&self, now: DateTime<Utc>) -> bool {
        self.expires_at <= now + chrono::Duration::minutes(5)
    }
}

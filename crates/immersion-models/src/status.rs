use serde::{Deserialize, Serialize};

/// User-visible state of the last sync attempt
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum SyncStatus {
    InProgress,
    Failed,
    Succeeded,
}

impl SyncStatus {
    /// Terminal states are cleared after the configured delay; in-progress is not
    pub fn is_terminal(&self) -> bool {
        !matches!(self, SyncStatus::InProgress)
    }

    pub fn message(&self) -> &'static str {
        match self {
            SyncStatus::InProgress => "Syncing your videos...",
            SyncStatus::Succeeded => "Videos synced successfully!",
            SyncStatus::Failed => "Error syncing videos. Try again later.",
        }
    }
}

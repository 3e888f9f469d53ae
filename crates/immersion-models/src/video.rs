use serde::{Deserialize, Deserializer, Serialize};
use std::collections::BTreeMap;

/// Remote side of the collection: records keyed by `unique_id`, no inherent order
pub type RemoteCollection = BTreeMap<String, VideoRecord>;

/// One watched video
///
/// Field names on the wire follow the legacy browser data (`id`, `uniqueId`,
/// `thumbnail`, `duration`, `addedAt`, `timestamp`) so existing mirrors and
/// remote documents deserialize unchanged.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct VideoRecord {
    /// 11-character platform video id (the same video may be added twice)
    #[serde(rename = "id")]
    pub external_id: String,
    /// Client-generated merge key. Empty only for legacy records before `load` repairs them.
    #[serde(rename = "uniqueId", default)]
    pub unique_id: String,
    pub title: String,
    #[serde(rename = "thumbnail", default)]
    pub thumbnail_url: String,
    #[serde(rename = "duration", default)]
    pub duration_seconds: u64,
    #[serde(rename = "url", default, skip_serializing_if = "Option::is_none")]
    pub source_url: Option<String>,
    #[serde(rename = "addedAt", default, skip_serializing_if = "Option::is_none")]
    pub created_at_iso: Option<String>,
    /// Epoch milliseconds used for ordering
    #[serde(
        rename = "timestamp",
        default,
        skip_serializing_if = "Option::is_none",
        deserialize_with = "lenient_timestamp"
    )]
    pub sort_timestamp: Option<i64>,
}

/// Legacy browser data sometimes carries timestamps as floating point numbers
fn lenient_timestamp<'de, D>(deserializer: D) -> Result<Option<i64>, D::Error>
where
    D: Deserializer<'de>,
{
    let number = Option::<serde_json::Number>::deserialize(deserializer)?;
    Ok(number.and_then(|n| {
        n.as_i64()
            .or_else(|| n.as_f64().filter(|f| f.is_finite()).map(|f| f as i64))
    }))
}

impl VideoRecord {
    pub fn has_timestamp(&self) -> bool {
        self.sort_timestamp.is_some()
    }
}

/// Metadata returned by the video metadata provider
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct VideoMetadata {
    pub external_id: String,
    pub title: String,
    pub thumbnail_url: String,
    pub duration_seconds: u64,
}

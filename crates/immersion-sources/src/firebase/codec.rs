//! Conversion between plain JSON and Firestore's typed value encoding.
//!
//! Firestore REST documents wrap every value in a single-key object naming its
//! type (`stringValue`, `integerValue`, `mapValue`, ...). Integers travel as
//! decimal strings.

use immersion_models::{RemoteCollection, VideoRecord};
use serde_json::{json, Map, Number, Value};
use tracing::debug;
use crate::error::SourceError;

/// Document field that holds the keyed video collection
pub const VIDEOS_FIELD: &str = "videos";

pub fn encode_value(value: &Value) -> Value {
    match value {
        Value::Null => json!({ "nullValue": null }),
        Value::Bool(b) => json!({ "booleanValue": b }),
        Value::Number(n) => {
            if let Some(i) = n.as_i64() {
                json!({ "integerValue": i.to_string() })
            } else if let Some(u) = n.as_u64() {
                json!({ "integerValue": u.to_string() })
            } else {
                json!({ "doubleValue": n.as_f64().unwrap_or_default() })
            }
        }
        Value::String(s) => json!({ "stringValue": s }),
        Value::Array(values) => {
            let values: Vec<Value> = values.iter().map(encode_value).collect();
            json!({ "arrayValue": { "values": values } })
        }
        Value::Object(map) => json!({ "mapValue": { "fields": encode_fields(map) } }),
    }
}

pub fn encode_fields(map: &Map<String, Value>) -> Map<String, Value> {
    map.iter().map(|(k, v)| (k.clone(), encode_value(v))).collect()
}

pub fn decode_value(value: &Value) -> Result<Value, SourceError> {
    let object = value
        .as_object()
        .ok_or_else(|| SourceError::new_decode("typed value is not an object"))?;
    let (kind, inner) = object
        .iter()
        .next()
        .ok_or_else(|| SourceError::new_decode("typed value is empty"))?;

    match kind.as_str() {
        "nullValue" => Ok(Value::Null),
        "booleanValue" => Ok(Value::Bool(inner.as_bool().unwrap_or_default())),
        "integerValue" => {
            // Integers arrive as strings but some emulators send bare numbers
            let parsed = match inner {
                Value::String(s) => s.parse::<i64>().ok(),
                Value::Number(n) => n.as_i64(),
                _ => None,
            };
            parsed
                .map(|i| Value::Number(i.into()))
                .ok_or_else(|| SourceError::new_decode(format!("bad integerValue: {}", inner)))
        }
        "doubleValue" => {
            let f = inner
                .as_f64()
                .ok_or_else(|| SourceError::new_decode(format!("bad doubleValue: {}", inner)))?;
            // Web clients store integral numbers (timestamps) as doubles now and then
            if f.fract() == 0.0 && f.abs() < i64::MAX as f64 {
                Ok(Value::Number((f as i64).into()))
            } else {
                Ok(Number::from_f64(f).map(Value::Number).unwrap_or(Value::Null))
            }
        }
        "stringValue" | "timestampValue" | "referenceValue" | "bytesValue" => Ok(inner.clone()),
        "arrayValue" => {
            let values = inner
                .get("values")
                .and_then(Value::as_array)
                .map(|values| values.iter().map(decode_value).collect::<Result<Vec<_>, _>>())
                .transpose()?
                .unwrap_or_default();
            Ok(Value::Array(values))
        }
        "mapValue" => Ok(Value::Object(decode_fields(inner.get("fields"))?)),
        other => Err(SourceError::new_decode(format!("unsupported value type: {}", other))),
    }
}

/// Decode a `fields` object; an absent object is an empty map
pub fn decode_fields(fields: Option<&Value>) -> Result<Map<String, Value>, SourceError> {
    let Some(fields) = fields.and_then(Value::as_object) else {
        return Ok(Map::new());
    };
    fields
        .iter()
        .map(|(k, v)| Ok((k.clone(), decode_value(v)?)))
        .collect()
}

pub fn encode_record(record: &VideoRecord) -> Result<Value, SourceError> {
    Ok(encode_value(&serde_json::to_value(record)?))
}

pub fn encode_collection(videos: &RemoteCollection) -> Result<Map<String, Value>, SourceError> {
    videos
        .iter()
        .map(|(key, record)| Ok((key.clone(), encode_record(record)?)))
        .collect()
}

/// Extract the keyed collection from a Firestore document body
///
/// Entries whose record lacks a `uniqueId` take the map key, which is the
/// same identifier.
pub fn decode_collection(document: &Value) -> Result<RemoteCollection, SourceError> {
    let Some(videos) = document.get("fields").and_then(|f| f.get(VIDEOS_FIELD)) else {
        debug!("Document has no {} field", VIDEOS_FIELD);
        return Ok(RemoteCollection::new());
    };

    let entries = match decode_value(videos)? {
        Value::Object(entries) => entries,
        Value::Null => return Ok(RemoteCollection::new()),
        other => {
            return Err(SourceError::new_decode(format!(
                "{} field is not a map: {}",
                VIDEOS_FIELD, other
            )))
        }
    };

    let mut collection = RemoteCollection::new();
    for (key, value) in entries {
        let mut record: VideoRecord = serde_json::from_value(value)
            .map_err(|e| SourceError::new_decode(format!("video {}: {}", key, e)))?;
        if record.unique_id.is_empty() {
            record.unique_id = key.clone();
        }
        collection.insert(key, record);
    }
    Ok(collection)
}

/// Quote a field path segment so arbitrary keys are accepted
pub fn quote_field_segment(segment: &str) -> String {
    format!("`{}`", segment.replace('\\', "\\\\").replace('`', "\\`"))
}

/// Field path of one entry inside the collection map
pub fn video_field_path(key: &str) -> String {
    format!("{}.{}", VIDEOS_FIELD, quote_field_segment(key))
}

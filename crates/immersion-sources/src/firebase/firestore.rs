use async_trait::async_trait;
use immersion_models::{Identity, RemoteCollection, VideoRecord};
use reqwest::{Client, RequestBuilder, Response, StatusCode};
use serde_json::{json, Map, Value};
use std::sync::Arc;
use tracing::{debug, info};
use crate::error::SourceError;
use crate::firebase::codec::{self, VIDEOS_FIELD};
use crate::traits::RemoteStore;

const FIRESTORE_BASE_URL: &str = "https://firestore.googleapis.com/v1";

/// Cloud Firestore over REST, one document per user holding a `videos` map
#[derive(Clone)]
pub struct FirestoreClient {
    client: Arc<Client>,
    project_id: String,
    collection: String,
    base_url: String,
}

impl FirestoreClient {
    pub fn new(project_id: String, collection: String) -> Self {
        Self {
            client: Arc::new(Client::new()),
            project_id,
            collection,
            base_url: FIRESTORE_BASE_URL.to_string(),
        }
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    pub(crate) fn document_url(&self, user_id: &str) -> String {
        format!(
            "{}/projects/{}/databases/(default)/documents/{}/{}",
            self.base_url,
            urlencoding::encode(&self.project_id),
            urlencoding::encode(&self.collection),
            urlencoding::encode(user_id)
        )
    }

    fn patch(&self, user: &Identity, field_path: &str) -> RequestBuilder {
        self.client
            .patch(self.document_url(&user.user_id))
            .bearer_auth(&user.id_token)
            .query(&[("updateMask.fieldPaths", field_path)])
    }

    async fn check(response: Response) -> Result<Response, SourceError> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }
        let body = response.text().await.unwrap_or_default();
        let message = serde_json::from_str::<Value>(&body)
            .ok()
            .and_then(|v| v["error"]["message"].as_str().map(str::to_string))
            .unwrap_or(body);
        Err(SourceError::Api {
            service: "firestore",
            status: status.as_u16(),
            message,
        })
    }
}

/// Body for a PATCH that touches only `videos.<key>` (or deletes it when `entry` is None)
pub(crate) fn single_entry_body(key: &str, entry: Option<Value>) -> Value {
    let mut entries = Map::new();
    if let Some(entry) = entry {
        entries.insert(key.to_string(), entry);
    }
    if entries.is_empty() {
        return json!({ "fields": {} });
    }
    json!({ "fields": { VIDEOS_FIELD: { "mapValue": { "fields": entries } } } })
}

#[async_trait]
impl RemoteStore for FirestoreClient {
    fn store_name(&self) -> &str {
        "firestore"
    }

    async fn fetch_collection(&self, user: &Identity) -> Result<RemoteCollection, SourceError> {
        let response = self
            .client
            .get(self.document_url(&user.user_id))
            .bearer_auth(&user.id_token)
            .send()
            .await?;

        if response.status() == StatusCode::NOT_FOUND {
            debug!(user_id = %user.user_id, "No user document yet");
            return Ok(RemoteCollection::new());
        }

        let document: Value = Self::check(response).await?.json().await?;
        let collection = codec::decode_collection(&document)?;
        info!(user_id = %user.user_id, count = collection.len(), "Fetched remote collection");
        Ok(collection)
    }

    async fn overwrite_collection(&self, user: &Identity, videos: &RemoteCollection) -> Result<(), SourceError> {
        let body = json!({
            "fields": { VIDEOS_FIELD: { "mapValue": { "fields": codec::encode_collection(videos)? } } }
        });
        let response = self.patch(user, VIDEOS_FIELD).json(&body).send().await?;
        Self::check(response).await?;
        info!(user_id = %user.user_id, count = videos.len(), "Overwrote remote collection");
        Ok(())
    }

    async fn upsert_field(&self, user: &Identity, key: &str, record: &VideoRecord) -> Result<(), SourceError> {
        let body = single_entry_body(key, Some(codec::encode_record(record)?));
        let response = self
            .patch(user, &codec::video_field_path(key))
            .json(&body)
            .send()
            .await?;
        Self::check(response).await?;
        debug!(user_id = %user.user_id, key = %key, "Upserted remote video");
        Ok(())
    }

    async fn delete_field(&self, user: &Identity, key: &str) -> Result<(), SourceError> {
        // Fields named in the mask but absent from the body are deleted.
        // Require an existing document so a delete never creates one.
        let response = self
            .patch(user, &codec::video_field_path(key))
            .query(&[("currentDocument.exists", "true")])
            .json(&single_entry_body(key, None))
            .send()
            .await?;

        if response.status() == StatusCode::NOT_FOUND {
            debug!(user_id = %user.user_id, key = %key, "Nothing to delete, no user document");
            return Ok(());
        }
        Self::check(response).await?;
        debug!(user_id = %user.user_id, key = %key, "Deleted remote video");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_document_url() {
        let client = FirestoreClient::new("immersion-d7".to_string(), "users".to_string());
        assert_eq!(
            client.document_url("uid 1"),
            "https://firestore.googleapis.com/v1/projects/immersion-d7/databases/(default)/documents/users/uid%201"
        );

        let local = client.with_base_url("http://localhost:8080/v1");
        assert!(local.document_url("u").starts_with("http://localhost:8080/v1/projects/"));
    }

    #[test]
    fn test_single_entry_body() {
        let body = single_entry_body("k", Some(json!({ "stringValue": "x" })));
        assert_eq!(body["fields"]["videos"]["mapValue"]["fields"]["k"]["stringValue"], "x");

        let delete = single_entry_body("k", None);
        assert_eq!(delete, json!({ "fields": {} }));
    }
}

//! Client - Transport to the cluster's REST API
//!
//! Documents live under collection paths (e.g. `/platform/quota/quotas`).
//! POST to a collection creates a document and returns its id; the document
//! is then addressed as `<collection>/<id>`.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};

use pylon_core::provider::{BoxFuture, ProviderError, ProviderResult};
use serde_json::{Map, Value};
use thiserror::Error;
use tokio::sync::Mutex;

/// Errors raised by a cluster transport
#[derive(Debug, Error)]
pub enum ClientError {
    #[error("no document at {0}")]
    NotFound(String),

    #[error("request body for {path} must be a JSON object, got {found}")]
    NotAnObject { path: String, found: &'static str },
}

impl From<ClientError> for ProviderError {
    fn from(err: ClientError) -> Self {
        ProviderError::new(err.to_string()).with_cause(err)
    }
}

/// JSON transport to the cluster
pub trait ClusterClient: Send + Sync {
    /// Fetch the document at `path`; `None` if it does not exist
    fn get<'a>(&'a self, path: &'a str) -> BoxFuture<'a, ProviderResult<Option<Value>>>;

    /// Create a document in the collection at `path` and return the response body
    fn post<'a>(&'a self, path: &'a str, body: Value) -> BoxFuture<'a, ProviderResult<Value>>;

    /// Modify the document at `path`
    fn put<'a>(&'a self, path: &'a str, body: Value) -> BoxFuture<'a, ProviderResult<()>>;

    fn delete<'a>(&'a self, path: &'a str) -> BoxFuture<'a, ProviderResult<()>>;
}

/// Cluster held in memory, for tests and dry runs
///
/// PUT merges top-level keys into the stored document: keys the body omits
/// are preserved and an explicit `null` is stored as `null`.
#[derive(Debug, Default)]
pub struct InMemoryCluster {
    documents: Mutex<HashMap<String, Map<String, Value>>>,
    next_id: AtomicU64,
}

impl InMemoryCluster {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store a document as is, e.g. to add fields only the cluster computes
    pub async fn insert(&self, path: impl Into<String>, document: Value) -> ProviderResult<()> {
        let path = path.into();
        let document = as_object(&path, document)?;
        self.documents.lock().await.insert(path, document);
        Ok(())
    }

    pub async fn len(&self) -> usize {
        self.documents.lock().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.documents.lock().await.is_empty()
    }

    async fn create(&self, path: &str, body: Value) -> ProviderResult<Value> {
        let mut document = as_object(path, body)?;
        let id = (self.next_id.fetch_add(1, Ordering::SeqCst) + 1).to_string();
        document.insert("id".to_string(), Value::String(id.clone()));

        let item = format!("{}/{}", path.trim_end_matches('/'), id);
        log::debug!("POST {} -> {}", path, item);
        self.documents.lock().await.insert(item, document);
        Ok(serde_json::json!({ "id": id }))
    }

    async fn merge(&self, path: &str, body: Value) -> ProviderResult<()> {
        let changes = as_object(path, body)?;
        let mut documents = self.documents.lock().await;
        let document = documents
            .get_mut(path)
            .ok_or_else(|| ClientError::NotFound(path.to_string()))?;
        log::debug!("PUT {} ({} keys)", path, changes.len());
        document.extend(changes);
        Ok(())
    }

    async fn remove(&self, path: &str) -> ProviderResult<()> {
        log::debug!("DELETE {}", path);
        match self.documents.lock().await.remove(path) {
            Some(_) => Ok(()),
            None => Err(ClientError::NotFound(path.to_string()).into()),
        }
    }
}

fn as_object(path: &str, body: Value) -> Result<Map<String, Value>, ClientError> {
    match body {
        Value::Object(map) => Ok(map),
        other => Err(ClientError::NotAnObject {
            path: path.to_string(),
            found: json_kind(&other),
        }),
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

impl ClusterClient for InMemoryCluster {
    fn get<'a>(&'a self, path: &'a str) -> BoxFuture<'a, ProviderResult<Option<Value>>> {
        Box::pin(async move {
            let documents = self.documents.lock().await;
            Ok(documents.get(path).cloned().map(Value::Object))
        })
    }

    fn post<'a>(&'a self, path: &'a str, body: Value) -> BoxFuture<'a, ProviderResult<Value>> {
        Box::pin(self.create(path, body))
    }

    fn put<'a>(&'a self, path: &'a str, body: Value) -> BoxFuture<'a, ProviderResult<()>> {
        Box::pin(self.merge(path, body))
    }

    fn delete<'a>(&'a self, path: &'a str) -> BoxFuture<'a, ProviderResult<()>> {
        Box::pin(self.remove(path))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[tokio::test]
    async fn post_assigns_sequential_ids() {
        let cluster = InMemoryCluster::new();
        let first = cluster.post("/c", json!({"name": "a"})).await.unwrap();
        let second = cluster.post("/c", json!({"name": "b"})).await.unwrap();
        assert_eq!(first, json!({"id": "1"}));
        assert_eq!(second, json!({"id": "2"}));
        assert_eq!(
            cluster.get("/c/2").await.unwrap(),
            Some(json!({"id": "2", "name": "b"}))
        );
    }

    #[tokio::test]
    async fn missing_document_is_none() {
        let cluster = InMemoryCluster::new();
        assert_eq!(cluster.get("/c/9").await.unwrap(), None);
        assert!(cluster.delete("/c/9").await.is_err());
        assert!(cluster.put("/c/9", json!({})).await.is_err());
    }

    #[tokio::test]
    async fn put_merges_top_level_keys() {
        let cluster = InMemoryCluster::new();
        cluster
            .insert("/c/1", json!({"name": "a", "size": 1, "note": "x"}))
            .await
            .unwrap();
        cluster
            .put("/c/1", json!({"size": 2, "note": null}))
            .await
            .unwrap();
        assert_eq!(
            cluster.get("/c/1").await.unwrap(),
            Some(json!({"name": "a", "size": 2, "note": null}))
        );
    }

    #[tokio::test]
    async fn body_must_be_an_object() {
        let cluster = InMemoryCluster::new();
        let err = cluster.post("/c", json!([1, 2])).await.unwrap_err();
        assert!(err.to_string().contains("got array"));
        assert!(cluster.is_empty().await);
    }
}

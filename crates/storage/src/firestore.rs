//! Firestore Document Source
//!
//! Reads `{collection}/{document}` through the Firestore REST API and decodes
//! the typed field values into a [`SensorSnapshot`].

use crate::{SnapshotDocument, StorageError};
use chrono::{DateTime, Utc};
use feature_engine::SensorSnapshot;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::time::Duration;
use tracing::{debug, info, warn};

/// Firestore connection configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct FirestoreConfig {
    /// REST endpoint root
    pub base_url: String,
    /// Google Cloud project id
    pub project_id: String,
    pub database: String,
    pub collection: String,
    pub document: String,
    /// OAuth2 bearer token; requests are anonymous when unset
    pub access_token: Option<String>,
    /// HTTP request timeout (seconds)
    pub timeout_secs: u64,
}

impl Default for FirestoreConfig {
    fn default() -> Self {
        Self {
            base_url: "https://firestore.googleapis.com/v1".to_string(),
            project_id: String::new(),
            database: "(default)".to_string(),
            collection: "sensor_data".to_string(),
            document: "latest".to_string(),
            access_token: None,
            timeout_secs: 10,
        }
    }
}

/// Raw Firestore document
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct FirestoreDocument {
    #[serde(default)]
    fields: Map<String, Value>,
    update_time: Option<DateTime<Utc>>,
}

impl FirestoreDocument {
    fn field(&self, key: &str) -> Option<f64> {
        let value = self.fields.get(key)?;
        let decoded = decode_number(value);
        if decoded.is_none() {
            warn!("Ignoring non-numeric sensor field {}: {}", key, value);
        }
        decoded
    }

    fn into_snapshot_document(self) -> SnapshotDocument {
        let snapshot = SensorSnapshot {
            n: self.field("N"),
            p: self.field("P"),
            k: self.field("K"),
            ph: self.field("pH"),
            moist: self.field("Moist"),
        };
        SnapshotDocument {
            snapshot,
            update_time: self.update_time,
        }
    }
}

/// Decode a Firestore typed value holding a number.
///
/// `integerValue` is transported as a string, `doubleValue` as a JSON number.
fn decode_number(value: &Value) -> Option<f64> {
    if let Some(v) = value.get("doubleValue") {
        return v.as_f64().or_else(|| v.as_str().and_then(|s| s.parse().ok()));
    }
    if let Some(v) = value.get("integerValue") {
        return v
            .as_str()
            .and_then(|s| s.parse::<i64>().ok())
            .or_else(|| v.as_i64())
            .map(|i| i as f64);
    }
    None
}

/// Firestore REST client for the latest snapshot document
pub struct FirestoreSource {
    client: reqwest::Client,
    config: FirestoreConfig,
}

impl FirestoreSource {
    /// Create a new source
    pub fn new(config: FirestoreConfig) -> Result<Self, StorageError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| StorageError::Connection(e.to_string()))?;

        info!(
            "Creating Firestore source for {}/{}/{}",
            config.project_id, config.collection, config.document
        );
        Ok(Self { client, config })
    }

    /// Full URL of the snapshot document
    pub fn document_url(&self) -> String {
        format!(
            "{}/projects/{}/databases/{}/documents/{}/{}",
            self.config.base_url.trim_end_matches('/'),
            self.config.project_id,
            self.config.database,
            self.config.collection,
            self.config.document
        )
    }

    /// Fetch the latest snapshot; `Ok(None)` if the document does not exist
    pub async fn fetch_latest(&self) -> Result<Option<SnapshotDocument>, StorageError> {
        let url = self.document_url();
        debug!("GET {}", url);

        let mut request = self.client.get(&url);
        if let Some(token) = &self.config.access_token {
            request = request.bearer_auth(token);
        }

        let response = request
            .send()
            .await
            .map_err(|e| StorageError::Connection(e.to_string()))?;

        let status = response.status();
        if status == reqwest::StatusCode::NOT_FOUND {
            debug!("Snapshot document not found");
            return Ok(None);
        }
        if !status.is_success() {
            return Err(StorageError::Http(status.as_u16()));
        }

        let document: FirestoreDocument = response
            .json()
            .await
            .map_err(|e| StorageError::Decode(e.to_string()))?;

        Ok(Some(document.into_snapshot_document()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpListener;

    const LATEST_DOCUMENT: &str = r#"{
        "name": "projects/terra/databases/(default)/documents/sensor_data/latest",
        "fields": {
            "N": {"integerValue": "12"},
            "P": {"integerValue": "5"},
            "K": {"doubleValue": 8.0},
            "pH": {"doubleValue": 6.2},
            "Moist": {"integerValue": "45"},
            "device": {"stringValue": "esp32-garden-01"}
        },
        "createTime": "2026-01-10T03:00:00.000000Z",
        "updateTime": "2026-01-12T08:30:15.123456Z"
    }"#;

    /// Serve one canned HTTP response and return the base URL
    async fn serve_once(status_line: &'static str, body: &'static str) -> String {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();

        tokio::spawn(async move {
            let (mut socket, _) = listener.accept().await.unwrap();
            let mut request = Vec::new();
            let mut buf = [0u8; 1024];
            while !request.windows(4).any(|w| w == b"\r\n\r\n") {
                let n = socket.read(&mut buf).await.unwrap();
                if n == 0 {
                    break;
                }
                request.extend_from_slice(&buf[..n]);
            }
            let response = format!(
                "HTTP/1.1 {}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
                status_line,
                body.len(),
                body
            );
            socket.write_all(response.as_bytes()).await.unwrap();
            socket.shutdown().await.ok();
        });

        format!("http://{}", addr)
    }

    fn source(base_url: String) -> FirestoreSource {
        FirestoreSource::new(FirestoreConfig {
            base_url,
            project_id: "terra".to_string(),
            ..Default::default()
        })
        .unwrap()
    }

    #[test]
    fn test_document_url() {
        let source = source("https://firestore.googleapis.com/v1/".to_string());
        assert_eq!(
            source.document_url(),
            "https://firestore.googleapis.com/v1/projects/terra/databases/(default)/documents/sensor_data/latest"
        );
    }

    #[test]
    fn test_decode_typed_fields() {
        let document: FirestoreDocument = serde_json::from_str(LATEST_DOCUMENT).unwrap();
        let decoded = document.into_snapshot_document();

        assert_eq!(decoded.snapshot, SensorSnapshot::new(12.0, 5.0, 8.0, 6.2, 45.0));
        assert_eq!(
            decoded.update_time.unwrap().to_rfc3339(),
            "2026-01-12T08:30:15.123456+00:00"
        );
    }

    #[test]
    fn test_decode_partial_document() {
        let document: FirestoreDocument = serde_json::from_str(
            r#"{"fields": {"pH": {"doubleValue": 5.5}, "K": {"stringValue": "high"}}}"#,
        )
        .unwrap();
        let snapshot = document.into_snapshot_document().snapshot;

        assert_eq!(snapshot.ph, Some(5.5));
        assert_eq!(snapshot.k, None);
        assert_eq!(snapshot.nitrogen(), 0.0);
    }

    #[test]
    fn test_decode_empty_document() {
        let document: FirestoreDocument = serde_json::from_str("{}").unwrap();
        let decoded = document.into_snapshot_document();
        assert_eq!(decoded.snapshot, SensorSnapshot::default());
        assert!(decoded.update_time.is_none());
    }

    #[tokio::test]
    async fn test_fetch_latest() {
        let base_url = serve_once("200 OK", LATEST_DOCUMENT).await;
        let document = source(base_url).fetch_latest().await.unwrap().unwrap();
        assert_eq!(document.snapshot.moisture(), 45.0);
    }

    #[tokio::test]
    async fn test_fetch_missing_document() {
        let base_url = serve_once("404 Not Found", r#"{"error": {"code": 404}}"#).await;
        assert!(source(base_url).fetch_latest().await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_fetch_server_error() {
        let base_url = serve_once("503 Service Unavailable", "{}").await;
        let err = source(base_url).fetch_latest().await.unwrap_err();
        assert!(matches!(err, StorageError::Http(503)));
    }
}

//! REST bridge client for the remote document store.
//!
//! Writes are plain JSON REST calls:
//!
//! - `POST   {base}/{collection}` - create, returns `{"id": "..."}`
//! - `PATCH  {base}/{collection}/{id}` - partial field update
//! - `DELETE {base}/{collection}/{id}` - delete
//!
//! Watching is one server-sent-events stream per collection at
//! `GET {base}/{collection}/events`; every event's `data:` payload is the
//! full current contents of the collection. The reader task reconnects
//! with a fixed delay after a stream failure and exits once the snapshot
//! receiver is dropped.

use std::time::Duration;

use market_lane_core::{CollectionKind, DocumentId};
use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;
use serde_json::{Map, Value};
use tokio::sync::mpsc;
use tracing::instrument;

use super::{Document, RemoteStore, Snapshot, SnapshotReceiver, StoreError};
use crate::config::RemoteStoreConfig;

const RECONNECT_DELAY: Duration = Duration::from_secs(2);

#[derive(Debug, Deserialize)]
struct CreatedResponse {
    id: String,
}

/// HTTP client for the store's REST bridge.
#[derive(Clone)]
pub struct RestRemoteStore {
    http: reqwest::Client,
    base_url: String,
    api_key: SecretString,
}

impl RestRemoteStore {
    /// Create a client from the store section of the admin config.
    #[must_use]
    pub fn new(config: &RemoteStoreConfig) -> Self {
        Self {
            http: reqwest::Client::new(),
            base_url: config.base_url.as_str().trim_end_matches('/').to_string(),
            api_key: config.api_key.clone(),
        }
    }

    fn collection_url(&self, kind: CollectionKind) -> String {
        format!("{}/{}", self.base_url, kind.as_str())
    }

    fn document_url(&self, kind: CollectionKind, id: &DocumentId) -> String {
        format!("{}/{}/{}", self.base_url, kind.as_str(), id.as_str())
    }

    async fn check_status(response: reqwest::Response) -> Result<reqwest::Response, StoreError> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let message = response.text().await.unwrap_or_default();
        Err(StoreError::Status {
            status: status.as_u16(),
            message,
        })
    }
}

impl RemoteStore for RestRemoteStore {
    #[instrument(skip(self))]
    async fn subscribe(&self, kind: CollectionKind) -> Result<SnapshotReceiver, StoreError> {
        let (tx, rx) = mpsc::unbounded_channel();
        let http = self.http.clone();
        let url = format!("{}/events", self.collection_url(kind));
        let api_key = self.api_key.clone();

        tokio::spawn(async move {
            watch_collection(http, url, api_key, kind, tx).await;
        });

        Ok(rx)
    }

    #[instrument(skip(self, fields))]
    async fn create(
        &self,
        kind: CollectionKind,
        fields: Map<String, Value>,
    ) -> Result<DocumentId, StoreError> {
        let response = self
            .http
            .post(self.collection_url(kind))
            .bearer_auth(self.api_key.expose_secret())
            .json(&fields)
            .send()
            .await?;

        let created: CreatedResponse = Self::check_status(response).await?.json().await?;
        tracing::info!(collection = %kind, id = %created.id, "Document created");
        Ok(DocumentId::new(created.id))
    }

    #[instrument(skip(self, fields))]
    async fn update(
        &self,
        kind: CollectionKind,
        id: &DocumentId,
        fields: Map<String, Value>,
    ) -> Result<(), StoreError> {
        let response = self
            .http
            .patch(self.document_url(kind, id))
            .bearer_auth(self.api_key.expose_secret())
            .json(&fields)
            .send()
            .await?;

        Self::check_status(response).await?;
        tracing::info!(collection = %kind, %id, "Document updated");
        Ok(())
    }

    #[instrument(skip(self))]
    async fn delete(&self, kind: CollectionKind, id: &DocumentId) -> Result<(), StoreError> {
        let response = self
            .http
            .delete(self.document_url(kind, id))
            .bearer_auth(self.api_key.expose_secret())
            .send()
            .await?;

        Self::check_status(response).await?;
        tracing::info!(collection = %kind, %id, "Document deleted");
        Ok(())
    }
}

/// Long-lived reader for one collection's event stream.
///
/// Runs until the snapshot receiver is dropped. Stream failures are logged
/// and followed by a reconnect; they are never surfaced to the subscriber,
/// which keeps observing the last good snapshot meanwhile.
async fn watch_collection(
    http: reqwest::Client,
    url: String,
    api_key: SecretString,
    kind: CollectionKind,
    tx: mpsc::UnboundedSender<Snapshot>,
) {
    loop {
        match http
            .get(&url)
            .bearer_auth(api_key.expose_secret())
            .header(reqwest::header::ACCEPT, "text/event-stream")
            .send()
            .await
        {
            Ok(response) if response.status().is_success() => {
                read_event_stream(response, kind, &tx).await;
            }
            Ok(response) => {
                tracing::warn!(
                    collection = %kind,
                    status = %response.status(),
                    "Watch stream refused"
                );
            }
            Err(e) => {
                tracing::warn!(collection = %kind, error = %e, "Watch stream failed to connect");
            }
        }

        // Wait out the reconnect delay, unless the subscriber goes away
        // first; a dropped receiver must release the stream promptly, not
        // on the next delivery attempt.
        tokio::select! {
            () = tx.closed() => {
                tracing::debug!(collection = %kind, "Watch stream released");
                return;
            }
            () = tokio::time::sleep(RECONNECT_DELAY) => {}
        }
    }
}

/// Forward every complete SSE event on `response` as a snapshot until the
/// stream ends or the subscriber goes away.
async fn read_event_stream(
    response: reqwest::Response,
    kind: CollectionKind,
    tx: &mpsc::UnboundedSender<Snapshot>,
) {
    use futures::StreamExt;

    let mut buffer = String::new();
    let mut byte_stream = std::pin::pin!(response.bytes_stream());

    loop {
        // A quiet stream yields no chunks, so losing the subscriber has to
        // be observed directly rather than on the next failed send.
        let chunk_result = tokio::select! {
            () = tx.closed() => {
                tracing::debug!(collection = %kind, "Watch stream released mid-read");
                return;
            }
            next = byte_stream.next() => match next {
                Some(chunk_result) => chunk_result,
                None => return,
            },
        };

        let chunk = match chunk_result {
            Ok(chunk) => chunk,
            Err(e) => {
                tracing::warn!(collection = %kind, error = %e, "Watch stream interrupted");
                return;
            }
        };

        let Ok(text) = std::str::from_utf8(&chunk) else {
            tracing::warn!(collection = %kind, "Watch stream sent invalid UTF-8");
            return;
        };
        buffer.push_str(text);

        while let Some(event) = extract_sse_event(&mut buffer) {
            match parse_snapshot_event(&event) {
                Some(Ok(snapshot)) => {
                    if tx.send(snapshot).is_err() {
                        return;
                    }
                }
                Some(Err(e)) => {
                    tracing::warn!(collection = %kind, error = %e, "Discarding bad snapshot event");
                }
                None => {}
            }
        }
    }
}

/// Pop one complete SSE event off the front of `buffer`, if present.
fn extract_sse_event(buffer: &mut String) -> Option<String> {
    // SSE events are separated by double newlines
    buffer.find("\n\n").map(|idx| {
        let event = buffer[..idx].to_string();
        *buffer = buffer[idx + 2..].to_string();
        event
    })
}

/// Parse an SSE event's `data:` payload into a full snapshot.
fn parse_snapshot_event(event: &str) -> Option<Result<Snapshot, StoreError>> {
    let mut data_line = None;

    for line in event.lines() {
        if let Some(stripped) = line.strip_prefix("data: ") {
            data_line = Some(stripped);
        }
    }

    let data = data_line?;
    match serde_json::from_str::<Vec<Document>>(data) {
        Ok(snapshot) => Some(Ok(snapshot)),
        Err(e) => Some(Err(StoreError::Parse(e))),
    }
}

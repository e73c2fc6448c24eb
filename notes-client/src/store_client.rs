//! Typed HTTP client for the remote notes collection.
//!
//! Four calls against `{base}/notes`, each sent once: no retries, no timeouts
//! beyond reqwest defaults, no local state.

use async_trait::async_trait;
use notes_types::{Note, NoteBody, NoteId};
use reqwest::{Response, StatusCode};
use serde::de::DeserializeOwned;
use std::fmt;

/// Which store call an error came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StoreOp {
    Create,
    List,
    Update,
    Delete,
}

impl StoreOp {
    pub fn as_str(&self) -> &'static str {
        match self {
            StoreOp::Create => "create",
            StoreOp::List => "list",
            StoreOp::Update => "update",
            StoreOp::Delete => "delete",
        }
    }
}

impl fmt::Display for StoreOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("{op} request failed: {source}")]
    Transport {
        op: StoreOp,
        #[source]
        source: reqwest::Error,
    },
    #[error("{op} returned HTTP {status}: {body}")]
    Status {
        op: StoreOp,
        status: StatusCode,
        body: String,
    },
    #[error("{op} response did not match the note shape: {source}")]
    Decode {
        op: StoreOp,
        #[source]
        source: serde_json::Error,
    },
}

impl StoreError {
    pub fn op(&self) -> StoreOp {
        match self {
            StoreError::Transport { op, .. }
            | StoreError::Status { op, .. }
            | StoreError::Decode { op, .. } => *op,
        }
    }

    /// Network failure or non-2xx response. Decode failures are reported
    /// separately so a misbehaving store can be told apart in logs.
    pub fn is_remote_failure(&self) -> bool {
        matches!(self, StoreError::Transport { .. } | StoreError::Status { .. })
    }
}

/// The remote note collection as seen by the view-model
#[async_trait]
pub trait NoteStore: Send + Sync {
    /// `POST /notes`; returns the note with its store-assigned id
    async fn create(&self, body: &NoteBody) -> Result<Note, StoreError>;

    /// `GET /notes`; notes in whatever order the store returns them
    async fn list(&self) -> Result<Vec<Note>, StoreError>;

    /// `PUT /notes/{id}`; the response body is ignored
    async fn update(&self, id: &NoteId, body: &NoteBody) -> Result<(), StoreError>;

    /// `DELETE /notes/{id}`
    async fn delete(&self, id: &NoteId) -> Result<(), StoreError>;
}

pub struct HttpNoteStore {
    base_url: String,
    client: reqwest::Client,
}

impl HttpNoteStore {
    pub fn new(base_url: &str) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            client: reqwest::Client::new(),
        }
    }

    fn collection_url(&self) -> String {
        format!("{}/notes", self.base_url)
    }

    fn note_url(&self, id: &NoteId) -> String {
        format!(
            "{}/notes/{}",
            self.base_url,
            urlencoding::encode(&id.to_string())
        )
    }
}

#[async_trait]
impl NoteStore for HttpNoteStore {
    async fn create(&self, body: &NoteBody) -> Result<Note, StoreError> {
        let op = StoreOp::Create;
        let resp = self
            .client
            .post(self.collection_url())
            .json(body)
            .send()
            .await
            .map_err(|source| StoreError::Transport { op, source })?;

        let note: Note = decode(op, check_status(op, resp).await?).await?;
        log::debug!("[STORE] Created note {}", note.id);
        Ok(note)
    }

    async fn list(&self) -> Result<Vec<Note>, StoreError> {
        let op = StoreOp::List;
        let resp = self
            .client
            .get(self.collection_url())
            .send()
            .await
            .map_err(|source| StoreError::Transport { op, source })?;

        let notes: Vec<Note> = decode(op, check_status(op, resp).await?).await?;
        log::debug!("[STORE] Listed {} notes", notes.len());
        Ok(notes)
    }

    async fn update(&self, id: &NoteId, body: &NoteBody) -> Result<(), StoreError> {
        let op = StoreOp::Update;
        let resp = self
            .client
            .put(self.note_url(id))
            .json(body)
            .send()
            .await
            .map_err(|source| StoreError::Transport { op, source })?;

        check_status(op, resp).await?;
        log::debug!("[STORE] Updated note {}", id);
        Ok(())
    }

    async fn delete(&self, id: &NoteId) -> Result<(), StoreError> {
        let op = StoreOp::Delete;
        let resp = self
            .client
            .delete(self.note_url(id))
            .send()
            .await
            .map_err(|source| StoreError::Transport { op, source })?;

        check_status(op, resp).await?;
        log::debug!("[STORE] Deleted note {}", id);
        Ok(())
    }
}

async fn check_status(op: StoreOp, resp: Response) -> Result<Response, StoreError> {
    let status = resp.status();
    if status.is_success() {
        return Ok(resp);
    }
    let body = resp.text().await.unwrap_or_default();
    Err(StoreError::Status { op, status, body })
}

async fn decode<T: DeserializeOwned>(op: StoreOp, resp: Response) -> Result<T, StoreError> {
    let bytes = resp
        .bytes()
        .await
        .map_err(|source| StoreError::Transport { op, source })?;
    serde_json::from_slice(&bytes).map_err(|source| StoreError::Decode { op, source })
}

//! Test doubles for the remote notes collection.

use crate::store_client::{NoteStore, StoreError, StoreOp};
use async_trait::async_trait;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::Json;
use axum::routing::{get, put};
use notes_types::{Note, NoteBody, NoteId};
use parking_lot::Mutex;
use std::collections::{HashSet, VecDeque};
use std::sync::Arc;
use tokio::sync::oneshot;

// ── In-memory store ─────────────────────────────────

#[derive(Default)]
struct MemoryInner {
    next_id: i64,
    notes: Vec<Note>,
    calls: Vec<StoreOp>,
    failing: HashSet<StoreOp>,
    list_gates: VecDeque<oneshot::Receiver<Vec<Note>>>,
}

/// `NoteStore` backed by a Vec, recording every call
#[derive(Default)]
pub struct MemoryStore {
    inner: Mutex<MemoryInner>,
}

impl MemoryStore {
    pub fn with_notes(notes: Vec<Note>) -> Self {
        let next_id = notes
            .iter()
            .filter_map(|n| match &n.id {
                NoteId::Number(id) => id.as_i64(),
                NoteId::Text(_) => None,
            })
            .max()
            .unwrap_or(0);
        Self {
            inner: Mutex::new(MemoryInner {
                next_id,
                notes,
                ..Default::default()
            }),
        }
    }

    /// Every store call made so far, in order
    pub fn calls(&self) -> Vec<StoreOp> {
        self.inner.lock().calls.clone()
    }

    pub fn notes(&self) -> Vec<Note> {
        self.inner.lock().notes.clone()
    }

    /// Make every subsequent `op` call fail with HTTP 500
    pub fn fail(&self, op: StoreOp) {
        self.inner.lock().failing.insert(op);
    }

    pub fn recover(&self, op: StoreOp) {
        self.inner.lock().failing.remove(&op);
    }

    /// Hold the next `list()` call until the returned sender provides its result
    pub fn gate_next_list(&self) -> oneshot::Sender<Vec<Note>> {
        let (tx, rx) = oneshot::channel();
        self.inner.lock().list_gates.push_back(rx);
        tx
    }

    fn record(&self, op: StoreOp) -> Result<(), StoreError> {
        let mut inner = self.inner.lock();
        inner.calls.push(op);
        if inner.failing.contains(&op) {
            return Err(StoreError::Status {
                op,
                status: reqwest::StatusCode::INTERNAL_SERVER_ERROR,
                body: "injected failure".to_string(),
            });
        }
        Ok(())
    }
}

#[async_trait]
impl NoteStore for MemoryStore {
    async fn create(&self, body: &NoteBody) -> Result<Note, StoreError> {
        self.record(StoreOp::Create)?;
        let mut inner = self.inner.lock();
        inner.next_id += 1;
        let note = Note::new(inner.next_id, body.text.clone());
        inner.notes.push(note.clone());
        Ok(note)
    }

    async fn list(&self) -> Result<Vec<Note>, StoreError> {
        self.record(StoreOp::List)?;
        let gate = self.inner.lock().list_gates.pop_front();
        match gate {
            Some(rx) => Ok(rx.await.unwrap_or_default()),
            None => Ok(self.notes()),
        }
    }

    async fn update(&self, id: &NoteId, body: &NoteBody) -> Result<(), StoreError> {
        self.record(StoreOp::Update)?;
        let mut inner = self.inner.lock();
        match inner.notes.iter_mut().find(|n| &n.id == id) {
            Some(note) => {
                note.text = body.text.clone();
                Ok(())
            }
            None => Err(not_found(StoreOp::Update)),
        }
    }

    async fn delete(&self, id: &NoteId) -> Result<(), StoreError> {
        self.record(StoreOp::Delete)?;
        let mut inner = self.inner.lock();
        let before = inner.notes.len();
        inner.notes.retain(|n| &n.id != id);
        if inner.notes.len() == before {
            return Err(not_found(StoreOp::Delete));
        }
        Ok(())
    }
}

fn not_found(op: StoreOp) -> StoreError {
    StoreError::Status {
        op,
        status: reqwest::StatusCode::NOT_FOUND,
        body: "note not found".to_string(),
    }
}

// ── In-process HTTP server ──────────────────────────

#[derive(Default)]
struct ServerNotes {
    next_id: i64,
    notes: Vec<Note>,
    requests: Vec<String>,
}

type SharedNotes = Arc<Mutex<ServerNotes>>;

/// A `/notes` collection served over real HTTP on a loopback port
pub struct FakeServer {
    pub base_url: String,
    state: SharedNotes,
}

impl FakeServer {
    /// Requests received under `/notes`, as "METHOD /path"
    pub fn requests(&self) -> Vec<String> {
        self.state.lock().requests.clone()
    }
}

pub async fn spawn_fake_server() -> FakeServer {
    spawn_fake_server_with(Vec::new()).await
}

/// Serve a collection seeded with `notes`; new notes get numeric ids
pub async fn spawn_fake_server_with(notes: Vec<Note>) -> FakeServer {
    let state: SharedNotes = Arc::new(Mutex::new(ServerNotes {
        notes,
        ..Default::default()
    }));

    let app = axum::Router::new()
        .route("/notes", get(list_notes).post(create_note))
        .route("/notes/:id", put(update_note).delete(delete_note))
        .route(
            "/broken/notes",
            get(|| async { r#"[{"text":"missing id"}]"# })
                .post(|| async { (StatusCode::CREATED, r#"{"created":true}"#) }),
        )
        .with_state(state.clone());

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("Failed to bind");
    let addr = listener.local_addr().expect("No local addr");

    tokio::spawn(async move {
        axum::serve(listener, app).await.expect("Server error");
    });

    FakeServer {
        base_url: format!("http://{}", addr),
        state,
    }
}

// GET /notes
async fn list_notes(State(state): State<SharedNotes>) -> Json<Vec<Note>> {
    let mut notes = state.lock();
    notes.requests.push("GET /notes".to_string());
    Json(notes.notes.clone())
}

// POST /notes
async fn create_note(
    State(state): State<SharedNotes>,
    Json(body): Json<NoteBody>,
) -> (StatusCode, Json<Note>) {
    let mut notes = state.lock();
    notes.requests.push("POST /notes".to_string());
    notes.next_id += 1;
    let note = Note::new(notes.next_id, body.text);
    notes.notes.push(note.clone());
    (StatusCode::CREATED, Json(note))
}

// PUT /notes/:id
async fn update_note(
    State(state): State<SharedNotes>,
    Path(id): Path<String>,
    Json(body): Json<NoteBody>,
) -> StatusCode {
    let mut notes = state.lock();
    notes.requests.push(format!("PUT /notes/{}", id));
    match notes.notes.iter_mut().find(|n| n.id.to_string() == id) {
        Some(note) => {
            note.text = body.text;
            StatusCode::OK
        }
        None => StatusCode::NOT_FOUND,
    }
}

// DELETE /notes/:id
async fn delete_note(State(state): State<SharedNotes>, Path(id): Path<String>) -> StatusCode {
    let mut notes = state.lock();
    notes.requests.push(format!("DELETE /notes/{}", id));
    let before = notes.notes.len();
    notes.notes.retain(|n| n.id.to_string() != id);
    if notes.notes.len() == before {
        StatusCode::NOT_FOUND
    } else {
        StatusCode::NO_CONTENT
    }
}

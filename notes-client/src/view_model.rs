//! Note list view-model — the state behind the notes page.
//!
//! Holds the fetched notes, the new-note draft, the edit selection and the
//! loading flag. Every mutation goes to the store and is followed by a full
//! re-fetch; nothing is patched locally. Store errors are never caught here,
//! they propagate to whoever invoked the operation.

use crate::store_client::{NoteStore, StoreError};
use notes_types::{Note, NoteBody, NoteId};
use parking_lot::Mutex;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

/// Renderable view-model state
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NoteListState {
    /// Notes from the last applied fetch, in store order
    pub notes: Vec<Note>,
    pub draft_text: String,
    /// Note being edited. Refers to a note by id only and is cleared once the
    /// note disappears from `notes`.
    pub editing_id: Option<NoteId>,
    pub editing_text: String,
    pub is_loading: bool,
}

impl NoteListState {
    pub fn is_editing(&self, id: &NoteId) -> bool {
        self.editing_id.as_ref() == Some(id)
    }

    fn clear_editing(&mut self) {
        self.editing_id = None;
        self.editing_text.clear();
    }
}

#[derive(Default)]
struct ViewState {
    view: NoteListState,
    fetches_in_flight: usize,
    /// Sequence number of the fetch whose result is in `view.notes`
    applied_seq: u64,
}

pub struct NoteListViewModel {
    store: Arc<dyn NoteStore>,
    state: Mutex<ViewState>,
    fetch_seq: AtomicU64,
}

/// Keeps `is_loading` set while alive; the flag clears when the last
/// in-flight fetch finishes, whether it succeeded, failed or was dropped.
struct FetchInFlight<'a> {
    state: &'a Mutex<ViewState>,
}

impl<'a> FetchInFlight<'a> {
    fn start(state: &'a Mutex<ViewState>) -> Self {
        let mut guard = state.lock();
        guard.fetches_in_flight += 1;
        guard.view.is_loading = true;
        Self { state }
    }
}

impl Drop for FetchInFlight<'_> {
    fn drop(&mut self) {
        let mut guard = self.state.lock();
        guard.fetches_in_flight = guard.fetches_in_flight.saturating_sub(1);
        guard.view.is_loading = guard.fetches_in_flight > 0;
    }
}

impl NoteListViewModel {
    /// Create an empty view-model. Callers mount it by awaiting `refresh()`.
    pub fn new(store: Arc<dyn NoteStore>) -> Self {
        Self {
            store,
            state: Mutex::new(ViewState::default()),
            fetch_seq: AtomicU64::new(0),
        }
    }

    /// Copy of the current state for rendering
    pub fn snapshot(&self) -> NoteListState {
        self.state.lock().view.clone()
    }

    pub fn notes(&self) -> Vec<Note> {
        self.state.lock().view.notes.clone()
    }

    pub fn set_draft_text(&self, text: impl Into<String>) {
        self.state.lock().view.draft_text = text.into();
    }

    pub fn set_editing_text(&self, text: impl Into<String>) {
        self.state.lock().view.editing_text = text.into();
    }

    /// Re-fetch the whole collection and replace `notes`.
    ///
    /// Overlapping calls are not deduplicated; each one is numbered when it
    /// starts and a response older than the one already applied is dropped.
    pub async fn refresh(&self) -> Result<(), StoreError> {
        let seq = self.fetch_seq.fetch_add(1, Ordering::SeqCst) + 1;
        let _in_flight = FetchInFlight::start(&self.state);

        let notes = self.store.list().await?;

        let mut state = self.state.lock();
        if seq <= state.applied_seq {
            log::debug!(
                "[NOTES] Discarding stale fetch #{} (already showing #{})",
                seq,
                state.applied_seq
            );
            return Ok(());
        }
        state.applied_seq = seq;

        let editing_gone = state
            .view
            .editing_id
            .as_ref()
            .is_some_and(|id| !notes.iter().any(|n| &n.id == id));
        if editing_gone {
            state.view.clear_editing();
        }

        state.view.notes = notes;
        Ok(())
    }

    /// Create a note from the draft, clear the draft and re-fetch.
    /// Does nothing while the draft is empty.
    pub async fn create_from_draft(&self) -> Result<(), StoreError> {
        let text = self.state.lock().view.draft_text.clone();
        if text.is_empty() {
            log::debug!("[NOTES] Empty draft, nothing to create");
            return Ok(());
        }

        let created = self.store.create(&NoteBody::new(text)).await?;
        log::info!("[NOTES] Created note {}", created.id);

        self.state.lock().view.draft_text.clear();
        self.refresh().await
    }

    /// Select `id` for editing with an empty buffer. No I/O.
    pub fn begin_edit(&self, id: NoteId) {
        let mut state = self.state.lock();
        state.view.editing_id = Some(id);
        state.view.editing_text.clear();
    }

    /// Leave editing without saving
    pub fn cancel_edit(&self) {
        self.state.lock().view.clear_editing();
    }

    /// Save the edit buffer to `id`, leave editing and re-fetch.
    /// Does nothing while the buffer is empty.
    pub async fn commit_edit(&self, id: &NoteId) -> Result<(), StoreError> {
        let text = self.state.lock().view.editing_text.clone();
        if text.is_empty() {
            log::debug!("[NOTES] Empty edit buffer, nothing to save for {}", id);
            return Ok(());
        }

        self.store.update(id, &NoteBody::new(text)).await?;
        log::info!("[NOTES] Updated note {}", id);

        self.state.lock().view.clear_editing();
        self.refresh().await
    }

    /// Delete `id` and re-fetch. Clears the edit selection if it pointed at `id`.
    pub async fn delete_note(&self, id: &NoteId) -> Result<(), StoreError> {
        self.store.delete(id).await?;
        log::info!("[NOTES] Deleted note {}", id);

        {
            let mut state = self.state.lock();
            if state.view.is_editing(id) {
                state.view.clear_editing();
            }
        }
        self.refresh().await
    }
}

//! Notes client — keeps a list of notes in sync with a remote `/notes` collection.
//!
//! Reads commands from stdin and re-renders the list after each one.
//! Point it at a store with NOTES_API_BASE_URL (default: http://127.0.0.1:3000).

mod config;
mod console;
mod store_client;
mod view_model;

#[cfg(test)]
mod testing;

use config::Config;
use store_client::{HttpNoteStore, NoteStore};
use std::sync::Arc;
use view_model::NoteListViewModel;

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();
    env_logger::init();

    let config = Config::from_env();
    log::info!("Notes store: {}/notes", config.api_base_url);

    let store: Arc<dyn NoteStore> = Arc::new(HttpNoteStore::new(&config.api_base_url));
    let vm = NoteListViewModel::new(store);

    // Initial fetch. On failure the list stays empty until the next `refresh`.
    if let Err(e) = vm.refresh().await {
        log::error!("[NOTES] Initial fetch failed: {}", e);
    }

    let stdin = tokio::io::BufReader::new(tokio::io::stdin());
    if let Err(e) = console::run(&vm, stdin, tokio::io::stdout()).await {
        log::error!("Console I/O error: {}", e);
        std::process::exit(1);
    }
}

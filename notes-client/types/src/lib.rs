//! Wire records for the remote `/notes` collection.

use serde::{Deserialize, Serialize};
use serde_json::Number;
use std::fmt;

// =====================================================
// Domain Types
// =====================================================

/// Store-assigned note identifier.
///
/// Opaque to the client: whatever JSON form the store hands out (number or
/// string) is kept as-is and sent back verbatim in request paths. Numbers are
/// not narrowed to a Rust integer, so u64-range and fractional ids survive.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum NoteId {
    Number(Number),
    Text(String),
}

impl fmt::Display for NoteId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NoteId::Number(n) => write!(f, "{}", n),
            NoteId::Text(s) => f.write_str(s),
        }
    }
}

impl From<i64> for NoteId {
    fn from(n: i64) -> Self {
        NoteId::Number(n.into())
    }
}

impl From<&str> for NoteId {
    fn from(s: &str) -> Self {
        NoteId::Text(s.to_string())
    }
}

/// A note as returned by the store
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Note {
    pub id: NoteId,
    pub text: String,
}

impl Note {
    pub fn new(id: impl Into<NoteId>, text: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            text: text.into(),
        }
    }
}

// =====================================================
// Request Types
// =====================================================

/// JSON body of create (`POST /notes`) and update (`PUT /notes/{id}`)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NoteBody {
    pub text: String,
}

impl NoteBody {
    pub fn new(text: impl Into<String>) -> Self {
        Self { text: text.into() }
    }
}

//! In-memory recommendation history.
//!
//! Append-only and process-local: a restart empties it, and that is the
//! intended durability level. Writes happen on the request path after
//! scoring, so a failed append is logged and swallowed rather than
//! failing an otherwise complete recommendation.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::sync::RwLock;
use uuid::Uuid;

/// One recorded recommendation event.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HistoryRecord {
    pub profile_ref: Uuid,
    pub top_roles: Vec<String>,
    pub scorer_backend: String,
    pub timestamp: DateTime<Utc>,
}

#[derive(Debug, Default)]
pub struct History {
    records: RwLock<Vec<HistoryRecord>>,
}

impl History {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn append(&self, record: HistoryRecord) {
        match self.records.write() {
            Ok(mut records) => records.push(record),
            Err(poisoned) => {
                tracing::warn!("history lock poisoned, appending anyway");
                poisoned.into_inner().push(record);
            }
        }
    }

    /// Snapshot in insertion order (oldest first).
    pub fn all(&self) -> Vec<HistoryRecord> {
        match self.records.read() {
            Ok(records) => records.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }

    pub fn len(&self) -> usize {
        match self.records.read() {
            Ok(records) => records.len(),
            Err(poisoned) => poisoned.into_inner().len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

//! Append-only journal of migration attempts.
//!
//! One JSONL event per attempted record migration, written after each
//! record settles. Diagnostic only: it records what happened, it is not a
//! staging log and cannot drive recovery of a half-completed move.

use serde::{Deserialize, Serialize};
use std::fs::OpenOptions;
use std::io::Write;
use std::path::PathBuf;
use ulid::Ulid;

#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct JournalEvent {
    pub ts: String,
    pub event_id: String,
    pub op: String,
    pub record_id: String,
    pub new_record_id: Option<String>,
    pub source: String,
    pub destination: String,
    pub status: String,
    pub dry_run: bool,
}

pub struct Journal {
    path: Option<PathBuf>,
}

impl Journal {
    /// Journal in the platform state dir (`chatshift/migrations.jsonl`).
    pub fn default_location() -> Self {
        let path = dirs::state_dir()
            .or_else(dirs::data_local_dir)
            .map(|dir| dir.join("chatshift").join("migrations.jsonl"));
        Journal { path }
    }

    pub fn at(path: PathBuf) -> Self {
        Journal { path: Some(path) }
    }

    /// No-op journal, for library callers that keep their own audit trail.
    pub fn disabled() -> Self {
        Journal { path: None }
    }

    /// Record one settled migration attempt. Journal failures never fail a
    /// migration: the stores are already consistent by the time this runs.
    pub fn record(
        &self,
        op: &str,
        record_id: &str,
        new_record_id: Option<&str>,
        source: &str,
        destination: &str,
        status: &str,
        dry_run: bool,
    ) {
        let Some(path) = &self.path else {
            return;
        };
        let event = JournalEvent {
            ts: now_iso(),
            event_id: Ulid::new().to_string(),
            op: op.to_string(),
            record_id: record_id.to_string(),
            new_record_id: new_record_id.map(str::to_string),
            source: source.to_string(),
            destination: destination.to_string(),
            status: status.to_string(),
            dry_run,
        };
        let Ok(line) = serde_json::to_string(&event) else {
            return;
        };
        if let Some(parent) = path.parent() {
            let _ = std::fs::create_dir_all(parent);
        }
        if let Ok(mut file) = OpenOptions::new().create(true).append(true).open(path) {
            let _ = writeln!(file, "{line}");
        }
    }
}

fn now_iso() -> String {
    use std::time::{SystemTime, UNIX_EPOCH};
    let secs = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_secs();
    format!("{secs}Z")
}

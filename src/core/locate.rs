//! Finding the store that owns a session, and the store behind a path.

use crate::core::db;
use crate::core::error::ChatshiftError;
use crate::core::paths;
use crate::core::session::{self, ArrayShape};
use crate::core::store::SessionStore;
use std::path::Path;

/// A session's current home: owning store and position in its array.
#[derive(Debug, Clone)]
pub struct Located {
    pub store: SessionStore,
    pub position: usize,
    pub shape: ArrayShape,
}

/// Scan every known store's array for the record. Workspace stores are
/// scanned before the global one, matching listing order.
pub fn locate_record(
    stores: &[SessionStore],
    identifier: &str,
) -> Result<Located, ChatshiftError> {
    for store in stores {
        let conn = db::open_ro(&store.db_path)?;
        let array = session::read_session_array(&conn)?;
        for (position, record) in array.records.iter().enumerate() {
            if session::record_identifier(record) == Some(identifier) {
                return Ok(Located {
                    store: store.clone(),
                    position,
                    shape: array.shape,
                });
            }
        }
    }
    Err(ChatshiftError::RecordNotFound(identifier.to_string()))
}

/// The workspace store associated with `path`. Exact match on normalized
/// paths only; this never creates a store, because store directory names
/// come from an editor-internal hashing convention we do not reproduce.
pub fn locate_destination<'a>(
    stores: &'a [SessionStore],
    path: &Path,
) -> Result<&'a SessionStore, ChatshiftError> {
    stores
        .iter()
        .filter(|store| !store.is_global())
        .find(|store| {
            store
                .folder
                .as_deref()
                .is_some_and(|folder| paths::paths_equivalent(folder, path))
        })
        .ok_or_else(|| ChatshiftError::DestinationNotFound(path.display().to_string()))
}

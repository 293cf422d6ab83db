//! Low-level access to a store file (`state.vscdb`).
//!
//! Two key-value tables matter: `ItemTable` (workspace + global state,
//! holds the session array) and `cursorDiskKV` (global store only, holds
//! per-message bubbles). Stores are always opened without the CREATE flag:
//! this tool never invents a store file.

use crate::core::error::ChatshiftError;
use rusqlite::types::ValueRef;
use rusqlite::{Connection, OpenFlags, OptionalExtension, params};
use std::path::Path;

pub const KV_TABLE: &str = "ItemTable";
pub const BLOB_TABLE: &str = "cursorDiskKV";

/// Bounded wait on a locked store. The editor holds its stores open with
/// long-lived connections; waiting longer than this just hangs the batch.
const BUSY_TIMEOUT_MS: u64 = 500;

/// Open a store for writing. Fails fast with `DatabaseLocked` when the host
/// editor holds the file, `PermissionDenied` when the file is not ours to
/// write.
pub fn open_rw(db_path: &Path) -> Result<Connection, ChatshiftError> {
    open_with_flags(db_path, OpenFlags::SQLITE_OPEN_READ_WRITE)
}

/// Open a store read-only. Listing and dry runs never need more.
pub fn open_ro(db_path: &Path) -> Result<Connection, ChatshiftError> {
    open_with_flags(db_path, OpenFlags::SQLITE_OPEN_READ_ONLY)
}

fn open_with_flags(db_path: &Path, flags: OpenFlags) -> Result<Connection, ChatshiftError> {
    let conn = Connection::open_with_flags(db_path, flags | OpenFlags::SQLITE_OPEN_NO_MUTEX)
        .map_err(|e| classify_sqlite(db_path, e))?;
    conn.busy_timeout(std::time::Duration::from_millis(BUSY_TIMEOUT_MS))
        .map_err(|e| classify_sqlite(db_path, e))?;
    Ok(conn)
}

/// Map SQLite failures to the migration taxonomy. Busy/locked and
/// permission problems get their own codes so a caller can distinguish
/// "retry later" from "fix your filesystem".
pub fn classify_sqlite(db_path: &Path, err: rusqlite::Error) -> ChatshiftError {
    use rusqlite::ErrorCode;
    if let rusqlite::Error::SqliteFailure(code, _) = &err {
        match code.code {
            ErrorCode::DatabaseBusy | ErrorCode::DatabaseLocked => {
                return ChatshiftError::DatabaseLocked(db_path.display().to_string());
            }
            ErrorCode::PermissionDenied | ErrorCode::ReadOnly | ErrorCode::CannotOpen => {
                return ChatshiftError::PermissionDenied(db_path.display().to_string());
            }
            _ => {}
        }
    }
    ChatshiftError::RusqliteError(err)
}

/// SQLite takes its locks per statement, not at open time, so every query
/// runs through the same classification as opening does.
fn classify_for(conn: &Connection, err: rusqlite::Error) -> ChatshiftError {
    let path = Path::new(conn.path().unwrap_or("<unknown store>"));
    classify_sqlite(path, err)
}

fn table_exists(conn: &Connection, table: &str) -> Result<bool, ChatshiftError> {
    let found: Option<String> = conn
        .query_row(
            "SELECT name FROM sqlite_master WHERE type = 'table' AND name = ?1",
            params![table],
            |row| row.get(0),
        )
        .optional()
        .map_err(|e| classify_for(conn, e))?;
    Ok(found.is_some())
}

fn get_value(
    conn: &Connection,
    table: &str,
    key: &str,
) -> Result<Option<String>, ChatshiftError> {
    if !table_exists(conn, table)? {
        return Ok(None);
    }
    // The value cell holds the JSON payload as UTF-8 bytes. SQLite reports
    // it as either Text or Blob depending on how it was written; both carry
    // the same bytes, so accept either and reject anything else.
    let raw: Option<Vec<u8>> = conn
        .query_row(
            &format!("SELECT value FROM {table} WHERE key = ?1"),
            params![key],
            |row| match row.get_ref(0)? {
                ValueRef::Text(bytes) | ValueRef::Blob(bytes) => Ok(bytes.to_vec()),
                other => Err(rusqlite::Error::InvalidColumnType(
                    0,
                    "value".to_string(),
                    other.data_type(),
                )),
            },
        )
        .optional()
        .map_err(|e| classify_for(conn, e))?;
    Ok(raw.map(|bytes| String::from_utf8_lossy(&bytes).into_owned()))
}

fn put_value(
    conn: &Connection,
    table: &str,
    key: &str,
    value: &str,
) -> Result<(), ChatshiftError> {
    // Single statement: the whole value replaces atomically or not at all.
    conn.execute(
        &format!("INSERT OR REPLACE INTO {table} (key, value) VALUES (?1, ?2)"),
        params![key, value],
    )
    .map_err(|e| classify_for(conn, e))?;
    Ok(())
}

pub fn kv_get(conn: &Connection, key: &str) -> Result<Option<String>, ChatshiftError> {
    get_value(conn, KV_TABLE, key)
}

pub fn kv_put(conn: &Connection, key: &str, value: &str) -> Result<(), ChatshiftError> {
    put_value(conn, KV_TABLE, key, value)
}

pub fn blob_get(conn: &Connection, key: &str) -> Result<Option<String>, ChatshiftError> {
    get_value(conn, BLOB_TABLE, key)
}

pub fn blob_put(conn: &Connection, key: &str, value: &str) -> Result<(), ChatshiftError> {
    put_value(conn, BLOB_TABLE, key, value)
}

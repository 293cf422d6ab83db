//! Moving and copying sessions between stores.
//!
//! One record at a time: resolve its owning store, validate the
//! destination, then mutate source and destination arrays in sequence
//! (copy mode replicates bubble content instead of touching the source).
//! There is no transaction spanning the two store files; a destination
//! failure after a successful source write is reported as
//! `MIGRATION_FAILED` and the journal holds the trail.

use crate::core::db;
use crate::core::error::ChatshiftError;
use crate::core::idgen;
use crate::core::journal::Journal;
use crate::core::locate;
use crate::core::paths;
use crate::core::replicate;
use crate::core::session::{self, HEADERS_FIELD};
use crate::core::store::{self, SessionStore};
use serde::Serialize;
use serde_json::Value as JsonValue;
use std::path::Path;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MigrationMode {
    Move,
    Copy,
}

impl MigrationMode {
    pub fn as_str(self) -> &'static str {
        match self {
            MigrationMode::Move => "move",
            MigrationMode::Copy => "copy",
        }
    }
}

/// Outcome for one record. Mutation-phase failures land here, never as
/// `Err`, so sibling records in a batch still get their chance.
#[derive(Debug, Clone, Serialize)]
pub struct MigrationResult {
    pub success: bool,
    pub record_identifier: String,
    pub source_store: Option<String>,
    pub destination_store: String,
    pub mode: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub new_record_identifier: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_code: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    pub dry_run: bool,
}

/// Batch/workspace rollup. `results` is ordered exactly like the resolved
/// input identifiers, success or not.
#[derive(Debug, Clone, Serialize)]
pub struct AggregateResult {
    pub success: bool,
    pub total_count: usize,
    pub success_count: usize,
    pub failure_count: usize,
    pub results: Vec<MigrationResult>,
    pub dry_run: bool,
}

impl AggregateResult {
    fn from_results(results: Vec<MigrationResult>, dry_run: bool) -> Self {
        let success_count = results.iter().filter(|r| r.success).count();
        AggregateResult {
            success: success_count == results.len(),
            total_count: results.len(),
            success_count,
            failure_count: results.len() - success_count,
            results,
            dry_run,
        }
    }
}

/// Migrate the given sessions to the workspace at `destination_path`.
///
/// Request-level validation (unknown destination, empty input) is returned
/// as `Err` before anything is touched. Per-record failures come back as
/// failed results, one per identifier, in input order.
pub fn migrate_sessions(
    stores: &[SessionStore],
    identifiers: &[String],
    destination_path: &Path,
    mode: MigrationMode,
    dry_run: bool,
    journal: &Journal,
) -> Result<Vec<MigrationResult>, ChatshiftError> {
    if identifiers.is_empty() {
        return Err(ChatshiftError::InvalidInput(
            "no session identifiers given".to_string(),
        ));
    }
    let destination = locate::locate_destination(stores, destination_path)?;
    Ok(run_batch(stores, identifiers, destination, mode, dry_run, journal))
}

/// Migrate every session owned by the workspace at `source_path`.
///
/// Guards run once, before any mutation: an empty source fails
/// `NO_RECORDS_FOUND`; a non-empty destination fails
/// `DESTINATION_NOT_EMPTY` unless `force` is set. Force means additive
/// merge; destination records are never overwritten.
pub fn migrate_workspace(
    stores: &[SessionStore],
    source_path: &Path,
    destination_path: &Path,
    mode: MigrationMode,
    dry_run: bool,
    force: bool,
    journal: &Journal,
) -> Result<AggregateResult, ChatshiftError> {
    let destination = locate::locate_destination(stores, destination_path)?;
    if paths::paths_equivalent(source_path, destination_path) {
        return Err(ChatshiftError::SameLocation(
            destination_path.display().to_string(),
        ));
    }

    // A path with no matching store owns zero records: same failure as a
    // matching-but-empty one.
    let identifiers = match locate::locate_destination(stores, source_path) {
        Ok(source) => {
            let conn = db::open_ro(&source.db_path)?;
            let array = session::read_session_array(&conn)?;
            array
                .records
                .iter()
                .filter_map(session::record_identifier)
                .map(str::to_string)
                .collect::<Vec<_>>()
        }
        Err(ChatshiftError::DestinationNotFound(_)) => Vec::new(),
        Err(other) => return Err(other),
    };
    if identifiers.is_empty() {
        return Err(ChatshiftError::NoRecordsFound(
            source_path.display().to_string(),
        ));
    }

    if !force {
        let conn = db::open_ro(&destination.db_path)?;
        let array = session::read_session_array(&conn)?;
        if !array.records.is_empty() {
            return Err(ChatshiftError::DestinationNotEmpty(
                destination_path.display().to_string(),
            ));
        }
    }

    let results = run_batch(stores, &identifiers, destination, mode, dry_run, journal);
    Ok(AggregateResult::from_results(results, dry_run))
}

fn run_batch(
    stores: &[SessionStore],
    identifiers: &[String],
    destination: &SessionStore,
    mode: MigrationMode,
    dry_run: bool,
    journal: &Journal,
) -> Vec<MigrationResult> {
    let mut results = Vec::with_capacity(identifiers.len());
    for identifier in identifiers {
        let result = migrate_one_record(stores, identifier, destination, mode, dry_run);
        journal.record(
            mode.as_str(),
            identifier,
            result.new_record_identifier.as_deref(),
            result.source_store.as_deref().unwrap_or("?"),
            &result.destination_store,
            result.error_code.as_deref().unwrap_or("OK"),
            dry_run,
        );
        results.push(result);
    }
    results
}

/// One record through the phases: resolve, validate, then either plan
/// (dry run) or mutate source and destination.
fn migrate_one_record(
    stores: &[SessionStore],
    identifier: &str,
    destination: &SessionStore,
    mode: MigrationMode,
    dry_run: bool,
) -> MigrationResult {
    let destination_label = destination.db_path.display().to_string();
    let fail = |source: Option<String>, err: &ChatshiftError| MigrationResult {
        success: false,
        record_identifier: identifier.to_string(),
        source_store: source,
        destination_store: destination_label.clone(),
        mode: mode.as_str(),
        new_record_identifier: None,
        error_code: Some(classify_phase_error(err).to_string()),
        error: Some(err.to_string()),
        dry_run,
    };

    // Resolve: which store owns this record right now.
    let located = match locate::locate_record(stores, identifier) {
        Ok(located) => located,
        Err(err) => return fail(None, &err),
    };
    let source_label = located.store.db_path.display().to_string();

    // Validate: a record is never migrated onto itself.
    if paths::paths_equivalent(&located.store.db_path, &destination.db_path) {
        let err = ChatshiftError::SameLocation(destination.label());
        return fail(Some(source_label), &err);
    }

    if dry_run {
        // Plan only: nothing read beyond validation, nothing written.
        return MigrationResult {
            success: true,
            record_identifier: identifier.to_string(),
            source_store: Some(source_label),
            destination_store: destination_label.clone(),
            mode: mode.as_str(),
            new_record_identifier: None,
            error_code: None,
            error: None,
            dry_run,
        };
    }

    match apply_migration(&located.store, destination, stores, identifier, mode) {
        Ok(new_id) => MigrationResult {
            success: true,
            record_identifier: identifier.to_string(),
            source_store: Some(source_label),
            destination_store: destination_label.clone(),
            mode: mode.as_str(),
            new_record_identifier: new_id,
            error_code: None,
            error: None,
            dry_run,
        },
        Err(err) => fail(Some(source_label), &err),
    }
}

/// Mutation phase. Returns the freshly minted identifier in copy mode.
fn apply_migration(
    source: &SessionStore,
    destination: &SessionStore,
    stores: &[SessionStore],
    identifier: &str,
    mode: MigrationMode,
) -> Result<Option<String>, ChatshiftError> {
    // Source first. Move removes the record and writes the array back;
    // copy only reads.
    match mode {
        MigrationMode::Move => {
            let conn = db::open_rw(&source.db_path)?;
            let mut array = session::read_session_array(&conn)?;
            let position = array
                .records
                .iter()
                .position(|r| session::record_identifier(r) == Some(identifier))
                .ok_or_else(|| {
                    // Resolution already proved existence under this same
                    // read; losing the record here is a race, reported
                    // rather than silently ignored.
                    ChatshiftError::MigrationFailed(format!(
                        "session {identifier} vanished from {} between resolution and update",
                        source.db_path.display()
                    ))
                })?;
            let record = array.records.remove(position);
            session::write_session_array(&conn, &array)?;
            // Past this point the record only exists in memory. Any
            // failure before the destination write lands is a lost
            // record: always MIGRATION_FAILED, never a retryable code.
            append_to_destination(destination, record).map_err(|err| {
                ChatshiftError::MigrationFailed(format!(
                    "{err}; session {identifier} was removed from {} but never reached {}",
                    source.db_path.display(),
                    destination.db_path.display()
                ))
            })?;
            Ok(None)
        }
        MigrationMode::Copy => {
            let record = {
                let conn = db::open_ro(&source.db_path)?;
                let array = session::read_session_array(&conn)?;
                array
                    .records
                    .iter()
                    .find(|r| session::record_identifier(r) == Some(identifier))
                    .cloned()
                    .ok_or_else(|| {
                        ChatshiftError::MigrationFailed(format!(
                            "session {identifier} vanished from {} between resolution and update",
                            source.db_path.display()
                        ))
                    })?
            };

            let mut copied = record.clone();
            let new_id = idgen::new_session_id();
            session::set_record_identifier(&mut copied, &new_id);
            // Bubbles are written before the destination array so the
            // array never references content that does not exist yet.
            if let Some(headers) = session::header_list(&record) {
                if !headers.is_empty() {
                    let global = store::global_store(stores).ok_or_else(|| {
                        ChatshiftError::MigrationFailed(
                            "no global store found for bubble replication".to_string(),
                        )
                    })?;
                    let global_conn = db::open_rw(&global.db_path)?;
                    let rewritten = replicate::replicate_bubbles(
                        &global_conn,
                        identifier,
                        &new_id,
                        headers,
                    )?;
                    if let Some(obj) = copied.as_object_mut() {
                        obj.insert(HEADERS_FIELD.to_string(), JsonValue::Array(rewritten));
                    }
                }
            }

            append_to_destination(destination, copied)?;
            Ok(Some(new_id))
        }
    }
}

/// Append one record to the destination array and write it back. A store
/// whose array key does not exist yet is treated as empty, and the write
/// creates the key.
fn append_to_destination(
    destination: &SessionStore,
    record: JsonValue,
) -> Result<(), ChatshiftError> {
    let conn = db::open_rw(&destination.db_path)?;
    let mut array = session::read_session_array(&conn)?;
    array.records.push(record);
    session::write_session_array(&conn, &array)
}

/// Mutation-phase errors collapse to `MIGRATION_FAILED` except the two
/// codes a caller can act on directly (locked store, bad permissions).
fn classify_phase_error(err: &ChatshiftError) -> &'static str {
    match err {
        ChatshiftError::RecordNotFound(_)
        | ChatshiftError::SameLocation(_)
        | ChatshiftError::DatabaseLocked(_)
        | ChatshiftError::PermissionDenied(_) => err.code(),
        _ => "MIGRATION_FAILED",
    }
}

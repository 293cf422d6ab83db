//! Reading and writing a store's session array.
//!
//! The array lives under one of two key-value keys depending on editor
//! vintage. Whichever shape a store was read in, it is written back in:
//! migrating a session must never upgrade or downgrade a store's schema as
//! a side effect. Envelope fields that sit next to the array (selection
//! state and the like) are carried through writes untouched.

use crate::core::db;
use crate::core::error::ChatshiftError;
use crate::core::store::SessionStore;
use rusqlite::Connection;
use serde::Serialize;
use serde_json::{Map, Value as JsonValue};
use std::path::PathBuf;

/// Current shape: `composer.composerData` → `{"allComposers": [...]}`.
pub const COMPOSER_KEY: &str = "composer.composerData";
/// Legacy shape: panel chat data → `{"tabs": [...]}`.
pub const LEGACY_CHAT_KEY: &str = "workbench.panel.aichat.view.aichat.chatdata";

const COMPOSER_ARRAY_FIELD: &str = "allComposers";
const LEGACY_ARRAY_FIELD: &str = "tabs";
const COMPOSER_ID_FIELD: &str = "composerId";
const LEGACY_ID_FIELD: &str = "tabId";

/// Header list inside a composer record: the only internal reference
/// structure pointing at bubble content in the global store.
pub const HEADERS_FIELD: &str = "fullConversationHeadersOnly";
pub const BUBBLE_ID_FIELD: &str = "bubbleId";

/// Which wire shape the array was found under.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArrayShape {
    Composer,
    LegacyChat,
    /// Neither key present. Zero records, not an error; a write under this
    /// shape creates the current key.
    Missing,
}

impl ArrayShape {
    pub fn key(self) -> &'static str {
        match self {
            ArrayShape::Composer | ArrayShape::Missing => COMPOSER_KEY,
            ArrayShape::LegacyChat => LEGACY_CHAT_KEY,
        }
    }

    fn array_field(self) -> &'static str {
        match self {
            ArrayShape::Composer | ArrayShape::Missing => COMPOSER_ARRAY_FIELD,
            ArrayShape::LegacyChat => LEGACY_ARRAY_FIELD,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            ArrayShape::Composer => "composer",
            ArrayShape::LegacyChat => "legacy-chat",
            ArrayShape::Missing => "empty",
        }
    }
}

/// A store's session array plus everything needed to write it back without
/// disturbing shape or sibling fields.
#[derive(Debug, Clone)]
pub struct SessionArray {
    pub records: Vec<JsonValue>,
    pub shape: ArrayShape,
    /// Whether the key existed at read time.
    pub existed: bool,
    /// Envelope object the array lived in, minus the array itself. `None`
    /// when the stored value was a bare JSON array.
    envelope: Option<Map<String, JsonValue>>,
}

/// Read the session array, probing the current key first, then the legacy
/// one. A store with neither key has zero sessions.
pub fn read_session_array(conn: &Connection) -> Result<SessionArray, ChatshiftError> {
    for shape in [ArrayShape::Composer, ArrayShape::LegacyChat] {
        let Some(raw) = db::kv_get(conn, shape.key())? else {
            continue;
        };
        let parsed: JsonValue = serde_json::from_str(&raw)?;
        return Ok(match parsed {
            JsonValue::Array(records) => SessionArray {
                records,
                shape,
                existed: true,
                envelope: None,
            },
            JsonValue::Object(mut envelope) => {
                let records = match envelope.remove(shape.array_field()) {
                    Some(JsonValue::Array(items)) => items,
                    _ => Vec::new(),
                };
                SessionArray {
                    records,
                    shape,
                    existed: true,
                    envelope: Some(envelope),
                }
            }
            other => {
                return Err(ChatshiftError::MigrationFailed(format!(
                    "unexpected value under {}: {}",
                    shape.key(),
                    preview_type(&other)
                )));
            }
        });
    }
    Ok(SessionArray {
        records: Vec::new(),
        shape: ArrayShape::Missing,
        existed: false,
        envelope: None,
    })
}

/// Write the array back, single statement, same key and same envelope it
/// was read with.
pub fn write_session_array(
    conn: &Connection,
    array: &SessionArray,
) -> Result<(), ChatshiftError> {
    let value = match &array.envelope {
        None if array.shape != ArrayShape::Missing => {
            JsonValue::Array(array.records.clone())
        }
        maybe_envelope => {
            let mut envelope = maybe_envelope.clone().unwrap_or_default();
            envelope.insert(
                array.shape.array_field().to_string(),
                JsonValue::Array(array.records.clone()),
            );
            JsonValue::Object(envelope)
        }
    };
    db::kv_put(conn, array.shape.key(), &serde_json::to_string(&value)?)
}

fn preview_type(value: &JsonValue) -> &'static str {
    match value {
        JsonValue::Null => "null",
        JsonValue::Bool(_) => "bool",
        JsonValue::Number(_) => "number",
        JsonValue::String(_) => "string",
        JsonValue::Array(_) => "array",
        JsonValue::Object(_) => "object",
    }
}

/// A record's identifier, whichever vintage of field it carries. A record
/// moved between differently-shaped stores keeps its original field, so
/// both are always probed.
pub fn record_identifier(record: &JsonValue) -> Option<&str> {
    record
        .get(COMPOSER_ID_FIELD)
        .or_else(|| record.get(LEGACY_ID_FIELD))
        .and_then(JsonValue::as_str)
}

/// Rewrite a record's identifier in place (copy mode). Writes whichever
/// identifier field the record already carries.
pub fn set_record_identifier(record: &mut JsonValue, new_id: &str) {
    let field = if record.get(COMPOSER_ID_FIELD).is_some() {
        COMPOSER_ID_FIELD
    } else {
        LEGACY_ID_FIELD
    };
    if let Some(obj) = record.as_object_mut() {
        obj.insert(field.to_string(), JsonValue::String(new_id.to_string()));
    }
}

/// The bubble header list, when the record carries one. Legacy records
/// keep their bubbles inline and have no header list.
pub fn header_list(record: &JsonValue) -> Option<&Vec<JsonValue>> {
    record.get(HEADERS_FIELD).and_then(JsonValue::as_array)
}

/// One row of the human-facing listing. The listing's 1-based order is the
/// same order numeric tokens resolve against.
#[derive(Debug, Clone, Serialize)]
pub struct SessionSummary {
    pub identifier: String,
    pub title: String,
    pub created_at: Option<i64>,
    pub last_updated_at: Option<i64>,
    pub bubble_count: usize,
    pub store_db: PathBuf,
    pub store_label: String,
    pub shape: &'static str,
}

pub fn summarize(store: &SessionStore, record: &JsonValue, shape: ArrayShape) -> Option<SessionSummary> {
    let identifier = record_identifier(record)?.to_string();
    let title = record
        .get("name")
        .or_else(|| record.get("chatTitle"))
        .and_then(JsonValue::as_str)
        .unwrap_or("")
        .to_string();
    let bubble_count = header_list(record)
        .map(Vec::len)
        .or_else(|| record.get("bubbles").and_then(JsonValue::as_array).map(Vec::len))
        .unwrap_or(0);
    Some(SessionSummary {
        identifier,
        title,
        created_at: record.get("createdAt").and_then(JsonValue::as_i64),
        last_updated_at: record.get("lastUpdatedAt").and_then(JsonValue::as_i64),
        bubble_count,
        store_db: store.db_path.clone(),
        store_label: store.label(),
        shape: shape.as_str(),
    })
}

/// Full listing across stores, newest first, ties broken by identifier so
/// the order is stable between invocations. Records without an identifier
/// cannot be addressed or migrated and are left out.
pub fn list_sessions(stores: &[SessionStore]) -> Result<Vec<SessionSummary>, ChatshiftError> {
    let mut summaries = Vec::new();
    for store in stores {
        let conn = db::open_ro(&store.db_path)?;
        let array = read_session_array(&conn)?;
        for record in &array.records {
            if let Some(summary) = summarize(store, record, array.shape) {
                summaries.push(summary);
            }
        }
    }
    summaries.sort_by(|a, b| {
        b.last_updated_at
            .unwrap_or(0)
            .cmp(&a.last_updated_at.unwrap_or(0))
            .then_with(|| a.identifier.cmp(&b.identifier))
    });
    Ok(summaries)
}

//! Deep duplication of a session's bubble content under new identifiers.
//!
//! Copying a session is a small graph copy: mint a new bubble row for every
//! header entry, then splice the rewritten header list into the copied
//! record. The header list is the only internal reference structure a
//! record carries; if the format ever grows another one, it joins this
//! rewrite pass.

use crate::core::db;
use crate::core::error::ChatshiftError;
use crate::core::idgen;
use crate::core::session::BUBBLE_ID_FIELD;
use rusqlite::Connection;
use serde_json::Value as JsonValue;

/// Composite key of one bubble row in the global store.
pub fn bubble_key(record_id: &str, bubble_id: &str) -> String {
    format!("bubbleId:{record_id}:{bubble_id}")
}

/// Fetch one bubble payload, parsed.
pub fn load_bubble(
    global: &Connection,
    record_id: &str,
    bubble_id: &str,
) -> Result<Option<JsonValue>, ChatshiftError> {
    match db::blob_get(global, &bubble_key(record_id, bubble_id))? {
        Some(raw) => Ok(Some(serde_json::from_str(&raw)?)),
        None => Ok(None),
    }
}

/// Duplicate every bubble referenced by `headers` from `old_id`'s namespace
/// into `new_id`'s, returning the rewritten header list.
///
/// A header entry whose source bubble row is absent was already dangling;
/// it is carried over unchanged rather than silently dropped.
pub fn replicate_bubbles(
    global: &Connection,
    old_id: &str,
    new_id: &str,
    headers: &[JsonValue],
) -> Result<Vec<JsonValue>, ChatshiftError> {
    let mut rewritten = Vec::with_capacity(headers.len());
    for original in headers {
        let mut header = original.clone();
        let bubble_id = header
            .get(BUBBLE_ID_FIELD)
            .and_then(JsonValue::as_str)
            .map(str::to_string);
        let Some(bubble_id) = bubble_id else {
            rewritten.push(header);
            continue;
        };
        match db::blob_get(global, &bubble_key(old_id, &bubble_id))? {
            Some(payload) => {
                let fresh_id = idgen::new_bubble_id();
                db::blob_put(global, &bubble_key(new_id, &fresh_id), &payload)?;
                if let Some(obj) = header.as_object_mut() {
                    obj.insert(
                        BUBBLE_ID_FIELD.to_string(),
                        JsonValue::String(fresh_id),
                    );
                }
                rewritten.push(header);
            }
            None => rewritten.push(header),
        }
    }
    Ok(rewritten)
}

//! `chatshift export` — render one session, bubbles included, to
//! Markdown or JSON.

use crate::core::db;
use crate::core::error::ChatshiftError;
use crate::core::locate;
use crate::core::replicate;
use crate::core::resolve;
use crate::core::session::{self, BUBBLE_ID_FIELD};
use crate::core::store::{self, SessionStore};
use clap::{Parser, ValueEnum};
use serde_json::Value as JsonValue;
use std::path::PathBuf;

#[derive(Copy, Clone, Debug, Eq, PartialEq, ValueEnum)]
pub enum ExportAs {
    Markdown,
    Json,
}

#[derive(Parser, Debug)]
#[clap(name = "export", about = "Export a session with its message content.")]
pub struct ExportCli {
    /// Listing number or session identifier.
    #[clap(value_name = "SESSION")]
    pub token: String,
    /// Write to a file instead of stdout.
    #[clap(long)]
    pub out: Option<PathBuf>,
    /// Document format.
    #[clap(long = "as", value_enum, default_value = "markdown")]
    pub render: ExportAs,
}

pub fn handle_export_command(
    stores: &[SessionStore],
    cli: &ExportCli,
) -> Result<(), ChatshiftError> {
    let listing = session::list_sessions(stores)?;
    let identifiers = resolve::resolve_tokens(&[cli.token.clone()], &listing)?;
    let identifier = identifiers.first().ok_or_else(|| {
        ChatshiftError::InvalidInput("no session identifiers given".to_string())
    })?;

    let located = locate::locate_record(stores, identifier)?;
    let conn = db::open_ro(&located.store.db_path)?;
    let array = session::read_session_array(&conn)?;
    let record = array
        .records
        .iter()
        .find(|r| session::record_identifier(r) == Some(identifier))
        .ok_or_else(|| ChatshiftError::RecordNotFound(identifier.clone()))?;

    let bubbles = collect_bubbles(stores, identifier, record)?;

    let document = match cli.render {
        ExportAs::Json => serde_json::to_string_pretty(&serde_json::json!({
            "session": record,
            "bubbles": bubbles,
        }))?,
        ExportAs::Markdown => render_markdown(&located.store, record, &bubbles),
    };

    match &cli.out {
        Some(path) => {
            std::fs::write(path, &document)?;
            println!("Exported session {} to {}", identifier, path.display());
        }
        None => println!("{document}"),
    }
    Ok(())
}

/// Bubbles in conversation order: fetched from the global store for
/// composer sessions, read inline for legacy ones. Header entries whose
/// bubble row is gone are skipped; export renders what exists.
fn collect_bubbles(
    stores: &[SessionStore],
    identifier: &str,
    record: &JsonValue,
) -> Result<Vec<JsonValue>, ChatshiftError> {
    if let Some(headers) = session::header_list(record) {
        let Some(global) = store::global_store(stores) else {
            return Ok(Vec::new());
        };
        let global_conn = db::open_ro(&global.db_path)?;
        let mut bubbles = Vec::with_capacity(headers.len());
        for header in headers {
            let Some(bubble_id) = header.get(BUBBLE_ID_FIELD).and_then(JsonValue::as_str)
            else {
                continue;
            };
            if let Some(bubble) = replicate::load_bubble(&global_conn, identifier, bubble_id)? {
                bubbles.push(bubble);
            }
        }
        return Ok(bubbles);
    }
    Ok(record
        .get("bubbles")
        .and_then(JsonValue::as_array)
        .cloned()
        .unwrap_or_default())
}

fn render_markdown(
    store: &SessionStore,
    record: &JsonValue,
    bubbles: &[JsonValue],
) -> String {
    let title = record
        .get("name")
        .or_else(|| record.get("chatTitle"))
        .and_then(JsonValue::as_str)
        .unwrap_or("Untitled session");
    let mut doc = format!("# {title}\n\nWorkspace: {}\n", store.label());
    for bubble in bubbles {
        doc.push_str(&format!("\n## {}\n\n", bubble_role(bubble)));
        let text = bubble.get("text").and_then(JsonValue::as_str).unwrap_or("");
        if text.is_empty() {
            doc.push_str("_(no text)_\n");
        } else {
            doc.push_str(text);
            doc.push('\n');
        }
    }
    doc
}

fn bubble_role(bubble: &JsonValue) -> &'static str {
    match bubble.get("type") {
        Some(JsonValue::Number(n)) if n.as_i64() == Some(1) => "User",
        Some(JsonValue::Number(_)) => "Assistant",
        Some(JsonValue::String(s)) if s == "user" => "User",
        _ => "Assistant",
    }
}

//! `chatshift show` — one session's metadata and bubble headers.

use crate::commands::{OutputFormat, now_iso};
use crate::core::db;
use crate::core::error::ChatshiftError;
use crate::core::locate;
use crate::core::output;
use crate::core::resolve;
use crate::core::session::{self, BUBBLE_ID_FIELD};
use crate::core::store::SessionStore;
use clap::Parser;
use serde_json::Value as JsonValue;

#[derive(Parser, Debug)]
#[clap(name = "show", about = "Show one session's metadata and bubble headers.")]
pub struct ShowCli {
    /// Listing number or session identifier.
    #[clap(value_name = "SESSION")]
    pub token: String,
    /// Output format for this command group.
    #[clap(long, value_enum, default_value = "text")]
    pub format: OutputFormat,
}

pub fn handle_show_command(
    stores: &[SessionStore],
    cli: &ShowCli,
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

    let summary = session::summarize(&located.store, record, array.shape)
        .ok_or_else(|| ChatshiftError::RecordNotFound(identifier.clone()))?;
    let headers: Vec<&str> = session::header_list(record)
        .map(|list| {
            list.iter()
                .filter_map(|h| h.get(BUBBLE_ID_FIELD).and_then(JsonValue::as_str))
                .collect()
        })
        .unwrap_or_default();

    let out = serde_json::json!({
        "ts": now_iso(),
        "cmd": "show",
        "status": "ok",
        "session": &summary,
        "bubble_ids": headers,
    });

    match cli.format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&out)?),
        OutputFormat::Text => {
            let title = if summary.title.is_empty() {
                "(untitled)"
            } else {
                summary.title.as_str()
            };
            println!("Session {}", summary.identifier);
            println!("  title:        {}", title);
            println!("  workspace:    {}", summary.store_label);
            println!("  store:        {}", summary.store_db.display());
            println!("  shape:        {}", summary.shape);
            println!("  bubbles:      {}", summary.bubble_count);
            println!(
                "  last updated: {}",
                output::format_timestamp(summary.last_updated_at)
            );
            if !resolve::looks_like_uuid(&summary.identifier) {
                println!("  note: identifier is not UUID-shaped");
            }
        }
    }
    Ok(())
}

//! `chatshift list` — the numbered session listing.
//!
//! The numbers printed here are the canonical 1-based positions that
//! `move`, `copy`, `show`, and `export` accept as tokens. Filtering by
//! workspace narrows the rows shown but keeps each session's canonical
//! number, so a number on screen always means the same session.

use crate::commands::{OutputFormat, now_iso};
use crate::core::error::ChatshiftError;
use crate::core::output;
use crate::core::paths;
use crate::core::session;
use crate::core::store::SessionStore;
use clap::Parser;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[clap(name = "list", about = "List chat sessions across workspaces.")]
pub struct ListCli {
    /// Only show sessions owned by this workspace folder.
    #[clap(long)]
    pub path: Option<PathBuf>,
    /// Output format for this command group.
    #[clap(long, value_enum, default_value = "text")]
    pub format: OutputFormat,
}

pub fn handle_list_command(
    stores: &[SessionStore],
    cli: &ListCli,
) -> Result<(), ChatshiftError> {
    let listing = session::list_sessions(stores)?;
    let rows: Vec<(usize, &session::SessionSummary)> = listing
        .iter()
        .enumerate()
        .map(|(idx, summary)| (idx + 1, summary))
        .filter(|(_, summary)| match &cli.path {
            Some(path) => paths::paths_equivalent(&PathBuf::from(&summary.store_label), path),
            None => true,
        })
        .collect();

    let items: Vec<serde_json::Value> = rows
        .iter()
        .map(|(index, summary)| {
            serde_json::json!({
                "index": index,
                "identifier": summary.identifier,
                "title": summary.title,
                "bubbles": summary.bubble_count,
                "last_updated_at": summary.last_updated_at,
                "workspace": summary.store_label,
                "shape": summary.shape,
            })
        })
        .collect();
    let out = serde_json::json!({
        "ts": now_iso(),
        "cmd": "list",
        "status": "ok",
        "total": rows.len(),
        "items": items,
    });

    match cli.format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&out)?),
        OutputFormat::Text => {
            if rows.is_empty() {
                println!("No sessions found.");
                return Ok(());
            }
            println!("Sessions ({}):", rows.len());
            for (index, summary) in &rows {
                let title = if summary.title.is_empty() {
                    "(untitled)".to_string()
                } else {
                    output::compact_line(&summary.title, 48)
                };
                println!(
                    "{:>4}. {}  {:<51}  {:>3} bubbles  {}",
                    index,
                    output::short_id(&summary.identifier),
                    title,
                    summary.bubble_count,
                    summary.store_label,
                );
            }
        }
    }
    Ok(())
}

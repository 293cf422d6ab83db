//! `chatshift workspaces` — discovered stores and what they hold.

use crate::commands::{OutputFormat, now_iso};
use crate::core::db;
use crate::core::error::ChatshiftError;
use crate::core::session;
use crate::core::store::SessionStore;
use clap::Parser;

#[derive(Parser, Debug)]
#[clap(name = "workspaces", about = "List workspace stores and their session counts.")]
pub struct WorkspacesCli {
    /// Output format for this command group.
    #[clap(long, value_enum, default_value = "text")]
    pub format: OutputFormat,
}

pub fn handle_workspaces_command(
    stores: &[SessionStore],
    cli: &WorkspacesCli,
) -> Result<(), ChatshiftError> {
    let mut items = Vec::with_capacity(stores.len());
    for store in stores {
        let conn = db::open_ro(&store.db_path)?;
        let array = session::read_session_array(&conn)?;
        items.push(serde_json::json!({
            "workspace": store.label(),
            "db_path": store.db_path.display().to_string(),
            "kind": if store.is_global() { "global" } else { "workspace" },
            "sessions": array.records.len(),
            "shape": array.shape.as_str(),
        }));
    }
    let out = serde_json::json!({
        "ts": now_iso(),
        "cmd": "workspaces",
        "status": "ok",
        "total": items.len(),
        "items": items,
    });

    match cli.format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&out)?),
        OutputFormat::Text => {
            if stores.is_empty() {
                println!("No stores found.");
                return Ok(());
            }
            println!("Stores ({}):", stores.len());
            for item in out["items"].as_array().into_iter().flatten() {
                let workspace = item["workspace"].as_str().unwrap_or("?");
                let sessions = item["sessions"].as_u64().unwrap_or(0);
                let shape = item["shape"].as_str().unwrap_or("?");
                println!("- {} [{} sessions, {}]", workspace, sessions, shape);
            }
        }
    }
    Ok(())
}

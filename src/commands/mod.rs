//! Command surfaces: clap-derived CLIs and their handlers.
//!
//! Every handler builds a JSON envelope for its result and renders it as
//! text or pretty JSON per `--format`. The engine in `crate::core` does
//! the actual work.

pub mod export;
pub mod list;
pub mod migrate;
pub mod show;
pub mod workspaces;

use clap::ValueEnum;

#[derive(Copy, Clone, Debug, Eq, PartialEq, ValueEnum)]
pub enum OutputFormat {
    Text,
    Json,
}

pub(crate) fn now_iso() -> String {
    use std::time::{SystemTime, UNIX_EPOCH};
    let secs = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_secs();
    format!("{secs}Z")
}

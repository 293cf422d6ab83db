//! chatshift: move and copy Cursor chat sessions between project workspaces.
//!
//! Each project workspace gets its own SQLite key-value store
//! (`state.vscdb`); one global store holds large per-message content
//! ("bubbles"). Sessions live as JSON objects inside a single array value
//! in their workspace's store. chatshift relocates those objects across
//! stores — and, for copies, deep-replicates their bubbles under freshly
//! minted identifiers — without the editor's help.
//!
//! # Architecture
//!
//! - [`core`]: store discovery, the session-array read-modify-write
//!   protocol, identifier resolution, and the move/copy engine
//! - [`commands`]: clap command surfaces (`list`, `workspaces`, `show`,
//!   `export`, `move`, `copy`, `merge`) and their rendering
//!
//! # Guarantees and limits
//!
//! - A store is always written back in the schema shape it was read in.
//! - Array writes are single statements; one store never ends up with a
//!   partially written array.
//! - There is no transaction spanning two store files. A destination
//!   failure after a move's source write is reported as `MIGRATION_FAILED`
//!   and logged to the journal; it cannot be rolled back automatically.
//!
//! # Examples
//!
//! ```bash
//! # What is where
//! chatshift list
//! chatshift workspaces
//!
//! # Move session 3 from the listing into another project
//! chatshift move 3 --to ~/work/other-project
//!
//! # Duplicate a session, bubbles included
//! chatshift copy 58edbf4f-5c38-4a32-b2a1-ddfa381b2ad7 --to ~/work/other-project
//!
//! # Empty one workspace into another
//! chatshift merge ~/work/old-project --to ~/work/new-project --force
//! ```

pub mod commands;
pub mod core;

use crate::commands::{export, list, migrate as migrate_cmd, show, workspaces};
use crate::core::journal::Journal;
use crate::core::{config, error, store};

use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[clap(
    name = "chatshift",
    version = env!("CARGO_PKG_VERSION"),
    about = "Move and copy Cursor chat sessions between project workspaces."
)]
struct Cli {
    /// Editor storage root (defaults to the platform's Cursor user dir).
    #[clap(long, global = true)]
    storage_root: Option<PathBuf>,
    #[clap(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// List chat sessions across workspaces
    List(list::ListCli),
    /// List workspace stores and their session counts
    Workspaces(workspaces::WorkspacesCli),
    /// Show one session's metadata and bubble headers
    Show(show::ShowCli),
    /// Export a session with its message content
    Export(export::ExportCli),
    /// Move sessions to another workspace
    Move(migrate_cmd::MoveCli),
    /// Copy sessions (and their bubbles) to another workspace
    Copy(migrate_cmd::CopyCli),
    /// Migrate every session from one workspace to another
    Merge(migrate_cmd::MergeCli),
    /// Print version
    Version,
}

pub fn run() -> Result<(), error::ChatshiftError> {
    let cli = Cli::parse();

    if let Command::Version = cli.command {
        // Simple output for scripts/parsing.
        println!("v{}", env!("CARGO_PKG_VERSION"));
        return Ok(());
    }

    let config = config::load()?;
    let storage_root = config::resolve_storage_root(cli.storage_root.as_deref(), &config)?;
    let stores = store::discover_stores(&storage_root)?;
    let journal = Journal::default_location();

    match &cli.command {
        Command::List(args) => list::handle_list_command(&stores, args),
        Command::Workspaces(args) => workspaces::handle_workspaces_command(&stores, args),
        Command::Show(args) => show::handle_show_command(&stores, args),
        Command::Export(args) => export::handle_export_command(&stores, args),
        Command::Move(args) => migrate_cmd::handle_move_command(&stores, &journal, args),
        Command::Copy(args) => migrate_cmd::handle_copy_command(&stores, &journal, args),
        Command::Merge(args) => migrate_cmd::handle_merge_command(&stores, &journal, args),
        Command::Version => unreachable!(),
    }
}

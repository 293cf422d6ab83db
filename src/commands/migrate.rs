//! `chatshift move` / `chatshift copy` / `chatshift merge` — the
//! migration surfaces.

use crate::commands::{OutputFormat, now_iso};
use crate::core::error::ChatshiftError;
use crate::core::journal::Journal;
use crate::core::migrate::{self, MigrationMode, MigrationResult};
use crate::core::output;
use crate::core::resolve;
use crate::core::session;
use crate::core::store::SessionStore;
use clap::Parser;
use colored::Colorize;
use std::path::{Path, PathBuf};

#[derive(Parser, Debug)]
#[clap(name = "move", about = "Move sessions to another workspace.")]
pub struct MoveCli {
    /// Listing numbers or session identifiers (comma or space separated).
    #[clap(value_name = "SESSION", required = true)]
    pub tokens: Vec<String>,
    /// Destination workspace folder.
    #[clap(long)]
    pub to: PathBuf,
    /// Validate and print the plan without writing anything.
    #[clap(long)]
    pub dry_run: bool,
    /// Output format for this command group.
    #[clap(long, value_enum, default_value = "text")]
    pub format: OutputFormat,
}

#[derive(Parser, Debug)]
#[clap(name = "copy", about = "Copy sessions (and their bubbles) to another workspace.")]
pub struct CopyCli {
    /// Listing numbers or session identifiers (comma or space separated).
    #[clap(value_name = "SESSION", required = true)]
    pub tokens: Vec<String>,
    /// Destination workspace folder.
    #[clap(long)]
    pub to: PathBuf,
    /// Validate and print the plan without writing anything.
    #[clap(long)]
    pub dry_run: bool,
    /// Output format for this command group.
    #[clap(long, value_enum, default_value = "text")]
    pub format: OutputFormat,
}

#[derive(Parser, Debug)]
#[clap(name = "merge", about = "Migrate every session from one workspace to another.")]
pub struct MergeCli {
    /// Source workspace folder.
    #[clap(value_name = "SOURCE")]
    pub source: PathBuf,
    /// Destination workspace folder.
    #[clap(long)]
    pub to: PathBuf,
    /// Copy instead of move; the source keeps its sessions.
    #[clap(long)]
    pub copy: bool,
    /// Proceed even when the destination already has sessions (additive
    /// merge; nothing in the destination is overwritten).
    #[clap(long)]
    pub force: bool,
    /// Validate and print the plan without writing anything.
    #[clap(long)]
    pub dry_run: bool,
    /// Output format for this command group.
    #[clap(long, value_enum, default_value = "text")]
    pub format: OutputFormat,
}

pub fn handle_move_command(
    stores: &[SessionStore],
    journal: &Journal,
    cli: &MoveCli,
) -> Result<(), ChatshiftError> {
    run_migration(
        stores,
        journal,
        &cli.tokens,
        &cli.to,
        MigrationMode::Move,
        cli.dry_run,
        cli.format,
    )
}

pub fn handle_copy_command(
    stores: &[SessionStore],
    journal: &Journal,
    cli: &CopyCli,
) -> Result<(), ChatshiftError> {
    run_migration(
        stores,
        journal,
        &cli.tokens,
        &cli.to,
        MigrationMode::Copy,
        cli.dry_run,
        cli.format,
    )
}

pub fn handle_merge_command(
    stores: &[SessionStore],
    journal: &Journal,
    cli: &MergeCli,
) -> Result<(), ChatshiftError> {
    let mode = if cli.copy {
        MigrationMode::Copy
    } else {
        MigrationMode::Move
    };
    let aggregate = migrate::migrate_workspace(
        stores,
        &cli.source,
        &cli.to,
        mode,
        cli.dry_run,
        cli.force,
        journal,
    )?;

    match cli.format {
        OutputFormat::Json => {
            let out = serde_json::json!({
                "ts": now_iso(),
                "cmd": "merge",
                "status": if aggregate.success { "ok" } else { "partial" },
                "aggregate": &aggregate,
            });
            println!("{}", serde_json::to_string_pretty(&out)?);
        }
        OutputFormat::Text => {
            render_result_lines(&aggregate.results);
            render_summary(mode, &aggregate.results, aggregate.dry_run);
        }
    }

    if aggregate.success {
        Ok(())
    } else {
        Err(ChatshiftError::MigrationFailed(format!(
            "{} of {} sessions failed",
            aggregate.failure_count, aggregate.total_count
        )))
    }
}

fn run_migration(
    stores: &[SessionStore],
    journal: &Journal,
    tokens: &[String],
    to: &Path,
    mode: MigrationMode,
    dry_run: bool,
    format: OutputFormat,
) -> Result<(), ChatshiftError> {
    let listing = session::list_sessions(stores)?;
    let identifiers = resolve::resolve_tokens(tokens, &listing)?;
    let results =
        migrate::migrate_sessions(stores, &identifiers, to, mode, dry_run, journal)?;

    match format {
        OutputFormat::Json => {
            let failed = results.iter().filter(|r| !r.success).count();
            let out = serde_json::json!({
                "ts": now_iso(),
                "cmd": mode.as_str(),
                "status": if failed == 0 { "ok" } else { "partial" },
                "dry_run": dry_run,
                "results": &results,
            });
            println!("{}", serde_json::to_string_pretty(&out)?);
        }
        OutputFormat::Text => {
            render_result_lines(&results);
            render_summary(mode, &results, dry_run);
        }
    }

    let failed = results.iter().filter(|r| !r.success).count();
    if failed == 0 {
        Ok(())
    } else {
        Err(ChatshiftError::MigrationFailed(format!(
            "{failed} of {} sessions failed",
            results.len()
        )))
    }
}

fn render_result_lines(results: &[MigrationResult]) {
    for result in results {
        if result.success {
            if result.dry_run {
                println!(
                    "{} would {} {}  {} -> {}",
                    "▸".bright_cyan(),
                    result.mode,
                    output::short_id(&result.record_identifier),
                    result.source_store.as_deref().unwrap_or("?"),
                    result.destination_store,
                );
            } else {
                let new_id = result
                    .new_record_identifier
                    .as_deref()
                    .map(|id| format!(" (new id {})", output::short_id(id)))
                    .unwrap_or_default();
                println!(
                    "{} {} {} -> {}{}",
                    "✓".bright_green(),
                    past_tense(result.mode),
                    output::short_id(&result.record_identifier),
                    result.destination_store,
                    new_id,
                );
            }
        } else {
            println!(
                "{} {} [{}] {}",
                "✗".bright_red(),
                output::short_id(&result.record_identifier),
                result.error_code.as_deref().unwrap_or("?"),
                result.error.as_deref().unwrap_or(""),
            );
        }
    }
}

fn render_summary(mode: MigrationMode, results: &[MigrationResult], dry_run: bool) {
    let ok = results.iter().filter(|r| r.success).count();
    let failed = results.len() - ok;
    if failed == 0 {
        println!(
            "{} session(s) {}.",
            ok.to_string().bright_green(),
            past_tense(mode.as_str())
        );
    } else {
        println!(
            "{} {}, {} failed.",
            ok.to_string().bright_green(),
            past_tense(mode.as_str()),
            failed.to_string().bright_red()
        );
    }
    if dry_run {
        println!("Dry run: no stores were modified.");
    }
}

fn past_tense(mode: &str) -> &'static str {
    if mode == "copy" { "copied" } else { "moved" }
}

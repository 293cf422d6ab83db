//! Store handles and discovery.
//!
//! One store per project workspace under `workspaceStorage/<hash>/`, plus
//! exactly one global store under `globalStorage/`. The association between
//! a workspace store and its project folder lives in a `workspace.json`
//! side file that this tool reads and never writes. Store directory names
//! are an editor-internal hash of the folder path; we treat them as opaque
//! and never mint new ones.

use crate::core::error::ChatshiftError;
use crate::core::paths;
use std::fs;
use std::path::{Path, PathBuf};

pub const STORE_DB_NAME: &str = "state.vscdb";
pub const WORKSPACE_META_NAME: &str = "workspace.json";
const WORKSPACE_STORAGE_DIR: &str = "workspaceStorage";
const GLOBAL_STORAGE_DIR: &str = "globalStorage";

/// Store type discriminator.
///
/// - `Workspace`: one per project folder, owns that project's sessions
/// - `Global`: single store holding bubble content (and its own sessions)
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreKind {
    Workspace,
    Global,
}

/// Handle to one `state.vscdb` store.
#[derive(Debug, Clone)]
pub struct SessionStore {
    pub kind: StoreKind,
    /// Absolute path to the backing database file.
    pub db_path: PathBuf,
    /// Associated project folder (workspace stores only), decoded from the
    /// `file://` URI in `workspace.json`.
    pub folder: Option<PathBuf>,
}

impl SessionStore {
    pub fn is_global(&self) -> bool {
        self.kind == StoreKind::Global
    }

    /// Human-facing name: the project folder for workspace stores, a fixed
    /// tag for the global store.
    pub fn label(&self) -> String {
        match &self.folder {
            Some(folder) => folder.display().to_string(),
            None if self.is_global() => "(global)".to_string(),
            None => format!("(unassociated: {})", self.db_path.display()),
        }
    }
}

/// Platform-default storage root (`Cursor/User` under the OS config dir).
pub fn default_storage_root() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join("Cursor").join("User"))
}

/// Enumerate every store under a storage root: all workspace stores plus
/// the global store, in stable order (workspaces sorted by folder, global
/// last). A workspace directory without a readable `workspace.json` still
/// yields a store; it just cannot be matched as a destination by path.
pub fn discover_stores(storage_root: &Path) -> Result<Vec<SessionStore>, ChatshiftError> {
    if !storage_root.is_dir() {
        return Err(ChatshiftError::InvalidInput(format!(
            "storage root not found: {}",
            storage_root.display()
        )));
    }

    let mut stores = Vec::new();
    let workspace_dir = storage_root.join(WORKSPACE_STORAGE_DIR);
    if workspace_dir.is_dir() {
        for entry in fs::read_dir(&workspace_dir)? {
            let entry = entry?;
            if !entry.file_type()?.is_dir() {
                continue;
            }
            let db_path = entry.path().join(STORE_DB_NAME);
            if !db_path.is_file() {
                continue;
            }
            stores.push(SessionStore {
                kind: StoreKind::Workspace,
                db_path,
                folder: read_workspace_folder(&entry.path()),
            });
        }
    }
    stores.sort_by(|a, b| a.label().cmp(&b.label()));

    let global_db = storage_root.join(GLOBAL_STORAGE_DIR).join(STORE_DB_NAME);
    if global_db.is_file() {
        stores.push(SessionStore {
            kind: StoreKind::Global,
            db_path: global_db,
            folder: None,
        });
    }

    Ok(stores)
}

/// The single global store, if present under this root.
pub fn global_store(stores: &[SessionStore]) -> Option<&SessionStore> {
    stores.iter().find(|s| s.is_global())
}

fn read_workspace_folder(store_dir: &Path) -> Option<PathBuf> {
    let meta_path = store_dir.join(WORKSPACE_META_NAME);
    let raw = fs::read_to_string(meta_path).ok()?;
    let meta: serde_json::Value = serde_json::from_str(&raw).ok()?;
    let folder = meta.get("folder")?.as_str()?;
    Some(paths::folder_uri_to_path(folder))
}

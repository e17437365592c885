//! Persistence for the session between process runs.

use crate::error::{ClientError, Result};
use crate::models::{Credentials, Identity};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::RwLock;

/// What survives a restart.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PersistedSession {
    pub identity: Identity,
    #[serde(default)]
    pub credentials: Option<Credentials>,
}

/// Trait for session storage
pub trait SessionStore: Send + Sync {
    /// Read the persisted session, if any
    fn load(&self) -> Result<Option<PersistedSession>>;

    /// Replace the persisted session
    fn save(&self, session: &PersistedSession) -> Result<()>;

    /// Remove the persisted session (no-op if absent)
    fn clear(&self) -> Result<()>;
}

/// In-memory session store
#[derive(Default)]
pub struct MemorySessionStore {
    session: RwLock<Option<PersistedSession>>,
}

impl MemorySessionStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl SessionStore for MemorySessionStore {
    fn load(&self) -> Result<Option<PersistedSession>> {
        Ok(self
            .session
            .read()
            .map_err(|_| ClientError::Storage("session lock poisoned".into()))?
            .clone())
    }

    fn save(&self, session: &PersistedSession) -> Result<()> {
        *self
            .session
            .write()
            .map_err(|_| ClientError::Storage("session lock poisoned".into()))? =
            Some(session.clone());
        Ok(())
    }

    fn clear(&self) -> Result<()> {
        *self
            .session
            .write()
            .map_err(|_| ClientError::Storage("session lock poisoned".into()))? = None;
        Ok(())
    }
}

/// JSON file session store.
///
/// The file holds credential material, so it is created owner-readable only
/// on unix.
#[derive(Debug, Clone)]
pub struct FileSessionStore {
    path: PathBuf,
}

impl FileSessionStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl SessionStore for FileSessionStore {
    fn load(&self) -> Result<Option<PersistedSession>> {
        let content = match fs::read_to_string(&self.path) {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(storage_error(&self.path, e)),
        };

        serde_json::from_str(&content)
            .map(Some)
            .map_err(|e| ClientError::Storage(format!("{}: {}", self.path.display(), e)))
    }

    fn save(&self, session: &PersistedSession) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent).map_err(|e| storage_error(parent, e))?;
        }

        let json = serde_json::to_string_pretty(session)
            .map_err(|e| ClientError::Storage(e.to_string()))?;
        write_private(&self.path, json.as_bytes()).map_err(|e| storage_error(&self.path, e))
    }

    fn clear(&self) -> Result<()> {
        match fs::remove_file(&self.path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(storage_error(&self.path, e)),
        }
    }
}

fn storage_error(path: &Path, err: std::io::Error) -> ClientError {
    ClientError::Storage(format!("{}: {}", path.display(), err))
}

#[cfg(unix)]
fn write_private(path: &Path, bytes: &[u8]) -> std::io::Result<()> {
    use std::io::Write;
    use std::os::unix::fs::{OpenOptionsExt, PermissionsExt};

    let mut file = fs::OpenOptions::new()
        .write(true)
        .create(true)
        .truncate(true)
        .mode(0o600)
        .open(path)?;
    // `mode` only applies on creation; tighten files that already existed.
    file.set_permissions(fs::Permissions::from_mode(0o600))?;
    file.write_all(bytes)
}

#[cfg(not(unix))]
fn write_private(path: &Path, bytes: &[u8]) -> std::io::Result<()> {
    fs::write(path, bytes)
}

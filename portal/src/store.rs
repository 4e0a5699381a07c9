//! Bearer-token persistence.
//!
//! DESIGN
//! ======
//! [`TokenStore`] is the local-storage analogue: a string key/value store
//! scoped to one origin. Reads never fail; anything that prevents reading
//! (missing file, permissions, corrupt content) is reported as "no token" so
//! the caller falls back to an anonymous session. [`TokenCell`] binds one key
//! of a store and broadcasts every change to subscribers.

#[cfg(test)]
#[path = "store_test.rs"]
mod tests;

use std::collections::HashMap;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, PoisonError};

use tokio::sync::watch;
use tracing::warn;

use crate::message::Origin;

/// Storage key for the member bearer token.
pub const MEMBER_TOKEN_KEY: &str = "access_token";
/// Storage key for the admin token.
pub const ADMIN_TOKEN_KEY: &str = "admin_token";

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("token storage unavailable: {0}")]
    Io(#[from] std::io::Error),
}

/// Origin-scoped string storage for tokens.
pub trait TokenStore: Send + Sync {
    /// Stored token for `key`, or `None` when absent or unreadable.
    fn load(&self, key: &str) -> Option<String>;

    /// Persist `token` under `key`.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] when the backing storage rejects the write.
    fn save(&self, key: &str, token: &str) -> Result<(), StoreError>;

    /// Remove `key`. Idempotent.
    fn clear(&self, key: &str);
}

// =============================================================================
// MEMORY STORE
// =============================================================================

/// Process-local store used by tests and short-lived tools.
#[derive(Debug, Default)]
pub struct MemoryTokenStore {
    entries: Mutex<HashMap<String, String>>,
}

impl MemoryTokenStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Store pre-seeded with one token.
    #[must_use]
    pub fn with_token(key: &str, token: &str) -> Self {
        let store = Self::new();
        store
            .entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(key.to_owned(), token.to_owned());
        store
    }
}

impl TokenStore for MemoryTokenStore {
    fn load(&self, key: &str) -> Option<String> {
        self.entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .get(key)
            .cloned()
    }

    fn save(&self, key: &str, token: &str) -> Result<(), StoreError> {
        self.entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(key.to_owned(), token.to_owned());
        Ok(())
    }

    fn clear(&self, key: &str) {
        self.entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(key);
    }
}

// =============================================================================
// FILE STORE
// =============================================================================

/// Durable store keeping one file per key in a directory.
///
/// Use [`FileTokenStore::for_origin`] to get a directory per backend origin,
/// mirroring how browser storage is partitioned.
#[derive(Debug, Clone)]
pub struct FileTokenStore {
    dir: PathBuf,
}

impl FileTokenStore {
    #[must_use]
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    #[must_use]
    pub fn for_origin(base: impl AsRef<Path>, origin: &Origin) -> Self {
        Self::new(base.as_ref().join(origin.storage_scope()))
    }

    #[must_use]
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn path(&self, key: &str) -> PathBuf {
        let file: String = key
            .chars()
            .map(|c| if c.is_ascii_alphanumeric() || c == '-' || c == '_' { c } else { '_' })
            .collect();
        self.dir.join(file)
    }
}

impl TokenStore for FileTokenStore {
    fn load(&self, key: &str) -> Option<String> {
        let path = self.path(key);
        match fs::read_to_string(&path) {
            Ok(raw) => {
                let token = raw.trim();
                (!token.is_empty()).then(|| token.to_owned())
            }
            Err(e) if e.kind() == ErrorKind::NotFound => None,
            Err(e) => {
                warn!(error = %e, path = %path.display(), "token read failed; treating as signed out");
                None
            }
        }
    }

    fn save(&self, key: &str, token: &str) -> Result<(), StoreError> {
        fs::create_dir_all(&self.dir)?;
        let path = self.path(key);
        fs::write(&path, token)?;
        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            fs::set_permissions(&path, fs::Permissions::from_mode(0o600))?;
        }
        Ok(())
    }

    fn clear(&self, key: &str) {
        let path = self.path(key);
        match fs::remove_file(&path) {
            Ok(()) => {}
            Err(e) if e.kind() == ErrorKind::NotFound => {}
            Err(e) => warn!(error = %e, path = %path.display(), "token removal failed"),
        }
    }
}

// =============================================================================
// TOKEN CELL
// =============================================================================

/// One key of a [`TokenStore`], with change notifications.
pub struct TokenCell {
    store: Arc<dyn TokenStore>,
    key: String,
    tx: watch::Sender<Option<String>>,
}

impl TokenCell {
    #[must_use]
    pub fn new(store: Arc<dyn TokenStore>, key: &str) -> Self {
        let (tx, _rx) = watch::channel(store.load(key));
        Self { store, key: key.to_owned(), tx }
    }

    #[must_use]
    pub fn key(&self) -> &str {
        &self.key
    }

    /// Current stored token. Reads through to the store every call.
    #[must_use]
    pub fn load(&self) -> Option<String> {
        self.store.load(&self.key)
    }

    /// Persist a token and notify subscribers.
    ///
    /// # Errors
    ///
    /// Propagates the store's write failure; subscribers are not notified
    /// in that case.
    pub fn save(&self, token: &str) -> Result<(), StoreError> {
        self.store.save(&self.key, token)?;
        self.tx.send_replace(Some(token.to_owned()));
        Ok(())
    }

    /// Remove the token and notify subscribers.
    pub fn clear(&self) {
        self.store.clear(&self.key);
        self.tx.send_replace(None);
    }

    /// Receive the latest token value whenever it changes.
    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<Option<String>> {
        self.tx.subscribe()
    }
}

impl std::fmt::Debug for TokenCell {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenCell").field("key", &self.key).finish_non_exhaustive()
    }
}

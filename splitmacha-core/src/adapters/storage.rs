//! Session store adapters
//!
//! The file-backed store persists the session as a single JSON document
//! (`session.json` in the app directory), so the token and user id are always
//! written together - a partial write cannot leave one key without the other.

use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;

use crate::domain::result::{Error, Result};
use crate::domain::Session;
use crate::ports::SessionStore;

/// File name of the persisted session document
pub const SESSION_FILE: &str = "session.json";

/// File-backed session store
#[derive(Debug)]
pub struct FileSessionStore {
    path: PathBuf,
}

impl FileSessionStore {
    /// Create a store rooted at the app directory
    pub fn new(app_dir: &Path) -> Self {
        Self {
            path: app_dir.join(SESSION_FILE),
        }
    }

    /// Path of the session document
    pub fn path(&self) -> &Path {
        &self.path
    }
}

#[async_trait]
impl SessionStore for FileSessionStore {
    async fn load(&self) -> Result<Option<Session>> {
        let content = match tokio::fs::read_to_string(&self.path).await {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(Error::storage(format!("Failed to read session: {}", e))),
        };

        let session: Session = serde_json::from_str(&content)
            .map_err(|e| Error::storage(format!("Corrupt session document: {}", e)))?;

        if session.token.is_empty() || session.user_id.is_empty() {
            return Err(Error::storage("Incomplete session document"));
        }

        Ok(Some(session))
    }

    async fn save(&self, session: &Session) -> Result<()> {
        let content = serde_json::to_string_pretty(session)?;
        tokio::fs::write(&self.path, content)
            .await
            .map_err(|e| Error::storage(format!("Failed to write session: {}", e)))
    }

    async fn clear(&self) -> Result<()> {
        match tokio::fs::remove_file(&self.path).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(Error::storage(format!("Failed to clear session: {}", e))),
        }
    }
}

/// In-memory session store for tests
///
/// `set_fail_loads` makes subsequent reads fail, to exercise the
/// storage-failure path of the session check.
#[derive(Debug, Default)]
pub struct MemorySessionStore {
    inner: Mutex<Option<Session>>,
    fail_loads: AtomicBool,
}

impl MemorySessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Force subsequent `load` calls to fail
    pub fn set_fail_loads(&self, fail: bool) {
        self.fail_loads.store(fail, Ordering::SeqCst);
    }
}

#[async_trait]
impl SessionStore for MemorySessionStore {
    async fn load(&self) -> Result<Option<Session>> {
        if self.fail_loads.load(Ordering::SeqCst) {
            return Err(Error::storage("Simulated storage read failure"));
        }
        Ok(self.inner.lock().expect("session store lock").clone())
    }

    async fn save(&self, session: &Session) -> Result<()> {
        *self.inner.lock().expect("session store lock") = Some(session.clone());
        Ok(())
    }

    async fn clear(&self) -> Result<()> {
        *self.inner.lock().expect("session store lock") = None;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_load_reports_none_when_no_session_stored() {
        let dir = TempDir::new().unwrap();
        let store = FileSessionStore::new(dir.path());
        assert!(store.load().await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_save_then_load_round_trip() {
        let dir = TempDir::new().unwrap();
        let store = FileSessionStore::new(dir.path());

        let session = Session::new("mock-token-user-1", "user-1");
        store.save(&session).await.unwrap();

        let loaded = store.load().await.unwrap().unwrap();
        assert_eq!(loaded, session);
    }

    #[tokio::test]
    async fn test_clear_is_idempotent() {
        let dir = TempDir::new().unwrap();
        let store = FileSessionStore::new(dir.path());

        // Clearing with nothing stored succeeds
        store.clear().await.unwrap();

        store.save(&Session::new("t", "u")).await.unwrap();
        store.clear().await.unwrap();
        store.clear().await.unwrap();
        assert!(store.load().await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_corrupt_document_is_a_storage_error() {
        let dir = TempDir::new().unwrap();
        let store = FileSessionStore::new(dir.path());

        tokio::fs::write(store.path(), "not json").await.unwrap();
        let err = store.load().await.unwrap_err();
        assert!(matches!(err, Error::Storage(_)));
    }

    #[tokio::test]
    async fn test_incomplete_document_is_rejected() {
        let dir = TempDir::new().unwrap();
        let store = FileSessionStore::new(dir.path());

        tokio::fs::write(store.path(), r#"{"token": "", "userId": "user-1"}"#)
            .await
            .unwrap();
        assert!(store.load().await.is_err());
    }
}

use std::{
    fs,
    io::ErrorKind,
    path::{Path, PathBuf},
    sync::{Mutex, MutexGuard},
};

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::{
    auth::{Session, User},
    error::{Error, Result},
};

/// Durable persistence for the session pair.
///
/// Exactly two entries are kept: the opaque credential token and the
/// serialized user record. Implementations are injected through the
/// [`Client`](crate::Client) builder, so applications can keep a
/// [`FileStore`] while tests run against a [`MemoryStore`].
pub trait SessionStore: Send + Sync + std::fmt::Debug {
    /// Returns the stored session if both entries are present and the user
    /// record deserializes. Missing or corrupt data is "no session", never
    /// an error.
    fn load(&self) -> Option<Session>;

    /// Persists both entries together.
    fn save(&self, session: &Session) -> Result<()>;

    /// Removes both entries. Idempotent and best-effort: ending a session
    /// must not be able to fail.
    fn clear(&self);
}

/// The two persisted entries. The user record stays in its serialized form
/// so every load exercises the same deserialization path a fresh process
/// would.
#[derive(Serialize, Deserialize, Debug, Clone)]
struct Entries {
    token: String,
    user: String,
}

impl Entries {
    fn from_session(session: &Session) -> Result<Self> {
        Ok(Self {
            token: session.token.clone(),
            user: serde_json::to_string(&session.user)?,
        })
    }

    fn into_session(self) -> Option<Session> {
        if self.token.is_empty() {
            return None;
        }
        match serde_json::from_str::<User>(&self.user) {
            Ok(user) => Some(Session {
                token: self.token,
                user,
            }),
            Err(e) => {
                warn!(error = %e, "stored user record is corrupt, treating it as no session");
                None
            }
        }
    }
}

/// Volatile in-memory store. Sessions do not survive the process, which is
/// exactly what tests and short-lived tools want.
#[derive(Debug, Default)]
pub struct MemoryStore {
    entries: Mutex<Option<Entries>>,
}

impl MemoryStore {
    /// Creates an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, Option<Entries>> {
        self.entries.lock().unwrap_or_else(|e| e.into_inner())
    }
}

impl SessionStore for MemoryStore {
    fn load(&self) -> Option<Session> {
        self.lock().clone().and_then(Entries::into_session)
    }

    fn save(&self, session: &Session) -> Result<()> {
        *self.lock() = Some(Entries::from_session(session)?);
        Ok(())
    }

    fn clear(&self) {
        *self.lock() = None;
    }
}

/// File-backed store holding both entries in one JSON document.
///
/// One session lives at one path, surviving process restarts. Missing parent
/// directories are created on the first save.
#[derive(Debug, Clone)]
pub struct FileStore {
    path: PathBuf,
}

impl FileStore {
    /// Creates a store that keeps the session at `path`.
    pub fn new<P: Into<PathBuf>>(path: P) -> Self {
        Self { path: path.into() }
    }

    /// The path the session lives at.
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl SessionStore for FileStore {
    fn load(&self) -> Option<Session> {
        let raw = match fs::read_to_string(&self.path) {
            Ok(raw) => raw,
            Err(e) if e.kind() == ErrorKind::NotFound => return None,
            Err(e) => {
                warn!(path = %self.path.display(), error = %e, "failed to read the session file, treating it as no session");
                return None;
            }
        };
        match serde_json::from_str::<Entries>(&raw) {
            Ok(entries) => entries.into_session(),
            Err(e) => {
                warn!(path = %self.path.display(), error = %e, "session file is corrupt, treating it as no session");
                None
            }
        }
    }

    fn save(&self, session: &Session) -> Result<()> {
        let raw = serde_json::to_string(&Entries::from_session(session)?)?;
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent).map_err(Error::StoreWrite)?;
            }
        }
        fs::write(&self.path, raw).map_err(Error::StoreWrite)
    }

    fn clear(&self) {
        if let Err(e) = fs::remove_file(&self.path) {
            if e.kind() != ErrorKind::NotFound {
                warn!(path = %self.path.display(), error = %e, "failed to remove the session file");
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn session() -> Session {
        Session {
            token: "xsct-42".to_string(),
            user: User {
                id: "u_1041".to_string(),
                email: "grace@example.com".to_string(),
                name: "Grace".to_string(),
                target_role: Some("Staff Engineer".to_string()),
                experience_level: Some("Senior".to_string()),
            },
        }
    }

    #[test]
    fn memory_round_trip() {
        let store = MemoryStore::new();
        assert!(store.load().is_none());

        store.save(&session()).unwrap();
        assert_eq!(store.load(), Some(session()));

        store.clear();
        assert!(store.load().is_none());
        store.clear();
    }

    #[test]
    fn file_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileStore::new(dir.path().join("session.json"));
        assert!(store.load().is_none());

        store.save(&session()).unwrap();
        assert_eq!(store.load(), Some(session()));

        store.clear();
        assert!(store.load().is_none());
        store.clear();
    }

    #[test]
    fn file_save_creates_parent_directories() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileStore::new(dir.path().join("state/auth/session.json"));

        store.save(&session()).unwrap();
        assert_eq!(store.load(), Some(session()));
    }

    #[test]
    fn corrupt_file_is_no_session() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("session.json");
        std::fs::write(&path, "{ not json").unwrap();

        assert!(FileStore::new(path).load().is_none());
    }

    #[test]
    fn corrupt_user_record_is_no_session() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("session.json");
        let raw = serde_json::to_string(&Entries {
            token: "xsct-42".to_string(),
            user: "{\"id\": 7}".to_string(),
        })
        .unwrap();
        std::fs::write(&path, raw).unwrap();

        assert!(FileStore::new(path).load().is_none());
    }

    #[test]
    fn empty_token_is_no_session() {
        let store = MemoryStore::new();
        let mut incomplete = session();
        incomplete.token.clear();
        store.save(&incomplete).unwrap();

        assert!(store.load().is_none());
    }
}

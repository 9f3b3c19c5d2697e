use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use anyhow::{Context, Result};
use tracing::{debug, warn};

use crate::models::User;

/// Persistent cache of the signed-in user and their bearer token
pub trait SessionStore: Send + Sync {
    fn token(&self) -> Option<String>;

    fn user(&self) -> Option<User>;

    fn save(&self, token: &str, user: &User) -> Result<()>;

    /// Refresh the cached profile, keeping the token
    fn save_user(&self, user: &User) -> Result<()>;

    fn clear(&self) -> Result<()>;
}

/// Session cache kept as two files (`token`, `user.json`) in a directory
pub struct FileSessionStore {
    dir: PathBuf,
}

impl FileSessionStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn token_path(&self) -> PathBuf {
        self.dir.join("token")
    }

    fn user_path(&self) -> PathBuf {
        self.dir.join("user.json")
    }

    fn write(&self, path: &Path, contents: &str) -> Result<()> {
        fs::create_dir_all(&self.dir)
            .with_context(|| format!("Failed to create {}", self.dir.display()))?;
        fs::write(path, contents).with_context(|| format!("Failed to write {}", path.display()))
    }
}

fn remove_if_present(path: &Path) -> Result<()> {
    match fs::remove_file(path) {
        Ok(()) => Ok(()),
        Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
        Err(e) => Err(e).with_context(|| format!("Failed to remove {}", path.display())),
    }
}

impl SessionStore for FileSessionStore {
    fn token(&self) -> Option<String> {
        let token = fs::read_to_string(self.token_path()).ok()?;
        let token = token.trim();
        (!token.is_empty()).then(|| token.to_string())
    }

    fn user(&self) -> Option<User> {
        let raw = fs::read_to_string(self.user_path()).ok()?;
        match serde_json::from_str(&raw) {
            Ok(user) => Some(user),
            Err(e) => {
                warn!("Ignoring unreadable cached user: {}", e);
                None
            }
        }
    }

    fn save(&self, token: &str, user: &User) -> Result<()> {
        self.write(&self.token_path(), token)?;
        self.save_user(user)
    }

    fn save_user(&self, user: &User) -> Result<()> {
        let json = serde_json::to_string_pretty(user)?;
        self.write(&self.user_path(), &json)?;
        debug!("Cached user {} in {}", user.email, self.dir.display());
        Ok(())
    }

    fn clear(&self) -> Result<()> {
        remove_if_present(&self.token_path())?;
        remove_if_present(&self.user_path())?;
        debug!("Cleared cached session in {}", self.dir.display());
        Ok(())
    }
}

/// Process-local session cache
#[derive(Default)]
pub struct MemorySessionStore {
    inner: Mutex<(Option<String>, Option<User>)>,
}

impl MemorySessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    #[cfg(test)]
    pub fn with_session(token: &str, user: User) -> Self {
        Self {
            inner: Mutex::new((Some(token.to_string()), Some(user))),
        }
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, (Option<String>, Option<User>)> {
        // a poisoned cache is still usable: every write replaces whole values
        self.inner.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl SessionStore for MemorySessionStore {
    fn token(&self) -> Option<String> {
        self.lock().0.clone()
    }

    fn user(&self) -> Option<User> {
        self.lock().1.clone()
    }

    fn save(&self, token: &str, user: &User) -> Result<()> {
        *self.lock() = (Some(token.to_string()), Some(user.clone()));
        Ok(())
    }

    fn save_user(&self, user: &User) -> Result<()> {
        self.lock().1 = Some(user.clone());
        Ok(())
    }

    fn clear(&self) -> Result<()> {
        *self.lock() = (None, None);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::test_user;
    use tempfile::TempDir;

    #[test]
    fn file_store_round_trips_and_clears() {
        let tmp = TempDir::new().unwrap();
        let store = FileSessionStore::new(tmp.path().join("session"));
        assert!(store.token().is_none());
        assert!(store.user().is_none());

        let user = test_user("agent");
        store.save("tok-123", &user).unwrap();
        assert_eq!(store.token().as_deref(), Some("tok-123"));
        assert_eq!(store.user(), Some(user));

        store.clear().unwrap();
        assert!(store.token().is_none());
        assert!(store.user().is_none());
        // clearing twice is fine
        store.clear().unwrap();
    }

    #[test]
    fn corrupt_user_file_reads_as_missing() {
        let tmp = TempDir::new().unwrap();
        let store = FileSessionStore::new(tmp.path());
        fs::write(tmp.path().join("user.json"), "{not json").unwrap();
        fs::write(tmp.path().join("token"), "tok").unwrap();
        assert!(store.user().is_none());
        assert_eq!(store.token().as_deref(), Some("tok"));
    }

    #[test]
    fn save_user_keeps_token() {
        let store = MemorySessionStore::with_session("tok", test_user("user"));
        let mut fresh = test_user("agent");
        fresh.first_name = "Renamed".into();
        store.save_user(&fresh).unwrap();
        assert_eq!(store.token().as_deref(), Some("tok"));
        assert_eq!(store.user().unwrap().first_name, "Renamed");
    }
}

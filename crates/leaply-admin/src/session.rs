//! Auth session: the bearer token and where it is persisted.
//!
//! The session is created once at start-up with [`Session::restore`] and
//! handed to [`ApiClient::new`](crate::client::ApiClient::new); nothing reads
//! the token from ambient storage after that. A restored token is trusted
//! until a request comes back 401, at which point the client calls
//! [`Session::expire`].

use std::fs;
use std::path::PathBuf;
use std::sync::Arc;

use arc_swap::ArcSwapOption;
use serde::{Deserialize, Serialize};

use crate::error::{AdminError, Result};
use crate::shell::Route;

/// Where the session token survives between runs.
pub trait TokenStore: Send + Sync {
    fn load(&self) -> Result<Option<String>>;
    fn save(&self, token: &str) -> Result<()>;
    /// Returns `true` if a token was removed.
    fn clear(&self) -> Result<bool>;
}

#[derive(Debug, Serialize, Deserialize)]
struct StoredSession {
    token: String,
}

/// Token persisted as JSON under `~/.leaply/session.<profile>.json`.
#[derive(Debug, Clone)]
pub struct FileTokenStore {
    path: PathBuf,
}

impl FileTokenStore {
    pub fn for_profile(profile: &str) -> Result<Self> {
        let dir = dirs::home_dir()
            .ok_or_else(|| AdminError::storage("Cannot determine home directory"))?
            .join(".leaply");
        Ok(Self::at(dir.join(format!("session.{profile}.json"))))
    }

    pub fn at(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &std::path::Path {
        &self.path
    }
}

impl TokenStore for FileTokenStore {
    fn load(&self) -> Result<Option<String>> {
        if !self.path.exists() {
            return Ok(None);
        }
        let content = fs::read_to_string(&self.path)
            .map_err(|e| AdminError::storage(format!("read {}: {e}", self.path.display())))?;
        let stored: StoredSession = serde_json::from_str(&content)
            .map_err(|e| AdminError::storage(format!("parse {}: {e}", self.path.display())))?;
        Ok(Some(stored.token).filter(|t| !t.is_empty()))
    }

    fn save(&self, token: &str) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)
                .map_err(|e| AdminError::storage(format!("mkdir {}: {e}", parent.display())))?;
        }
        let content = serde_json::to_string_pretty(&StoredSession {
            token: token.to_string(),
        })?;
        fs::write(&self.path, content)
            .map_err(|e| AdminError::storage(format!("write {}: {e}", self.path.display())))?;
        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            if let Err(e) = fs::set_permissions(&self.path, fs::Permissions::from_mode(0o600)) {
                tracing::warn!("failed to chmod 0600 {}: {e}", self.path.display());
            }
        }
        Ok(())
    }

    fn clear(&self) -> Result<bool> {
        if !self.path.exists() {
            return Ok(false);
        }
        fs::remove_file(&self.path)
            .map_err(|e| AdminError::storage(format!("delete {}: {e}", self.path.display())))?;
        Ok(true)
    }
}

/// Process-local store, used by tests and throwaway sessions.
#[derive(Default)]
pub struct MemoryTokenStore {
    token: ArcSwapOption<String>,
}

impl MemoryTokenStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_token(token: impl Into<String>) -> Self {
        Self {
            token: ArcSwapOption::from_pointee(token.into()),
        }
    }
}

impl TokenStore for MemoryTokenStore {
    fn load(&self) -> Result<Option<String>> {
        Ok(self.token.load_full().map(|t| t.as_ref().clone()))
    }

    fn save(&self, token: &str) -> Result<()> {
        self.token.store(Some(Arc::new(token.to_string())));
        Ok(())
    }

    fn clear(&self) -> Result<bool> {
        Ok(self.token.swap(None).is_some())
    }
}

/// Shared handle to the current session. Cloning shares the same token.
#[derive(Clone)]
pub struct Session {
    token: Arc<ArcSwapOption<String>>,
    store: Arc<dyn TokenStore>,
}

impl Session {
    /// Read the persisted token once and build the session from it.
    pub fn restore(store: Arc<dyn TokenStore>) -> Result<Self> {
        let token = store.load()?;
        if token.is_some() {
            tracing::debug!("restored persisted session token");
        }
        Ok(Self {
            token: Arc::new(ArcSwapOption::from(token.map(Arc::new))),
            store,
        })
    }

    /// A session with nothing persisted and no token.
    pub fn anonymous() -> Self {
        Self {
            token: Arc::new(ArcSwapOption::empty()),
            store: Arc::new(MemoryTokenStore::new()),
        }
    }

    pub fn is_authenticated(&self) -> bool {
        self.token.load().is_some()
    }

    pub fn token(&self) -> Option<Arc<String>> {
        self.token.load_full()
    }

    /// Persist `token`, mark the session authenticated, go to the dashboard.
    pub fn login(&self, token: impl Into<String>) -> Result<Route> {
        let token = token.into();
        self.store.save(&token)?;
        self.token.store(Some(Arc::new(token)));
        tracing::info!("session authenticated");
        Ok(Route::Dashboard)
    }

    /// Forget the token and go back to the login screen.
    pub fn logout(&self) -> Result<Route> {
        self.store.clear()?;
        self.token.store(None);
        tracing::info!("session closed");
        Ok(Route::Login)
    }

    /// Drop a token the server has rejected.
    pub fn expire(&self) {
        if self.token.swap(None).is_none() {
            return;
        }
        tracing::warn!("session token rejected by server; logging out");
        if let Err(e) = self.store.clear() {
            tracing::warn!(error = %e, "failed to clear persisted session token");
        }
    }

    /// Where to go on start-up.
    pub fn landing_route(&self) -> Route {
        if self.is_authenticated() {
            Route::Dashboard
        } else {
            Route::Login
        }
    }
}

impl std::fmt::Debug for Session {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Session")
            .field("authenticated", &self.is_authenticated())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_restore_without_token_is_anonymous() {
        let session = Session::restore(Arc::new(MemoryTokenStore::new())).unwrap();
        assert!(!session.is_authenticated());
        assert_eq!(session.landing_route(), Route::Login);
    }

    #[test]
    fn test_restore_with_token_is_optimistically_authenticated() {
        let session = Session::restore(Arc::new(MemoryTokenStore::with_token("abc"))).unwrap();
        assert!(session.is_authenticated());
        assert_eq!(session.token().as_deref().map(String::as_str), Some("abc"));
        assert_eq!(session.landing_route(), Route::Dashboard);
    }

    #[test]
    fn test_login_then_logout() {
        let store = Arc::new(MemoryTokenStore::new());
        let session = Session::restore(store.clone()).unwrap();

        assert_eq!(session.login("tok-1").unwrap(), Route::Dashboard);
        assert!(session.is_authenticated());
        assert_eq!(store.load().unwrap().as_deref(), Some("tok-1"));

        assert_eq!(session.logout().unwrap(), Route::Login);
        assert!(!session.is_authenticated());
        assert_eq!(store.load().unwrap(), None);
    }

    struct ReadOnlyStore;

    impl TokenStore for ReadOnlyStore {
        fn load(&self) -> Result<Option<String>> {
            Ok(Some("tok-disk".into()))
        }

        fn save(&self, _token: &str) -> Result<()> {
            Err(AdminError::storage("read-only"))
        }

        fn clear(&self) -> Result<bool> {
            Err(AdminError::storage("read-only"))
        }
    }

    #[test]
    fn test_failed_logout_keeps_session() {
        let session = Session::restore(Arc::new(ReadOnlyStore)).unwrap();
        assert!(session.is_authenticated());

        let err = session.logout().unwrap_err();
        assert!(matches!(err, AdminError::Storage(_)));
        assert!(session.is_authenticated());
        assert_eq!(session.token().as_deref().map(String::as_str), Some("tok-disk"));
    }

    #[test]
    fn test_clones_share_state() {
        let session = Session::anonymous();
        let other = session.clone();
        session.login("shared").unwrap();
        assert!(other.is_authenticated());
        other.expire();
        assert!(!session.is_authenticated());
    }

    #[test]
    fn test_file_store_survives_restart() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("session.default.json");

        let session = Session::restore(Arc::new(FileTokenStore::at(&path))).unwrap();
        session.login("persisted-token").unwrap();
        assert!(path.exists());

        let reloaded = Session::restore(Arc::new(FileTokenStore::at(&path))).unwrap();
        assert!(reloaded.is_authenticated());

        reloaded.expire();
        assert!(!path.exists());
        let after = Session::restore(Arc::new(FileTokenStore::at(&path))).unwrap();
        assert!(!after.is_authenticated());
    }

    #[test]
    fn test_file_store_clear_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileTokenStore::at(dir.path().join("session.json"));
        assert!(!store.clear().unwrap());
    }
}

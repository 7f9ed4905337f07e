//! Persisted token slots: access token, refresh token and the one-shot
//! PKCE code verifier.

use std::collections::HashMap;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::RwLock;

use crate::Result;

/// The three named slots of persisted auth state.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum TokenSlot {
    AccessToken,
    RefreshToken,
    CodeVerifier,
}

impl TokenSlot {
    pub const ALL: [TokenSlot; 3] = [
        TokenSlot::AccessToken,
        TokenSlot::RefreshToken,
        TokenSlot::CodeVerifier,
    ];

    pub fn file_name(self) -> &'static str {
        match self {
            TokenSlot::AccessToken => "access_token",
            TokenSlot::RefreshToken => "refresh_token",
            TokenSlot::CodeVerifier => "code_verifier",
        }
    }
}

/// Access token plus optional refresh token.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TokenPair {
    pub access_token: String,
    pub refresh_token: Option<String>,
}

/// Key/value storage for the auth slots.
pub trait TokenStore: Send + Sync {
    fn get(&self, slot: TokenSlot) -> Result<Option<String>>;
    fn set(&self, slot: TokenSlot, value: &str) -> Result<()>;
    fn remove(&self, slot: TokenSlot) -> Result<()>;

    fn access_token(&self) -> Result<Option<String>> {
        self.get(TokenSlot::AccessToken)
    }

    fn refresh_token(&self) -> Result<Option<String>> {
        self.get(TokenSlot::RefreshToken)
    }

    /// Current pair, `None` while no access token is stored.
    fn token_pair(&self) -> Result<Option<TokenPair>> {
        Ok(self.access_token()?.map(|access_token| TokenPair {
            access_token,
            refresh_token: self.refresh_token().ok().flatten(),
        }))
    }

    /// Write the access token and, when supplied, the refresh token.
    fn store_pair(&self, pair: &TokenPair) -> Result<()> {
        self.set(TokenSlot::AccessToken, &pair.access_token)?;
        if let Some(refresh) = &pair.refresh_token {
            self.set(TokenSlot::RefreshToken, refresh)?;
        }
        Ok(())
    }

    fn clear_tokens(&self) -> Result<()> {
        self.remove(TokenSlot::AccessToken)?;
        self.remove(TokenSlot::RefreshToken)
    }
}

/// Process-local store, used by tests and short-lived sessions.
#[derive(Debug, Default)]
pub struct MemoryTokenStore {
    slots: RwLock<HashMap<TokenSlot, String>>,
}

impl MemoryTokenStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl TokenStore for MemoryTokenStore {
    fn get(&self, slot: TokenSlot) -> Result<Option<String>> {
        let slots = self.slots.read().unwrap_or_else(|e| e.into_inner());
        Ok(slots.get(&slot).cloned())
    }

    fn set(&self, slot: TokenSlot, value: &str) -> Result<()> {
        let mut slots = self.slots.write().unwrap_or_else(|e| e.into_inner());
        slots.insert(slot, value.to_string());
        Ok(())
    }

    fn remove(&self, slot: TokenSlot) -> Result<()> {
        let mut slots = self.slots.write().unwrap_or_else(|e| e.into_inner());
        slots.remove(&slot);
        Ok(())
    }
}

/// One file per slot under a directory, e.g. `<data_dir>/tokens/refresh_token`.
#[derive(Debug, Clone)]
pub struct FileTokenStore {
    dir: PathBuf,
}

impl FileTokenStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn path(&self, slot: TokenSlot) -> PathBuf {
        self.dir.join(slot.file_name())
    }
}

impl TokenStore for FileTokenStore {
    fn get(&self, slot: TokenSlot) -> Result<Option<String>> {
        match fs::read_to_string(self.path(slot)) {
            Ok(content) => {
                let value = content.trim();
                Ok((!value.is_empty()).then(|| value.to_string()))
            }
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    fn set(&self, slot: TokenSlot, value: &str) -> Result<()> {
        if !self.dir.exists() {
            fs::create_dir_all(&self.dir)?;
        }
        fs::write(self.path(slot), value)?;
        tracing::trace!(slot = slot.file_name(), "Token slot written");
        Ok(())
    }

    fn remove(&self, slot: TokenSlot) -> Result<()> {
        match fs::remove_file(self.path(slot)) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn exercise(store: &dyn TokenStore) {
        assert_eq!(store.token_pair().unwrap(), None);

        store.set(TokenSlot::RefreshToken, "r1").unwrap();
        // a refresh token alone is not a session
        assert_eq!(store.token_pair().unwrap(), None);

        store
            .store_pair(&TokenPair {
                access_token: "a1".to_string(),
                refresh_token: None,
            })
            .unwrap();
        assert_eq!(
            store.token_pair().unwrap(),
            Some(TokenPair {
                access_token: "a1".to_string(),
                refresh_token: Some("r1".to_string()),
            })
        );

        store.set(TokenSlot::CodeVerifier, "v").unwrap();
        store.clear_tokens().unwrap();
        assert_eq!(store.access_token().unwrap(), None);
        assert_eq!(store.refresh_token().unwrap(), None);
        assert_eq!(store.get(TokenSlot::CodeVerifier).unwrap().as_deref(), Some("v"));

        // removing twice is fine
        store.remove(TokenSlot::CodeVerifier).unwrap();
        store.remove(TokenSlot::CodeVerifier).unwrap();
    }

    #[test]
    fn memory_store_slots() {
        exercise(&MemoryTokenStore::new());
    }

    #[test]
    fn file_store_slots() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileTokenStore::new(dir.path().join("tokens"));
        exercise(&store);
    }

    #[test]
    fn file_store_survives_reopen() {
        let dir = tempfile::tempdir().unwrap();
        FileTokenStore::new(dir.path())
            .set(TokenSlot::AccessToken, "persisted\n")
            .unwrap();
        let reopened = FileTokenStore::new(dir.path());
        assert_eq!(reopened.access_token().unwrap().as_deref(), Some("persisted"));
    }
}

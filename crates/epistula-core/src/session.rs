//! Durable part of the browser session: the bearer token and the cached
//! user profile, kept in some persistent client-side storage.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::LOG_TARGET;

/// Storage key of the bearer token.
pub const TOKEN_KEY: &str = "token";
/// Storage key of the cached user profile (json).
pub const USER_KEY: &str = "user";

/// A string key/value storage that outlives a single page load.
///
/// Mirrors the browser's local storage: absence of a key is a normal state,
/// and writes do not fail from the caller's point of view.
pub trait SessionStorage {
    fn get_item(&self, key: &str) -> Option<String>;
    fn set_item(&mut self, key: &str, value: &str);
    fn remove_item(&mut self, key: &str);
}

/// Plain in-memory storage.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MemoryStorage(HashMap<String, String>);

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl SessionStorage for MemoryStorage {
    fn get_item(&self, key: &str) -> Option<String> {
        self.0.get(key).cloned()
    }

    fn set_item(&mut self, key: &str, value: &str) {
        self.0.insert(key.to_owned(), value.to_owned());
    }

    fn remove_item(&mut self, key: &str) {
        self.0.remove(key);
    }
}

/// Profile blob cached next to the token, used for greetings only.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserProfile {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
}

impl UserProfile {
    /// Name to greet the user with: the name, or else the email.
    pub fn display_name(&self) -> Option<&str> {
        self.name
            .as_deref()
            .filter(|n| !n.trim().is_empty())
            .or(self.email.as_deref())
    }
}

/// Session store over an optional storage.
///
/// A store without storage behaves like a browser context where local
/// storage is not available (e.g. prerendering): it is always empty and
/// writes are dropped.
#[derive(Debug)]
pub struct SessionStore<S> {
    storage: Option<S>,
}

impl<S> SessionStore<S>
where
    S: SessionStorage,
{
    pub fn new(storage: S) -> Self {
        Self {
            storage: Some(storage),
        }
    }

    pub fn unavailable() -> Self {
        Self { storage: None }
    }

    pub fn is_available(&self) -> bool {
        self.storage.is_some()
    }

    /// The stored bearer token, if any.
    pub fn load(&self) -> Option<String> {
        self.storage
            .as_ref()?
            .get_item(TOKEN_KEY)
            .filter(|token| !token.is_empty())
    }

    /// The cached user profile. A blob that does not parse is treated as
    /// absent.
    pub fn user(&self) -> Option<UserProfile> {
        let raw = self.storage.as_ref()?.get_item(USER_KEY)?;
        serde_json::from_str(&raw)
            .inspect_err(|err| debug!(target: LOG_TARGET, %err, "Ignoring malformed user blob"))
            .ok()
    }

    /// Persist a freshly obtained token, and the profile if known.
    pub fn save(&mut self, token: &str, user: Option<&UserProfile>) {
        let Some(storage) = self.storage.as_mut() else {
            debug!(target: LOG_TARGET, "No storage available, session not saved");
            return;
        };
        storage.set_item(TOKEN_KEY, token);
        match user.map(serde_json::to_string) {
            Some(Ok(user)) => storage.set_item(USER_KEY, &user),
            Some(Err(err)) => {
                debug!(target: LOG_TARGET, %err, "Could not serialize user blob");
                storage.remove_item(USER_KEY);
            }
            None => storage.remove_item(USER_KEY),
        }
    }

    /// Remove the token and the cached profile. Idempotent.
    pub fn clear(&mut self) {
        if let Some(storage) = self.storage.as_mut() {
            storage.remove_item(TOKEN_KEY);
            storage.remove_item(USER_KEY);
        }
    }

    pub fn storage(&self) -> Option<&S> {
        self.storage.as_ref()
    }

    pub fn into_storage(self) -> Option<S> {
        self.storage
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_storage_has_no_session() {
        let store = SessionStore::new(MemoryStorage::new());
        assert_eq!(store.load(), None);
        assert_eq!(store.user(), None);
    }

    #[test]
    fn unavailable_storage_has_no_session_and_drops_writes() {
        let mut store = SessionStore::<MemoryStorage>::unavailable();
        store.save("a.b.c", None);
        assert_eq!(store.load(), None);
        store.clear();
        assert!(!store.is_available());
    }

    #[test]
    fn save_then_load() {
        let mut store = SessionStore::new(MemoryStorage::new());
        let user = UserProfile {
            name: Some("Ada".into()),
            email: Some("ada@example.com".into()),
        };
        store.save("a.b.c", Some(&user));

        assert_eq!(store.load().as_deref(), Some("a.b.c"));
        assert_eq!(store.user(), Some(user));
    }

    #[test]
    fn empty_token_counts_as_absent() {
        let mut storage = MemoryStorage::new();
        storage.set_item(TOKEN_KEY, "");
        assert_eq!(SessionStore::new(storage).load(), None);
    }

    #[test]
    fn clear_is_idempotent() {
        let mut store = SessionStore::new(MemoryStorage::new());
        store.save("a.b.c", Some(&UserProfile::default()));

        store.clear();
        store.clear();

        assert_eq!(store.load(), None);
        assert_eq!(store.user(), None);
        assert!(store.storage().is_some_and(MemoryStorage::is_empty));
    }

    #[test]
    fn malformed_user_blob_is_ignored() {
        let mut storage = MemoryStorage::new();
        storage.set_item(USER_KEY, "{not json");
        assert_eq!(SessionStore::new(storage).user(), None);
    }

    #[test]
    fn display_name_prefers_name_over_email() {
        let user = UserProfile {
            name: Some(" ".into()),
            email: Some("ada@example.com".into()),
        };
        assert_eq!(user.display_name(), Some("ada@example.com"));
    }
}
